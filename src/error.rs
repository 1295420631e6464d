//! The crate's closed error type. The sweep itself never panics on bad
//! input — invalid input is checked up front in `engine::compute` and
//! rejected before any work happens — but a small set of conditions the
//! algorithm must never reach in practice (a broken beachline neighbour
//! triple, an unclosable cell) still need a way to surface as a diagnostic
//! rather than a panic, so both variants share one enum.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoronoiError {
    #[error("site {index} has a non-finite coordinate: ({x}, {y})")]
    NonFiniteSite { index: usize, x: f64, y: f64 },

    #[error("bounding box dimensions must be positive, got {width} x {height}")]
    InvalidBoundingBox { width: f64, height: f64 },

    #[error("at least one site is required")]
    EmptyInput,

    #[error("sites {a} and {b} are duplicates within epsilon")]
    DuplicateSite { a: usize, b: usize },

    #[error("internal invariant violated near site {site}: {detail}")]
    InternalInvariant { site: usize, detail: &'static str },
}

pub type Result<T> = std::result::Result<T, VoronoiError>;
