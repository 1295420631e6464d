#![warn(clippy::all)]
#![forbid(unsafe_code)]
//!# Docs
//!
//! This is a rust implementation of
//! [fortune's algorithm](https://en.wikipedia.org/wiki/Fortune%27s_algorithm) to generate a
//! bounded [voronoi diagram](https://en.wikipedia.org/wiki/Voronoi_diagram) of the plane.
//!
//!## Implementation Details
//! The implementation is entirely in safe rust code.
//!
//! The input is a slice of sites plus the width and height of an axis-aligned bounding box
//! with corners `(0, 0)` and `(width, height)` — sites need not be pre-normalised to the unit
//! square. The resulting diagram is returned as a sites/vertices/edges/cells structure rather
//! than a DCEL of half-edge pointers; see [`diagram::Diagram`].
//!
//!## Example Usage
//!
//! ```rust
//! use fortune_voronoi::vector2::Vector2;
//!
//! let sites = vec![
//!     Vector2::new(0.2, 0.3),
//!     Vector2::new(0.7, 0.5),
//!     Vector2::new(0.4, 0.8),
//! ];
//! let diagram = fortune_voronoi::compute(&sites, 1.0, 1.0).unwrap();
//! assert_eq!(diagram.cell_count(), 3);
//! ```

mod arena;
mod beachline;
mod boundingbox;
pub mod diagram;
mod engine;
pub mod error;
mod event;
mod finishing;
mod ordered_tree;
pub mod typedvector;
pub mod vector2;

pub use engine::compute;
pub use error::VoronoiError;

use diagram::Diagram;
use vector2::Vector2;

/// Performs [Lloyd's algorithm](https://en.wikipedia.org/wiki/Lloyd%27s_algorithm) on the
/// supplied sites, against the box with corners `(0, 0)` and `(width, height)`.
///
/// Each iteration computes the diagram and replaces every site with its cell's centroid,
/// spreading the points toward a more even distribution. Returns whatever error `compute`
/// would on the initial or any intermediate iteration's input (relaxation can, in principle,
/// move a site onto another within ε).
pub fn lloyds_relaxation(
    sites: &[Vector2],
    width: f64,
    height: f64,
    iterations: usize,
) -> Result<Vec<Vector2>, VoronoiError> {
    let mut sites = sites.to_vec();
    for _ in 0..iterations {
        let diagram: Diagram = compute(&sites, width, height)?;
        sites = diagram.cells().map(|(cell, _)| diagram.cell_center(cell)).collect();
    }
    Ok(sites)
}
