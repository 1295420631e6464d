//! The beachline: the x-ordered sequence of parabolic arcs the sweep
//! maintains as it moves down the plane. Built on [`crate::ordered_tree`],
//! the same red-black-plus-linked-list primitive the event queue uses —
//! the beachline just supplies its own, dynamic (sweep-y-dependent) notion
//! of where a new arc belongs, then delegates the actual insert/rebalance
//! to the tree.

use crate::diagram::{Diagram, EdgeIndex, SiteIndex};
use crate::event::CircleEvent;
use crate::ordered_tree::{NodeId, Tree};
use crate::vector2::{Vector2, EPSILON};

/// A beachline node: which site's parabola this arc traces, the edges
/// currently being drawn by its two breakpoints, and the circle event (if
/// any) that will remove it.
#[derive(Clone, Debug)]
pub struct Arc {
    pub site: SiteIndex,
    pub left_edge: Option<EdgeIndex>,
    pub right_edge: Option<EdgeIndex>,
    pub event: Option<NodeId<CircleEvent>>,
}

/// A handle to a beachline node — identical to `NodeId<Arc>`, named for
/// what it points at rather than how it's stored.
pub type ArcId = NodeId<Arc>;

pub struct Beachline {
    tree: Tree<Arc>,
}

impl Beachline {
    pub fn new() -> Self {
        Beachline { tree: Tree::new() }
    }

    pub fn is_empty(&self) -> bool {
        !self.tree.has_root()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Inserts the very first arc, when a site event finds the beachline
    /// empty.
    ///
    /// # Panics
    /// Panics if the beachline already has a root.
    pub fn insert_root(&mut self, site: SiteIndex) -> ArcId {
        self.tree.create_root(Arc {
            site,
            left_edge: None,
            right_edge: None,
            event: None,
        })
    }

    pub fn get(&self, arc: ArcId) -> &Arc {
        self.tree.get_contents(arc)
    }

    pub fn get_mut(&mut self, arc: ArcId) -> &mut Arc {
        self.tree.get_mut_contents(arc)
    }

    pub fn prev(&self, arc: ArcId) -> Option<ArcId> {
        self.tree.get_prev(arc)
    }

    pub fn next(&self, arc: ArcId) -> Option<ArcId> {
        self.tree.get_next(arc)
    }

    pub fn first(&self) -> Option<ArcId> {
        self.tree.get_leftmost_node()
    }

    pub fn last(&self) -> Option<ArcId> {
        self.tree.get_rightmost_node()
    }

    pub fn remove(&mut self, arc: ArcId) {
        self.tree.delete_node(arc);
    }

    /// Descends from the root to find the arc directly above `point` at the
    /// current sweep line, comparing `point.x` against the dynamic
    /// breakpoints with each candidate's in-order neighbours (§4.2).
    ///
    /// # Panics
    /// Panics if the beachline is empty.
    pub fn locate_arc_above(&self, point: Vector2, sweep_y: f64, diagram: &Diagram) -> ArcId {
        let mut node = self.tree.root().expect("locate_arc_above on an empty beachline");
        loop {
            let site_point = diagram.site_point(self.get(node).site);

            if let Some(prev) = self.prev(node) {
                let prev_point = diagram.site_point(self.get(prev).site);
                let left_breakpoint = compute_breakpoint(prev_point, site_point, sweep_y);
                if point.x < left_breakpoint - EPSILON {
                    node = self
                        .tree
                        .get_left(node)
                        .expect("descent left with no left child");
                    continue;
                }
            }

            if let Some(next) = self.next(node) {
                let next_point = diagram.site_point(self.get(next).site);
                let right_breakpoint = compute_breakpoint(site_point, next_point, sweep_y);
                if point.x > right_breakpoint + EPSILON {
                    node = self
                        .tree
                        .get_right(node)
                        .expect("descent right with no right child");
                    continue;
                }
            }

            return node;
        }
    }

    /// Splits `above` into three arcs for a site event at `new_site`:
    /// `above` is reused in place as the left copy, a fresh arc for
    /// `new_site` is inserted as its successor, and a right copy of the
    /// original site follows that — equivalent to the textbook
    /// remove-and-reinsert-three description in §4.4 step 4, but without
    /// discarding and recreating the node the two flanking copies share.
    pub fn split_arc(&mut self, above: ArcId, new_site: SiteIndex) -> (ArcId, ArcId, ArcId) {
        let above_arc = self.get(above).clone();

        self.tree.set_contents(
            above,
            Arc {
                site: above_arc.site,
                left_edge: above_arc.left_edge,
                right_edge: None,
                event: None,
            },
        );
        let new_arc = self.tree.insert_after(
            above,
            Arc {
                site: new_site,
                left_edge: None,
                right_edge: None,
                event: None,
            },
        );
        let right_copy = self.tree.insert_after(
            new_arc,
            Arc {
                site: above_arc.site,
                left_edge: None,
                right_edge: above_arc.right_edge,
                event: None,
            },
        );

        (above, new_arc, right_copy)
    }
}

impl Default for Beachline {
    fn default() -> Self {
        Self::new()
    }
}

/// The x coordinate where the parabolas of `left` and `right` (their foci)
/// intersect at the given sweep y — i.e. where the beachline's boundary
/// between their two arcs currently sits.
///
/// A focus exactly on the sweep line has collapsed to a zero-width arc
/// sitting at its own x; if only one of the two has degenerated this way
/// the breakpoint is that arc's x, not the other's. If both have (the two
/// sites arrived at the same sweep y — see testable scenario 6), neither
/// arc has a well-defined width yet and the new boundary between them must
/// bisect the two foci exactly.
pub fn compute_breakpoint(left: Vector2, right: Vector2, sweep_y: f64) -> f64 {
    let left_on_directrix = (left.y - sweep_y).abs() < EPSILON;
    let right_on_directrix = (right.y - sweep_y).abs() < EPSILON;

    if left_on_directrix && right_on_directrix {
        return (left.x + right.x) / 2.0;
    }
    if left_on_directrix {
        return left.x;
    }
    if right_on_directrix {
        return right.x;
    }

    let d_left = 1.0 / (2.0 * (left.y - sweep_y));
    let d_right = 1.0 / (2.0 * (right.y - sweep_y));
    let a = d_left - d_right;
    let b = 2.0 * (right.x * d_right - left.x * d_left);
    let c = (left.x * left.x + left.y * left.y - sweep_y * sweep_y) * d_left
        - (right.x * right.x + right.y * right.y - sweep_y * sweep_y) * d_right;

    if a.abs() < EPSILON {
        return -c / b;
    }

    let discriminant = (b * b - 4.0 * a * c).max(0.0);
    (-b - discriminant.sqrt()) / (2.0 * a)
}
