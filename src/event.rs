//! The live circle-event queue.
//!
//! Keyed by `(y, x)` ascending, this is the event queue's entry point onto
//! [`crate::ordered_tree`] — the same structural primitive the beachline
//! uses, just with a static descent comparator instead of the beachline's
//! dynamic breakpoint one. Each arc owns at most one scheduled event, so
//! removal is always by handle rather than by value.
//!
//! The presorted site-event stream isn't here: it never needs removal or
//! reordering once sorted, so `engine::compute` just walks a plain
//! `Vec<SiteIndex>` by cursor instead of pushing sites through a second tree.

use crate::beachline::ArcId;
use crate::ordered_tree::{NodeId, Tree};
use crate::vector2::Vector2;

/// A pending circle event: the arc it will remove, the centre of the
/// circle through that arc's triple, and the sweep-y at which the event
/// fires (`centre.y + radius`, with `centre.x` as the tiebreaker).
#[derive(Clone, Copy, Debug)]
pub struct CircleEvent {
    pub arc: ArcId,
    pub center: Vector2,
    pub y: f64,
}

pub type CircleEventId = NodeId<CircleEvent>;

#[derive(Default)]
pub struct EventQueue {
    tree: Tree<CircleEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue { tree: Tree::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn peek_min(&self) -> Option<&CircleEvent> {
        self.tree.get_leftmost_node().map(|node| self.tree.get_contents(node))
    }

    /// Inserts `event`, descending the tree by `(y, x)` to find where it
    /// belongs relative to the events already queued.
    pub fn push(&mut self, event: CircleEvent) -> CircleEventId {
        if !self.tree.has_root() {
            return self.tree.create_root(event);
        }

        let mut cursor = self.tree.root().unwrap();
        loop {
            if key(&event) < key(self.tree.get_contents(cursor)) {
                match self.tree.get_left(cursor) {
                    Some(left) => cursor = left,
                    None => return self.tree.insert_before(cursor, event),
                }
            } else {
                match self.tree.get_right(cursor) {
                    Some(right) => cursor = right,
                    None => return self.tree.insert_after(cursor, event),
                }
            }
        }
    }

    /// Removes and returns the event with the smallest `(y, x)`.
    pub fn pop_min(&mut self) -> Option<CircleEvent> {
        let node = self.tree.get_leftmost_node()?;
        let event = *self.tree.get_contents(node);
        self.tree.delete_node(node);
        Some(event)
    }

    /// Invalidates a previously scheduled event by handle — used when the
    /// arc it would remove, or one of its neighbours, changes before the
    /// event fires.
    pub fn remove(&mut self, event: CircleEventId) {
        self.tree.delete_node(event);
    }
}

fn key(event: &CircleEvent) -> (f64, f64) {
    (event.y, event.center.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beachline::Beachline;
    use crate::diagram::Diagram;

    fn arc_id(beachline: &mut Beachline, diagram: &mut Diagram, x: f64) -> ArcId {
        let site = diagram.add_site(Vector2::new(x, 0.0));
        if beachline.is_empty() {
            beachline.insert_root(site)
        } else {
            let above = beachline.first().unwrap();
            let (_, new_arc, _) = beachline.split_arc(above, site);
            new_arc
        }
    }

    #[test]
    fn pop_min_returns_events_in_sweep_y_order() {
        let mut diagram = Diagram::new();
        let mut beachline = Beachline::new();
        let mut queue = EventQueue::new();

        let a = arc_id(&mut beachline, &mut diagram, 0.1);
        let b = arc_id(&mut beachline, &mut diagram, 0.2);
        let c = arc_id(&mut beachline, &mut diagram, 0.3);

        queue.push(CircleEvent {
            arc: a,
            center: Vector2::new(0.0, 0.0),
            y: 1.0,
        });
        queue.push(CircleEvent {
            arc: b,
            center: Vector2::new(0.0, 0.0),
            y: 0.5,
        });
        queue.push(CircleEvent {
            arc: c,
            center: Vector2::new(0.0, 0.0),
            y: 2.0,
        });

        assert_eq!(queue.pop_min().unwrap().y, 0.5);
        assert_eq!(queue.pop_min().unwrap().y, 1.0);
        assert_eq!(queue.pop_min().unwrap().y, 2.0);
        assert!(queue.pop_min().is_none());
    }

    #[test]
    fn ties_on_y_break_by_center_x() {
        let mut diagram = Diagram::new();
        let mut beachline = Beachline::new();
        let mut queue = EventQueue::new();
        let a = arc_id(&mut beachline, &mut diagram, 0.1);
        let b = arc_id(&mut beachline, &mut diagram, 0.2);

        queue.push(CircleEvent {
            arc: a,
            center: Vector2::new(0.9, 0.0),
            y: 1.0,
        });
        queue.push(CircleEvent {
            arc: b,
            center: Vector2::new(0.1, 0.0),
            y: 1.0,
        });

        assert_eq!(queue.pop_min().unwrap().center.x, 0.1);
        assert_eq!(queue.pop_min().unwrap().center.x, 0.9);
    }

    #[test]
    fn removed_events_do_not_surface_on_pop() {
        let mut diagram = Diagram::new();
        let mut beachline = Beachline::new();
        let mut queue = EventQueue::new();
        let a = arc_id(&mut beachline, &mut diagram, 0.1);
        let b = arc_id(&mut beachline, &mut diagram, 0.2);

        let handle = queue.push(CircleEvent {
            arc: a,
            center: Vector2::new(0.0, 0.0),
            y: 0.5,
        });
        queue.push(CircleEvent {
            arc: b,
            center: Vector2::new(0.0, 0.0),
            y: 1.0,
        });

        queue.remove(handle);
        assert_eq!(queue.pop_min().unwrap().y, 1.0);
        assert!(queue.pop_min().is_none());
    }
}
