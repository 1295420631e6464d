use crate::vector2::{Vector2, EPSILON};

/// Which side of the box a boundary point lies on. Used by the finishing
/// pass to walk the perimeter counterclockwise, corner by corner, when it
/// closes a cell whose half-edges don't already meet end to end.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl BoundingBox {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        BoundingBox {
            left,
            right,
            top,
            bottom,
        }
    }

    /// The box with corners (0, 0) and (width, height), the shape `compute`
    /// is always called with.
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        BoundingBox::new(0.0, width, 0.0, height)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= self.left - EPSILON
            && point.x <= self.right + EPSILON
            && point.y >= self.top - EPSILON
            && point.y <= self.bottom + EPSILON
    }

    pub fn contains_segment(&self, a: Vector2, b: Vector2) -> bool {
        self.contains(a) && self.contains(b)
    }

    pub fn intersects_box(&self, other: &BoundingBox) -> bool {
        self.left <= other.right
            && self.right >= other.left
            && self.top <= other.bottom
            && self.bottom >= other.top
    }

    pub fn intersects_segment(&self, a: Vector2, b: Vector2) -> bool {
        self.clamp(a, b).is_some()
    }

    /// Liang-Barsky parametric clipping of the segment `a`-`b` against this
    /// box. Computes the entry parameter `t0` and exit parameter `t1` along
    /// the segment against each of the four slab inequalities in turn,
    /// narrowing `[t0, t1]` from the initial `[0, 1]`; if the segment misses
    /// the box entirely (`t0 > t1`) returns `None`, otherwise the subsegment
    /// from `t0` to `t1`.
    pub fn clamp(&self, a: Vector2, b: Vector2) -> Option<(Vector2, Vector2)> {
        let dx = b.x - a.x;
        let dy = b.y - a.y;

        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;

        let checks = [
            (-dx, a.x - self.left),
            (dx, self.right - a.x),
            (-dy, a.y - self.top),
            (dy, self.bottom - a.y),
        ];

        for (p, q) in checks {
            if p.abs() < EPSILON {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }

        if t0 > t1 {
            return None;
        }

        let start = Vector2::new(a.x + t0 * dx, a.y + t0 * dy);
        let end = Vector2::new(a.x + t1 * dx, a.y + t1 * dy);
        Some((start, end))
    }

    pub fn top_left(&self) -> Vector2 {
        Vector2::new(self.left, self.top)
    }

    pub fn top_right(&self) -> Vector2 {
        Vector2::new(self.right, self.top)
    }

    pub fn bottom_left(&self) -> Vector2 {
        Vector2::new(self.left, self.bottom)
    }

    pub fn bottom_right(&self) -> Vector2 {
        Vector2::new(self.right, self.bottom)
    }

    /// Which side of the box `point` lies on. `point` is assumed to already
    /// be on the boundary (within epsilon), e.g. the result of [`Self::clamp`].
    pub fn side_of(&self, point: Vector2) -> Side {
        if (point.y - self.top).abs() < EPSILON {
            Side::Top
        } else if (point.x - self.right).abs() < EPSILON {
            Side::Right
        } else if (point.y - self.bottom).abs() < EPSILON {
            Side::Bottom
        } else {
            Side::Left
        }
    }

    /// Perimeter arc-length of `point`, measured clockwise from the
    /// top-left corner along the top edge. Two points on the boundary can be
    /// ordered by this value to find the shortest way to walk between them
    /// around the box.
    fn perimeter_param(&self, point: Vector2) -> f64 {
        match self.side_of(point) {
            Side::Top => point.x - self.left,
            Side::Right => self.width() + (point.y - self.top),
            Side::Bottom => self.width() + self.height() + (self.right - point.x),
            Side::Left => 2.0 * self.width() + self.height() + (self.bottom - point.y),
        }
    }

    /// The box corners that lie strictly between `from` and `to` walking the
    /// perimeter clockwise (wrapping past the top-left corner if `to`'s
    /// parameter is not already ahead of `from`'s). Used by the finishing
    /// pass to splice in the boundary vertices needed to close a cell whose
    /// consecutive half-edges end and start at different points on the box.
    pub fn corners_between(&self, from: Vector2, to: Vector2) -> Vec<Vector2> {
        let perimeter = 2.0 * (self.width() + self.height());
        let start = self.perimeter_param(from);
        let mut end = self.perimeter_param(to);
        if end <= start + EPSILON {
            end += perimeter;
        }

        let corners = [
            (0.0, self.top_left()),
            (self.width(), self.top_right()),
            (self.width() + self.height(), self.bottom_right()),
            (2.0 * self.width() + self.height(), self.bottom_left()),
        ];

        let mut candidates: Vec<(f64, Vector2)> = corners
            .iter()
            .map(|&(param, point)| {
                let mut candidate = param;
                while candidate <= start + EPSILON {
                    candidate += perimeter;
                }
                (candidate, point)
            })
            .filter(|&(candidate, _)| candidate < end - EPSILON)
            .collect();
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        candidates.into_iter().map(|(_, point)| point).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_interior_segment_is_unchanged() {
        let bbox = BoundingBox::from_dimensions(1.0, 1.0);
        let (a, b) = bbox
            .clamp(Vector2::new(0.2, 0.2), Vector2::new(0.8, 0.8))
            .unwrap();
        assert!(a.approx_eq(Vector2::new(0.2, 0.2)));
        assert!(b.approx_eq(Vector2::new(0.8, 0.8)));
    }

    #[test]
    fn clamp_ray_extending_past_the_box_stops_at_the_edge() {
        let bbox = BoundingBox::from_dimensions(1.0, 1.0);
        let (a, b) = bbox
            .clamp(Vector2::new(0.5, 0.5), Vector2::new(0.5, 10.0))
            .unwrap();
        assert!(a.approx_eq(Vector2::new(0.5, 0.5)));
        assert!(b.approx_eq(Vector2::new(0.5, 1.0)));
    }

    #[test]
    fn clamp_segment_entirely_outside_the_box_is_none() {
        let bbox = BoundingBox::from_dimensions(1.0, 1.0);
        assert!(bbox
            .clamp(Vector2::new(2.0, 2.0), Vector2::new(3.0, 3.0))
            .is_none());
    }

    #[test]
    fn corners_between_adjacent_sides_is_the_shared_corner() {
        let bbox = BoundingBox::from_dimensions(1.0, 1.0);
        let from = Vector2::new(0.5, 0.0); // mid top edge
        let to = Vector2::new(1.0, 0.5); // mid right edge
        let corners = bbox.corners_between(from, to);
        assert_eq!(corners.len(), 1);
        assert!(corners[0].approx_eq(bbox.top_right()));
    }

    #[test]
    fn corners_between_wraps_past_the_top_left_corner() {
        let bbox = BoundingBox::from_dimensions(1.0, 1.0);
        let from = Vector2::new(0.0, 0.5); // mid left edge
        let to = Vector2::new(0.5, 0.0); // mid top edge
        let corners = bbox.corners_between(from, to);
        assert_eq!(corners.len(), 1);
        assert!(corners[0].approx_eq(bbox.top_left()));
    }
}
