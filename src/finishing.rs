//! Turns the raw output of the sweep — edges that may still be missing an
//! endpoint, and cells with no half-edges at all yet — into the closed
//! polygons the diagram promises: extend and clip every dangling edge
//! against the box (§4.6 step 1), assemble each cell's half-edges from its
//! bordering edges in angular order (§4.6 step 2), then splice in synthetic
//! boundary segments to close any cell that touches the box edge (§4.6
//! step 3).

use crate::boundingbox::BoundingBox;
use crate::diagram::{CellEdge, CellIndex, Diagram, EdgeIndex, VertexIndex};
use crate::error::{Result, VoronoiError};
use crate::vector2::{midpoint, Vector2, EPSILON};

pub fn finish(diagram: &mut Diagram, width: f64, height: f64) -> Result<()> {
    let bbox = BoundingBox::from_dimensions(width, height);
    extend_and_clip(diagram, &bbox);
    assemble_cells(diagram, &bbox);
    close_cells(diagram, &bbox)
}

/// §4.6 step 1: every edge the sweep never finished — because no circle
/// event ever bounded one or both of its ends — gets carried out to the box
/// along its bisector and clipped. An edge clipped away to nothing (it never
/// crosses the box) is dropped rather than kept with coincident endpoints,
/// and the same goes for an already fully-bounded edge whose two circle
/// events happened to land on (nearly) the same point.
fn extend_and_clip(diagram: &mut Diagram, bbox: &BoundingBox) {
    let far = 4.0 * (bbox.width() + bbox.height() + 1.0);
    let edges: Vec<EdgeIndex> = diagram.all_edges().map(|(idx, _)| idx).collect();

    for edge_index in edges {
        let left = diagram.edge_left(edge_index);
        let right = diagram.edge_right(edge_index);
        let a = diagram.edge_a(edge_index);
        let b = diagram.edge_b(edge_index);
        if let (Some(va), Some(vb)) = (a, b) {
            if diagram.vertex_point(va).approx_eq(diagram.vertex_point(vb)) {
                diagram.set_edge_dropped(edge_index);
            }
            continue;
        }

        let l = diagram.site_point(left);
        let r = diagram.site_point(right);
        let bisector_direction = (r - l).get_orthogonal();
        let mid = midpoint(l, r);

        let ray = match (a, b) {
            (None, None) => (mid - bisector_direction * far, mid + bisector_direction * far),
            (Some(v), None) | (None, Some(v)) => {
                let anchor = diagram.vertex_point(v);
                // `anchor` sits on the bisector on the near side of `mid`,
                // pulled toward it by the third site that closed off this
                // edge's other end; the ray away from that site continues
                // through `mid`, not back past `anchor`.
                let outward = {
                    let delta = mid - anchor;
                    if delta.dot(delta) < EPSILON * EPSILON {
                        bisector_direction
                    } else {
                        delta
                    }
                };
                (anchor, anchor + outward * far)
            }
            (Some(_), Some(_)) => unreachable!(),
        };

        match bbox.clamp(ray.0, ray.1) {
            Some((p0, p1)) if p0.distance(p1) >= EPSILON => {
                let v0 = endpoint_for(diagram, a, p0);
                let v1 = endpoint_for(diagram, b, p1);
                diagram.set_edge_endpoints(edge_index, v0, v1);
            }
            _ => diagram.set_edge_dropped(edge_index),
        }
    }
}

/// Reuses `known`'s existing vertex when the clamped point still matches it
/// (the common case: one end was already pinned down by a circle event),
/// otherwise allocates a fresh vertex at the box boundary.
fn endpoint_for(diagram: &mut Diagram, known: Option<VertexIndex>, point: Vector2) -> VertexIndex {
    if let Some(vertex) = known {
        if diagram.vertex_point(vertex).approx_eq(point) {
            return vertex;
        }
    }
    diagram.add_vertex(point)
}

/// §4.6 step 2: every finished edge contributes one half-edge to each of its
/// two bordering cells. Which of the edge's two endpoints is `start` and
/// which is `end` is resolved geometrically — the site sits to the left of
/// its own half-edge walking start to end — rather than from the order `a`
/// and `b` happened to be filled in, which doesn't track left/right at all.
fn assemble_cells(diagram: &mut Diagram, _bbox: &BoundingBox) {
    let edges: Vec<EdgeIndex> = diagram.edges().map(|(idx, _)| idx).collect();

    for edge_index in edges {
        let left = diagram.edge_left(edge_index);
        let right = diagram.edge_right(edge_index);
        let a = diagram.edge_a(edge_index).expect("finished edge missing endpoint a");
        let b = diagram.edge_b(edge_index).expect("finished edge missing endpoint b");
        let pa = diagram.vertex_point(a);
        let pb = diagram.vertex_point(b);

        for (site, other) in [(left, right), (right, left)] {
            let site_point = diagram.site_point(site);
            let other_point = diagram.site_point(other);

            let cross = (pb.x - pa.x) * (site_point.y - pa.y) - (pb.y - pa.y) * (site_point.x - pa.x);
            let (start, end) = if cross > 0.0 { (a, b) } else { (b, a) };
            let angle = (other_point.y - site_point.y).atan2(other_point.x - site_point.x);

            let cell = diagram.cell_of(site);
            diagram.push_half_edge(cell, CellEdge::new(Some(edge_index), start, end, angle));
        }
    }

    let cells: Vec<CellIndex> = diagram.cells().map(|(idx, _)| idx).collect();
    for cell in cells {
        diagram.sort_cell_half_edges(cell);
    }
}

/// §4.6 step 3: walks each cell's angularly sorted half-edges and, wherever
/// one's end doesn't already meet the next one's start, splices in synthetic
/// half-edges (`edge: None`) along the box perimeter to bridge the gap. A
/// cell that needed any bridging borders the box.
fn close_cells(diagram: &mut Diagram, bbox: &BoundingBox) -> Result<()> {
    let cells: Vec<CellIndex> = diagram.cells().map(|(idx, _)| idx).collect();

    for cell in cells {
        let half_edges = diagram.cell_half_edges(cell).to_vec();

        if half_edges.is_empty() {
            if diagram.site_count() != 1 {
                let site = diagram.cell_site(cell);
                return Err(VoronoiError::InternalInvariant {
                    site: site.index(),
                    detail: "cell has no half-edges despite other sites existing",
                });
            }
            diagram.set_cell_half_edges(cell, whole_box_half_edges(diagram, bbox));
            diagram.set_cell_on_edge(cell);
            continue;
        }

        let n = half_edges.len();
        let mut closed = Vec::with_capacity(n * 2);
        let mut touches_boundary = false;

        for i in 0..n {
            let current = half_edges[i];
            closed.push(current);
            let next = half_edges[(i + 1) % n];

            let gap_start = diagram.vertex_point(current.end());
            let gap_end = diagram.vertex_point(next.start());
            if gap_start.approx_eq(gap_end) {
                continue;
            }
            touches_boundary = true;

            let mut from_vertex = current.end();
            let mut from_point = gap_start;
            for corner in bbox.corners_between(gap_start, gap_end) {
                let corner_vertex = diagram.add_vertex(corner);
                closed.push(boundary_edge(from_vertex, corner_vertex, from_point, corner));
                from_vertex = corner_vertex;
                from_point = corner;
            }
            closed.push(boundary_edge(from_vertex, next.start(), from_point, gap_end));
        }

        let closes_up = match (closed.first(), closed.last()) {
            (Some(first), Some(last)) => diagram
                .vertex_point(last.end())
                .approx_eq(diagram.vertex_point(first.start())),
            _ => false,
        };
        if !closes_up {
            let site = diagram.cell_site(cell);
            return Err(VoronoiError::InternalInvariant {
                site: site.index(),
                detail: "finishing pass could not close the cell's boundary",
            });
        }

        if touches_boundary {
            diagram.set_cell_on_edge(cell);
        }
        diagram.set_cell_half_edges(cell, closed);
    }

    Ok(())
}

/// A synthetic half-edge along the box perimeter, with the tangent-based
/// angle the cell-closing walk uses instead of the site-relative one real
/// edges get (there's no second site to measure against).
fn boundary_edge(start: VertexIndex, end: VertexIndex, start_point: Vector2, end_point: Vector2) -> CellEdge {
    let along = end_point - start_point;
    let angle = along.x.atan2(-along.y);
    CellEdge::new(None, start, end, angle)
}

/// The degenerate single-site case: no edges were ever created, so the
/// lone cell is the whole box.
fn whole_box_half_edges(diagram: &mut Diagram, bbox: &BoundingBox) -> Vec<CellEdge> {
    let corners = [
        bbox.top_left(),
        bbox.top_right(),
        bbox.bottom_right(),
        bbox.bottom_left(),
    ];
    let vertices: Vec<VertexIndex> = corners.iter().map(|&p| diagram.add_vertex(p)).collect();

    (0..4)
        .map(|i| {
            let j = (i + 1) % 4;
            boundary_edge(vertices[i], vertices[j], corners[i], corners[j])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::Diagram;

    #[test]
    fn single_site_closes_to_the_whole_box() {
        let mut diagram = Diagram::new();
        let site = diagram.add_site(Vector2::new(0.5, 0.5));
        let cell = diagram.cell_of(site);
        finish(&mut diagram, 1.0, 1.0).unwrap();
        assert!(diagram.is_cell_on_edge(cell));
        assert_eq!(diagram.cell_half_edges(cell).len(), 4);
        assert!((diagram.cell_area(cell) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn a_dangling_edge_with_no_endpoints_clips_to_a_line_across_the_box() {
        let mut diagram = Diagram::new();
        let s0 = diagram.add_site(Vector2::new(0.25, 0.5));
        let s1 = diagram.add_site(Vector2::new(0.75, 0.5));
        let edge = diagram.add_edge(s0, s1);

        extend_and_clip(&mut diagram, &BoundingBox::from_dimensions(1.0, 1.0));

        let a = diagram.vertex_point(diagram.edge_a(edge).unwrap());
        let b = diagram.vertex_point(diagram.edge_b(edge).unwrap());
        assert!((a.x - 0.5).abs() < 1e-9);
        assert!((b.x - 0.5).abs() < 1e-9);
        assert!((a.y.min(b.y)).abs() < 1e-9);
        assert!((a.y.max(b.y) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn a_dangling_edge_with_one_endpoint_extends_outward_from_it() {
        let mut diagram = Diagram::new();
        let s0 = diagram.add_site(Vector2::new(0.25, 0.5));
        let s1 = diagram.add_site(Vector2::new(0.75, 0.5));
        let edge = diagram.add_edge(s0, s1);
        let known = diagram.add_vertex(Vector2::new(0.5, 0.6));
        diagram.set_edge_endpoint(edge, known);

        extend_and_clip(&mut diagram, &BoundingBox::from_dimensions(1.0, 1.0));

        let a = diagram.edge_a(edge).unwrap();
        let b = diagram.vertex_point(diagram.edge_b(edge).unwrap());
        assert_eq!(a, known);
        assert!((diagram.vertex_point(a).x - 0.5).abs() < 1e-9);
        assert!((b.x - 0.5).abs() < 1e-9);
        assert!((b.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn an_edge_that_never_reaches_the_box_is_dropped() {
        let mut diagram = Diagram::new();
        let s0 = diagram.add_site(Vector2::new(0.5, -10.0));
        let s1 = diagram.add_site(Vector2::new(0.5, -9.0));
        let edge = diagram.add_edge(s0, s1);

        extend_and_clip(&mut diagram, &BoundingBox::from_dimensions(1.0, 1.0));

        assert!(diagram.is_edge_dropped(edge));
    }
}
