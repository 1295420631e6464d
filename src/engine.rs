//! The sweepline driver (the teacher's `voronoi_builder`, renamed to match
//! the rest of this crate's noun-based modules): merges the presorted
//! site-event stream with the dynamically produced circle-event queue,
//! mutating the beachline and the diagram in place until both streams are
//! exhausted, then hands off to `finishing`.

use std::time::Instant;

use crate::beachline::{ArcId, Beachline};
use crate::diagram::{Diagram, SiteIndex};
use crate::error::{Result, VoronoiError};
use crate::event::{CircleEvent, EventQueue};
use crate::finishing;
use crate::vector2::{compute_circumcircle_center, Vector2, EPSILON};

/// Runs Fortune's algorithm over `sites` against the box with corners
/// `(0, 0)` and `(width, height)`, returning the finished diagram.
pub fn compute(sites: &[Vector2], width: f64, height: f64) -> Result<Diagram> {
    validate_input(sites, width, height)?;
    let start = Instant::now();
    log::debug!("computing voronoi diagram for {} sites", sites.len());

    let mut diagram = Diagram::new();
    let mut site_order: Vec<SiteIndex> = sites.iter().map(|&point| diagram.add_site(point)).collect();
    site_order.sort_by(|&a, &b| {
        let pa = diagram.site_point(a);
        let pb = diagram.site_point(b);
        pa.y.partial_cmp(&pb.y)
            .unwrap()
            .then(pa.x.partial_cmp(&pb.x).unwrap())
    });

    let mut beachline = Beachline::new();
    let mut events = EventQueue::new();
    let mut cursor = 0usize;

    loop {
        let next_site = site_order.get(cursor).map(|&s| (diagram.site_point(s).y, s));
        let next_circle_y = events.peek_min().map(|e| e.y);

        let process_site = match (next_site, next_circle_y) {
            (None, None) => break,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some((site_y, _)), Some(circle_y)) => site_y <= circle_y + EPSILON,
        };

        if process_site {
            let (site_y, site) = next_site.unwrap();
            cursor += 1;
            log::trace!("site event: site {} at y={}", site.index(), site_y);
            handle_site_event(site, site_y, &mut diagram, &mut beachline, &mut events);
        } else {
            let event = events.pop_min().unwrap();
            log::trace!("circle event at y={} x={}", event.y, event.center.x);
            handle_circle_event(event, &mut diagram, &mut beachline, &mut events)?;
        }
    }

    finishing::finish(&mut diagram, width, height)?;
    diagram.set_exec_time(start.elapsed());
    log::debug!(
        "voronoi diagram finished: {} edges, {} cells in {:?}",
        diagram.edge_count(),
        diagram.cell_count(),
        diagram.exec_time()
    );
    Ok(diagram)
}

fn validate_input(sites: &[Vector2], width: f64, height: f64) -> Result<()> {
    if sites.is_empty() {
        return Err(VoronoiError::EmptyInput);
    }
    if !(width > 0.0) || !(height > 0.0) {
        return Err(VoronoiError::InvalidBoundingBox { width, height });
    }
    for (index, site) in sites.iter().enumerate() {
        if !site.is_finite() {
            return Err(VoronoiError::NonFiniteSite {
                index,
                x: site.x,
                y: site.y,
            });
        }
    }
    for a in 0..sites.len() {
        for b in (a + 1)..sites.len() {
            if sites[a].approx_eq(sites[b]) {
                return Err(VoronoiError::DuplicateSite { a, b });
            }
        }
    }
    Ok(())
}

/// §4.4 "Site event at site s".
fn handle_site_event(
    site: SiteIndex,
    sweep_y: f64,
    diagram: &mut Diagram,
    beachline: &mut Beachline,
    events: &mut EventQueue,
) {
    if beachline.is_empty() {
        beachline.insert_root(site);
        return;
    }

    let point = diagram.site_point(site);
    let above = beachline.locate_arc_above(point, sweep_y, diagram);
    invalidate_event(above, beachline, events);

    let above_site = beachline.get(above).site;
    let (left_copy, new_arc, right_copy) = beachline.split_arc(above, site);

    // One edge, shared by both sides of the newly inserted arc — see §4.4
    // step 5 and the edge-orientation notes in beachline::split_arc.
    let edge = diagram.add_edge(above_site, site);
    beachline.get_mut(left_copy).right_edge = Some(edge);
    beachline.get_mut(new_arc).left_edge = Some(edge);
    beachline.get_mut(new_arc).right_edge = Some(edge);
    beachline.get_mut(right_copy).left_edge = Some(edge);

    if let Some(left_left) = beachline.prev(left_copy) {
        schedule_circle_event(left_left, left_copy, new_arc, sweep_y, diagram, beachline, events);
    }
    if let Some(right_right) = beachline.next(right_copy) {
        schedule_circle_event(new_arc, right_copy, right_right, sweep_y, diagram, beachline, events);
    }
}

/// §4.4 "Circle event at arc a with centre c".
fn handle_circle_event(
    event: CircleEvent,
    diagram: &mut Diagram,
    beachline: &mut Beachline,
    events: &mut EventQueue,
) -> Result<()> {
    let arc = event.arc;
    let arc_site = beachline.get(arc).site;

    let prev = beachline.prev(arc).ok_or(VoronoiError::InternalInvariant {
        site: arc_site.index(),
        detail: "circle event arc has no left neighbour",
    })?;
    let next = beachline.next(arc).ok_or(VoronoiError::InternalInvariant {
        site: arc_site.index(),
        detail: "circle event arc has no right neighbour",
    })?;

    let vertex = diagram.add_vertex(event.center);

    let left_edge = beachline
        .get(arc)
        .left_edge
        .ok_or(VoronoiError::InternalInvariant {
            site: arc_site.index(),
            detail: "circle event arc missing its left edge",
        })?;
    let right_edge = beachline
        .get(arc)
        .right_edge
        .ok_or(VoronoiError::InternalInvariant {
            site: arc_site.index(),
            detail: "circle event arc missing its right edge",
        })?;
    diagram.set_edge_endpoint(left_edge, vertex);
    diagram.set_edge_endpoint(right_edge, vertex);

    invalidate_event(prev, beachline, events);
    invalidate_event(next, beachline, events);

    let prev_site = beachline.get(prev).site;
    let next_site = beachline.get(next).site;
    let new_edge = diagram.add_edge(prev_site, next_site);
    diagram.set_edge_endpoint(new_edge, vertex);
    beachline.get_mut(prev).right_edge = Some(new_edge);
    beachline.get_mut(next).left_edge = Some(new_edge);

    beachline.remove(arc);

    if let Some(left_left) = beachline.prev(prev) {
        schedule_circle_event(left_left, prev, next, event.y, diagram, beachline, events);
    }
    if let Some(right_right) = beachline.next(next) {
        schedule_circle_event(prev, next, right_right, event.y, diagram, beachline, events);
    }

    Ok(())
}

fn invalidate_event(arc: ArcId, beachline: &mut Beachline, events: &mut EventQueue) {
    if let Some(event) = beachline.get(arc).event {
        events.remove(event);
        beachline.get_mut(arc).event = None;
    }
}

/// §4.4's circle-event detection for the triple `(left, mid, right)`:
/// rejects a shared focus, rejects anything that isn't a right turn (a
/// degenerate or collinear circle), and rejects a circumcentre that
/// wouldn't yet be reached by the sweep line.
fn schedule_circle_event(
    left: ArcId,
    mid: ArcId,
    right: ArcId,
    sweep_y: f64,
    diagram: &Diagram,
    beachline: &mut Beachline,
    events: &mut EventQueue,
) {
    invalidate_event(mid, beachline, events);

    let left_site = beachline.get(left).site;
    let mid_site = beachline.get(mid).site;
    let right_site = beachline.get(right).site;
    if left_site == right_site {
        return;
    }

    let l = diagram.site_point(left_site);
    let m = diagram.site_point(mid_site);
    let r = diagram.site_point(right_site);

    let cross = (m.x - l.x) * (r.y - l.y) - (m.y - l.y) * (r.x - l.x);
    if cross >= -EPSILON {
        log::trace!("circle event for site {} rejected: not a right turn", mid_site.index());
        return;
    }

    let center = compute_circumcircle_center(l, m, r);
    let radius = center.distance(m);
    let event_y = center.y + radius;
    if event_y - sweep_y <= EPSILON {
        log::trace!("circle event for site {} rejected: already behind the sweep line", mid_site.index());
        return;
    }

    let handle = events.push(CircleEvent { arc: mid, center, y: event_y });
    beachline.get_mut(mid).event = Some(handle);
    log::trace!("circle event scheduled for site {} at y={}", mid_site.index(), event_y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(compute(&[], 1.0, 1.0), Err(VoronoiError::EmptyInput)));
    }

    #[test]
    fn rejects_non_positive_box() {
        let sites = vec![Vector2::new(0.5, 0.5)];
        assert!(matches!(
            compute(&sites, 0.0, 1.0),
            Err(VoronoiError::InvalidBoundingBox { width, height }) if width == 0.0 && height == 1.0
        ));
    }

    #[test]
    fn rejects_non_finite_site() {
        let sites = vec![Vector2::new(f64::NAN, 0.5)];
        assert!(matches!(
            compute(&sites, 1.0, 1.0),
            Err(VoronoiError::NonFiniteSite { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_sites() {
        let sites = vec![Vector2::new(0.3, 0.3), Vector2::new(0.3, 0.3)];
        assert!(matches!(
            compute(&sites, 1.0, 1.0),
            Err(VoronoiError::DuplicateSite { a: 0, b: 1 })
        ));
    }

    #[test]
    fn single_site_fills_the_whole_box() {
        let sites = vec![Vector2::new(0.5, 0.5)];
        let diagram = compute(&sites, 1.0, 1.0).unwrap();
        assert_eq!(diagram.cell_count(), 1);
        assert_eq!(diagram.edge_count(), 0);
        let (only_cell, _) = diagram.cells().next().unwrap();
        assert!(diagram.is_cell_on_edge(only_cell));
        assert!((diagram.cell_area(only_cell) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn two_sites_split_the_box_down_the_middle() {
        let sites = vec![Vector2::new(0.25, 0.5), Vector2::new(0.75, 0.5)];
        let diagram = compute(&sites, 1.0, 1.0).unwrap();
        assert_eq!(diagram.cell_count(), 2);
        assert_eq!(diagram.edge_count(), 1);
        let (edge_index, _) = diagram.edges().next().unwrap();
        let a = diagram.vertex_point(diagram.edge_a(edge_index).unwrap());
        let b = diagram.vertex_point(diagram.edge_b(edge_index).unwrap());
        assert!((a.x - 0.5).abs() < 1e-6);
        assert!((b.x - 0.5).abs() < 1e-6);
        assert!((a.y.min(b.y)).abs() < 1e-6);
        assert!((a.y.max(b.y) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn equilateral_triangle_has_one_vertex_at_the_circumcenter() {
        use approx::assert_relative_eq;

        let sites = vec![
            Vector2::new(0.5, 0.8),
            Vector2::new(0.1, 0.2),
            Vector2::new(0.9, 0.2),
        ];
        let diagram = compute(&sites, 1.0, 1.0).unwrap();
        assert_eq!(diagram.cell_count(), 3);
        assert_eq!(diagram.edge_count(), 3);
        for (cell, _) in diagram.cells() {
            assert!(diagram.is_cell_on_edge(cell));
        }

        let circumcenter = diagram
            .vertices()
            .into_iter()
            .map(|(_, point)| point)
            .find(|point| point.x > 1e-6 && point.x < 1.0 - 1e-6 && point.y > 1e-6 && point.y < 1.0 - 1e-6)
            .expect("triangle should produce one interior vertex");
        assert_relative_eq!(circumcenter.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(circumcenter.y, 0.3666666666666667, epsilon = 1e-6);

        let mut areas: Vec<f64> = diagram.cells().map(|(cell, _)| diagram.cell_area(cell)).collect();
        areas.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((areas[0] - 4.0 / 15.0).abs() < 1e-6);
        assert!((areas[1] - 4.0 / 15.0).abs() < 1e-6);
        assert!((areas[2] - 7.0 / 15.0).abs() < 1e-6);
        assert!((areas.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn square_of_four_sites_meets_at_the_box_center() {
        let sites = vec![
            Vector2::new(0.25, 0.25),
            Vector2::new(0.75, 0.25),
            Vector2::new(0.25, 0.75),
            Vector2::new(0.75, 0.75),
        ];
        let diagram = compute(&sites, 1.0, 1.0).unwrap();
        assert_eq!(diagram.cell_count(), 4);
        assert_eq!(diagram.edge_count(), 4);

        let center = diagram
            .vertices()
            .into_iter()
            .map(|(_, point)| point)
            .find(|point| point.x > 1e-6 && point.x < 1.0 - 1e-6 && point.y > 1e-6 && point.y < 1.0 - 1e-6)
            .expect("square should produce one interior vertex");
        assert!((center.x - 0.5).abs() < 1e-6);
        assert!((center.y - 0.5).abs() < 1e-6);

        let mut total_area = 0.0;
        for (cell, _) in diagram.cells() {
            assert!(diagram.is_cell_on_edge(cell));
            assert!((diagram.cell_area(cell) - 0.25).abs() < 1e-6);
            total_area += diagram.cell_area(cell);
        }
        assert!((total_area - 1.0).abs() < 1e-6);
    }

    #[test]
    fn collinear_sites_produce_three_vertical_slabs() {
        let sites = vec![
            Vector2::new(0.2, 0.5),
            Vector2::new(0.5, 0.5),
            Vector2::new(0.8, 0.5),
        ];
        let diagram = compute(&sites, 1.0, 1.0).unwrap();
        assert_eq!(diagram.cell_count(), 3);
        assert_eq!(diagram.edge_count(), 2);

        let mut edge_xs: Vec<f64> = diagram
            .edges()
            .map(|(edge, _)| diagram.vertex_point(diagram.edge_a(edge).unwrap()).x)
            .collect();
        edge_xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((edge_xs[0] - 0.35).abs() < 1e-6);
        assert!((edge_xs[1] - 0.65).abs() < 1e-6);

        let mut areas: Vec<f64> = diagram.cells().map(|(cell, _)| diagram.cell_area(cell)).collect();
        areas.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((areas[0] - 0.3).abs() < 1e-6);
        assert!((areas[1] - 0.35).abs() < 1e-6);
        assert!((areas[2] - 0.35).abs() < 1e-6);
    }
}
