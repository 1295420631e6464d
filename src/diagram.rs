//! The permanent output of a sweep: sites, vertices, edges and cells, all
//! held as `TypedVec` arenas (see `typedvector`) and referenced by index
//! rather than by pointer, per the crate's design notes on avoiding a
//! reference-cycle graph of edges/sites/cells/half-edges.
//!
//! `Cell`s are created 1:1 with `Site`s, in the same order, so a site's
//! `SiteIndex` and its cell's `CellIndex` always carry the same underlying
//! slot — [`Diagram::cell_of`] is just a type-changing cast over that
//! invariant.

use std::collections::HashSet;
use std::time::Duration;

use crate::typedvector::{TypedIndex, TypedVec};
use crate::vector2::Vector2;

pub type SiteIndex = TypedIndex<Site>;
pub type VertexIndex = TypedIndex<Vertex>;
pub type EdgeIndex = TypedIndex<Edge>;
pub type CellIndex = TypedIndex<Cell>;

#[derive(Clone, Copy, Debug)]
pub struct Site {
    point: Vector2,
}

#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    point: Vector2,
}

/// One Voronoi edge between two sites. `a`/`b` are the two endpoints, filled
/// in as the sweep (or the finishing pass) discovers them; an edge with
/// either endpoint still `None` is "dangling" and must be extended and
/// clipped before it can be handed to a cell. `dropped` is set by the
/// finishing pass when clipping collapses the edge to nothing.
#[derive(Clone, Debug)]
pub struct Edge {
    left: SiteIndex,
    right: SiteIndex,
    a: Option<VertexIndex>,
    b: Option<VertexIndex>,
    dropped: bool,
}

impl Edge {
    /// The site on the other side of this edge from `site`.
    ///
    /// # Panics
    /// Panics if `site` is neither this edge's left nor right site.
    pub fn other_site(&self, site: SiteIndex) -> SiteIndex {
        if site == self.left {
            self.right
        } else if site == self.right {
            self.left
        } else {
            panic!("site does not border this edge")
        }
    }
}

/// One side of a shared [`Edge`] as seen by one of its two sites, or a
/// synthetic segment along the bounding box perimeter inserted by the
/// finishing pass to close a cell. `start`/`end` are already oriented so
/// that the owning cell's interior is on the left walking from `start` to
/// `end`; `angle` is the sort key used to assemble a cell's boundary in
/// angular order (see `finishing::assemble_cells`).
#[derive(Clone, Copy, Debug)]
pub struct CellEdge {
    edge: Option<EdgeIndex>,
    start: VertexIndex,
    end: VertexIndex,
    angle: f64,
}

impl CellEdge {
    pub fn new(edge: Option<EdgeIndex>, start: VertexIndex, end: VertexIndex, angle: f64) -> Self {
        CellEdge {
            edge,
            start,
            end,
            angle,
        }
    }

    pub fn edge(&self) -> Option<EdgeIndex> {
        self.edge
    }

    pub fn start(&self) -> VertexIndex {
        self.start
    }

    pub fn end(&self) -> VertexIndex {
        self.end
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }
}

#[derive(Clone, Debug)]
pub struct Cell {
    site: SiteIndex,
    half_edges: Vec<CellEdge>,
    on_edge: bool,
}

/// Sites, vertices, edges and cells produced by one `compute` call, plus how
/// long the sweep and finishing pass took.
pub struct Diagram {
    sites: TypedVec<Site>,
    vertices: TypedVec<Vertex>,
    edges: TypedVec<Edge>,
    cells: TypedVec<Cell>,
    exec_time: Duration,
}

impl Diagram {
    pub fn new() -> Self {
        Diagram {
            sites: TypedVec::new(),
            vertices: TypedVec::new(),
            edges: TypedVec::new(),
            cells: TypedVec::new(),
            exec_time: Duration::default(),
        }
    }

    /// Adds a site and its (initially empty) cell together, preserving the
    /// invariant that a site and its cell share an index.
    pub fn add_site(&mut self, point: Vector2) -> SiteIndex {
        let site = self.sites.insert(Site { point });
        let cell = self.cells.insert(Cell {
            site,
            half_edges: Vec::new(),
            on_edge: false,
        });
        debug_assert_eq!(site.index(), cell.index());
        site
    }

    pub fn site_point(&self, site: SiteIndex) -> Vector2 {
        self.sites.get(site).expect("dangling site index").point
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn sites(&self) -> impl Iterator<Item = (SiteIndex, Vector2)> + '_ {
        self.sites.iter().map(|(idx, site)| (idx, site.point))
    }

    /// The cell created alongside `site` in [`Self::add_site`].
    pub fn cell_of(&self, site: SiteIndex) -> CellIndex {
        CellIndex::new(site.index())
    }

    pub fn add_vertex(&mut self, point: Vector2) -> VertexIndex {
        self.vertices.insert(Vertex { point })
    }

    pub fn vertex_point(&self, vertex: VertexIndex) -> Vector2 {
        self.vertices
            .get(vertex)
            .expect("dangling vertex index")
            .point
    }

    pub fn add_edge(&mut self, left: SiteIndex, right: SiteIndex) -> EdgeIndex {
        self.edges.insert(Edge {
            left,
            right,
            a: None,
            b: None,
            dropped: false,
        })
    }

    pub fn edge(&self, edge: EdgeIndex) -> &Edge {
        self.edges.get(edge).expect("dangling edge index")
    }

    pub fn edge_left(&self, edge: EdgeIndex) -> SiteIndex {
        self.edge(edge).left
    }

    pub fn edge_right(&self, edge: EdgeIndex) -> SiteIndex {
        self.edge(edge).right
    }

    pub fn edge_a(&self, edge: EdgeIndex) -> Option<VertexIndex> {
        self.edge(edge).a
    }

    pub fn edge_b(&self, edge: EdgeIndex) -> Option<VertexIndex> {
        self.edge(edge).b
    }

    /// Assigns the first free endpoint slot (`a`, then `b`) to `vertex`.
    ///
    /// # Panics
    /// Panics if both endpoints are already assigned.
    pub fn set_edge_endpoint(&mut self, edge: EdgeIndex, vertex: VertexIndex) {
        let e = self.edges.get_mut(edge).expect("dangling edge index");
        if e.a.is_none() {
            e.a = Some(vertex);
        } else if e.b.is_none() {
            e.b = Some(vertex);
        } else {
            panic!("edge already has both endpoints assigned");
        }
    }

    pub fn set_edge_dropped(&mut self, edge: EdgeIndex) {
        self.edges.get_mut(edge).expect("dangling edge index").dropped = true;
    }

    pub fn is_edge_dropped(&self, edge: EdgeIndex) -> bool {
        self.edge(edge).dropped
    }

    /// Edges with both endpoints present and not dropped by the finishing
    /// pass — the public `edges` surface from §6(b).
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &Edge)> + '_ {
        self.edges
            .iter()
            .filter(|(_, e)| !e.dropped && e.a.is_some() && e.b.is_some())
    }

    /// All edges regardless of endpoint or dropped state — used internally
    /// by the finishing pass, which is what fills in the endpoints this
    /// type's [`Self::edges`] filters on.
    pub fn all_edges(&self) -> impl Iterator<Item = (EdgeIndex, &Edge)> + '_ {
        self.edges.iter()
    }

    /// Overwrites both endpoints at once, as the finishing pass does once it
    /// has resolved the edge's final clipped segment — unlike
    /// [`Self::set_edge_endpoint`], which only ever fills the next free slot
    /// during the sweep.
    pub fn set_edge_endpoints(&mut self, edge: EdgeIndex, a: VertexIndex, b: VertexIndex) {
        let e = self.edges.get_mut(edge).expect("dangling edge index");
        e.a = Some(a);
        e.b = Some(b);
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    pub fn push_half_edge(&mut self, cell: CellIndex, half_edge: CellEdge) {
        self.cells
            .get_mut(cell)
            .expect("dangling cell index")
            .half_edges
            .push(half_edge);
    }

    pub fn sort_cell_half_edges(&mut self, cell: CellIndex) {
        self.cells
            .get_mut(cell)
            .expect("dangling cell index")
            .half_edges
            .sort_by(|a, b| a.angle.partial_cmp(&b.angle).expect("NaN angle"));
    }

    /// Replaces a cell's half-edges wholesale, as the finishing pass does
    /// once it has spliced in the boundary segments needed to close the
    /// polygon — unlike [`Self::push_half_edge`], which only appends.
    pub fn set_cell_half_edges(&mut self, cell: CellIndex, half_edges: Vec<CellEdge>) {
        self.cells.get_mut(cell).expect("dangling cell index").half_edges = half_edges;
    }

    pub fn set_cell_on_edge(&mut self, cell: CellIndex) {
        self.cells.get_mut(cell).expect("dangling cell index").on_edge = true;
    }

    pub fn cell_site(&self, cell: CellIndex) -> SiteIndex {
        self.cells.get(cell).expect("dangling cell index").site
    }

    pub fn cell_half_edges(&self, cell: CellIndex) -> &[CellEdge] {
        &self.cells.get(cell).expect("dangling cell index").half_edges
    }

    pub fn is_cell_on_edge(&self, cell: CellIndex) -> bool {
        self.cells.get(cell).expect("dangling cell index").on_edge
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellIndex, &Cell)> + '_ {
        self.cells.iter()
    }

    /// The vertices referenced by at least one surviving edge or half-edge,
    /// deduplicated by index identity — §6(b)'s "derived union of all edge
    /// endpoints".
    pub fn vertices(&self) -> Vec<(VertexIndex, Vector2)> {
        let mut seen = HashSet::new();
        for (_, edge) in self.edges() {
            if let Some(a) = edge.a {
                seen.insert(a);
            }
            if let Some(b) = edge.b {
                seen.insert(b);
            }
        }
        for (_, cell) in self.cells.iter() {
            for half_edge in &cell.half_edges {
                seen.insert(half_edge.start);
                seen.insert(half_edge.end);
            }
        }
        seen.into_iter()
            .map(|v| (v, self.vertex_point(v)))
            .collect()
    }

    /// The centroid of a cell's boundary polygon, used by `lloyds_relaxation`.
    ///
    /// # Panics
    /// Panics if the cell has fewer than three half-edges.
    pub fn cell_center(&self, cell: CellIndex) -> Vector2 {
        let half_edges = self.cell_half_edges(cell);
        assert!(half_edges.len() >= 3, "cell polygon needs at least 3 vertices");
        let mut centroid = Vector2::new(0.0, 0.0);
        let mut area_sum = 0.0;
        for half_edge in half_edges {
            let p0 = self.vertex_point(half_edge.start);
            let p1 = self.vertex_point(half_edge.end);
            let cross = p0.x * p1.y - p1.x * p0.y;
            area_sum += cross;
            centroid = centroid + (p0 + p1) * cross;
        }
        let area = area_sum / 2.0;
        if area.abs() < crate::vector2::EPSILON {
            let n = half_edges.len() as f64;
            return half_edges
                .iter()
                .fold(Vector2::new(0.0, 0.0), |acc, he| acc + self.vertex_point(he.start))
                * (1.0 / n);
        }
        centroid * (1.0 / (6.0 * area))
    }

    /// Shoelace area of a cell's boundary polygon.
    pub fn cell_area(&self, cell: CellIndex) -> f64 {
        let half_edges = self.cell_half_edges(cell);
        let mut sum = 0.0;
        for half_edge in half_edges {
            let p0 = self.vertex_point(half_edge.start);
            let p1 = self.vertex_point(half_edge.end);
            sum += p0.x * p1.y - p1.x * p0.y;
        }
        (sum / 2.0).abs()
    }

    pub fn set_exec_time(&mut self, exec_time: Duration) {
        self.exec_time = exec_time;
    }

    pub fn exec_time(&self) -> Duration {
        self.exec_time
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_and_cell_share_an_index() {
        let mut diagram = Diagram::new();
        let s0 = diagram.add_site(Vector2::new(0.0, 0.0));
        let s1 = diagram.add_site(Vector2::new(1.0, 1.0));
        assert_eq!(diagram.cell_of(s0).index(), s0.index());
        assert_eq!(diagram.cell_of(s1).index(), s1.index());
    }

    #[test]
    fn edge_endpoints_fill_in_order() {
        let mut diagram = Diagram::new();
        let s0 = diagram.add_site(Vector2::new(0.0, 0.0));
        let s1 = diagram.add_site(Vector2::new(1.0, 0.0));
        let edge = diagram.add_edge(s0, s1);
        assert_eq!(diagram.edge_a(edge), None);
        let v0 = diagram.add_vertex(Vector2::new(0.5, 0.0));
        diagram.set_edge_endpoint(edge, v0);
        assert_eq!(diagram.edge_a(edge), Some(v0));
        let v1 = diagram.add_vertex(Vector2::new(0.5, 1.0));
        diagram.set_edge_endpoint(edge, v1);
        assert_eq!(diagram.edge_b(edge), Some(v1));
    }

    #[test]
    fn dropped_edges_are_excluded_from_the_public_edge_list() {
        let mut diagram = Diagram::new();
        let s0 = diagram.add_site(Vector2::new(0.0, 0.0));
        let s1 = diagram.add_site(Vector2::new(1.0, 0.0));
        let edge = diagram.add_edge(s0, s1);
        let v0 = diagram.add_vertex(Vector2::new(0.5, 0.0));
        let v1 = diagram.add_vertex(Vector2::new(0.5, 1.0));
        diagram.set_edge_endpoint(edge, v0);
        diagram.set_edge_endpoint(edge, v1);
        assert_eq!(diagram.edges().count(), 1);
        diagram.set_edge_dropped(edge);
        assert_eq!(diagram.edges().count(), 0);
    }

    #[test]
    fn other_site_returns_the_opposite_side() {
        let mut diagram = Diagram::new();
        let s0 = diagram.add_site(Vector2::new(0.0, 0.0));
        let s1 = diagram.add_site(Vector2::new(1.0, 0.0));
        let edge = diagram.add_edge(s0, s1);
        assert_eq!(diagram.edge(edge).other_site(s0), s1);
        assert_eq!(diagram.edge(edge).other_site(s1), s0);
    }
}
