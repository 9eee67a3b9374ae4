//! Translates a catalog plus a fixed wait-penalty and global velocity
//! into a directed weighted graph whose shortest paths are physically
//! meaningful trips.

mod builder;

pub use builder::build;

use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

/// The two vertices a stop contributes to the routing graph: `id` ("on
/// the bus") and `transfer_id` ("waiting at platform"), with the
/// invariant `transfer_id == id + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexPair {
    pub id: u32,
    pub transfer_id: u32,
}

/// Metadata for one graph edge, keyed by the edge's stable [`EdgeIndex`].
///
/// For wait edges `bus` is `None` and `from == to`; `span_count` is 0.
#[derive(Debug, Clone)]
pub struct EdgeMeta {
    pub from_stop: u32,
    pub to_stop: u32,
    pub bus: Option<u32>,
    pub span_count: u32,
    pub time: f64,
}

/// A directed weighted graph of `2 * stops` vertices encoding wait and
/// ride semantics, plus the side tables needed to interpret it.
///
/// Edge weights are travel times in minutes; `NodeIndex` doubles as a
/// stable vertex id and `EdgeIndex` doubles as a stable edge id — both
/// stay valid because vertices and edges are only ever appended, never
/// removed, during [`build`].
#[derive(Debug, Clone)]
pub struct Graph {
    graph: DiGraph<(), f64>,
    edge_meta: Vec<EdgeMeta>,
    stop_vertex: HashMap<u32, VertexPair>,
}

impl Graph {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn vertex_pair(&self, stop_id: u32) -> Option<VertexPair> {
        self.stop_vertex.get(&stop_id).copied()
    }

    #[must_use]
    pub fn stop_vertices(&self) -> &HashMap<u32, VertexPair> {
        &self.stop_vertex
    }

    #[must_use]
    pub fn edge_meta(&self, edge: EdgeIndex) -> &EdgeMeta {
        &self.edge_meta[edge.index()]
    }

    #[must_use]
    pub fn edge_count_meta(&self) -> usize {
        self.edge_meta.len()
    }

    pub(crate) fn inner(&self) -> &DiGraph<(), f64> {
        &self.graph
    }

    /// Rebuilds a `Graph` from deserialized parts, restoring the
    /// `petgraph` adjacency structure from a flat edge list. Used only
    /// by the binary codec.
    #[must_use]
    pub(crate) fn from_parts(
        vertex_count: usize,
        edges: Vec<(NodeIndex, NodeIndex, f64)>,
        edge_meta: Vec<EdgeMeta>,
        stop_vertex: HashMap<u32, VertexPair>,
    ) -> Self {
        let mut graph = DiGraph::with_capacity(vertex_count, edges.len());
        for _ in 0..vertex_count {
            graph.add_node(());
        }
        for (from, to, weight) in edges {
            graph.add_edge(from, to, weight);
        }
        Self { graph, edge_meta, stop_vertex }
    }

    pub(crate) fn edges_in_order(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, f64)> + '_ {
        use petgraph::visit::EdgeRef;
        self.graph.edge_references().map(|e| (e.source(), e.target(), *e.weight()))
    }
}
