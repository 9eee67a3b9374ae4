//! All-pairs shortest paths over the routing graph (Floyd-Warshall),
//! with O(1) memoized queries and recoverable path edges.

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::graph::Graph;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
    pub(crate) weight: f64,
    pub(crate) prev_edge: EdgeIndex,
}

/// The dense all-pairs table: `table[u][v]` is `None` when there is no
/// path from `u` to `v` (or `u == v`, never populated) and `Some(entry)`
/// otherwise, where `entry.prev_edge` is the last edge on the optimal
/// `u -> v` path. Owned independently of the [`Graph`] it was computed
/// from so the binary codec can persist and restore it without fighting
/// a borrow.
pub type Table = Vec<Vec<Option<Entry>>>;

/// The result of a [`Router::build_route`] query: total travel time in
/// minutes and the edges of the optimal path, in forward order.
#[derive(Debug, Clone)]
pub struct RouteQuery {
    pub total_weight: f64,
    pub edges: Vec<EdgeIndex>,
}

/// Runs Floyd-Warshall relaxation over `graph`'s edges, producing the
/// dense all-pairs [`Table`].
///
/// When multiple paths tie on total weight, the surviving predecessor
/// depends on relaxation order only — callers must not depend on a
/// specific edge sequence beyond the total weight it produces.
#[must_use]
pub fn compute_table(graph: &Graph) -> Table {
    let n = graph.vertex_count();
    let mut table: Table = vec![vec![None; n]; n];

    for edge in graph.inner().edge_references() {
        let u = edge.source().index();
        let v = edge.target().index();
        if u == v {
            continue;
        }
        let weight = *edge.weight();
        let better = table[u][v].map_or(true, |e| weight < e.weight);
        if better {
            table[u][v] = Some(Entry { weight, prev_edge: edge.id() });
        }
    }

    for k in 0..n {
        for u in 0..n {
            if u == k {
                continue;
            }
            let Some(uk) = table[u][k] else { continue };
            for v in 0..n {
                if v == u || v == k {
                    continue;
                }
                let Some(kv) = table[k][v] else { continue };
                let candidate = uk.weight + kv.weight;
                let better = table[u][v].map_or(true, |e| candidate < e.weight);
                if better {
                    table[u][v] = Some(Entry { weight: candidate, prev_edge: kv.prev_edge });
                }
            }
        }
    }

    table
}

/// A thin, borrowing view over a [`Graph`] and a precomputed [`Table`],
/// used to answer `build_route` queries in O(path length).
pub struct Router<'g> {
    graph: &'g Graph,
    table: &'g Table,
}

impl<'g> Router<'g> {
    #[must_use]
    pub fn new(graph: &'g Graph, table: &'g Table) -> Self {
        Self { graph, table }
    }

    /// Finds the minimum-weight path between two vertex ids.
    ///
    /// Returns `Some` with an empty edge list and zero weight when
    /// `source == target`; `None` when `target` is unreachable from
    /// `source`.
    #[must_use]
    pub fn build_route(&self, source: NodeIndex, target: NodeIndex) -> Option<RouteQuery> {
        if source == target {
            return Some(RouteQuery { total_weight: 0.0, edges: Vec::new() });
        }

        let entry = self.table[source.index()][target.index()]?;

        let mut edges = Vec::new();
        let mut cur = target;
        loop {
            let prev_edge = self.table[source.index()][cur.index()]?.prev_edge;
            edges.push(prev_edge);
            cur = self.graph.inner().edge_endpoints(prev_edge)?.0;
            if cur == source {
                break;
            }
        }
        edges.reverse();

        Some(RouteQuery { total_weight: entry.weight, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus_builder::{self, RawBus};
    use crate::catalog::{Catalog, RouteType, RoutingSettings};
    use crate::geo::Coordinate;
    use crate::graph;

    fn settings() -> RoutingSettings {
        RoutingSettings { bus_velocity: 6.0, bus_wait_time: 2.0 }
    }

    #[test]
    fn same_source_and_target_is_free() {
        let mut cat = Catalog::new();
        cat.add_stop("A", Coordinate::new(0.0, 0.0)).unwrap();
        let g = graph::build(&cat, &settings());
        let table = compute_table(&g);
        let router = Router::new(&g, &table);
        let vp = g.vertex_pair(0).unwrap();
        let route = router
            .build_route(NodeIndex::new(vp.transfer_id as usize), NodeIndex::new(vp.transfer_id as usize))
            .unwrap();
        assert_eq!(route.total_weight, 0.0);
        assert!(route.edges.is_empty());
    }

    #[test]
    fn unreachable_target_is_none() {
        let mut cat = Catalog::new();
        cat.add_stop("A", Coordinate::new(0.0, 0.0)).unwrap();
        cat.add_stop("B", Coordinate::new(1.0, 1.0)).unwrap();
        let g = graph::build(&cat, &settings());
        let table = compute_table(&g);
        let router = Router::new(&g, &table);
        let a = g.vertex_pair(0).unwrap();
        let b = g.vertex_pair(1).unwrap();
        assert!(router
            .build_route(NodeIndex::new(a.transfer_id as usize), NodeIndex::new(b.transfer_id as usize))
            .is_none());
    }

    #[test]
    fn single_bus_one_hop_matches_spec_example() {
        let mut cat = Catalog::new();
        let a = cat.add_stop("A", Coordinate::new(0.0, 0.0)).unwrap();
        let b = cat.add_stop("B", Coordinate::new(0.0, 0.001)).unwrap();
        cat.add_distance(a, b, 100.0);
        let raw = RawBus { name: "1".into(), route_type: RouteType::Direct, stops: vec!["A".into(), "B".into()] };
        let bus = bus_builder::build(&raw, &cat, settings());
        cat.add_bus(bus).unwrap();

        let g = graph::build(&cat, &settings());
        let table = compute_table(&g);
        let router = Router::new(&g, &table);
        let va = g.vertex_pair(a).unwrap();
        let vb = g.vertex_pair(b).unwrap();

        let route = router
            .build_route(NodeIndex::new(va.transfer_id as usize), NodeIndex::new(vb.transfer_id as usize))
            .unwrap();
        assert!(approx::abs_diff_eq!(route.total_weight, 3.0, epsilon = 1e-9));
        assert_eq!(route.edges.len(), 2);
    }

    #[test]
    fn prefers_smaller_weight_over_fewer_hops() {
        let mut cat = Catalog::new();
        let a = cat.add_stop("A", Coordinate::new(0.0, 0.0)).unwrap();
        let b = cat.add_stop("B", Coordinate::new(0.0, 0.001)).unwrap();
        let c = cat.add_stop("C", Coordinate::new(0.0, 0.002)).unwrap();
        cat.add_distance(a, b, 100.0);
        cat.add_distance(b, c, 100.0);
        cat.add_distance(a, c, 10_000.0);

        let slow = bus_builder::build(&RawBus { name: "slow".into(), route_type: RouteType::Direct, stops: vec!["A".into(), "C".into()] }, &cat, settings());
        cat.add_bus(slow).unwrap();
        let fast = bus_builder::build(&RawBus { name: "fast".into(), route_type: RouteType::Direct, stops: vec!["A".into(), "B".into(), "C".into()] }, &cat, settings());
        cat.add_bus(fast).unwrap();

        let g = graph::build(&cat, &settings());
        let table = compute_table(&g);
        let router = Router::new(&g, &table);
        let va = g.vertex_pair(a).unwrap();
        let vc = g.vertex_pair(c).unwrap();

        let route = router
            .build_route(NodeIndex::new(va.transfer_id as usize), NodeIndex::new(vc.transfer_id as usize))
            .unwrap();
        // two-hop fast ride (2 min) + one wait beats the single slow hop (>1000 min)
        assert!(route.total_weight < 10.0);
    }
}
