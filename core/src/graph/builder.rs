use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::catalog::{Catalog, RoutingSettings};
use crate::constants::MINUTES_PER_KMH;

use super::{EdgeMeta, Graph, VertexPair};

/// Builds the routing graph for `catalog` under the given global
/// routing parameters.
///
/// Vertex ids are assigned in catalog iteration order, two per stop
/// (`id` then `transfer_id`), consuming `2 * stops.len()` node indices.
/// Wait edges are added first (one per stop, `EdgeId`s `0..stops.len()`)
/// followed by ride edges, after parallel-edge collapse, in ascending
/// `(from, to)` vertex order for determinism.
#[must_use]
pub fn build(catalog: &Catalog, settings: &RoutingSettings) -> Graph {
    let mut graph = DiGraph::<(), f64>::new();
    let mut stop_vertex = HashMap::with_capacity(catalog.stop_count());

    for stop in catalog.stops() {
        let id = graph.add_node(());
        let transfer_id = graph.add_node(());
        stop_vertex.insert(
            stop.id,
            VertexPair { id: id.index() as u32, transfer_id: transfer_id.index() as u32 },
        );
    }

    let mut edge_meta = Vec::with_capacity(catalog.stop_count());

    for stop in catalog.stops() {
        let vp = stop_vertex[&stop.id];
        graph.add_edge(
            NodeIndex::new(vp.transfer_id as usize),
            NodeIndex::new(vp.id as usize),
            settings.bus_wait_time,
        );
        edge_meta.push(EdgeMeta {
            from_stop: stop.id,
            to_stop: stop.id,
            bus: None,
            span_count: 0,
            time: settings.bus_wait_time,
        });
    }

    let mut candidates: HashMap<(NodeIndex, NodeIndex), (f64, EdgeMeta)> = HashMap::new();

    for bus in catalog.buses() {
        collect_ride_candidates(&bus.route, bus.id, catalog, &stop_vertex, settings.bus_velocity, &mut candidates);
        if matches!(bus.route_type, crate::catalog::RouteType::BackAndForth) {
            let reversed: Vec<u32> = bus.route.iter().rev().copied().collect();
            collect_ride_candidates(&reversed, bus.id, catalog, &stop_vertex, settings.bus_velocity, &mut candidates);
        }
    }

    let mut ordered: Vec<((NodeIndex, NodeIndex), (f64, EdgeMeta))> = candidates.into_iter().collect();
    ordered.sort_by_key(|((from, to), _)| (from.index(), to.index()));

    for ((from, to), (time, meta)) in ordered {
        graph.add_edge(from, to, time);
        edge_meta.push(meta);
    }

    Graph { graph, edge_meta, stop_vertex }
}

/// Walks one traversal of `route` (already in the direction it should be
/// read), generating a ride-edge candidate for every ordered pair of
/// positions `(i, j)` with `j > i` where `route[i] != route[j]`.
fn collect_ride_candidates(
    route: &[u32],
    bus_id: u32,
    catalog: &Catalog,
    stop_vertex: &HashMap<u32, VertexPair>,
    bus_velocity: f64,
    candidates: &mut HashMap<(NodeIndex, NodeIndex), (f64, EdgeMeta)>,
) {
    for i in 0..route.len() {
        let mut cumulative = 0.0;
        let mut prev = route[i];
        for (span, &cur) in route.iter().enumerate().skip(i + 1) {
            cumulative += catalog.distance(prev, cur);
            prev = cur;

            if cur == route[i] {
                continue;
            }

            let span_count = (span - i) as u32;
            let time = (cumulative / bus_velocity) * MINUTES_PER_KMH;

            let from_vp = stop_vertex[&route[i]];
            let to_vp = stop_vertex[&cur];
            let from_node = NodeIndex::new(from_vp.id as usize);
            let to_node = NodeIndex::new(to_vp.transfer_id as usize);

            let meta = EdgeMeta { from_stop: route[i], to_stop: cur, bus: Some(bus_id), span_count, time };

            candidates
                .entry((from_node, to_node))
                .and_modify(|(best_time, best_meta)| {
                    if time < *best_time {
                        *best_time = time;
                        *best_meta = meta.clone();
                    }
                })
                .or_insert((time, meta));
        }
    }
}
