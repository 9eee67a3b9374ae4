//! Serializes and deserializes the engine's whole live state — catalog,
//! render/routing settings, graph, and router table — to a single
//! binary artifact.
//!
//! Deserialization order is mandatory because later records dereference
//! earlier ones: stops, then buses, then render settings, then routing
//! settings, then the graph, then the router table. Graph edges and
//! incidence lists are restored before per-edge metadata, which looks up
//! stops and buses by id.

mod wire;

use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::catalog::{Bus, Catalog, RouteType, RoutingSettings};
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::graph::{EdgeMeta, Graph, VertexPair};
use crate::router::{Entry, Table};
use crate::settings::{Color, Offset, RenderSettings};
use wire::{Reader, Writer};

/// Everything the codec persists, borrowed from the live session.
pub struct EncodeInput<'a> {
    pub catalog: &'a Catalog,
    pub graph: &'a Graph,
    pub table: &'a Table,
    pub render_settings: &'a RenderSettings,
    pub routing_settings: &'a RoutingSettings,
}

/// Everything the codec restores, owned, ready to hand to a session.
pub struct DecodeOutput {
    pub catalog: Catalog,
    pub graph: Graph,
    pub table: Table,
    pub render_settings: RenderSettings,
    pub routing_settings: RoutingSettings,
}

#[must_use]
pub fn encode(input: &EncodeInput<'_>) -> Vec<u8> {
    let mut w = Writer::new();
    write_stops(&mut w, input.catalog);
    write_buses(&mut w, input.catalog);
    write_render_settings(&mut w, input.render_settings);
    write_routing_settings(&mut w, input.routing_settings);
    write_graph(&mut w, input.graph);
    write_table(&mut w, input.table);
    w.into_bytes()
}

pub fn decode(bytes: &[u8]) -> Result<DecodeOutput> {
    let mut r = Reader::new(bytes);
    let mut catalog = Catalog::new();
    read_stops(&mut r, &mut catalog)?;
    read_buses(&mut r, &mut catalog)?;
    let render_settings = read_render_settings(&mut r)?;
    let routing_settings = read_routing_settings(&mut r)?;
    let graph = read_graph(&mut r)?;
    let table = read_table(&mut r)?;
    validate_graph_ids(&graph, &catalog)?;
    Ok(DecodeOutput { catalog, graph, table, render_settings, routing_settings })
}

/// Checks that every stop/bus id an edge's metadata references actually
/// resolves in `catalog`, guarding against a wire-valid but structurally
/// corrupt artifact (e.g. one hand-edited or truncated mid-record).
fn validate_graph_ids(graph: &Graph, catalog: &Catalog) -> Result<()> {
    for i in 0..graph.edge_count_meta() {
        let meta = graph.edge_meta(EdgeIndex::new(i));
        if catalog.stop_by_id(meta.from_stop).is_none() {
            return Err(Error::DanglingStopId(meta.from_stop));
        }
        if catalog.stop_by_id(meta.to_stop).is_none() {
            return Err(Error::DanglingStopId(meta.to_stop));
        }
        if let Some(bus) = meta.bus {
            if catalog.bus_by_id(bus).is_none() {
                return Err(Error::DanglingBusId(bus));
            }
        }
    }
    Ok(())
}

fn write_stops(w: &mut Writer, catalog: &Catalog) {
    w.write_vec(catalog.stops(), |w, stop| {
        w.write_u32(stop.id);
        w.write_string(&stop.name);
        w.write_f64(stop.coord.lat);
        w.write_f64(stop.coord.lng);
    });

    let mut distances: Vec<(u32, u32, f64)> = catalog.distances().collect();
    distances.sort_by_key(|&(from, to, _)| (from, to));
    w.write_vec(&distances, |w, &(from, to, meters)| {
        w.write_u32(from);
        w.write_u32(to);
        w.write_f64(meters);
    });
}

fn read_stops(r: &mut Reader<'_>, catalog: &mut Catalog) -> Result<()> {
    let stops: Vec<(u32, String, f64, f64)> = r.read_vec(|r| {
        Ok((r.read_u32()?, r.read_string()?, r.read_f64()?, r.read_f64()?))
    })?;
    for (id, name, lat, lng) in stops {
        catalog.add_stop_with_id(id, name, Coordinate::new(lat, lng)).map_err(|_| Error::Codec("malformed binary artifact".into()))?;
    }

    let distances: Vec<(u32, u32, f64)> = r.read_vec(|r| Ok((r.read_u32()?, r.read_u32()?, r.read_f64()?)))?;
    for (from, to, meters) in distances {
        catalog.add_distance(from, to, meters);
    }
    Ok(())
}

fn write_buses(w: &mut Writer, catalog: &Catalog) {
    let buses: Vec<&Bus> = catalog.buses().collect();
    w.write_vec(&buses, |w, bus| {
        w.write_u32(bus.id);
        w.write_string(&bus.name);
        w.write_u8(route_type_tag(bus.route_type));
        w.write_vec(&bus.route, |w, &stop_id| w.write_u32(stop_id));
        w.write_f64(bus.route_geo_length);
        w.write_f64(bus.route_true_length);
        w.write_u32(bus.stops_on_route);
        w.write_u32(bus.unique_stops);
        w.write_f64(bus.settings.bus_velocity);
        w.write_f64(bus.settings.bus_wait_time);
    });
}

fn read_buses(r: &mut Reader<'_>, catalog: &mut Catalog) -> Result<()> {
    let buses = r.read_vec(|r| {
        let id = r.read_u32()?;
        let name = r.read_string()?;
        let route_type = route_type_from_tag(r.read_u8()?)?;
        let route = r.read_vec(|r| r.read_u32())?;
        let route_geo_length = r.read_f64()?;
        let route_true_length = r.read_f64()?;
        let stops_on_route = r.read_u32()?;
        let unique_stops = r.read_u32()?;
        let bus_velocity = r.read_f64()?;
        let bus_wait_time = r.read_f64()?;
        Ok(Bus {
            id,
            name,
            route,
            route_type,
            route_geo_length,
            route_true_length,
            stops_on_route,
            unique_stops,
            settings: RoutingSettings { bus_velocity, bus_wait_time },
        })
    })?;
    for bus in buses {
        let id = bus.id;
        catalog.add_bus_with_id(id, bus).map_err(|_| Error::Codec("malformed binary artifact".into()))?;
    }
    Ok(())
}

fn route_type_tag(route_type: RouteType) -> u8 {
    match route_type {
        RouteType::Direct => 0,
        RouteType::BackAndForth => 1,
        RouteType::Round => 2,
    }
}

fn route_type_from_tag(tag: u8) -> Result<RouteType> {
    match tag {
        0 => Ok(RouteType::Direct),
        1 => Ok(RouteType::BackAndForth),
        2 => Ok(RouteType::Round),
        _ => Err(Error::Codec("malformed binary artifact".into())),
    }
}

fn write_color(w: &mut Writer, color: &Color) {
    match color {
        Color::Named(name) => {
            w.write_u8(0);
            w.write_string(name);
        }
        Color::Rgb(r, g, b) => {
            w.write_u8(1);
            w.write_u8(*r);
            w.write_u8(*g);
            w.write_u8(*b);
        }
        Color::Rgba(r, g, b, a) => {
            w.write_u8(2);
            w.write_u8(*r);
            w.write_u8(*g);
            w.write_u8(*b);
            w.write_f64(*a);
        }
    }
}

fn read_color(r: &mut Reader<'_>) -> Result<Color> {
    match r.read_u8()? {
        0 => Ok(Color::Named(r.read_string()?)),
        1 => Ok(Color::Rgb(r.read_u8()?, r.read_u8()?, r.read_u8()?)),
        2 => {
            let red = r.read_u8()?;
            let green = r.read_u8()?;
            let blue = r.read_u8()?;
            Ok(Color::Rgba(red, green, blue, r.read_f64()?))
        }
        _ => Err(Error::Codec("malformed binary artifact".into())),
    }
}

fn write_render_settings(w: &mut Writer, settings: &RenderSettings) {
    w.write_f64(settings.width);
    w.write_f64(settings.height);
    w.write_f64(settings.padding);
    w.write_f64(settings.line_width);
    w.write_f64(settings.stop_radius);
    w.write_f64(settings.bus_label_font_size);
    w.write_f64(settings.bus_label_offset.dx);
    w.write_f64(settings.bus_label_offset.dy);
    w.write_f64(settings.stop_label_font_size);
    w.write_f64(settings.stop_label_offset.dx);
    w.write_f64(settings.stop_label_offset.dy);
    write_color(w, &settings.underlayer_color);
    w.write_f64(settings.underlayer_width);
    w.write_vec(&settings.color_palette, |w, color| write_color(w, color));
}

fn read_render_settings(r: &mut Reader<'_>) -> Result<RenderSettings> {
    Ok(RenderSettings {
        width: r.read_f64()?,
        height: r.read_f64()?,
        padding: r.read_f64()?,
        line_width: r.read_f64()?,
        stop_radius: r.read_f64()?,
        bus_label_font_size: r.read_f64()?,
        bus_label_offset: Offset { dx: r.read_f64()?, dy: r.read_f64()? },
        stop_label_font_size: r.read_f64()?,
        stop_label_offset: Offset { dx: r.read_f64()?, dy: r.read_f64()? },
        underlayer_color: read_color(r)?,
        underlayer_width: r.read_f64()?,
        color_palette: r.read_vec(read_color)?,
    })
}

fn write_routing_settings(w: &mut Writer, settings: &RoutingSettings) {
    w.write_f64(settings.bus_velocity);
    w.write_f64(settings.bus_wait_time);
}

fn read_routing_settings(r: &mut Reader<'_>) -> Result<RoutingSettings> {
    Ok(RoutingSettings { bus_velocity: r.read_f64()?, bus_wait_time: r.read_f64()? })
}

fn write_graph(w: &mut Writer, graph: &Graph) {
    w.write_u32(graph.vertex_count() as u32);

    let edges: Vec<(NodeIndex, NodeIndex, f64)> = graph.edges_in_order().collect();
    w.write_vec(&edges, |w, &(from, to, weight)| {
        w.write_u32(from.index() as u32);
        w.write_u32(to.index() as u32);
        w.write_f64(weight);
    });

    w.write_vec(&(0..graph.edge_count_meta()).collect::<Vec<_>>(), |w, &i| {
        let meta = graph.edge_meta(EdgeIndex::new(i));
        w.write_u32(meta.from_stop);
        w.write_u32(meta.to_stop);
        w.write_bool(meta.bus.is_some());
        if let Some(bus) = meta.bus {
            w.write_u32(bus);
        }
        w.write_u32(meta.span_count);
        w.write_f64(meta.time);
    });

    let mut stop_vertices: Vec<(u32, VertexPair)> = graph.stop_vertices().iter().map(|(&id, &vp)| (id, vp)).collect();
    stop_vertices.sort_by_key(|&(id, _)| id);
    w.write_vec(&stop_vertices, |w, &(stop_id, vp)| {
        w.write_u32(stop_id);
        w.write_u32(vp.id);
        w.write_u32(vp.transfer_id);
    });
}

fn read_graph(r: &mut Reader<'_>) -> Result<Graph> {
    let vertex_count = r.read_u32()? as usize;

    let edges: Vec<(NodeIndex, NodeIndex, f64)> = r.read_vec(|r| {
        Ok((NodeIndex::new(r.read_u32()? as usize), NodeIndex::new(r.read_u32()? as usize), r.read_f64()?))
    })?;

    let edge_meta: Vec<EdgeMeta> = r.read_vec(|r| {
        let from_stop = r.read_u32()?;
        let to_stop = r.read_u32()?;
        let has_bus = r.read_bool()?;
        let bus = if has_bus { Some(r.read_u32()?) } else { None };
        let span_count = r.read_u32()?;
        let time = r.read_f64()?;
        Ok(EdgeMeta { from_stop, to_stop, bus, span_count, time })
    })?;

    let stop_vertex: HashMap<u32, VertexPair> = r
        .read_vec(|r| {
            let stop_id = r.read_u32()?;
            let id = r.read_u32()?;
            let transfer_id = r.read_u32()?;
            Ok((stop_id, VertexPair { id, transfer_id }))
        })?
        .into_iter()
        .collect();

    Ok(Graph::from_parts(vertex_count, edges, edge_meta, stop_vertex))
}

fn write_table(w: &mut Writer, table: &Table) {
    w.write_u32(table.len() as u32);
    for row in table {
        let present: Vec<(u32, &Entry)> =
            row.iter().enumerate().filter_map(|(v, e)| e.as_ref().map(|entry| (v as u32, entry))).collect();
        w.write_vec(&present, |w, &(v, entry)| {
            w.write_u32(v);
            w.write_f64(entry.weight);
            w.write_u32(entry.prev_edge.index() as u32);
        });
    }
}

fn read_table(r: &mut Reader<'_>) -> Result<Table> {
    let n = r.read_u32()? as usize;
    let mut table: Table = vec![vec![None; n]; n];
    for row in table.iter_mut() {
        let present = r.read_vec(|r| {
            let v = r.read_u32()? as usize;
            let weight = r.read_f64()?;
            let prev_edge = EdgeIndex::new(r.read_u32()? as usize);
            Ok((v, Entry { weight, prev_edge }))
        })?;
        for (v, entry) in present {
            if v >= row.len() {
                return Err(Error::Codec("malformed binary artifact".into()));
            }
            row[v] = Some(entry);
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus_builder::{self, RawBus};
    use crate::graph;
    use crate::router;

    fn sample_catalog() -> Catalog {
        let mut cat = Catalog::new();
        let a = cat.add_stop("A", Coordinate::new(0.0, 0.0)).unwrap();
        let b = cat.add_stop("B", Coordinate::new(0.0, 0.001)).unwrap();
        cat.add_distance(a, b, 100.0);
        let raw = RawBus { name: "1".into(), route_type: RouteType::Direct, stops: vec!["A".into(), "B".into()] };
        let settings = RoutingSettings { bus_velocity: 6.0, bus_wait_time: 2.0 };
        let bus = bus_builder::build(&raw, &cat, settings);
        cat.add_bus(bus).unwrap();
        cat
    }

    #[test]
    fn round_trips_whole_state() {
        let catalog = sample_catalog();
        let routing_settings = RoutingSettings { bus_velocity: 6.0, bus_wait_time: 2.0 };
        let render_settings = RenderSettings {
            width: 200.0,
            height: 200.0,
            padding: 10.0,
            line_width: 2.0,
            stop_radius: 3.0,
            bus_label_font_size: 10.0,
            bus_label_offset: Offset { dx: 1.0, dy: 1.0 },
            stop_label_font_size: 10.0,
            stop_label_offset: Offset { dx: 1.0, dy: -1.0 },
            underlayer_color: Color::Rgba(255, 255, 255, 0.85),
            underlayer_width: 3.0,
            color_palette: vec![Color::Named("red".into())],
        };
        let graph = graph::build(&catalog, &routing_settings);
        let table = router::compute_table(&graph);

        let bytes = encode(&EncodeInput {
            catalog: &catalog,
            graph: &graph,
            table: &table,
            render_settings: &render_settings,
            routing_settings: &routing_settings,
        });

        let restored = decode(&bytes).unwrap();
        assert_eq!(restored.catalog.stop_count(), catalog.stop_count());
        assert_eq!(restored.catalog.bus_count(), catalog.bus_count());
        assert_eq!(restored.graph.vertex_count(), graph.vertex_count());
        assert_eq!(restored.graph.edge_count(), graph.edge_count());
        assert!(approx::abs_diff_eq!(restored.routing_settings.bus_velocity, 6.0, epsilon = 1e-12));
    }

    #[test]
    fn dangling_stop_id_in_edge_metadata_is_rejected() {
        let catalog = sample_catalog();
        let routing_settings = RoutingSettings { bus_velocity: 6.0, bus_wait_time: 2.0 };
        let graph = graph::build(&catalog, &routing_settings);
        let table = router::compute_table(&graph);
        let render_settings = RenderSettings {
            width: 1.0,
            height: 1.0,
            padding: 0.0,
            line_width: 1.0,
            stop_radius: 1.0,
            bus_label_font_size: 1.0,
            bus_label_offset: Offset { dx: 0.0, dy: 0.0 },
            stop_label_font_size: 1.0,
            stop_label_offset: Offset { dx: 0.0, dy: 0.0 },
            underlayer_color: Color::Named("white".into()),
            underlayer_width: 1.0,
            color_palette: vec![],
        };

        // Build a graph whose single edge references a stop id that no
        // stop record will claim, simulating a corrupted artifact whose
        // wire framing is otherwise perfectly valid.
        let mut corrupt = Catalog::new();
        corrupt.add_stop("only", Coordinate::new(0.0, 0.0)).unwrap();
        let mut w = Writer::new();
        write_stops(&mut w, &corrupt);
        write_buses(&mut w, &corrupt);
        write_render_settings(&mut w, &render_settings);
        write_routing_settings(&mut w, &routing_settings);
        w.write_u32(graph.vertex_count() as u32);
        w.write_vec(&[(NodeIndex::new(0), NodeIndex::new(1), 1.0)], |w, &(from, to, weight)| {
            w.write_u32(from.index() as u32);
            w.write_u32(to.index() as u32);
            w.write_f64(weight);
        });
        w.write_vec(&[(99u32, 0u32)], |w, &(from_stop, to_stop)| {
            w.write_u32(from_stop);
            w.write_u32(to_stop);
            w.write_bool(false);
            w.write_u32(0);
            w.write_f64(1.0);
        });
        let no_stop_vertices: Vec<(u32, u32, u32)> = Vec::new();
        w.write_vec(&no_stop_vertices, |w, &(stop_id, id, transfer_id)| {
            w.write_u32(stop_id);
            w.write_u32(id);
            w.write_u32(transfer_id);
        });
        write_table(&mut w, &table);

        assert!(matches!(decode(&w.into_bytes()), Err(Error::DanglingStopId(99))));
    }

    #[test]
    fn truncated_artifact_is_codec_error() {
        let catalog = sample_catalog();
        let routing_settings = RoutingSettings { bus_velocity: 6.0, bus_wait_time: 2.0 };
        let graph = graph::build(&catalog, &routing_settings);
        let table = router::compute_table(&graph);
        let render_settings = RenderSettings {
            width: 1.0,
            height: 1.0,
            padding: 0.0,
            line_width: 1.0,
            stop_radius: 1.0,
            bus_label_font_size: 1.0,
            bus_label_offset: Offset { dx: 0.0, dy: 0.0 },
            stop_label_font_size: 1.0,
            stop_label_offset: Offset { dx: 0.0, dy: 0.0 },
            underlayer_color: Color::Named("white".into()),
            underlayer_width: 1.0,
            color_palette: vec![],
        };
        let bytes = encode(&EncodeInput {
            catalog: &catalog,
            graph: &graph,
            table: &table,
            render_settings: &render_settings,
            routing_settings: &routing_settings,
        });
        assert!(decode(&bytes[..bytes.len() / 2]).is_err());
    }
}
