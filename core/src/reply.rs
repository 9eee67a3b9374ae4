//! Assembles the JSON stat reply array, one element per `stat_requests`
//! entry, in the same order.

use petgraph::graph::NodeIndex;

use crate::json::{Builder, Value};
use crate::request::{StatKind, StatRequest};
use crate::session::Session;

/// Builds the reply array for `requests` against `session`.
#[must_use]
pub fn build_replies(session: &Session, requests: &[StatRequest]) -> Value {
    let mut builder = Builder::new();
    builder.start_array();
    for request in requests {
        builder.value(build_reply(session, request));
    }
    builder.end_array().build()
}

fn build_reply(session: &Session, request: &StatRequest) -> Value {
    match &request.kind {
        StatKind::Stop { name } => stop_reply(session, request.id, name),
        StatKind::Bus { name } => bus_reply(session, request.id, name),
        StatKind::Map => map_reply(session, request.id),
        StatKind::Route { from, to } => route_reply(session, request.id, from, to),
    }
}

fn not_found(request_id: i64) -> Value {
    Builder::new()
        .start_dict()
        .key("request_id")
        .value(request_id)
        .key("error_message")
        .value("not found")
        .end_dict()
        .build()
}

fn stop_reply(session: &Session, request_id: i64, name: &str) -> Value {
    let Some(_stop) = session.catalog().stop_by_name(name) else { return not_found(request_id) };
    let buses = session.catalog().buses_for_stop(name);

    let mut builder = Builder::new();
    builder.start_dict().key("request_id").value(request_id).key("buses").start_array();
    for bus_name in &buses {
        builder.value(bus_name.as_str());
    }
    builder.end_array().end_dict().build()
}

fn bus_reply(session: &Session, request_id: i64, name: &str) -> Value {
    let Some(bus) = session.catalog().bus_by_name(name) else { return not_found(request_id) };
    let curvature = if bus.route_geo_length > 0.0 { bus.curvature() } else { 0.0 };

    Builder::new()
        .start_dict()
        .key("request_id")
        .value(request_id)
        .key("curvature")
        .value(curvature)
        .key("route_length")
        .value(bus.route_true_length)
        .key("stop_count")
        .value(bus.stops_on_route)
        .key("unique_stop_count")
        .value(bus.unique_stops)
        .end_dict()
        .build()
}

fn map_reply(session: &Session, request_id: i64) -> Value {
    Builder::new().start_dict().key("request_id").value(request_id).key("map").value(session.render_map()).end_dict().build()
}

fn route_reply(session: &Session, request_id: i64, from: &str, to: &str) -> Value {
    let Some(source_stop) = session.catalog().stop_by_name(from) else { return not_found(request_id) };
    let Some(target_stop) = session.catalog().stop_by_name(to) else { return not_found(request_id) };

    let Some(source_vp) = session.graph().vertex_pair(source_stop.id) else { return not_found(request_id) };
    let Some(target_vp) = session.graph().vertex_pair(target_stop.id) else { return not_found(request_id) };

    let source = NodeIndex::new(source_vp.transfer_id as usize);
    let target = NodeIndex::new(target_vp.transfer_id as usize);
    let Some(route) = session.build_route(source, target) else { return not_found(request_id) };

    let mut builder = Builder::new();
    builder.start_dict().key("request_id").value(request_id).key("total_time").value(route.total_weight).key("items").start_array();
    for edge in &route.edges {
        let meta = session.graph().edge_meta(*edge);
        match meta.bus {
            None => {
                let stop_name = session
                    .catalog()
                    .stop_by_id(meta.from_stop)
                    .expect("edge metadata references a live stop")
                    .name
                    .clone();
                builder
                    .start_dict()
                    .key("type")
                    .value("Wait")
                    .key("stop_name")
                    .value(stop_name)
                    .key("time")
                    .value(meta.time)
                    .end_dict();
            }
            Some(bus_id) => {
                let bus_name = session
                    .catalog()
                    .bus_by_id(bus_id)
                    .expect("edge metadata references a live bus")
                    .name
                    .clone();
                builder
                    .start_dict()
                    .key("type")
                    .value("Bus")
                    .key("bus")
                    .value(bus_name)
                    .key("span_count")
                    .value(meta.span_count)
                    .key("time")
                    .value(meta.time)
                    .end_dict();
            }
        }
    }
    builder.end_array().end_dict().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus_builder::{self, RawBus};
    use crate::catalog::{Catalog, RouteType, RoutingSettings};
    use crate::geo::Coordinate;
    use crate::request::StatKind;
    use crate::settings::{Color, Offset, RenderSettings};

    fn render_settings() -> RenderSettings {
        RenderSettings {
            width: 200.0,
            height: 200.0,
            padding: 10.0,
            line_width: 2.0,
            stop_radius: 3.0,
            bus_label_font_size: 10.0,
            bus_label_offset: Offset { dx: 1.0, dy: 1.0 },
            stop_label_font_size: 10.0,
            stop_label_offset: Offset { dx: 1.0, dy: -1.0 },
            underlayer_color: Color::Named("white".into()),
            underlayer_width: 3.0,
            color_palette: vec![Color::Named("red".into())],
        }
    }

    fn session_with_one_bus() -> Session {
        let mut catalog = Catalog::new();
        let a = catalog.add_stop("A", Coordinate::new(0.0, 0.0)).unwrap();
        let b = catalog.add_stop("B", Coordinate::new(0.0, 0.001)).unwrap();
        catalog.add_distance(a, b, 100.0);
        let routing_settings = RoutingSettings { bus_velocity: 6.0, bus_wait_time: 2.0 };
        let raw = RawBus { name: "1".into(), route_type: RouteType::Direct, stops: vec!["A".into(), "B".into()] };
        let bus = bus_builder::build(&raw, &catalog, routing_settings);
        catalog.add_bus(bus).unwrap();
        Session::build(catalog, render_settings(), routing_settings)
    }

    #[test]
    fn unknown_stop_returns_not_found() {
        let session = session_with_one_bus();
        let reply = stop_reply(&session, 7, "ghost");
        assert_eq!(reply.get("error_message").and_then(Value::as_str), Some("not found"));
        assert_eq!(reply.get("request_id").and_then(Value::as_i64), Some(7));
    }

    #[test]
    fn known_stop_lists_its_buses() {
        let session = session_with_one_bus();
        let reply = stop_reply(&session, 1, "A");
        let buses = reply.get("buses").and_then(Value::as_array).unwrap();
        assert_eq!(buses.len(), 1);
        assert_eq!(buses[0].as_str(), Some("1"));
    }

    #[test]
    fn single_bus_one_hop_route_matches_spec_example() {
        let session = session_with_one_bus();
        let reply = route_reply(&session, 1, "A", "B");
        assert!(approx::abs_diff_eq!(reply.get("total_time").and_then(Value::as_f64).unwrap(), 3.0, epsilon = 1e-9));
        let items = reply.get("items").and_then(Value::as_array).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("type").and_then(Value::as_str), Some("Wait"));
        assert_eq!(items[1].get("type").and_then(Value::as_str), Some("Bus"));
    }

    #[test]
    fn same_source_and_target_is_an_empty_route() {
        let session = session_with_one_bus();
        let reply = route_reply(&session, 1, "A", "A");
        assert_eq!(reply.get("total_time").and_then(Value::as_f64), Some(0.0));
        assert_eq!(reply.get("items").and_then(Value::as_array).unwrap().len(), 0);
    }

    #[test]
    fn unknown_stop_name_in_route_yields_not_found() {
        let session = session_with_one_bus();
        let reply = route_reply(&session, 1, "A", "nonexistent");
        assert_eq!(reply.get("error_message").and_then(Value::as_str), Some("not found"));
    }

    #[test]
    fn map_reply_embeds_svg() {
        let session = session_with_one_bus();
        let reply = map_reply(&session, 1);
        assert!(reply.get("map").and_then(Value::as_str).unwrap().starts_with("<?xml"));
    }

    #[test]
    fn stat_kind_is_constructed_as_expected() {
        let kind = StatKind::Bus { name: "1".into() };
        assert!(matches!(kind, StatKind::Bus { name } if name == "1"));
    }
}
