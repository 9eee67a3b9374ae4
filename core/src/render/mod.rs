//! Projects the catalog onto a canvas and emits a static SVG map: one
//! polyline per bus, two `<text>` elements per bus endpoint, one white
//! circle per stop, and two `<text>` elements per stop — in that order,
//! back to front.

mod svg;

use crate::catalog::{Bus, Catalog, RouteType, Stop};
use crate::constants::EPSILON;
use crate::settings::RenderSettings;
use svg::{Point, TextSpec};

struct Projector {
    min_lng: f64,
    max_lat: f64,
    zoom: f64,
    pad: f64,
}

impl Projector {
    fn new(stops: &[&Stop], settings: &RenderSettings) -> Self {
        let mut min_lng = f64::INFINITY;
        let mut max_lng = f64::NEG_INFINITY;
        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        for stop in stops {
            min_lng = min_lng.min(stop.coord.lng);
            max_lng = max_lng.max(stop.coord.lng);
            min_lat = min_lat.min(stop.coord.lat);
            max_lat = max_lat.max(stop.coord.lat);
        }

        let pad = settings.padding;
        let height_coef = if max_lat - min_lat > EPSILON { (settings.height - 2.0 * pad) / (max_lat - min_lat) } else { 0.0 };
        let width_coef = if max_lng - min_lng > EPSILON { (settings.width - 2.0 * pad) / (max_lng - min_lng) } else { 0.0 };
        let zoom = height_coef.min(width_coef);

        Self { min_lng, max_lat, zoom, pad }
    }

    fn project(&self, stop: &Stop) -> Point {
        Point {
            x: (stop.coord.lng - self.min_lng) * self.zoom + self.pad,
            y: (self.max_lat - stop.coord.lat) * self.zoom + self.pad,
        }
    }
}

/// Renders `catalog` under `settings` to a complete SVG document.
#[must_use]
pub fn render(catalog: &Catalog, settings: &RenderSettings) -> String {
    let selected_stops: Vec<&Stop> = catalog
        .stops()
        .iter()
        .filter(|stop| !catalog.buses_for_stop(&stop.name).is_empty())
        .collect();
    let selected_buses: Vec<&Bus> = catalog.buses().filter(|bus| !bus.route.is_empty()).collect();

    let projector = Projector::new(&selected_stops, settings);

    let mut alphabetical_stops = selected_stops.clone();
    alphabetical_stops.sort_by(|a, b| a.name.cmp(&b.name));

    let mut body = String::new();

    for (i, bus) in selected_buses.iter().enumerate() {
        let color = bus_color(settings, i);
        body.push_str(&render_bus_polyline(catalog, &projector, bus, &color, settings.line_width));
    }
    for (i, bus) in selected_buses.iter().enumerate() {
        let color = bus_color(settings, i);
        body.push_str(&render_bus_labels(catalog, &projector, bus, &color, settings));
    }
    for stop in &alphabetical_stops {
        body.push_str(&svg::circle(&projector.project(stop), settings.stop_radius, "white"));
    }
    for stop in &alphabetical_stops {
        body.push_str(&render_stop_labels(&projector, stop, settings));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><svg xmlns="http://www.w3.org/2000/svg" version="1.1">{body}</svg>"#
    )
}

fn bus_color(settings: &RenderSettings, index: usize) -> String {
    if settings.color_palette.is_empty() {
        return "black".to_owned();
    }
    settings.color_palette[index % settings.color_palette.len()].to_css()
}

fn render_bus_polyline(catalog: &Catalog, projector: &Projector, bus: &Bus, color: &str, line_width: f64) -> String {
    let mut points: Vec<Point> = bus
        .route
        .iter()
        .map(|&stop_id| projector.project(catalog.stop_by_id(stop_id).expect("route stop id resolves")))
        .collect();
    if matches!(bus.route_type, RouteType::BackAndForth) && bus.route.len() > 1 {
        points.extend(bus.route[..bus.route.len() - 1].iter().rev().map(|&stop_id| {
            projector.project(catalog.stop_by_id(stop_id).expect("route stop id resolves"))
        }));
    }
    svg::polyline(&points, color, line_width)
}

fn render_bus_labels(catalog: &Catalog, projector: &Projector, bus: &Bus, color: &str, settings: &RenderSettings) -> String {
    let Some(&first) = bus.route.first() else { return String::new() };
    let last = *bus.route.last().expect("non-empty route has a last stop");

    let mut endpoints = vec![first];
    if matches!(bus.route_type, RouteType::BackAndForth) && first != last {
        endpoints.push(last);
    }

    let mut out = String::new();
    for stop_id in endpoints {
        let stop = catalog.stop_by_id(stop_id).expect("route stop id resolves");
        let point = projector.project(stop);
        out.push_str(&svg::text(&TextSpec {
            point: &point,
            offset_dx: settings.bus_label_offset.dx,
            offset_dy: settings.bus_label_offset.dy,
            font_size: settings.bus_label_font_size,
            bold: true,
            fill: &settings.underlayer_color.to_css(),
            stroke: Some((&settings.underlayer_color.to_css(), settings.underlayer_width)),
            content: &bus.name,
        }));
        out.push_str(&svg::text(&TextSpec {
            point: &point,
            offset_dx: settings.bus_label_offset.dx,
            offset_dy: settings.bus_label_offset.dy,
            font_size: settings.bus_label_font_size,
            bold: true,
            fill: color,
            stroke: None,
            content: &bus.name,
        }));
    }
    out
}

fn render_stop_labels(projector: &Projector, stop: &Stop, settings: &RenderSettings) -> String {
    let point = projector.project(stop);
    let mut out = String::new();
    out.push_str(&svg::text(&TextSpec {
        point: &point,
        offset_dx: settings.stop_label_offset.dx,
        offset_dy: settings.stop_label_offset.dy,
        font_size: settings.stop_label_font_size,
        bold: false,
        fill: &settings.underlayer_color.to_css(),
        stroke: Some((&settings.underlayer_color.to_css(), settings.underlayer_width)),
        content: &stop.name,
    }));
    out.push_str(&svg::text(&TextSpec {
        point: &point,
        offset_dx: settings.stop_label_offset.dx,
        offset_dy: settings.stop_label_offset.dy,
        font_size: settings.stop_label_font_size,
        bold: false,
        fill: "black",
        stroke: None,
        content: &stop.name,
    }));
    out
}
