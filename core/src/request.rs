//! Parses the JSON request document's `base_requests`, `stat_requests`,
//! `render_settings`, `routing_settings`, and `serialization_settings`
//! into typed values the rest of the engine works with.

use std::path::PathBuf;

use crate::catalog::{RouteType, RoutingSettings};
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::json::Value;
use crate::settings::{Color, Offset, RenderSettings, SerializationSettings};

/// One entry of `base_requests`: either a stop or a bus declaration.
#[derive(Debug, Clone)]
pub enum BaseRequest {
    Stop(BaseStop),
    Bus(BaseBus),
}

#[derive(Debug, Clone)]
pub struct BaseStop {
    pub name: String,
    pub coord: Coordinate,
    /// `(other_stop_name, meters)` pairs, in the order they appeared in
    /// the request's `road_distances` object.
    pub road_distances: Vec<(String, f64)>,
}

#[derive(Debug, Clone)]
pub struct BaseBus {
    pub name: String,
    pub route_type: RouteType,
    pub stops: Vec<String>,
}

/// One entry of `stat_requests`.
#[derive(Debug, Clone)]
pub struct StatRequest {
    pub id: i64,
    pub kind: StatKind,
}

#[derive(Debug, Clone)]
pub enum StatKind {
    Stop { name: String },
    Bus { name: String },
    Map,
    Route { from: String, to: String },
}

fn malformed(message: impl Into<String>) -> Error {
    Error::MalformedRequest(message.into())
}

fn object_get<'a>(value: &'a Value, key: &str) -> Result<&'a Value> {
    value.get(key).ok_or_else(|| malformed(format!("missing field '{key}'")))
}

fn as_str<'a>(value: &'a Value, key: &str) -> Result<&'a str> {
    object_get(value, key)?.as_str().ok_or_else(|| malformed(format!("field '{key}' must be a string")))
}

fn as_f64(value: &Value, key: &str) -> Result<f64> {
    object_get(value, key)?.as_f64().ok_or_else(|| malformed(format!("field '{key}' must be a number")))
}

/// Parses the root document's `base_requests` array, if present.
pub fn parse_base_requests(root: &Value) -> Result<Vec<BaseRequest>> {
    let Some(array) = root.get("base_requests") else { return Ok(Vec::new()) };
    let items = array.as_array().ok_or_else(|| malformed("base_requests must be an array"))?;
    items.iter().map(parse_base_request).collect()
}

fn parse_base_request(value: &Value) -> Result<BaseRequest> {
    match as_str(value, "type")? {
        "Stop" => Ok(BaseRequest::Stop(parse_base_stop(value)?)),
        "Bus" => Ok(BaseRequest::Bus(parse_base_bus(value)?)),
        other => Err(Error::UnknownRequestType(other.to_owned())),
    }
}

fn parse_base_stop(value: &Value) -> Result<BaseStop> {
    let name = as_str(value, "name")?.to_owned();
    let lat = as_f64(value, "latitude")?;
    let lng = as_f64(value, "longitude")?;

    let road_distances = match value.get("road_distances") {
        Some(obj) => obj
            .as_object()
            .ok_or_else(|| malformed("road_distances must be an object"))?
            .iter()
            .map(|(stop_name, meters)| {
                let meters = meters.as_f64().ok_or_else(|| malformed("road_distances values must be numbers"))?;
                Ok((stop_name.clone(), meters))
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(BaseStop { name, coord: Coordinate::new(lat, lng), road_distances })
}

fn parse_base_bus(value: &Value) -> Result<BaseBus> {
    let name = as_str(value, "name")?.to_owned();
    let stops: Vec<String> = object_get(value, "stops")?
        .as_array()
        .ok_or_else(|| malformed("stops must be an array"))?
        .iter()
        .map(|v| v.as_str().map(str::to_owned).ok_or_else(|| malformed("stop names must be strings")))
        .collect::<Result<_>>()?;

    let is_roundtrip = object_get(value, "is_roundtrip")?
        .as_bool()
        .ok_or_else(|| malformed("is_roundtrip must be a boolean"))?;

    // A route of zero or one stops has no direction to reverse or close,
    // so it is always Direct regardless of the flag.
    let route_type = if stops.len() <= 1 {
        RouteType::Direct
    } else if is_roundtrip {
        RouteType::Round
    } else {
        RouteType::BackAndForth
    };

    Ok(BaseBus { name, route_type, stops })
}

/// Parses the root document's `stat_requests` array, if present.
pub fn parse_stat_requests(root: &Value) -> Result<Vec<StatRequest>> {
    let Some(array) = root.get("stat_requests") else { return Ok(Vec::new()) };
    let items = array.as_array().ok_or_else(|| malformed("stat_requests must be an array"))?;
    items.iter().map(parse_stat_request).collect()
}

fn parse_stat_request(value: &Value) -> Result<StatRequest> {
    let id = object_get(value, "id")?.as_i64().ok_or_else(|| malformed("id must be an integer"))?;
    let kind = match as_str(value, "type")? {
        "Stop" => StatKind::Stop { name: as_str(value, "name")?.to_owned() },
        "Bus" => StatKind::Bus { name: as_str(value, "name")?.to_owned() },
        "Map" => StatKind::Map,
        "Route" => StatKind::Route { from: as_str(value, "from")?.to_owned(), to: as_str(value, "to")?.to_owned() },
        other => return Err(Error::UnknownRequestType(other.to_owned())),
    };
    Ok(StatRequest { id, kind })
}

/// Parses the root document's `routing_settings` object. Absent entirely,
/// this defaults to zero wait time and a velocity that would make every
/// ride instantaneous — callers generating a base from a document that
/// omits it are responsible for deciding whether that is acceptable.
pub fn parse_routing_settings(root: &Value) -> Result<RoutingSettings> {
    let Some(obj) = root.get("routing_settings") else {
        return Ok(RoutingSettings { bus_velocity: 1.0, bus_wait_time: 0.0 });
    };
    Ok(RoutingSettings { bus_wait_time: as_f64(obj, "bus_wait_time")?, bus_velocity: as_f64(obj, "bus_velocity")? })
}

/// Parses the root document's `serialization_settings` object.
pub fn parse_serialization_settings(root: &Value) -> Result<SerializationSettings> {
    let obj = object_get(root, "serialization_settings")?;
    Ok(SerializationSettings { file: PathBuf::from(as_str(obj, "file")?) })
}

/// Parses the root document's `render_settings` object.
pub fn parse_render_settings(root: &Value) -> Result<RenderSettings> {
    let obj = object_get(root, "render_settings")?;
    Ok(RenderSettings {
        width: as_f64(obj, "width")?,
        height: as_f64(obj, "height")?,
        padding: as_f64(obj, "padding")?,
        line_width: as_f64(obj, "line_width")?,
        stop_radius: as_f64(obj, "stop_radius")?,
        bus_label_font_size: as_f64(obj, "bus_label_font_size")?,
        bus_label_offset: parse_offset(object_get(obj, "bus_label_offset")?)?,
        stop_label_font_size: as_f64(obj, "stop_label_font_size")?,
        stop_label_offset: parse_offset(object_get(obj, "stop_label_offset")?)?,
        underlayer_color: parse_color(object_get(obj, "underlayer_color")?)?,
        underlayer_width: as_f64(obj, "underlayer_width")?,
        color_palette: object_get(obj, "color_palette")?
            .as_array()
            .ok_or_else(|| malformed("color_palette must be an array"))?
            .iter()
            .map(parse_color)
            .collect::<Result<_>>()?,
    })
}

fn parse_offset(value: &Value) -> Result<Offset> {
    let items = value.as_array().ok_or_else(|| malformed("offset must be a [dx, dy] array"))?;
    let [dx, dy] = items else { return Err(malformed("offset must have exactly two elements")) };
    Ok(Offset {
        dx: dx.as_f64().ok_or_else(|| malformed("offset dx must be a number"))?,
        dy: dy.as_f64().ok_or_else(|| malformed("offset dy must be a number"))?,
    })
}

fn parse_color(value: &Value) -> Result<Color> {
    if let Some(name) = value.as_str() {
        return Ok(Color::Named(name.to_owned()));
    }
    let items = value.as_array().ok_or_else(|| malformed("color must be a string or an array"))?;
    let channel = |v: &Value| -> Result<u8> {
        let n = v.as_f64().ok_or_else(|| malformed("color channel must be a number"))?;
        Ok(n as u8)
    };
    match items {
        [r, g, b] => Ok(Color::Rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha = a.as_f64().ok_or_else(|| malformed("color alpha must be a number"))?;
            Ok(Color::Rgba(channel(r)?, channel(g)?, channel(b)?, alpha))
        }
        _ => Err(malformed("color array must have 3 or 4 elements")),
    }
}
