//! Computes derived bus metrics (geo length, true length, unique stops,
//! stops-on-route) from a raw route and a catalog's distance table.

use crate::catalog::{Bus, Catalog, RouteType, RoutingSettings};

use std::collections::HashSet;

/// A bus description before its derived metrics are computed.
pub struct RawBus {
    pub name: String,
    pub route_type: RouteType,
    /// Stop names in declaration order. Names that do not resolve in the
    /// catalog are silently dropped rather than surfacing a parse error.
    pub stops: Vec<String>,
}

/// Resolves `raw` against `catalog` and computes every derived metric,
/// producing a [`Bus`] ready for [`Catalog::add_bus`].
#[must_use]
pub fn build(raw: &RawBus, catalog: &Catalog, settings: RoutingSettings) -> Bus {
    let resolved: Vec<u32> = raw
        .stops
        .iter()
        .filter_map(|name| catalog.stop_by_name(name))
        .map(|stop| stop.id)
        .collect();

    let stops_on_route = if matches!(raw.route_type, RouteType::BackAndForth) {
        resolved.len() as u32 * 2 - resolved.len().min(1) as u32
    } else {
        resolved.len() as u32
    };

    let unique_stops = resolved.iter().collect::<HashSet<_>>().len() as u32;

    let geo_forward = sum_geo_length(&resolved, catalog);
    let true_forward = sum_true_length(&resolved, catalog);

    let (route_geo_length, route_true_length) = if matches!(raw.route_type, RouteType::BackAndForth) {
        let true_backward = sum_true_length(resolved.iter().rev().copied().collect::<Vec<_>>().as_slice(), catalog);
        (geo_forward * 2.0, true_forward + true_backward)
    } else {
        (geo_forward, true_forward)
    };

    Bus {
        id: 0, // overwritten by Catalog::add_bus
        name: raw.name.clone(),
        route: resolved,
        route_type: raw.route_type,
        route_geo_length,
        route_true_length,
        stops_on_route,
        unique_stops,
        settings,
    }
}

fn sum_geo_length(stops: &[u32], catalog: &Catalog) -> f64 {
    stops
        .windows(2)
        .map(|pair| {
            let a = catalog.stop_by_id(pair[0]).expect("resolved stop id must exist");
            let b = catalog.stop_by_id(pair[1]).expect("resolved stop id must exist");
            a.coord.distance_to(b.coord)
        })
        .sum()
}

fn sum_true_length(stops: &[u32], catalog: &Catalog) -> f64 {
    stops.windows(2).map(|pair| catalog.distance(pair[0], pair[1])).sum()
}
