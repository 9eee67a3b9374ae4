/// How a bus traverses its declared stop sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    /// One-way: the declared sequence is traversed once.
    Direct,
    /// The declared sequence is traversed forward, then reversed (the
    /// last stop is touched only once).
    BackAndForth,
    /// The declared sequence closes on itself.
    Round,
}

/// Global routing parameters in effect when a bus was built.
///
/// These are copied onto every [`Bus`] from the catalog-wide
/// `routing_settings` at build time; the source of truth is the single
/// settings value the catalog was built with, not per-bus configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingSettings {
    /// Kilometers per hour.
    pub bus_velocity: f64,
    /// Minutes a passenger waits after boarding at a stop.
    pub bus_wait_time: f64,
}

/// A named ordered sequence of stops with a route type and derived
/// metrics, as produced by [`crate::bus_builder`].
#[derive(Debug, Clone)]
pub struct Bus {
    pub id: u32,
    pub name: String,
    /// Stop ids in declaration order, already resolved against the
    /// catalog (unknown names are dropped before this point).
    pub route: Vec<u32>,
    pub route_type: RouteType,
    pub route_geo_length: f64,
    pub route_true_length: f64,
    pub stops_on_route: u32,
    pub unique_stops: u32,
    pub settings: RoutingSettings,
}

impl Bus {
    /// `route_true_length / route_geo_length`. Callers must check
    /// `route_geo_length > 0` first — an empty or single-stop route has
    /// no meaningful curvature.
    #[must_use]
    pub fn curvature(&self) -> f64 {
        self.route_true_length / self.route_geo_length
    }
}
