//! Named numeric constants shared across the catalog, graph builder, and
//! renderer, pulled out of their call sites.

/// Mean Earth radius in kilometers, used by the great-circle distance in
/// [`crate::geo`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Converts `meters / (kilometers per hour)` into minutes:
/// `(m / (km/h)) * (3.6 / 60.0)`.
pub const MINUTES_PER_KMH: f64 = 3.6 / 60.0;

/// Absolute tolerance used for coordinate and weight comparisons.
pub const EPSILON: f64 = 1e-6;
