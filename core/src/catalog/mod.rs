//! Canonical storage of stops, buses, and inter-stop distances, with
//! stable integer ids used by both the renderer and the router.

mod bus;
mod stop;

pub use bus::{Bus, RouteType, RoutingSettings};
pub use stop::Stop;

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};

/// Owns every stop, bus, and inter-stop distance in the network.
///
/// The graph holds stable stop/bus ids into this catalog rather than
/// pointers; the router in turn borrows the graph. This makes the
/// catalog the single owner in the live object graph, which keeps
/// deserialization straightforward (ids are rebuilt against a catalog
/// that already exists by the time anything links into it).
#[derive(Debug, Default)]
pub struct Catalog {
    stops: Vec<Stop>,
    stop_ids: HashMap<String, u32>,
    buses: Vec<Option<Bus>>,
    bus_ids: HashMap<String, u32>,
    distances: HashMap<(u32, u32), f64>,
    /// Lexicographically ordered bus names serving each stop, indexed by
    /// stop id.
    stop_buses: Vec<BTreeSet<String>>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stop, assigning the next id in insertion order.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateStop`] if `name` is already present.
    pub fn add_stop(&mut self, name: impl Into<String>, coord: crate::geo::Coordinate) -> Result<u32> {
        let name = name.into();
        if self.stop_ids.contains_key(&name) {
            return Err(Error::DuplicateStop(name));
        }
        let id = self.stops.len() as u32;
        self.stop_ids.insert(name.clone(), id);
        self.stops.push(Stop { id, name, coord });
        self.stop_buses.push(BTreeSet::new());
        Ok(id)
    }

    /// Adds a stop under an explicit id, for use only during
    /// deserialization.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateStop`] or [`Error::DuplicateStopId`] on
    /// collision.
    pub fn add_stop_with_id(
        &mut self,
        id: u32,
        name: impl Into<String>,
        coord: crate::geo::Coordinate,
    ) -> Result<()> {
        let name = name.into();
        if self.stop_ids.contains_key(&name) {
            return Err(Error::DuplicateStop(name));
        }
        let idx = id as usize;
        if idx < self.stops.len() && self.stops[idx].id == id {
            return Err(Error::DuplicateStopId(id));
        }
        if idx >= self.stops.len() {
            self.stops.resize_with(idx + 1, || Stop {
                id: u32::MAX,
                name: String::new(),
                coord: crate::geo::Coordinate::new(0.0, 0.0),
            });
            self.stop_buses.resize_with(idx + 1, BTreeSet::new);
        }
        self.stop_ids.insert(name.clone(), id);
        self.stops[idx] = Stop { id, name, coord };
        Ok(())
    }

    /// Sets `(from, to) -> meters`. If `(to, from)` has no entry yet, it
    /// is back-filled with the same value — a one-shot default that a
    /// later explicit call for `(to, from)` overrides, without ever
    /// touching `(from, to)` again.
    pub fn add_distance(&mut self, from: u32, to: u32, meters: f64) {
        self.distances.insert((from, to), meters);
        self.distances.entry((to, from)).or_insert(meters);
    }

    /// Registers a bus, assigning the next id in insertion order, and
    /// updates the stop→buses reverse index for every stop on its route.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateBus`] if the name is already present.
    pub fn add_bus(&mut self, bus: Bus) -> Result<u32> {
        if self.bus_ids.contains_key(&bus.name) {
            return Err(Error::DuplicateBus(bus.name));
        }
        let id = self.buses.len() as u32;
        self.register_bus_reverse_index(&bus);
        self.bus_ids.insert(bus.name.clone(), id);
        self.buses.push(Some(Bus { id, ..bus }));
        Ok(id)
    }

    /// Registers a bus under an explicit id, for use only during
    /// deserialization.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateBus`] or [`Error::DuplicateBusId`] on
    /// collision.
    pub fn add_bus_with_id(&mut self, id: u32, bus: Bus) -> Result<()> {
        if self.bus_ids.contains_key(&bus.name) {
            return Err(Error::DuplicateBus(bus.name));
        }
        let idx = id as usize;
        if idx < self.buses.len() && self.buses[idx].is_some() {
            return Err(Error::DuplicateBusId(id));
        }
        if idx >= self.buses.len() {
            self.buses.resize_with(idx + 1, || None);
        }
        self.register_bus_reverse_index(&bus);
        self.bus_ids.insert(bus.name.clone(), id);
        self.buses[idx] = Some(Bus { id, ..bus });
        Ok(())
    }

    fn register_bus_reverse_index(&mut self, bus: &Bus) {
        let mut seen = BTreeSet::new();
        for &stop_id in &bus.route {
            if seen.insert(stop_id) {
                if let Some(set) = self.stop_buses.get_mut(stop_id as usize) {
                    set.insert(bus.name.clone());
                }
            }
        }
    }

    #[must_use]
    pub fn stop_by_name(&self, name: &str) -> Option<&Stop> {
        self.stop_ids.get(name).map(|&id| &self.stops[id as usize])
    }

    #[must_use]
    pub fn bus_by_name(&self, name: &str) -> Option<&Bus> {
        self.bus_ids.get(name).and_then(|&id| self.buses[id as usize].as_ref())
    }

    #[must_use]
    pub fn stop_by_id(&self, id: u32) -> Option<&Stop> {
        self.stops.get(id as usize)
    }

    #[must_use]
    pub fn bus_by_id(&self, id: u32) -> Option<&Bus> {
        self.buses.get(id as usize).and_then(Option::as_ref)
    }

    /// Lexicographically ordered bus names serving `name`. Returns an
    /// empty set, never an error, when the stop is unknown.
    #[must_use]
    pub fn buses_for_stop(&self, name: &str) -> BTreeSet<String> {
        self.stop_ids
            .get(name)
            .and_then(|&id| self.stop_buses.get(id as usize))
            .cloned()
            .unwrap_or_default()
    }

    /// Road distance from `from` to `to`, in meters.
    ///
    /// # Panics
    /// Panics if no entry exists. Callers must only request distances
    /// for pairs that are consecutive in some bus route — the catalog's
    /// invariants guarantee those pairs are always populated.
    #[must_use]
    pub fn distance(&self, from: u32, to: u32) -> f64 {
        self.distances[&(from, to)]
    }

    #[must_use]
    pub fn distance_checked(&self, from: u32, to: u32) -> Option<f64> {
        self.distances.get(&(from, to)).copied()
    }

    #[must_use]
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn buses(&self) -> impl Iterator<Item = &Bus> {
        self.buses.iter().filter_map(Option::as_ref)
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    #[must_use]
    pub fn bus_count(&self) -> usize {
        self.buses.iter().filter(|b| b.is_some()).count()
    }

    pub fn distances(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        self.distances.iter().map(|(&(from, to), &meters)| (from, to, meters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;

    fn coord() -> Coordinate {
        Coordinate::new(0.0, 0.0)
    }

    #[test]
    fn ids_are_assigned_in_insertion_order() {
        let mut cat = Catalog::new();
        let a = cat.add_stop("A", coord()).unwrap();
        let b = cat.add_stop("B", coord()).unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(cat.stop_by_id(a).unwrap().name, "A");
        assert_eq!(cat.stop_by_id(b).unwrap().name, "B");
    }

    #[test]
    fn duplicate_stop_name_fails() {
        let mut cat = Catalog::new();
        cat.add_stop("A", coord()).unwrap();
        assert!(matches!(cat.add_stop("A", coord()), Err(Error::DuplicateStop(_))));
    }

    #[test]
    fn distance_back_fill_is_one_shot() {
        let mut cat = Catalog::new();
        let a = cat.add_stop("A", coord()).unwrap();
        let b = cat.add_stop("B", coord()).unwrap();

        cat.add_distance(a, b, 100.0);
        assert_eq!(cat.distance(a, b), 100.0);
        assert_eq!(cat.distance(b, a), 100.0);

        cat.add_distance(b, a, 150.0);
        assert_eq!(cat.distance(a, b), 100.0);
        assert_eq!(cat.distance(b, a), 150.0);
    }

    #[test]
    fn buses_for_unknown_stop_is_empty_not_error() {
        let cat = Catalog::new();
        assert!(cat.buses_for_stop("nonexistent").is_empty());
    }
}
