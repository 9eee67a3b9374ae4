//! Ties the catalog, routing graph, and router table together into the
//! single long-lived object the CLI drives: built fresh during
//! `make_base`, or restored from the binary artifact during
//! `process_requests`.

use petgraph::graph::NodeIndex;

use crate::catalog::{Catalog, RoutingSettings};
use crate::codec::{self, DecodeOutput, EncodeInput};
use crate::error::Result;
use crate::graph::{self, Graph};
use crate::render::{self};
use crate::router::{self, RouteQuery, Router, Table};
use crate::settings::RenderSettings;

/// The live routing core plus everything the renderer needs: a catalog,
/// its derived graph, and the graph's precomputed shortest-path table.
pub struct Session {
    catalog: Catalog,
    graph: Graph,
    table: Table,
    render_settings: RenderSettings,
    routing_settings: RoutingSettings,
}

impl Session {
    /// Builds a session from a freshly ingested catalog: constructs the
    /// routing graph and runs Floyd-Warshall once.
    #[must_use]
    pub fn build(catalog: Catalog, render_settings: RenderSettings, routing_settings: RoutingSettings) -> Self {
        let graph = graph::build(&catalog, &routing_settings);
        let table = router::compute_table(&graph);
        log::info!(
            "built session: {} stops, {} buses, {} graph vertices, {} graph edges",
            catalog.stop_count(),
            catalog.bus_count(),
            graph.vertex_count(),
            graph.edge_count()
        );
        Self { catalog, graph, table, render_settings, routing_settings }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[must_use]
    pub fn render_settings(&self) -> &RenderSettings {
        &self.render_settings
    }

    #[must_use]
    pub fn routing_settings(&self) -> &RoutingSettings {
        &self.routing_settings
    }

    /// Issues a `build_route` query between two graph vertices (always
    /// `transfer_id`s at the boundary — see the graph builder docs).
    #[must_use]
    pub fn build_route(&self, source: NodeIndex, target: NodeIndex) -> Option<RouteQuery> {
        Router::new(&self.graph, &self.table).build_route(source, target)
    }

    /// Renders the network to a complete SVG document.
    #[must_use]
    pub fn render_map(&self) -> String {
        render::render(&self.catalog, &self.render_settings)
    }

    /// Serializes the whole session state to a binary artifact.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let bytes = codec::encode(&EncodeInput {
            catalog: &self.catalog,
            graph: &self.graph,
            table: &self.table,
            render_settings: &self.render_settings,
            routing_settings: &self.routing_settings,
        });
        log::debug!("encoded session to {} bytes", bytes.len());
        bytes
    }

    /// Restores a session from a binary artifact produced by [`Session::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let DecodeOutput { catalog, graph, table, render_settings, routing_settings } = codec::decode(bytes)?;
        log::info!(
            "restored session: {} stops, {} buses, {} graph vertices",
            catalog.stop_count(),
            catalog.bus_count(),
            graph.vertex_count()
        );
        Ok(Self { catalog, graph, table, render_settings, routing_settings })
    }
}
