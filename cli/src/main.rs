use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use transit_catalog_core::catalog::{Catalog, RoutingSettings};
use transit_catalog_core::json::{self, Value};
use transit_catalog_core::request::{self, BaseRequest};
use transit_catalog_core::reply;
use transit_catalog_core::session::Session;
use transit_catalog_core::{bus_builder, Result};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("make_base") => run_make_base().map_err(log_and_return)?,
        Some("process_requests") => run_process_requests().map_err(log_and_return)?,
        _ => return Err("usage: transit_catalog <make_base|process_requests>".into()),
    }

    Ok(())
}

fn log_and_return(err: transit_catalog_core::Error) -> transit_catalog_core::Error {
    log::error!("{err}");
    err
}

fn read_stdin_document() -> Result<Value> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    json::parse(&input)
}

fn run_make_base() -> Result<()> {
    let root = read_stdin_document()?;

    let render_settings = request::parse_render_settings(&root)?;
    let routing_settings = request::parse_routing_settings(&root)?;
    let serialization_settings = request::parse_serialization_settings(&root)?;
    let base_requests = request::parse_base_requests(&root)?;

    let catalog = build_catalog(&base_requests, routing_settings)?;
    let session = Session::build(catalog, render_settings, routing_settings);

    let bytes = session.to_bytes();
    {
        let file = File::create(&serialization_settings.file)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;
    }
    log::info!("wrote {} bytes to {}", bytes.len(), serialization_settings.file.display());
    Ok(())
}

fn run_process_requests() -> Result<()> {
    let root = read_stdin_document()?;

    let serialization_settings = request::parse_serialization_settings(&root)?;
    let stat_requests = request::parse_stat_requests(&root)?;

    let bytes = {
        let file = File::open(&serialization_settings.file)?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        bytes
    };
    let session = Session::from_bytes(&bytes)?;

    let replies = reply::build_replies(&session, &stat_requests);
    let text = json::write(&replies);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(text.as_bytes())?;
    handle.write_all(b"\n")?;
    Ok(())
}

/// Builds a catalog from parsed base requests in three passes: stops
/// first (so every name resolves), then road distances, then buses
/// (which need both stops and distances to compute derived metrics).
fn build_catalog(base_requests: &[BaseRequest], routing_settings: RoutingSettings) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    for request in base_requests {
        if let BaseRequest::Stop(stop) = request {
            catalog.add_stop(stop.name.clone(), stop.coord)?;
        }
    }

    for request in base_requests {
        if let BaseRequest::Stop(stop) = request {
            let Some(from) = catalog.stop_by_name(&stop.name) else { continue };
            let from_id = from.id;
            for (other_name, meters) in &stop.road_distances {
                if let Some(to) = catalog.stop_by_name(other_name) {
                    catalog.add_distance(from_id, to.id, *meters);
                }
            }
        }
    }

    for request in base_requests {
        if let BaseRequest::Bus(bus) = request {
            let raw = bus_builder::RawBus { name: bus.name.clone(), route_type: bus.route_type, stops: bus.stops.clone() };
            let built = bus_builder::build(&raw, &catalog, routing_settings);
            catalog.add_bus(built)?;
        }
    }

    log::info!("ingested {} stops, {} buses", catalog.stop_count(), catalog.bus_count());
    Ok(catalog)
}
