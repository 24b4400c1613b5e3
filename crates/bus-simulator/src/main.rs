//! Campus Bus Tracker CLI
//!
//! Runs one dashboard screen headless: ticks the simulated fleet, reconciles
//! the map markers and prints the bus list on every snapshot.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bus_domain::{Variant, VehicleId};
use bus_map::list::list_heading;
use bus_map::{BusCard, LogSurface, MapStyle, MarkerLayer};
use bus_simulator::location::{DeniedSource, EnvSource};
use bus_simulator::{FleetSimulator, FleetStore, LocationProvider, TrackerConfig};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bus-tracker")]
#[command(about = "Simulate live campus bus tracking")]
struct Args {
    /// Screen to simulate: campus, occupancy or fleet
    #[arg(short, long)]
    variant: Option<Variant>,

    /// Tick interval in milliseconds (defaults to the screen cadence)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: Option<u64>,

    /// Stop after this many ticks (runs until Ctrl+C when omitted)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    ticks: Option<u64>,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Select a bus by id, as if its marker were clicked
    #[arg(long)]
    select: Option<String>,

    /// Print each snapshot as a JSON line on stdout
    #[arg(long)]
    json: bool,

    /// Log as JSON
    #[arg(long)]
    log_json: bool,

    /// Behave as if the viewer refused location access
    #[arg(long)]
    deny_location: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = TrackerConfig::from_env()?;
    if let Some(variant) = args.variant {
        config.variant = variant;
    }
    if let Some(ms) = args.tick_ms {
        config.tick_period = Some(Duration::from_millis(ms));
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    init_tracing(&config.log_level, args.log_json)?;

    let motion = config.motion();
    info!(
        variant = %config.variant,
        period_ms = motion.tick_period().as_millis() as u64,
        seed = ?config.seed,
        "Starting bus tracker v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut simulator = FleetSimulator::new(bus_domain::seed::fleet_for(config.variant)?, motion)?;
    if let Some(seed) = config.seed {
        simulator = simulator.with_seed(seed);
    }

    let mut store = FleetStore::new(simulator);
    let mut subscription = store.subscribe();

    let mut layer = MarkerLayer::mount(MapStyle::for_variant(config.variant), LogSurface);
    let initial = store.snapshot();
    layer.render(&initial);
    if let Some(id) = args.select.as_deref() {
        if layer.click(&VehicleId::from(id), &initial).is_none() {
            warn!(vehicle = id, "no such bus, selection cleared");
        }
    }
    print_snapshot(config.variant, &layer, &initial, args.json)?;

    let provider = if args.deny_location {
        LocationProvider::new(Arc::new(DeniedSource))
    } else {
        LocationProvider::new(Arc::new(EnvSource))
    }
    .with_fallback(config.fallback_location);
    let mut location = provider.request();
    let mut located = false;

    store.start(motion.tick_period());

    loop {
        tokio::select! {
            snapshot = subscription.next() => {
                let Some(snapshot) = snapshot else { break };
                layer.render(&snapshot);
                print_snapshot(config.variant, &layer, &snapshot, args.json)?;
                if args.ticks.is_some_and(|limit| snapshot.sequence >= limit) {
                    info!(ticks = snapshot.sequence, "tick limit reached");
                    break;
                }
            }
            position = &mut location, if !located => {
                located = true;
                match position {
                    Ok(position) => {
                        info!(%position, "viewer located");
                        layer.show_viewer(position);
                    }
                    Err(_) => warn!("location request dropped"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    store.stop();
    info!("Tracking stopped");
    Ok(())
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!(
            "bus_tracker={level},bus_simulator={level},bus_map={level}"
        ))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn print_snapshot(
    variant: Variant,
    layer: &MarkerLayer<LogSurface>,
    snapshot: &bus_domain::FleetSnapshot,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }

    println!("{} (tick {})", list_heading(variant, snapshot), snapshot.sequence);
    for card in BusCard::from_snapshot(snapshot, layer.selection().id()) {
        println!("{card}");
    }
    if let Some(selected) = layer.selection().selected(snapshot) {
        println!("  selected {} at {}", selected.label, selected.position);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_limits_must_be_positive() {
        assert!(Args::try_parse_from(["bus-tracker", "--ticks", "0"]).is_err());
        assert!(Args::try_parse_from(["bus-tracker", "--tick-ms", "0"]).is_err());

        let args = Args::try_parse_from(["bus-tracker", "--ticks", "3", "-v", "fleet"]).unwrap();
        assert_eq!(args.ticks, Some(3));
        assert_eq!(args.variant, Some(Variant::Fleet));
    }
}
