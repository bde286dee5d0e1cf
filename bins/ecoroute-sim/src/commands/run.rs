//! Run command - drive the live map until the pickup completes

use crate::output;
use anyhow::{Context, Result};
use ecoroute_core::config::ConfigSchema;
use ecoroute_geo::Coordinate;
use ecoroute_session::{MemoryStore, Session};
use ecoroute_telemetry::metrics;
use ecoroute_tracker::{
    FlowEvent, FlowSettings, Fleet, MapFlow, MapSession, Roster, TrayState, VehicleCategory,
    TICKS_COUNTER, TICK_TIMER,
};
use owo_colors::OwoColorize;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

pub struct RunOptions {
    pub anchor: Coordinate,
    pub category: Option<VehicleCategory>,
    pub operator: Option<u32>,
    pub ticks: u32,
    pub auto_confirm: bool,
    pub seed: Option<u64>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    pickups: u64,
    points: u64,
    level: String,
    completed: bool,
    metrics: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Completed,
    OutOfTicks,
    Interrupted,
}

/// Run the simulation
pub async fn run(options: RunOptions, schema: &ConfigSchema) -> Result<()> {
    let seed = options
        .seed
        .or(schema.simulation.seed)
        .unwrap_or_else(rand::random);
    info!(seed, ticks = options.ticks, "Starting map run");

    let flow = MapFlow::new(Fleet::seeded(), FlowSettings::from(schema))
        .context("failed to build the map")?;

    let session = Arc::new(
        Session::new(MemoryStore::new(), None).with_default_points(schema.session.default_points),
    );
    session.hydrate();

    let tick_interval = schema.simulation.tick_interval();
    let handle = MapSession::spawn(
        flow,
        tick_interval,
        Arc::clone(&session),
        ChaCha8Rng::seed_from_u64(seed),
    );
    let mut events = handle.subscribe();

    if !options.json {
        output::header("🚛 EcoRoute Live Map");
        println!("  Anchor:  {}", options.anchor.cyan());
        println!("  Seed:    {seed}");
        println!("  Ticks:   {} every {:?}", options.ticks, tick_interval);
        println!();
    }

    handle.set_anchor(options.anchor)?;

    let requested = if let Some(operator_id) = options.operator {
        let request = Roster::default().request(operator_id)?;
        if !options.json {
            println!("{}", request.contacting_message().yellow());
        }
        tokio::time::sleep(Duration::from_millis(schema.dispatch.assignment_delay_ms)).await;
        if !options.json {
            println!("{}", request.assigned_message().green());
        }
        handle.start_tracking(request.category).await?;
        true
    } else if let Some(category) = options.category {
        handle.start_tracking(category).await?;
        true
    } else {
        false
    };

    let deadline = tokio::time::sleep(tick_interval * options.ticks);
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let stop = loop {
        tokio::select! {
            _ = &mut deadline => break Stop::OutOfTicks,
            _ = &mut ctrl_c => break Stop::Interrupted,
            received = events.recv() => match received {
                Ok(event) => {
                    output::event(&event, options.json)?;
                    match event {
                        FlowEvent::TrayStateChanged {
                            to: TrayState::VisiblePendingConfirmation,
                            ..
                        } if options.auto_confirm => {
                            debug!("Auto-confirming pickup");
                            handle.confirm()?;
                        }
                        FlowEvent::FlowReset if requested => break Stop::Completed,
                        _ => {}
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event output fell behind");
                }
                Err(RecvError::Closed) => break Stop::OutOfTicks,
            },
        }
    };

    handle.shutdown().await?;
    session.close().await;

    let data = session.data();
    let summary = RunSummary {
        seed,
        pickups: data.pickup_count,
        points: data.points,
        level: session.citizen_level().to_string(),
        completed: stop == Stop::Completed,
        metrics: metrics().export_json(),
    };

    if options.json {
        return output::json_line(&summary);
    }

    println!();
    match stop {
        Stop::Completed => println!("{}", "✓ Pickup completed".green().bold()),
        Stop::OutOfTicks => println!("{}", "Tick budget exhausted".yellow()),
        Stop::Interrupted => println!("{}", "Interrupted".yellow()),
    }
    println!("  Pickups: {}", summary.pickups);
    println!(
        "  Ticks:   {} (p95 {:.3} ms)",
        metrics().counter(TICKS_COUNTER),
        summary.metrics["histograms"][TICK_TIMER]["p95"]
            .as_f64()
            .unwrap_or_default()
    );
    println!(
        "  Level:   {} ({:.0}% to next)",
        summary.level.cyan(),
        session.level_progress() * 100.0
    );
    Ok(())
}
