//! Runs the heated-earth simulation under the configured topology.

mod presenter;
mod telemetry;

use anyhow::Result;
use earth_coord::Coordinator;
use earth_core::Settings;
use earth_sim::Stepper;
use presenter::LoggingPresenter;
use tokio::signal;
use tracing::{error, info};

/// Path to a JSON settings file; defaults are used when unset
const CONFIG_ENV: &str = "HEATED_EARTH_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let settings = match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            info!("Loading settings from {}", path);
            Settings::load(&path)?
        }
        Err(_) => Settings::default(),
    };

    // Reject bad settings before any role starts
    let config = match settings.validate() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid settings: {}", e);
            return Err(e.into());
        }
    };

    info!(
        initiative = ?config.initiative,
        simulation_threaded = config.threading.simulation,
        presentation_threaded = config.threading.presentation,
        buffer_capacity = config.buffer_capacity,
        grid_spacing = config.grid_spacing,
        timestep_minutes = config.timestep_minutes,
        step_limit = ?config.step_limit,
        "Starting heated-earth simulation"
    );

    let stepper = Stepper::from_config(&config)?;
    let presenter = LoggingPresenter::new(config.refresh_rate);
    let mut coordinator = Coordinator::new(config, stepper, presenter)?;
    let controls = coordinator.controls();

    // The roles block, so the run gets a thread of its own
    let mut run = tokio::task::spawn_blocking(move || coordinator.run());

    let summary = tokio::select! {
        result = &mut run => result??,
        _ = shutdown_signal() => {
            info!("Cancelling run");
            controls.cancel_all();
            run.await??
        }
    };

    record_counter!(
        "states_presented",
        summary.states_presented,
        run_id = summary.run_id.to_string().as_str()
    );
    info!(
        run_id = %summary.run_id,
        steps_produced = summary.steps_produced,
        states_presented = summary.states_presented,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Simulation finished"
    );

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
