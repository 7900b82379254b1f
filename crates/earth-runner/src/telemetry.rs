//! Tracing setup for the runner.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,earth_runner=debug,earth_coord=debug";

/// Install the global subscriber. `HEATED_EARTH_LOG_FORMAT=json` switches
/// to one JSON object per event.
pub fn init_telemetry() -> Result<()> {
    let json = std::env::var("HEATED_EARTH_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let (json_layer, text_layer) = if json {
        (Some(fmt::layer().json().with_target(true)), None)
    } else {
        (None, Some(fmt::layer().with_target(true)))
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    info!(json, "Telemetry initialized");
    Ok(())
}

/// Record a counter as a structured event
#[macro_export]
macro_rules! record_counter {
    ($name:expr, $value:expr) => {
        tracing::info!(counter_name = $name, counter_value = $value, "Counter metric");
    };
    ($name:expr, $value:expr, $($key:ident = $val:expr),+) => {
        tracing::info!(
            counter_name = $name,
            counter_value = $value,
            $($key = $val,)+
            "Counter metric"
        );
    };
}

/// Record a gauge as a structured event
#[macro_export]
macro_rules! record_gauge {
    ($name:expr, $value:expr) => {
        tracing::debug!(gauge_name = $name, gauge_value = $value, "Gauge metric");
    };
    ($name:expr, $value:expr, $($key:ident = $val:expr),+) => {
        tracing::debug!(
            gauge_name = $name,
            gauge_value = $value,
            $($key = $val,)+
            "Gauge metric"
        );
    };
}
