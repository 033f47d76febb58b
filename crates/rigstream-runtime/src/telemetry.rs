//! Tracing subscriber setup for hosts that do not install their own

use tracing_subscriber::EnvFilter;

use rigstream_core::{RigError, RigResult};

/// Log output configuration
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
    /// Include the module target in each line
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            level: "info".into(),
            json: false,
            with_target: true,
        }
    }
}

impl TelemetryConfig {
    /// Verbose text output including per-frame trace events
    pub fn verbose() -> Self {
        TelemetryConfig {
            level: "rigstream=trace,info".into(),
            ..Default::default()
        }
    }

    /// Structured output for log collectors
    pub fn json() -> Self {
        TelemetryConfig {
            json: true,
            ..Default::default()
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a global
/// subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> RigResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| RigError::ConfigurationError(format!("log filter: {}", e)))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| RigError::ConfigurationError(format!("tracing subscriber: {}", e)))
}
