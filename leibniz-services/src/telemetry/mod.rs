//! Tracing Subscriber Setup
//!
//! `TigerStyle`: Explicit configuration, never panics on a second install.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use leibniz_services::settings::ServiceSettings;
//! use leibniz_services::telemetry::{init_tracing, TelemetryConfig};
//!
//! // From service settings (log_level, debug)
//! let config = TelemetryConfig::from_settings(&ServiceSettings::default());
//! init_tracing(&config).expect("tracing init");
//!
//! // Or configure explicitly
//! let config = TelemetryConfig::builder()
//!     .service_name("leibniz-worker")
//!     .log_filter("leibniz_services=debug,info")
//!     .ansi(false)
//!     .build();
//! let _ = init_tracing(&config);
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG` - Overrides `log_filter` when set and valid

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::settings::ServiceSettings;

/// Default service name attached to the startup event
const SERVICE_NAME_DEFAULT: &str = "leibniz";

/// Default log filter directive
const LOG_FILTER_DEFAULT: &str = "info";

/// Telemetry configuration errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The filter directive does not parse
    #[error("invalid log filter {filter:?}: {reason}")]
    InvalidFilter {
        /// The rejected directive
        filter: String,
        /// Parser message
        reason: String,
    },

    /// Service name is empty
    #[error("service_name cannot be empty")]
    EmptyServiceName,

    /// A global subscriber is already installed
    #[error("tracing initialization failed: {reason}")]
    InitFailed {
        /// The reason for the failure
        reason: String,
    },
}

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Configuration for the global tracing subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name reported on startup
    pub service_name: String,
    /// `EnvFilter` directive (e.g. "info", "leibniz_services=trace")
    pub log_filter: String,
    /// Include the event target (module path) in output
    pub with_target: bool,
    /// Colourise output
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: SERVICE_NAME_DEFAULT.to_string(),
            log_filter: LOG_FILTER_DEFAULT.to_string(),
            with_target: true,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Create a new builder for `TelemetryConfig`
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::default()
    }

    /// Derive a config from service settings.
    ///
    /// `debug = true` forces the `debug` level regardless of `log_level`.
    #[must_use]
    pub fn from_settings(settings: &ServiceSettings) -> Self {
        let log_filter = if settings.debug {
            "debug".to_string()
        } else {
            settings.log_level.clone()
        };
        Self {
            log_filter,
            ..Self::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns `TelemetryError::EmptyServiceName` or
    /// `TelemetryError::InvalidFilter`.
    pub fn validate(&self) -> Result<()> {
        if self.service_name.is_empty() {
            return Err(TelemetryError::EmptyServiceName);
        }
        self.filter().map(|_| ())
    }

    fn filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.log_filter).map_err(|e| TelemetryError::InvalidFilter {
            filter: self.log_filter.clone(),
            reason: e.to_string(),
        })
    }
}

/// Builder for `TelemetryConfig`
#[derive(Debug, Default)]
pub struct TelemetryConfigBuilder {
    service_name: Option<String>,
    log_filter: Option<String>,
    with_target: Option<bool>,
    ansi: Option<bool>,
}

impl TelemetryConfigBuilder {
    /// Set the service name
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Set the filter directive
    #[must_use]
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Include or omit event targets
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = Some(with_target);
        self
    }

    /// Enable or disable ANSI colours
    #[must_use]
    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = Some(ansi);
        self
    }

    /// Build the `TelemetryConfig`
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        let default = TelemetryConfig::default();
        TelemetryConfig {
            service_name: self.service_name.unwrap_or(default.service_name),
            log_filter: self.log_filter.unwrap_or(default.log_filter),
            with_target: self.with_target.unwrap_or(default.with_target),
            ansi: self.ansi.unwrap_or(default.ansi),
        }
    }
}

/// Install a global `fmt` subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` for a bad directive and
/// `TelemetryError::InitFailed` if a global subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    // Preconditions
    config.validate()?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.filter()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|e| TelemetryError::InitFailed {
            reason: e.to_string(),
        })?;

    tracing::info!(
        service_name = %config.service_name,
        log_filter = %config.log_filter,
        "tracing initialized"
    );
    Ok(())
}
