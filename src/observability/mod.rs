//! Logging setup for binaries built on this crate
//!
//! Library code only emits `tracing` events (catalog loads, skipped
//! components, SSP assembly). Nothing is printed until a binary installs a
//! subscriber through [`init`].
//!
//! # Usage
//!
//! ```ignore
//! use blueprint::observability::{init, LogFormat, ObservabilityConfig};
//!
//! // From environment variables
//! init(ObservabilityConfig::from_env())?;
//!
//! // Or programmatically
//! let config = ObservabilityConfig::builder()
//!     .log_format(LogFormat::Compact)
//!     .log_filter("blueprint=debug")
//!     .build();
//! init(config)?;
//! ```

mod config;
mod providers;

pub use config::{LogFormat, ObservabilityConfig, ObservabilityConfigBuilder};

use thiserror::Error;
use tracing::info;

/// Install the tracing subscriber.
///
/// Call once at startup, before any logging occurs.
///
/// # Errors
///
/// Returns an error if the filter directive does not parse or a global
/// subscriber is already installed.
pub fn init(config: ObservabilityConfig) -> Result<(), ObservabilityError> {
    providers::init_tracing(&config)?;

    info!(
        log_format = config.log_format.as_str(),
        log_filter = %config.log_filter,
        "Observability initialized"
    );

    Ok(())
}

/// Observability initialization errors
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// Invalid configuration
    #[error("Observability config error: {0}")]
    Config(String),
    /// Subscriber installation failed
    #[error("Provider error: {0}")]
    Provider(String),
}
