//! Observability Configuration

use std::env;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-line
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
            Self::Compact => "compact",
        }
    }

    /// Parse a format name, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Log output format
    pub log_format: LogFormat,
    /// Filter directive (e.g., "info", "blueprint=debug")
    pub log_filter: String,
    /// Include source file and line in events
    pub with_location: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_filter: "info".to_string(),
            with_location: false,
        }
    }
}

impl ObservabilityConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BLUEPRINT_LOG_FORMAT`: "pretty", "json", or "compact" (default: "pretty")
    /// - `BLUEPRINT_LOG`: filter directive, falling back to `RUST_LOG` (default: "info")
    /// - `BLUEPRINT_LOG_LOCATION`: "true" or "1" to include file and line (default: off)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let log_format = lookup("BLUEPRINT_LOG_FORMAT")
            .and_then(|s| LogFormat::parse(&s))
            .unwrap_or(defaults.log_format);

        let log_filter = lookup("BLUEPRINT_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        let with_location = lookup("BLUEPRINT_LOG_LOCATION")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.with_location);

        Self {
            log_format,
            log_filter,
            with_location,
        }
    }

    /// Create a new configuration builder
    pub fn builder() -> ObservabilityConfigBuilder {
        ObservabilityConfigBuilder::default()
    }
}

/// Builder for ObservabilityConfig
#[derive(Default)]
pub struct ObservabilityConfigBuilder {
    config: ObservabilityConfig,
}

impl ObservabilityConfigBuilder {
    /// Set the log format
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.log_format = format;
        self
    }

    /// Set the log filter
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    pub fn with_location(mut self, enable: bool) -> Self {
        self.config.with_location = enable;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ObservabilityConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> ObservabilityConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ObservabilityConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.log_filter, "info");
        assert!(!config.with_location);
    }

    #[test]
    fn test_blueprint_log_wins_over_rust_log() {
        let config = from_vars(&[("BLUEPRINT_LOG", "blueprint=debug"), ("RUST_LOG", "warn")]);
        assert_eq!(config.log_filter, "blueprint=debug");

        let config = from_vars(&[("RUST_LOG", "warn")]);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_format_from_env() {
        let config = from_vars(&[("BLUEPRINT_LOG_FORMAT", "JSON"), ("BLUEPRINT_LOG_LOCATION", "1")]);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.with_location);

        let config = from_vars(&[("BLUEPRINT_LOG_FORMAT", "xml")]);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_builder() {
        let config = ObservabilityConfig::builder()
            .log_format(LogFormat::Compact)
            .log_filter("debug")
            .build();

        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(LogFormat::Compact.as_str(), "compact");
    }
}
