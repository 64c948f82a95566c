//! SSP Generation Configuration
//!
//! Fixed texts and identifiers written into every generated System Security
//! Plan. Uses a global OnceLock for app-wide access, with a builder for
//! callers that want an explicit configuration instead.
//!
//! # Initialization
//!
//! ```ignore
//! use blueprint::config::{self, SspConfig};
//!
//! config::init(SspConfig::from_env());
//! ```
//!
//! # Global Access
//!
//! ```ignore
//! let ssp = blueprint::config::config();
//! println!("Writing OSCAL {}", ssp.oscal_version);
//! ```

use std::sync::OnceLock;

use crate::oscal::{SystemState, OSCAL_VERSION};

static SSP_CONFIG: OnceLock<SspConfig> = OnceLock::new();

/// Initialize global SSP configuration (call once at startup)
pub fn init(config: SspConfig) {
    if SSP_CONFIG.set(config.clone()).is_err() {
        tracing::warn!("SSP configuration already initialized");
        return;
    }
    tracing::info!(
        oscal_version = %config.oscal_version,
        document_version = %config.document_version,
        system_state = config.system_state.as_str(),
        "SSP configuration initialized"
    );
}

/// Get the global SSP configuration
///
/// If called before `init()`, initializes from environment variables.
pub fn config() -> &'static SspConfig {
    SSP_CONFIG.get_or_init(|| {
        tracing::debug!("SSP config accessed before init(), using defaults from environment");
        SspConfig::from_env()
    })
}

/// Texts and identifiers the SSP assembler writes into generated documents
///
/// # Example
///
/// ```ignore
/// use blueprint::config::SspConfig;
///
/// let config = SspConfig::builder()
///     .document_version("1.0")
///     .authorization_boundary("All services in the payments VPC")
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SspConfig {
    /// `metadata.oscal-version`
    pub oscal_version: String,

    /// `metadata.version` of the plan itself
    pub document_version: String,

    /// `control-implementation.description`
    pub system_description: String,

    /// `system-characteristics.authorization-boundary.description`
    pub authorization_boundary: String,

    /// `identifier-type` of the derived system id
    pub identifier_type: String,

    /// State written for the system and every component
    pub system_state: SystemState,

    /// Title of the system component
    pub this_system_title: String,

    /// Title of the back-matter resource; `None` omits back-matter
    pub back_matter_resource: Option<String>,
}

impl Default for SspConfig {
    fn default() -> Self {
        Self {
            oscal_version: OSCAL_VERSION.to_string(),
            document_version: "0.1".to_string(),
            system_description: "[INSERT SYSTEM DESCRIPTION HERE]".to_string(),
            authorization_boundary: "INSERT AUTHORIZATION BOUNDARY".to_string(),
            identifier_type: "https://ietf.org/rfc/rfc4122".to_string(),
            system_state: SystemState::Operational,
            this_system_title: "This System".to_string(),
            back_matter_resource: Some("Test Resource".to_string()),
        }
    }
}

impl SspConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BLUEPRINT_OSCAL_VERSION` (default: "1.0.2")
    /// - `BLUEPRINT_SSP_VERSION` (default: "0.1")
    /// - `BLUEPRINT_SYSTEM_DESCRIPTION` (default: "[INSERT SYSTEM DESCRIPTION HERE]")
    /// - `BLUEPRINT_AUTHORIZATION_BOUNDARY` (default: "INSERT AUTHORIZATION BOUNDARY")
    /// - `BLUEPRINT_SYSTEM_STATE`: "operational", "under-development", ... (default: "operational")
    /// - `BLUEPRINT_SSP_RESOURCE`: back-matter resource title, empty to omit (default: "Test Resource")
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |name: &str, default: String| lookup(name).filter(|v| !v.trim().is_empty()).unwrap_or(default);

        Self {
            oscal_version: text("BLUEPRINT_OSCAL_VERSION", defaults.oscal_version),
            document_version: text("BLUEPRINT_SSP_VERSION", defaults.document_version),
            system_description: text("BLUEPRINT_SYSTEM_DESCRIPTION", defaults.system_description),
            authorization_boundary: text("BLUEPRINT_AUTHORIZATION_BOUNDARY", defaults.authorization_boundary),
            identifier_type: defaults.identifier_type,
            system_state: lookup("BLUEPRINT_SYSTEM_STATE")
                .and_then(|s| SystemState::parse(&s))
                .unwrap_or(defaults.system_state),
            this_system_title: defaults.this_system_title,
            back_matter_resource: match lookup("BLUEPRINT_SSP_RESOURCE") {
                Some(v) if v.trim().is_empty() => None,
                Some(v) => Some(v),
                None => defaults.back_matter_resource,
            },
        }
    }

    /// Create a new builder for programmatic configuration.
    pub fn builder() -> SspConfigBuilder {
        SspConfigBuilder::default()
    }
}

/// Builder for SspConfig
#[derive(Debug, Clone, Default)]
pub struct SspConfigBuilder {
    config: SspConfig,
}

impl SspConfigBuilder {
    pub fn oscal_version(mut self, version: impl Into<String>) -> Self {
        self.config.oscal_version = version.into();
        self
    }

    pub fn document_version(mut self, version: impl Into<String>) -> Self {
        self.config.document_version = version.into();
        self
    }

    pub fn system_description(mut self, description: impl Into<String>) -> Self {
        self.config.system_description = description.into();
        self
    }

    pub fn authorization_boundary(mut self, description: impl Into<String>) -> Self {
        self.config.authorization_boundary = description.into();
        self
    }

    pub fn system_state(mut self, state: SystemState) -> Self {
        self.config.system_state = state;
        self
    }

    pub fn this_system_title(mut self, title: impl Into<String>) -> Self {
        self.config.this_system_title = title.into();
        self
    }

    pub fn back_matter_resource(mut self, title: impl Into<String>) -> Self {
        self.config.back_matter_resource = Some(title.into());
        self
    }

    /// Leave back-matter out of generated plans
    pub fn without_back_matter(mut self) -> Self {
        self.config.back_matter_resource = None;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SspConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> SspConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SspConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = SspConfig::default();
        assert_eq!(config.oscal_version, "1.0.2");
        assert_eq!(config.document_version, "0.1");
        assert_eq!(config.system_state, SystemState::Operational);
        assert_eq!(config.back_matter_resource.as_deref(), Some("Test Resource"));
    }

    #[test]
    fn test_from_env_overrides() {
        let config = from_vars(&[
            ("BLUEPRINT_SSP_VERSION", "2.3"),
            ("BLUEPRINT_SYSTEM_STATE", "under-development"),
            ("BLUEPRINT_SSP_RESOURCE", ""),
            ("BLUEPRINT_AUTHORIZATION_BOUNDARY", "   "),
        ]);
        assert_eq!(config.document_version, "2.3");
        assert_eq!(config.system_state, SystemState::UnderDevelopment);
        assert_eq!(config.back_matter_resource, None);
        assert_eq!(config.authorization_boundary, "INSERT AUTHORIZATION BOUNDARY");
    }

    #[test]
    fn test_unrecognized_state_falls_back() {
        let config = from_vars(&[("BLUEPRINT_SYSTEM_STATE", "retired")]);
        assert_eq!(config.system_state, SystemState::Operational);
    }

    #[test]
    fn test_builder() {
        let config = SspConfig::builder()
            .document_version("1.0")
            .this_system_title("Payments")
            .without_back_matter()
            .build();
        assert_eq!(config.document_version, "1.0");
        assert_eq!(config.this_system_title, "Payments");
        assert!(config.back_matter_resource.is_none());
        assert_eq!(config.oscal_version, OSCAL_VERSION);
    }
}
