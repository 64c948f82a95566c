//! Error taxonomy for the OSCAL model and project engines
//!
//! Lookup misses (`ControlNotFound`, `ImplementationNotFound`,
//! `RequirementNotFound`) are recoverable; the aggregation engine treats the
//! per-component variants as "not implemented here". Everything else is
//! returned to the caller untouched. Nothing in this crate logs an error or
//! retries.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{CatalogVersion, ImpactLevel};

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input or a field the schema does not allow
    #[error("Schema violation: {message}")]
    SchemaViolation {
        /// Offending field name, when the parser reported one
        field: Option<String>,
        message: String,
    },

    /// Control id is not part of the catalog
    #[error("Control not found: {0}")]
    ControlNotFound(String),

    /// Component has no control implementation for the catalog version
    #[error("Provided catalog version is not in control implementations: '{0}'")]
    ImplementationNotFound(CatalogVersion),

    /// Implementation exists but does not cover the control
    #[error("{control_id} is not implemented for {version}")]
    RequirementNotFound {
        control_id: String,
        version: CatalogVersion,
    },

    /// Uniqueness invariant violated by a mutation
    #[error("{key} already present in {owner}")]
    DuplicateKey { key: String, owner: String },

    /// Client referenced a component that is not attached to the project
    #[error("Component {0} is not attached to this project")]
    UnknownComponent(String),

    /// A project already has its one system component
    #[error("Project already has system component {existing}; cannot also attach {rejected} as system")]
    SystemComponentConflict { existing: Uuid, rejected: Uuid },

    /// No catalog registered for the version and impact level
    #[error("No catalog loaded for {version} ({impact_level})")]
    CatalogNotFound {
        version: CatalogVersion,
        impact_level: ImpactLevel,
    },

    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Build a schema violation from a serde_json error.
    ///
    /// serde reports unknown and missing fields as "unknown field `x`" and
    /// "missing field `x`"; the quoted name is lifted into `field`.
    pub fn schema(err: serde_json::Error) -> Self {
        let message = err.to_string();
        Self::SchemaViolation {
            field: offending_field(&message),
            message,
        }
    }

    /// Schema violation raised by model-level validation
    pub fn schema_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Whether this is a recoverable lookup miss
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            Self::ControlNotFound(_)
                | Self::ImplementationNotFound(_)
                | Self::RequirementNotFound { .. }
                | Self::CatalogNotFound { .. }
        )
    }

    /// Whether this error was caused by client input rather than an internal fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaViolation { .. }
                | Self::UnknownComponent(_)
                | Self::DuplicateKey { .. }
                | Self::SystemComponentConflict { .. }
        )
    }

    /// Miss that means "this component does not implement the control"
    pub(crate) fn is_component_miss(&self) -> bool {
        matches!(
            self,
            Self::ImplementationNotFound(_) | Self::RequirementNotFound { .. }
        )
    }
}

fn offending_field(message: &str) -> Option<String> {
    ["unknown field `", "missing field `", "duplicate field `"]
        .iter()
        .find_map(|marker| {
            let start = message.find(marker)? + marker.len();
            let end = message[start..].find('`')?;
            Some(message[start..start + end].to_string())
        })
}
