//! Error types for the Blueprint CLI

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Project file not found
    #[error("Project file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Project file read error
    #[error("Failed to read project file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Project file parse error
    #[error("Failed to parse project file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Invalid project file value
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// A component file could not be used
    #[error("Failed to load component file {path}: {source}")]
    ComponentFile {
        path: PathBuf,
        #[source]
        source: blueprint::Error,
    },

    /// Component definition failed the strict check
    #[error("Component definition check failed with {count} errors")]
    CheckFailed { count: usize },

    /// Output directory creation failed
    #[error("Failed to create output directory {path}: {source}")]
    OutputDirCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the OSCAL core
    #[error(transparent)]
    Core(#[from] blueprint::Error),

    /// Logging setup failed
    #[error(transparent)]
    Observability(#[from] blueprint::observability::ObservabilityError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Create an invalid value error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error
    ///
    /// 2 for problems in the user's input files, 3 for lookups that found
    /// nothing, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::InvalidValue { .. }
            | Self::ComponentFile { .. }
            | Self::CheckFailed { .. } => 2,
            Self::Core(e) if e.is_client_error() => 2,
            Self::Core(e) if e.is_lookup_miss() => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::invalid("project.title", "empty").exit_code(), 2);
        assert_eq!(
            CliError::Core(blueprint::Error::ControlNotFound("ac-99".into())).exit_code(),
            3
        );
        assert_eq!(
            CliError::Core(blueprint::Error::UnknownComponent("x".into())).exit_code(),
            2
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            CliError::FileWrite {
                path: "out.json".into(),
                source: io
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err = CliError::from(blueprint::Error::ControlNotFound("ac-99".into()));
        assert_eq!(err.to_string(), "Control not found: ac-99");
    }
}
