//! Serialization contract shared by every OSCAL model type
//!
//! Model types carry kebab-case wire names through serde attributes, reject
//! unknown fields, omit absent optional fields and emit present fields in
//! declaration order. This trait adds the JSON entry points and maps parser
//! failures onto [`Error::SchemaViolation`].

use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// JSON read/write for OSCAL documents and fragments
pub trait OscalElement: Serialize + DeserializeOwned {
    /// Parse from a JSON string
    fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::schema)
    }

    /// Parse from an already-decoded JSON value
    fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::schema)
    }

    /// Parse from a reader
    fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(Error::schema)
    }

    /// Load from a JSON file
    fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Compact JSON
    fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::schema)
    }

    /// Two-space indented JSON
    fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::schema)
    }

    /// JSON value tree
    fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(Error::schema)
    }
}

