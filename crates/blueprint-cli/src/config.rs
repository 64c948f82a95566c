//! Project file parsing for blueprint.toml
//!
//! A project file names the catalog, the component-definition files to
//! attach and the project's tracked state. Relative paths resolve against
//! the directory holding the project file.
//!
//! ```toml
//! [project]
//! id = "1"
//! title = "Payments Platform"
//! acronym = "PAY"
//! catalog_version = "NIST_SP80053R5"
//! impact_level = "moderate"
//!
//! [catalog]
//! path = "catalogs/NIST_SP-800-53_rev5_MODERATE-baseline-resolved-profile_catalog.json"
//!
//! [[components]]
//! path = "components/cool_component.json"
//!
//! [[components]]
//! path = "components/payments.json"
//! role = "system"
//!
//! [[controls]]
//! control_id = "ac-2"
//! status = "incomplete"
//!
//! [[stakeholders]]
//! title = "System Owner (SO)"
//!
//! [[narratives]]
//! control_id = "ac-2"
//! component_uuid = "e35accd9-0cc3-4a02-8557-01764c7cbe0b"
//! enabled = false
//!
//! [ssp]
//! document_version = "1.0"
//! ```

use std::path::{Path, PathBuf};

use blueprint::catalog::{Catalog, CatalogLoader, CatalogVersion, ImpactLevel};
use blueprint::oscal::{ComponentModel, OscalElement, SystemState};
use blueprint::project::{ComponentRole, NarrativeOverride, ProjectSnapshot, Stakeholder, TrackedControl};
use blueprint::SspConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CliError, Result};

/// Root structure of blueprint.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    /// Project identity and baseline
    pub project: ProjectSection,

    /// Catalog document for the project's baseline
    pub catalog: CatalogSection,

    /// Component-definition files to attach, in attachment order
    #[serde(default)]
    pub components: Vec<ComponentEntry>,

    /// Tracked controls, in tracking order
    #[serde(default)]
    pub controls: Vec<TrackedControl>,

    #[serde(default)]
    pub stakeholders: Vec<Stakeholder>,

    /// Persisted narrative enable/disable flags
    #[serde(default)]
    pub narratives: Vec<NarrativeOverride>,

    /// Overrides for the generated SSP
    #[serde(default)]
    pub ssp: SspSection,

    /// Location the file was read from
    #[serde(skip)]
    path: PathBuf,
}

impl ProjectFile {
    /// Load a project file from a path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CliError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CliError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_str(&content, path)
    }

    /// Parse a project file from a string
    pub fn from_str(content: &str, path: &Path) -> Result<Self> {
        let mut file: Self = toml::from_str(content).map_err(|e| CliError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.path = path.to_path_buf();
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<()> {
        if self.project.title.trim().is_empty() {
            return Err(CliError::invalid("project.title", "must not be empty"));
        }
        if let Some(state) = &self.ssp.system_state {
            if SystemState::parse(state).is_none() {
                return Err(CliError::invalid("ssp.system_state", format!("unknown state '{state}'")));
            }
        }
        let systems = self
            .components
            .iter()
            .filter(|c| c.role == ComponentRole::System)
            .count();
        if systems > 1 {
            return Err(CliError::invalid(
                "components.role",
                format!("{systems} components have the system role; at most one is allowed"),
            ));
        }
        Ok(())
    }

    /// Resolve a path from the project file against its directory
    pub fn resolve(&self, relative: &str) -> PathBuf {
        let relative = Path::new(relative);
        if relative.is_absolute() {
            return relative.to_path_buf();
        }
        self.path
            .parent()
            .map(|dir| dir.join(relative))
            .unwrap_or_else(|| relative.to_path_buf())
    }

    /// Load and index the project's catalog
    pub fn load_catalog(&self) -> Result<Catalog> {
        let mut loader = CatalogLoader::new(self.project.catalog_version, self.project.impact_level);
        if let Some(source) = &self.catalog.source {
            loader = loader.with_source(source.clone());
        }
        Ok(loader.from_file(self.resolve(&self.catalog.path))?)
    }

    /// Build the project snapshot, reading every component file
    pub fn load_snapshot(&self) -> Result<ProjectSnapshot> {
        let project = &self.project;
        let mut snapshot = ProjectSnapshot::new(
            project.id.clone(),
            project.title.clone(),
            project.catalog_version,
            project.impact_level,
        )
        .with_acronym(project.acronym.clone().unwrap_or_default());
        if let Some(last_modified) = project.last_modified {
            snapshot = snapshot.with_last_modified(last_modified);
        }

        for entry in &self.components {
            let path = self.resolve(&entry.path);
            let model = ComponentModel::from_file(&path).map_err(|source| CliError::ComponentFile {
                path: path.clone(),
                source,
            })?;

            let mut components = model.into_components();
            if let Some(uuid) = entry.uuid {
                components.retain(|c| c.uuid == uuid);
                if components.is_empty() {
                    return Err(CliError::invalid(
                        "components.uuid",
                        format!("{} has no component {uuid}", path.display()),
                    ));
                }
            }
            for component in components {
                tracing::debug!(component = %component.uuid, role = ?entry.role, "Attaching component");
                snapshot.attach(component, entry.role)?;
            }
        }

        for control in &self.controls {
            snapshot.track(control.control_id.clone(), control.status)?;
        }
        for stakeholder in &self.stakeholders {
            snapshot.add_stakeholder(stakeholder.clone());
        }
        snapshot.apply_overrides(&self.narratives);

        Ok(snapshot)
    }

    /// Apply the `[ssp]` overrides on top of a base configuration
    pub fn ssp_config(&self, base: &SspConfig) -> SspConfig {
        let ssp = &self.ssp;
        let mut builder = SspConfig::builder()
            .oscal_version(base.oscal_version.clone())
            .document_version(ssp.document_version.clone().unwrap_or_else(|| base.document_version.clone()))
            .system_description(
                ssp.system_description
                    .clone()
                    .unwrap_or_else(|| base.system_description.clone()),
            )
            .authorization_boundary(
                ssp.authorization_boundary
                    .clone()
                    .unwrap_or_else(|| base.authorization_boundary.clone()),
            )
            .system_state(
                ssp.system_state
                    .as_deref()
                    .and_then(SystemState::parse)
                    .unwrap_or(base.system_state),
            )
            .this_system_title(ssp.this_system_title.clone().unwrap_or_else(|| base.this_system_title.clone()));

        builder = match ssp.back_matter_resource.as_deref().or(base.back_matter_resource.as_deref()) {
            Some(title) if !title.trim().is_empty() => builder.back_matter_resource(title),
            _ => builder.without_back_matter(),
        };
        builder.build()
    }
}

/// `[project]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    #[serde(default = "default_project_id")]
    pub id: String,

    pub title: String,

    /// Short system name; the SSP falls back to the title
    #[serde(default)]
    pub acronym: Option<String>,

    /// "NIST_SP80053R4" or "NIST_SP80053R5"
    pub catalog_version: CatalogVersion,

    /// "low", "moderate" or "high"
    pub impact_level: ImpactLevel,

    /// RFC 3339 timestamp; defaults to now
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

fn default_project_id() -> String {
    "1".to_string()
}

/// `[catalog]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSection {
    /// Resolved-profile catalog JSON
    pub path: String,

    /// Source URI recorded on the catalog; defaults to the published baseline
    #[serde(default)]
    pub source: Option<String>,
}

/// One `[[components]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentEntry {
    /// Component-definition JSON
    pub path: String,

    /// Attach only this component from the definition
    #[serde(default)]
    pub uuid: Option<Uuid>,

    /// "inherited" (default) or "system"
    #[serde(default)]
    pub role: ComponentRole,
}

/// `[ssp]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SspSection {
    #[serde(default)]
    pub document_version: Option<String>,

    #[serde(default)]
    pub system_description: Option<String>,

    #[serde(default)]
    pub authorization_boundary: Option<String>,

    /// "operational", "under-development", ...
    #[serde(default)]
    pub system_state: Option<String>,

    #[serde(default)]
    pub this_system_title: Option<String>,

    /// Back-matter resource title; empty to omit back-matter
    #[serde(default)]
    pub back_matter_resource: Option<String>,
}
