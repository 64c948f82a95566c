//! Project Snapshots and Control Aggregation
//!
//! A project assembles components against one catalog version and impact
//! level. The persistence layer owns the project; this module receives a
//! [`ProjectSnapshot`] per call and computes views over it without keeping
//! any state of its own.
//!
//! # Usage
//!
//! ```ignore
//! use blueprint::project::{ComponentRole, ControlAggregator, ControlStatus, ProjectSnapshot};
//!
//! let mut project = ProjectSnapshot::new("42", "Payments", CatalogVersion::NistSp80053R5, ImpactLevel::Moderate);
//! project.attach(aws, ComponentRole::Inherited)?;
//! project.attach(this_system, ComponentRole::System)?;
//! project.track("ac-2", ControlStatus::Incomplete)?;
//!
//! let aggregator = ControlAggregator::new(&project, &catalog)?;
//! let view = aggregator.view("ac-2")?;
//! for narrative in &view.component_data.components.inherited {
//!     println!("{}: {}", narrative.title, narrative.description);
//! }
//! let aws_text = view.component_data.inherited("AWS").map(|n| &n.description);
//! ```

mod aggregate;
mod progress;

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{CatalogVersion, ImpactLevel};
use crate::error::{Error, Result};
use crate::oscal::{Component, Keyed, KeyedList, Property};

pub use aggregate::{
    CatalogNavigation, ComponentNarratives, ControlAggregator, ControlRef, ControlSummary, ControlView,
    InheritedNarrative, NarrativeBuckets, NarrativeOverride, PrivateNarrative, ProjectSummary,
    StatementNarrative,
};
pub use progress::{FamilyProgress, Progress};

/// How a component participates in a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentRole {
    /// Shared component whose narratives the project inherits read-only
    #[default]
    Inherited,
    /// The project's own system component; its narrative is editable
    System,
}

/// Implementation status the project tracks for a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    #[default]
    NotStarted,
    Incomplete,
    Complete,
}

impl ControlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Incomplete => "incomplete",
            Self::Complete => "complete",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Incomplete => "Incomplete",
            Self::Complete => "Complete",
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::NotStarted, Self::Incomplete, Self::Complete]
    }

    /// Parse a status, accepting dashes or spaces for underscores
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "not_started" => Some(Self::NotStarted),
            "incomplete" => Some(Self::Incomplete),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component attached to a project
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedComponent {
    pub component: Component,
    pub role: ComponentRole,
}

impl AttachedComponent {
    pub fn uuid(&self) -> Uuid {
        self.component.uuid
    }

    pub fn is_system(&self) -> bool {
        self.role == ComponentRole::System
    }
}

impl Keyed for AttachedComponent {
    type Key = Uuid;

    fn key(&self) -> &Uuid {
        &self.component.uuid
    }
}

/// A control the project tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedControl {
    pub control_id: String,
    #[serde(default)]
    pub status: ControlStatus,
}

impl Keyed for TrackedControl {
    type Key = String;

    fn key(&self) -> &String {
        &self.control_id
    }
}

/// Person or office with a stake in the system
///
/// The title may carry an abbreviation in parentheses, as in
/// "Information System Security Officer (ISSO)".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<Property>,
}

impl Stakeholder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            property: None,
        }
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.property = Some(property);
        self
    }
}

/// Everything the engines need to know about one project
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    pub id: String,
    pub title: String,
    pub acronym: String,
    pub catalog_version: CatalogVersion,
    pub impact_level: ImpactLevel,
    /// Attached components in attachment order
    pub components: KeyedList<AttachedComponent>,
    /// Tracked controls in tracking order
    pub controls: KeyedList<TrackedControl>,
    pub stakeholders: Vec<Stakeholder>,
    pub last_modified: DateTime<Utc>,
    narrative_flags: HashMap<(String, Uuid), bool>,
}

impl ProjectSnapshot {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        catalog_version: CatalogVersion,
        impact_level: ImpactLevel,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            acronym: String::new(),
            catalog_version,
            impact_level,
            components: KeyedList::new(),
            controls: KeyedList::new(),
            stakeholders: Vec::new(),
            last_modified: Utc::now(),
            narrative_flags: HashMap::new(),
        }
    }

    pub fn with_acronym(mut self, acronym: impl Into<String>) -> Self {
        self.acronym = acronym.into();
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = last_modified;
        self
    }

    fn owner(&self) -> String {
        format!("project {}", self.id)
    }

    /// Attach a component; each component may be attached once
    ///
    /// A project has at most one system component, so a second
    /// `ComponentRole::System` attachment is rejected.
    pub fn attach(&mut self, component: Component, role: ComponentRole) -> Result<&mut Self> {
        if role == ComponentRole::System {
            if let Some(existing) = self.system_component() {
                if existing.uuid() != component.uuid {
                    return Err(Error::SystemComponentConflict {
                        existing: existing.uuid(),
                        rejected: component.uuid,
                    });
                }
            }
        }
        let owner = self.owner();
        self.components
            .try_push(AttachedComponent { component, role }, owner)?;
        Ok(self)
    }

    /// Start tracking a control; each control may be tracked once
    pub fn track(&mut self, control_id: impl Into<String>, status: ControlStatus) -> Result<&mut Self> {
        let owner = self.owner();
        self.controls.try_push(
            TrackedControl {
                control_id: control_id.into(),
                status,
            },
            owner,
        )?;
        Ok(self)
    }

    pub fn add_stakeholder(&mut self, stakeholder: Stakeholder) -> &mut Self {
        self.stakeholders.push(stakeholder);
        self
    }

    /// Tracked status, `NotStarted` for untracked controls
    pub fn status(&self, control_id: &str) -> ControlStatus {
        self.controls
            .get(control_id)
            .map(|c| c.status)
            .unwrap_or_default()
    }

    pub fn is_tracked(&self, control_id: &str) -> bool {
        self.controls.contains_key(control_id)
    }

    /// The attached component with the system role
    pub fn system_component(&self) -> Option<&AttachedComponent> {
        self.components.iter().find(|c| c.is_system())
    }

    /// Attached components other than the system component, in attachment order
    pub fn inherited_components(&self) -> impl Iterator<Item = &AttachedComponent> {
        self.components.iter().filter(|c| !c.is_system())
    }

    pub fn attached(&self, uuid: &Uuid) -> Option<&AttachedComponent> {
        self.components.get(uuid)
    }

    /// Whether a component's narrative for a control is shown; defaults to enabled
    pub fn is_narrative_enabled(&self, control_id: &str, component: Uuid) -> bool {
        self.narrative_flags
            .get(&(control_id.to_string(), component))
            .copied()
            .unwrap_or(true)
    }

    /// Record persisted enable/disable overrides, later entries winning
    pub fn apply_overrides<'a>(&mut self, overrides: impl IntoIterator<Item = &'a NarrativeOverride>) {
        for o in overrides {
            self.narrative_flags
                .insert((o.control_id.clone(), o.component_uuid), o.enabled);
        }
    }
}
