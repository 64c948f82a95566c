//! OSCAL System Security Plan Model v1.0
//!
//! The subset of the SSP schema the product emits: system characteristics,
//! system implementation (users and components) and one control
//! implementation whose requirements carry per-component narratives.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{
    BackMatter, Link, MarkupLine, MarkupMultiLine, Metadata, Property, ResponsibleParty, ResponsibleRole,
    SetParameter,
};
use super::component::{ComponentType, Protocol, Statement};
use super::element::OscalElement;
use super::keyed::{Keyed, KeyedList};
use crate::error::Result;

/// Root wrapper: `{"system-security-plan": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SspModel {
    pub system_security_plan: SystemSecurityPlan,
}

impl OscalElement for SspModel {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemSecurityPlan {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub metadata: Metadata,
    pub import_profile: ImportProfile,
    pub system_characteristics: SystemCharacteristics,
    pub system_implementation: SystemImplementation,
    pub control_implementation: SspControlImplementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_matter: Option<BackMatter>,
}

impl OscalElement for SystemSecurityPlan {}

/// Baseline profile the plan is written against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ImportProfile {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_type: Option<String>,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemCharacteristics {
    pub system_ids: Vec<SystemId>,
    pub system_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_name_short: Option<String>,
    pub description: MarkupMultiLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_authorized: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_sensitivity_level: Option<String>,
    pub system_information: SystemInformation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_impact_level: Option<SecurityImpactLevel>,
    pub status: SystemStatus,
    pub authorization_boundary: Diagram,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_architecture: Option<Diagram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_flow: Option<Diagram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_parties: Option<Vec<ResponsibleParty>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemInformation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    pub information_types: Vec<InformationType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InformationType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    pub title: MarkupLine,
    pub description: MarkupMultiLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    pub confidentiality_impact: Impact,
    pub integrity_impact: Impact,
    pub availability_impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Impact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment_justification: Option<MarkupMultiLine>,
}

impl Impact {
    pub fn base(base: impl Into<String>) -> Self {
        Self {
            props: None,
            links: None,
            base: base.into(),
            selected: None,
            adjustment_justification: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SecurityImpactLevel {
    pub security_objective_confidentiality: String,
    pub security_objective_integrity: String,
    pub security_objective_availability: String,
}

impl SecurityImpactLevel {
    /// Same token for all three objectives
    pub fn uniform(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            security_objective_confidentiality: token.clone(),
            security_objective_integrity: token.clone(),
            security_objective_availability: token,
        }
    }
}

/// Lifecycle state of a system or component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemState {
    #[default]
    Operational,
    UnderDevelopment,
    UnderMajorModification,
    Disposition,
    Other,
}

impl SystemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::UnderDevelopment => "under-development",
            Self::UnderMajorModification => "under-major-modification",
            Self::Disposition => "disposition",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "operational" => Some(Self::Operational),
            "under-development" => Some(Self::UnderDevelopment),
            "under-major-modification" => Some(Self::UnderMajorModification),
            "disposition" => Some(Self::Disposition),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemStatus {
    pub state: SystemState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl SystemStatus {
    pub fn new(state: SystemState) -> Self {
        Self { state, remarks: None }
    }
}

/// Authorization boundary, network architecture or data flow description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Diagram {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<MarkupMultiLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl Diagram {
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            props: None,
            links: None,
            remarks: None,
        }
    }
}

/// Type of user of the system and the roles they hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct User {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MarkupLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<MarkupMultiLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

/// Component as deployed within the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemComponent {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub title: MarkupLine,
    pub description: MarkupMultiLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<MarkupLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    pub status: SystemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_roles: Option<Vec<ResponsibleRole>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<Protocol>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl Keyed for SystemComponent {
    type Key = Uuid;

    fn key(&self) -> &Uuid {
        &self.uuid
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemImplementation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default, skip_serializing_if = "KeyedList::is_empty")]
    pub components: KeyedList<SystemComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl SystemImplementation {
    /// Add a component; its uuid must be new to the system
    pub fn add_component(&mut self, component: SystemComponent) -> Result<&mut SystemComponent> {
        self.components.try_push(component, "system implementation")
    }
}

/// Narrative contributed by one component to an implemented requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ByComponent {
    pub component_uuid: Uuid,
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub description: MarkupMultiLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_parameters: Vec<SetParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responsible_roles: Vec<ResponsibleRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl ByComponent {
    pub fn new(component_uuid: Uuid, uuid: Uuid, description: impl Into<String>) -> Self {
        Self {
            component_uuid,
            uuid,
            description: description.into(),
            props: None,
            links: None,
            set_parameters: Vec::new(),
            responsible_roles: Vec::new(),
            remarks: None,
        }
    }
}

impl Keyed for ByComponent {
    type Key = Uuid;

    fn key(&self) -> &Uuid {
        &self.component_uuid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SspImplementedRequirement {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub control_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_parameters: Vec<SetParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responsible_roles: Vec<ResponsibleRole>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<Statement>,
    #[serde(default, skip_serializing_if = "KeyedList::is_empty")]
    pub by_components: KeyedList<ByComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl SspImplementedRequirement {
    pub fn new(control_id: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            uuid,
            control_id: control_id.into(),
            props: None,
            links: None,
            set_parameters: Vec::new(),
            responsible_roles: Vec::new(),
            statements: Vec::new(),
            by_components: KeyedList::new(),
            remarks: None,
        }
    }

    /// Attach a component narrative; one entry per component
    pub fn add_by_component(&mut self, by_component: ByComponent) -> Result<&mut Self> {
        let owner = format!("implemented requirement for {}", self.control_id);
        self.by_components.try_push(by_component, owner)?;
        Ok(self)
    }
}

impl Keyed for SspImplementedRequirement {
    type Key = String;

    fn key(&self) -> &String {
        &self.control_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SspControlImplementation {
    pub description: MarkupMultiLine,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_parameters: Vec<SetParameter>,
    #[serde(default)]
    pub implemented_requirements: KeyedList<SspImplementedRequirement>,
}

impl SspControlImplementation {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            set_parameters: Vec::new(),
            implemented_requirements: KeyedList::new(),
        }
    }

    /// Add a requirement; one per control
    pub fn add_implemented_requirement(
        &mut self,
        requirement: SspImplementedRequirement,
    ) -> Result<&mut SspImplementedRequirement> {
        self.implemented_requirements
            .try_push(requirement, "SSP control implementation")
    }

    pub fn requirement(&self, control_id: &str) -> Option<&SspImplementedRequirement> {
        self.implemented_requirements.get(control_id)
    }
}
