//! OSCAL Component Definition Model v1.0
//!
//! A component definition describes how a product, service or policy
//! implements controls. Each component carries one control implementation per
//! catalog version it supports; the version is stored in the implementation's
//! `description`, which is how the rest of the product joins components to
//! catalogs.
//!
//! # Usage
//!
//! ```ignore
//! use blueprint::catalog::CatalogVersion;
//! use blueprint::oscal::{ComponentModel, OscalElement};
//!
//! let model = ComponentModel::from_file("components/aws.json")?;
//! for component in model.component_definition.components.iter() {
//!     let requirement = component.get_control("ac-2", CatalogVersion::NistSp80053R5)?;
//!     println!("{}: {}", component.title, requirement.description);
//! }
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{
    find_property, BackMatter, Link, MarkupLine, MarkupMultiLine, Metadata, Property, PropertyKey,
    ResponsibleRole, SetParameter,
};
use super::element::OscalElement;
use super::keyed::{Keyed, KeyedList};
use crate::catalog::CatalogVersion;
use crate::error::{Error, Result};

/// Kind of component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    #[default]
    Software,
    Hardware,
    Service,
    Interconnection,
    Policy,
    Process,
    Procedure,
    Plan,
    Guidance,
    Standard,
    Validation,
    /// The system an SSP describes
    #[serde(rename = "this-system")]
    ThisSystem,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Software => "software",
            Self::Hardware => "hardware",
            Self::Service => "service",
            Self::Interconnection => "interconnection",
            Self::Policy => "policy",
            Self::Process => "process",
            Self::Procedure => "procedure",
            Self::Plan => "plan",
            Self::Guidance => "guidance",
            Self::Standard => "standard",
            Self::Validation => "validation",
            Self::ThisSystem => "this-system",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a control implementation's `description` designates
///
/// A recognised catalog version tag becomes [`ImplementationTarget::Catalog`];
/// any other text is kept verbatim. Both serialize back to the original
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImplementationTarget {
    Catalog(CatalogVersion),
    Text(MarkupMultiLine),
}

impl ImplementationTarget {
    pub fn catalog_version(&self) -> Option<CatalogVersion> {
        match self {
            Self::Catalog(version) => Some(*version),
            Self::Text(_) => None,
        }
    }
}

impl From<String> for ImplementationTarget {
    fn from(s: String) -> Self {
        match CatalogVersion::parse(&s) {
            Some(version) if version.as_str() == s => Self::Catalog(version),
            _ => Self::Text(s),
        }
    }
}

impl From<ImplementationTarget> for String {
    fn from(target: ImplementationTarget) -> Self {
        match target {
            ImplementationTarget::Catalog(version) => version.as_str().to_string(),
            ImplementationTarget::Text(text) => text,
        }
    }
}

impl From<CatalogVersion> for ImplementationTarget {
    fn from(version: CatalogVersion) -> Self {
        Self::Catalog(version)
    }
}

/// Narrative for one part of a control statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Statement {
    pub statement_id: String,
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    #[serde(default)]
    pub description: MarkupMultiLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_roles: Option<Vec<ResponsibleRole>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl Statement {
    pub fn new(statement_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            statement_id: statement_id.into(),
            uuid: Uuid::new_v4(),
            description: description.into(),
            props: None,
            links: None,
            responsible_roles: None,
            remarks: None,
        }
    }
}

impl Keyed for Statement {
    type Key = String;

    fn key(&self) -> &String {
        &self.statement_id
    }
}

/// One control's implementation narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ImplementedRequirement {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub control_id: String,
    pub description: MarkupMultiLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<KeyedList<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "KeyedList::is_empty")]
    pub set_parameters: KeyedList<SetParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responsible_roles: Vec<ResponsibleRole>,
    #[serde(default, skip_serializing_if = "KeyedList::is_empty")]
    pub statements: KeyedList<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl ImplementedRequirement {
    pub fn new(control_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            control_id: control_id.into(),
            description: description.into(),
            props: None,
            links: None,
            set_parameters: KeyedList::new(),
            responsible_roles: Vec::new(),
            statements: KeyedList::new(),
            remarks: None,
        }
    }

    fn owner(&self) -> String {
        format!("implemented requirement for {}", self.control_id)
    }

    /// Value of a recognised property
    pub fn property(&self, key: PropertyKey) -> Option<&str> {
        find_property(self.props.iter().flatten(), key)
    }

    /// Responsibility (`security_control_type` property)
    pub fn responsibility(&self) -> Option<&str> {
        self.property(PropertyKey::Responsibility)
    }

    /// Provider (`provider` property)
    pub fn provider(&self) -> Option<&str> {
        self.property(PropertyKey::Provider)
    }

    pub fn statement(&self, statement_id: &str) -> Option<&Statement> {
        self.statements.get(statement_id)
    }

    /// Attach a statement; `statement-id` must be new to this requirement
    pub fn add_statement(&mut self, statement: Statement) -> Result<&mut Self> {
        let owner = self.owner();
        self.statements.try_push(statement, owner)?;
        Ok(self)
    }

    /// Attach a parameter assignment; `param-id` must be new to this requirement
    pub fn add_parameter(&mut self, parameter: SetParameter) -> Result<&mut Self> {
        let owner = self.owner();
        self.set_parameters.try_push(parameter, owner)?;
        Ok(self)
    }

    /// Attach a property; its name must be new to this requirement
    pub fn add_property(&mut self, property: Property) -> Result<&mut Self> {
        let owner = self.owner();
        self.props.get_or_insert_with(KeyedList::new).try_push(property, owner)?;
        Ok(self)
    }
}

impl Keyed for ImplementedRequirement {
    type Key = String;

    fn key(&self) -> &String {
        &self.control_id
    }
}

/// A component's claim of implementing controls for one catalog version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ControlImplementation {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub source: String,
    pub description: ImplementationTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_parameters: Option<Vec<SetParameter>>,
    #[serde(default)]
    pub implemented_requirements: KeyedList<ImplementedRequirement>,
}

impl ControlImplementation {
    pub fn new(source: impl Into<String>, target: impl Into<ImplementationTarget>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            source: source.into(),
            description: target.into(),
            props: None,
            links: None,
            set_parameters: None,
            implemented_requirements: KeyedList::new(),
        }
    }

    /// Catalog version this implementation targets, if its description names one
    pub fn catalog_version(&self) -> Option<CatalogVersion> {
        self.description.catalog_version()
    }

    /// First requirement for the control
    pub fn requirement(&self, control_id: &str) -> Option<&ImplementedRequirement> {
        self.implemented_requirements.get(control_id)
    }

    pub fn requirement_mut(&mut self, control_id: &str) -> Option<&mut ImplementedRequirement> {
        self.implemented_requirements.get_mut(control_id)
    }

    /// Add a requirement; its `control-id` must be new to this implementation
    pub fn add_implemented_requirement(
        &mut self,
        requirement: ImplementedRequirement,
    ) -> Result<&mut ImplementedRequirement> {
        let owner = format!("control implementation {}", self.uuid);
        self.implemented_requirements.try_push(requirement, owner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PortRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
}

/// Network protocol a component exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Protocol {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MarkupLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_ranges: Option<Vec<PortRange>>,
}

/// Reusable unit implementing controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Component {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    #[serde(rename = "type", default)]
    pub component_type: ComponentType,
    pub title: MarkupLine,
    pub description: MarkupMultiLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<MarkupLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_roles: Option<Vec<ResponsibleRole>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<Protocol>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_implementations: Vec<ControlImplementation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl OscalElement for Component {}

impl Component {
    pub fn new(
        component_type: ComponentType,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            component_type,
            title: title.into(),
            description: description.into(),
            purpose: None,
            props: None,
            links: None,
            responsible_roles: None,
            protocols: None,
            control_implementations: Vec::new(),
            remarks: None,
        }
    }

    /// First control implementation targeting the catalog version
    pub fn get_control_implementation(&self, version: CatalogVersion) -> Result<&ControlImplementation> {
        self.control_implementations
            .iter()
            .find(|imp| imp.catalog_version() == Some(version))
            .ok_or(Error::ImplementationNotFound(version))
    }

    pub fn get_control_implementation_mut(
        &mut self,
        version: CatalogVersion,
    ) -> Result<&mut ControlImplementation> {
        self.control_implementations
            .iter_mut()
            .find(|imp| imp.catalog_version() == Some(version))
            .ok_or(Error::ImplementationNotFound(version))
    }

    /// Requirement for a control under the catalog version's implementation
    pub fn get_control(&self, control_id: &str, version: CatalogVersion) -> Result<&ImplementedRequirement> {
        self.get_control_implementation(version)?
            .requirement(control_id)
            .ok_or_else(|| Error::RequirementNotFound {
                control_id: control_id.to_string(),
                version,
            })
    }

    pub fn get_control_mut(
        &mut self,
        control_id: &str,
        version: CatalogVersion,
    ) -> Result<&mut ImplementedRequirement> {
        self.get_control_implementation_mut(version)?
            .requirement_mut(control_id)
            .ok_or_else(|| Error::RequirementNotFound {
                control_id: control_id.to_string(),
                version,
            })
    }

    /// Whether the component implements the control for the catalog version
    pub fn implements(&self, control_id: &str, version: CatalogVersion) -> bool {
        self.get_control(control_id, version).is_ok()
    }

    /// Implemented requirements
    ///
    /// Without a version, every implementation's requirements in implementation
    /// order, then requirement order; the same control id may appear once per
    /// version. With a version, only that implementation's requirements.
    pub fn controls(&self, version: Option<CatalogVersion>) -> Result<Vec<&ImplementedRequirement>> {
        match version {
            None => Ok(self
                .control_implementations
                .iter()
                .flat_map(|imp| imp.implemented_requirements.iter())
                .collect()),
            Some(version) => Ok(self
                .get_control_implementation(version)?
                .implemented_requirements
                .iter()
                .collect()),
        }
    }

    /// Distinct control ids across all implementations, sorted
    pub fn control_ids(&self) -> Vec<String> {
        self.control_implementations
            .iter()
            .flat_map(|imp| imp.implemented_requirements.iter())
            .map(|req| req.control_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Catalog versions with an implementation; unrecognised descriptions are skipped
    pub fn catalog_versions(&self) -> Vec<CatalogVersion> {
        self.control_implementations
            .iter()
            .filter_map(ControlImplementation::catalog_version)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Keyed for Component {
    type Key = Uuid;

    fn key(&self) -> &Uuid {
        &self.uuid
    }
}

/// Weak reference to a component by uuid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRef(pub Uuid);

impl ComponentRef {
    /// Look the component up; `None` when the lookup does not know it
    pub fn resolve<'a, L: ComponentLookup + ?Sized>(&self, lookup: &'a L) -> Option<&'a Component> {
        lookup.component(self)
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Resolves component references without owning the components
pub trait ComponentLookup {
    fn component(&self, reference: &ComponentRef) -> Option<&Component>;
}

impl ComponentLookup for ComponentDefinition {
    fn component(&self, reference: &ComponentRef) -> Option<&Component> {
        self.components.get(&reference.0)
    }
}

impl ComponentLookup for [Component] {
    fn component(&self, reference: &ComponentRef) -> Option<&Component> {
        self.iter().find(|c| c.uuid == reference.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct IncorporatesComponent {
    pub component_uuid: ComponentRef,
    pub description: MarkupMultiLine,
}

/// Grouping of components that together provide a capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Capability {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub name: String,
    pub description: MarkupMultiLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incorporates_components: Option<Vec<IncorporatesComponent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_implementations: Option<Vec<ControlImplementation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl Capability {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            props: None,
            links: None,
            incorporates_components: None,
            control_implementations: None,
            remarks: None,
        }
    }

    fn refs(&self) -> impl Iterator<Item = &ComponentRef> {
        self.incorporates_components
            .iter()
            .flatten()
            .map(|inc| &inc.component_uuid)
    }

    /// Incorporated components the lookup can resolve, in declaration order
    pub fn incorporated_components<'a, L: ComponentLookup + ?Sized>(&self, lookup: &'a L) -> Vec<&'a Component> {
        self.refs().filter_map(|r| r.resolve(lookup)).collect()
    }

    /// References the lookup cannot resolve
    pub fn unresolved_components<L: ComponentLookup + ?Sized>(&self, lookup: &L) -> Vec<ComponentRef> {
        self.refs()
            .filter(|r| r.resolve(lookup).is_none())
            .copied()
            .collect()
    }
}

impl Keyed for Capability {
    type Key = Uuid;

    fn key(&self) -> &Uuid {
        &self.uuid
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ImportComponentDefinition {
    pub href: String,
}

/// Component definition document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ComponentDefinition {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_component_definitions: Option<Vec<ImportComponentDefinition>>,
    #[serde(default, skip_serializing_if = "KeyedList::is_empty")]
    pub components: KeyedList<Component>,
    #[serde(default, skip_serializing_if = "KeyedList::is_empty")]
    pub capabilities: KeyedList<Capability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_matter: Option<BackMatter>,
}

impl OscalElement for ComponentDefinition {}

impl ComponentDefinition {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            metadata,
            import_component_definitions: None,
            components: KeyedList::new(),
            capabilities: KeyedList::new(),
            back_matter: None,
        }
    }

    fn owner(&self) -> String {
        format!("component definition {}", self.uuid)
    }

    /// Add a component; its uuid must be new to this definition
    pub fn add_component(&mut self, component: Component) -> Result<&mut Self> {
        let owner = self.owner();
        self.components.try_push(component, owner)?;
        Ok(self)
    }

    /// Add a capability; its uuid must be new to this definition
    pub fn add_capability(&mut self, capability: Capability) -> Result<&mut Self> {
        let owner = self.owner();
        self.capabilities.try_push(capability, owner)?;
        Ok(self)
    }

    pub fn component_by_uuid(&self, uuid: &Uuid) -> Option<&Component> {
        self.components.get(uuid)
    }
}

/// Root wrapper: `{"component-definition": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ComponentModel {
    pub component_definition: ComponentDefinition,
}

impl OscalElement for ComponentModel {}

impl ComponentModel {
    pub fn components(&self) -> &[Component] {
        self.component_definition.components.as_slice()
    }

    pub fn into_components(self) -> Vec<Component> {
        self.component_definition.components.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscal::common::OSCAL_VERSION;

    const COOL_COMPONENT: &str = include_str!("../../testdata/cool_component.json");
    const FULL_COMPONENT: &str = include_str!("../../testdata/full_component.json");

    fn cool_component() -> Component {
        ComponentModel::from_json(COOL_COMPONENT)
            .unwrap()
            .into_components()
            .remove(0)
    }

    fn component_with(implementations: Vec<(CatalogVersion, &[&str])>) -> Component {
        let mut component = Component::new(ComponentType::Service, "Test", "Test component");
        for (version, ids) in implementations {
            let mut imp = ControlImplementation::new("https://example.com/catalog.json", version);
            for id in ids {
                imp.add_implemented_requirement(ImplementedRequirement::new(*id, format!("{id} narrative")))
                    .unwrap();
            }
            component.control_implementations.push(imp);
        }
        component
    }

    #[test]
    fn test_parse_component_definition() {
        let component = cool_component();
        assert_eq!(component.title, "Cool Component");
        assert_eq!(component.component_type, ComponentType::Software);
        assert_eq!(component.control_implementations.len(), 2);
        assert_eq!(
            component.control_implementations[0].catalog_version(),
            Some(CatalogVersion::NistSp80053R5)
        );
    }

    #[test]
    fn test_round_trip() {
        let model = ComponentModel::from_json(COOL_COMPONENT).unwrap();
        let json = model.to_json().unwrap();
        let again = ComponentModel::from_json(&json).unwrap();
        assert_eq!(again, model);
        assert_eq!(again.to_json().unwrap(), json);
    }

    #[test]
    fn test_full_definition_round_trips() {
        let input: serde_json::Value = serde_json::from_str(FULL_COMPONENT).unwrap();
        let model = ComponentModel::from_json(FULL_COMPONENT).unwrap();
        assert_eq!(model.to_value().unwrap(), input);

        let json = model.to_json_pretty().unwrap();
        let again = ComponentModel::from_json(&json).unwrap();
        assert_eq!(again, model);
        assert_eq!(again.to_json_pretty().unwrap(), json);

        let definition = &model.component_definition;
        let shipper = &definition.components.as_slice()[0];
        let ac2 = shipper.get_control("ac-2", CatalogVersion::NistSp80053R5).unwrap();
        assert_eq!(ac2.statements.len(), 2);
        assert_eq!(ac2.set_parameters.len(), 2);
        assert_eq!(ac2.responsibility(), Some("Inherited"));
        assert_eq!(shipper.control_implementations[1].catalog_version(), None);
        assert_eq!(
            String::from(shipper.control_implementations[1].description.clone()),
            "ISO 27001 Annex A"
        );

        let capability = &definition.capabilities.as_slice()[0];
        let titles: Vec<_> = capability
            .incorporated_components(definition)
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Log Shipper", "Audit Store"]);
    }

    #[test]
    fn test_explicit_empty_props_kept() {
        let json = r#"{"uuid": "61c24e8f-b073-42df-ae65-7f8091a2b3c4", "control-id": "ac-2",
            "description": "d", "props": []}"#;
        let req: ImplementedRequirement = serde_json::from_str(json).unwrap();
        assert_eq!(req.props.as_ref().map(KeyedList::len), Some(0));
        assert_eq!(req.responsibility(), None);

        let out = serde_json::to_value(&req).unwrap();
        assert_eq!(out["props"], serde_json::json!([]));

        let mut req = ImplementedRequirement::new("ac-2", "d");
        assert!(req.props.is_none());
        req.add_property(Property::keyed(PropertyKey::Responsibility, "Hybrid"))
            .unwrap();
        assert_eq!(req.responsibility(), Some("Hybrid"));
    }

    #[test]
    fn test_unknown_field_is_schema_violation() {
        let json = r#"{"uuid": "e35accd9-0cc3-4a02-8557-01764c7cbe0b", "type": "software",
            "title": "X", "description": "Y", "colour": "blue"}"#;
        match Component::from_json(json).unwrap_err() {
            Error::SchemaViolation { field, .. } => assert_eq!(field.as_deref(), Some("colour")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_get_control_implementation_by_version() {
        let component = cool_component();
        let imp = component
            .get_control_implementation(CatalogVersion::NistSp80053R4)
            .unwrap();
        assert_eq!(imp.implemented_requirements.len(), 1);

        let missing = component_with(vec![(CatalogVersion::NistSp80053R4, &["ac-1"])]);
        assert!(matches!(
            missing.get_control_implementation(CatalogVersion::NistSp80053R5),
            Err(Error::ImplementationNotFound(CatalogVersion::NistSp80053R5))
        ));
    }

    #[test]
    fn test_duplicate_implementations_first_match_wins() {
        let mut component = component_with(vec![
            (CatalogVersion::NistSp80053R5, &["ac-1"]),
            (CatalogVersion::NistSp80053R5, &["ac-2"]),
        ]);
        component.control_implementations[1].source = "second".into();
        let imp = component
            .get_control_implementation(CatalogVersion::NistSp80053R5)
            .unwrap();
        assert!(imp.requirement("ac-1").is_some());
        assert!(component.get_control("ac-2", CatalogVersion::NistSp80053R5).is_err());
    }

    #[test]
    fn test_get_control() {
        let component = cool_component();
        let req = component
            .get_control("ac-2", CatalogVersion::NistSp80053R5)
            .unwrap();
        assert_eq!(req.description, "This component satisfies a.");

        let rev4 = component
            .get_control("ac-2", CatalogVersion::NistSp80053R4)
            .unwrap();
        assert_eq!(rev4.description, "Rev 4 account management narrative.");

        match component.get_control("ac-3", CatalogVersion::NistSp80053R5) {
            Err(Error::RequirementNotFound { control_id, version }) => {
                assert_eq!(control_id, "ac-3");
                assert_eq!(version, CatalogVersion::NistSp80053R5);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_controls_without_version_concatenates_in_order() {
        let component = component_with(vec![
            (CatalogVersion::NistSp80053R4, &["ac-1", "ac-2"]),
            (CatalogVersion::NistSp80053R5, &["ac-2", "at-1", "pe-3"]),
        ]);
        let ids: Vec<_> = component
            .controls(None)
            .unwrap()
            .iter()
            .map(|r| r.control_id.as_str())
            .collect();
        assert_eq!(ids, vec!["ac-1", "ac-2", "ac-2", "at-1", "pe-3"]);

        let rev5: Vec<_> = component
            .controls(Some(CatalogVersion::NistSp80053R5))
            .unwrap()
            .iter()
            .map(|r| r.control_id.as_str())
            .collect();
        assert_eq!(rev5, vec!["ac-2", "at-1", "pe-3"]);
    }

    #[test]
    fn test_control_ids_and_versions() {
        let component = cool_component();
        assert_eq!(component.control_ids(), vec!["ac-2", "at-1", "at-2", "at-3", "pe-3"]);
        assert_eq!(
            component.catalog_versions(),
            vec![CatalogVersion::NistSp80053R4, CatalogVersion::NistSp80053R5]
        );
    }

    #[test]
    fn test_free_text_description_round_trips() {
        let json = r#"{"uuid": "f94a7f03-6ac5-4386-98eb-fa0392f26a1c", "source": "s",
            "description": "Implements the AC family", "implemented-requirements": []}"#;
        let imp: ControlImplementation = serde_json::from_str(json).unwrap();
        assert_eq!(imp.catalog_version(), None);
        let out = serde_json::to_value(&imp).unwrap();
        assert_eq!(out["description"], "Implements the AC family");
    }

    #[test]
    fn test_typed_property_lookup() {
        let component = cool_component();
        let req = component
            .get_control("ac-2", CatalogVersion::NistSp80053R5)
            .unwrap();
        assert_eq!(req.responsibility(), Some("Hybrid"));
        assert_eq!(req.provider(), Some("yes"));

        let bare = component
            .get_control("at-1", CatalogVersion::NistSp80053R5)
            .unwrap();
        assert_eq!(bare.responsibility(), None);
    }

    #[test]
    fn test_add_statement_rejects_duplicate() {
        let mut req = ImplementedRequirement::new("ac-2", "narrative");
        req.add_statement(Statement::new("ac-2_smt.a", "first")).unwrap();

        match req.add_statement(Statement::new("ac-2_smt.a", "second")) {
            Err(Error::DuplicateKey { key, owner }) => {
                assert_eq!(key, "ac-2_smt.a");
                assert!(owner.contains("ac-2"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert_eq!(req.statements.len(), 1);
        assert_eq!(req.statement("ac-2_smt.a").unwrap().description, "first");
    }

    #[test]
    fn test_add_parameter_and_property_reject_duplicates() {
        let mut req = ImplementedRequirement::new("ac-1", "narrative");
        req.add_parameter(SetParameter::new("ac-1_prm_1", vec!["ISSO".into()]))
            .unwrap()
            .add_property(Property::keyed(PropertyKey::Provider, "yes"))
            .unwrap();

        assert!(req
            .add_parameter(SetParameter::new("ac-1_prm_1", vec!["CISO".into()]))
            .is_err());
        assert!(req.add_property(Property::new("provider", "no")).is_err());
        assert_eq!(req.provider(), Some("yes"));
    }

    #[test]
    fn test_add_requirement_rejects_duplicate_control() {
        let mut imp = ControlImplementation::new("src", CatalogVersion::NistSp80053R5);
        imp.add_implemented_requirement(ImplementedRequirement::new("ac-2", "a"))
            .unwrap();
        assert!(matches!(
            imp.add_implemented_requirement(ImplementedRequirement::new("ac-2", "b")),
            Err(Error::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_loaded_duplicate_requirements_are_tolerated() {
        let json = r#"{"source": "s", "description": "NIST_SP80053R5", "implemented-requirements": [
            {"control-id": "ac-2", "description": "first"},
            {"control-id": "ac-2", "description": "second"}
        ]}"#;
        let imp: ControlImplementation = serde_json::from_str(json).unwrap();
        assert_eq!(imp.implemented_requirements.len(), 2);
        assert_eq!(imp.requirement("ac-2").unwrap().description, "first");
    }

    #[test]
    fn test_empty_optional_collections_are_omitted() {
        let req = ImplementedRequirement::new("ac-2", "narrative");
        let value = serde_json::to_value(&req).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert!(keys.contains(&"control-id".to_string()));
        assert!(!keys.contains(&"statements".to_string()));
        assert!(!keys.contains(&"set-parameters".to_string()));
        assert!(!keys.contains(&"responsible-roles".to_string()));
        assert!(!keys.contains(&"props".to_string()));
    }

    #[test]
    fn test_definition_rejects_duplicate_component() {
        let mut def = ComponentDefinition::new(Metadata::new("Def", "1", chrono::Utc::now()));
        let component = Component::new(ComponentType::Policy, "Policy", "Policy component");
        def.add_component(component.clone()).unwrap();
        assert!(def.add_component(component).is_err());
        assert_eq!(def.metadata.oscal_version, OSCAL_VERSION);
    }

    #[test]
    fn test_capability_resolves_weak_references() {
        let mut def = ComponentDefinition::new(Metadata::new("Def", "1", chrono::Utc::now()));
        let component = Component::new(ComponentType::Service, "Logging", "Central logging");
        let known = ComponentRef(component.uuid);
        let unknown = ComponentRef(Uuid::new_v4());
        def.add_component(component).unwrap();

        let mut capability = Capability::new("Audit", "Audit capability");
        capability.incorporates_components = Some(vec![
            IncorporatesComponent {
                component_uuid: known,
                description: "logs".into(),
            },
            IncorporatesComponent {
                component_uuid: unknown,
                description: "missing".into(),
            },
        ]);

        let resolved = capability.incorporated_components(&def);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].title, "Logging");
        assert_eq!(capability.unresolved_components(&def), vec![unknown]);
    }
}
