//! OSCAL Document Model
//!
//! Serde types for the three OSCAL document kinds the product reads and
//! writes: catalogs, component definitions and system security plans.
//!
//! Every type uses the kebab-case wire names of the OSCAL 1.0 JSON schema,
//! rejects unknown fields and omits absent optional fields, so that
//! `from_json(to_json(x)) == x` and re-serialization is byte stable.
//!
//! # Usage
//!
//! ```ignore
//! use blueprint::oscal::{ComponentModel, OscalElement};
//!
//! let model = ComponentModel::from_file("components/cool_component.json")?;
//! println!("{}", model.to_json_pretty()?);
//! ```

mod catalog;
mod common;
mod component;
mod element;
mod keyed;
mod ssp;

pub use catalog::{
    CatalogDocument, CatalogModel, Constraint, ConstraintTest, Control, Group, Guideline, Parameter,
    Part, Selection,
};
pub use common::{
    find_property, Address, BackMatter, Base64, Citation, DocumentId, ExternalId, Link, MarkupLine,
    MarkupMultiLine, Metadata, Party, Property, PropertyKey, Resource, ResourceHash, ResourceLink,
    ResponsibleParty, ResponsibleRole, Revision, Role, SetParameter, TelephoneNumber, OSCAL_VERSION,
};
pub use component::{
    Capability, Component, ComponentDefinition, ComponentLookup, ComponentModel, ComponentRef,
    ComponentType, ControlImplementation, ImplementationTarget, ImplementedRequirement,
    ImportComponentDefinition, IncorporatesComponent, PortRange, Protocol, Statement,
};
pub use element::OscalElement;
pub use keyed::{Keyed, KeyedList};
pub use ssp::{
    ByComponent, Diagram, Impact, ImportProfile, InformationType, SecurityImpactLevel,
    SspControlImplementation, SspImplementedRequirement, SspModel, SystemCharacteristics,
    SystemComponent, SystemId, SystemImplementation, SystemInformation, SystemSecurityPlan,
    SystemState, SystemStatus, User,
};
