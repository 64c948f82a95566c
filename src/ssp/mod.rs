//! System Security Plan Assembly
//!
//! Builds one OSCAL SSP document from a project snapshot in a single pass.
//! Given an unchanged snapshot the output is identical between runs apart
//! from the uuids of elements that have no stable identity (the plan itself,
//! users, implemented requirements and by-component entries). Components keep
//! the uuid of their component definition and the system id is a UUIDv5 of
//! the project title.
//!
//! # Usage
//!
//! ```ignore
//! use blueprint::ssp::{ssp_filename, SspAssembler};
//!
//! let assembler = SspAssembler::new(blueprint::config::config());
//! let json = assembler.to_json(&project, &catalog)?;
//! std::fs::write(ssp_filename(&project.title), json)?;
//! ```

mod roles;

use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::SspConfig;
use crate::error::Result;
use crate::oscal::{
    BackMatter, ByComponent, ComponentType, Diagram, Impact, ImportProfile, InformationType, Metadata,
    OscalElement, Resource, SecurityImpactLevel, SspControlImplementation, SspImplementedRequirement,
    SspModel, SystemCharacteristics, SystemComponent, SystemId, SystemImplementation, SystemInformation,
    SystemSecurityPlan, SystemStatus,
};
use crate::project::{AttachedComponent, ControlAggregator, ProjectSnapshot};

pub use roles::{derive_roles, role_id, split_title};

/// File name for a project's exported plan
///
/// Path separators and a leading dot in the title become `_`, so the name
/// always stays inside the directory it is joined to.
pub fn ssp_filename(project_title: &str) -> String {
    let mut stem: String = project_title
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect();
    if stem.starts_with('.') {
        stem.replace_range(..1, "_");
    }
    format!("{stem}-ssp.json")
}

/// Stable system identifier derived from the project title
pub fn system_uuid(project_title: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, project_title.as_bytes())
}

/// Assembles SSP documents using one configuration
#[derive(Debug, Clone, Copy)]
pub struct SspAssembler<'a> {
    config: &'a SspConfig,
}

impl<'a> SspAssembler<'a> {
    pub fn new(config: &'a SspConfig) -> Self {
        Self { config }
    }

    /// Build the plan for a project
    ///
    /// The catalog must match the project's version and impact level; its
    /// source becomes the import-profile href.
    pub fn assemble(&self, project: &ProjectSnapshot, catalog: &Catalog) -> Result<SspModel> {
        ControlAggregator::new(project, catalog)?;

        let (roles, users) = derive_roles(&project.stakeholders);
        let mut metadata = Metadata::new(
            project.title.clone(),
            self.config.document_version.clone(),
            project.last_modified,
        );
        metadata.oscal_version = self.config.oscal_version.clone();
        if !roles.is_empty() {
            metadata.roles = Some(roles);
        }

        let mut system_implementation = SystemImplementation {
            users,
            ..SystemImplementation::default()
        };
        for attached in project.components.iter() {
            system_implementation.add_component(self.system_component(project, attached))?;
        }

        let control_implementation = self.control_implementation(project)?;

        let plan = SystemSecurityPlan {
            uuid: Uuid::new_v4(),
            metadata,
            import_profile: ImportProfile {
                href: catalog.source().to_string(),
                remarks: None,
            },
            system_characteristics: self.system_characteristics(project),
            system_implementation,
            control_implementation,
            back_matter: self.config.back_matter_resource.as_ref().map(|title| BackMatter {
                resources: Some(vec![Resource::titled(title.clone())]),
            }),
        };

        tracing::info!(
            project = %project.title,
            components = plan.system_implementation.components.len(),
            requirements = plan.control_implementation.implemented_requirements.len(),
            "Assembled system security plan"
        );
        Ok(SspModel {
            system_security_plan: plan,
        })
    }

    /// Build the plan and render it as two-space indented JSON
    pub fn to_json(&self, project: &ProjectSnapshot, catalog: &Catalog) -> Result<String> {
        self.assemble(project, catalog)?.to_json_pretty()
    }

    fn system_component(&self, project: &ProjectSnapshot, attached: &AttachedComponent) -> SystemComponent {
        let component = &attached.component;
        let (component_type, title, description) = if attached.is_system() {
            (
                ComponentType::ThisSystem,
                self.config.this_system_title.clone(),
                project.title.clone(),
            )
        } else {
            (
                component.component_type,
                component.title.clone(),
                component.description.clone(),
            )
        };
        SystemComponent {
            uuid: component.uuid,
            component_type,
            title,
            description,
            purpose: None,
            props: None,
            links: None,
            status: SystemStatus::new(self.config.system_state),
            responsible_roles: None,
            protocols: None,
            remarks: None,
        }
    }

    fn system_characteristics(&self, project: &ProjectSnapshot) -> SystemCharacteristics {
        let fips = project.impact_level.fips199();
        let description = if project.acronym.is_empty() {
            project.title.clone()
        } else {
            project.acronym.clone()
        };
        SystemCharacteristics {
            system_ids: vec![SystemId {
                identifier_type: Some(self.config.identifier_type.clone()),
                id: system_uuid(&project.title).to_string(),
            }],
            system_name: project.title.clone(),
            system_name_short: (!project.acronym.is_empty()).then(|| project.acronym.clone()),
            description,
            props: None,
            links: None,
            date_authorized: None,
            security_sensitivity_level: Some(project.impact_level.as_str().to_string()),
            system_information: SystemInformation {
                props: None,
                links: None,
                information_types: vec![InformationType {
                    uuid: None,
                    title: project.title.clone(),
                    description: project.title.clone(),
                    props: None,
                    links: None,
                    confidentiality_impact: Impact::base(fips.clone()),
                    integrity_impact: Impact::base(fips.clone()),
                    availability_impact: Impact::base(fips.clone()),
                }],
            },
            security_impact_level: Some(SecurityImpactLevel::uniform(fips)),
            status: SystemStatus::new(self.config.system_state),
            authorization_boundary: Diagram::described(self.config.authorization_boundary.clone()),
            network_architecture: None,
            data_flow: None,
            responsible_parties: None,
            remarks: None,
        }
    }

    /// One requirement per tracked control, one by-component per implementing component
    ///
    /// Narrative enable flags only shape the control view; every
    /// implementing component is emitted here.
    fn control_implementation(&self, project: &ProjectSnapshot) -> Result<SspControlImplementation> {
        let mut implementation = SspControlImplementation::new(self.config.system_description.clone());

        for tracked in project.controls.iter() {
            let control_id = tracked.control_id.as_str();
            let mut requirement = SspImplementedRequirement::new(control_id, Uuid::new_v4());

            for attached in project.components.iter() {
                let component = &attached.component;
                let narrative = match component.get_control(control_id, project.catalog_version) {
                    Ok(narrative) => narrative,
                    Err(e) if e.is_component_miss() => continue,
                    Err(e) => return Err(e),
                };
                requirement.add_by_component(ByComponent::new(
                    component.uuid,
                    Uuid::new_v4(),
                    narrative.description.clone(),
                ))?;
            }

            implementation.add_implemented_requirement(requirement)?;
        }
        Ok(implementation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::rev5_catalog;
    use crate::catalog::{CatalogVersion, ImpactLevel};
    use crate::error::Error;
    use crate::project::tests::{component, snapshot};
    use crate::project::{ComponentRole, ControlStatus, NarrativeOverride, Stakeholder};
    use serde_json::Value;

    const V5: CatalogVersion = CatalogVersion::NistSp80053R5;

    fn assemble(project: &ProjectSnapshot) -> SspModel {
        let config = SspConfig::default();
        SspAssembler::new(&config)
            .assemble(project, &rev5_catalog())
            .unwrap()
    }

    fn strip_uuids(value: &mut Value) {
        match value {
            Value::Object(map) => {
                map.remove("uuid");
                map.values_mut().for_each(strip_uuids);
            }
            Value::Array(items) => items.iter_mut().for_each(strip_uuids),
            _ => {}
        }
    }

    #[test]
    fn test_ssp_filename() {
        assert_eq!(ssp_filename("Payments Platform"), "Payments Platform-ssp.json");
    }

    #[test]
    fn test_ssp_filename_stays_in_directory() {
        assert_eq!(ssp_filename("../../etc/cron.d/x"), "_._.._etc_cron.d_x-ssp.json");
        assert_eq!(ssp_filename("a\\b"), "a_b-ssp.json");
        assert_eq!(ssp_filename(".."), "_.-ssp.json");

        let dir = std::path::Path::new("out");
        for title in ["../escape", "/abs/path", "..", "nested/dir/name"] {
            let path = dir.join(ssp_filename(title));
            assert_eq!(path.parent(), Some(dir), "{title}");
        }
    }

    #[test]
    fn test_one_by_component_when_one_of_two_implements() {
        let mut project = snapshot();
        project
            .attach(component("A", V5, &["ac-2"]), ComponentRole::Inherited)
            .unwrap()
            .attach(component("B", V5, &["at-1"]), ComponentRole::Inherited)
            .unwrap()
            .track("ac-2", ControlStatus::Incomplete)
            .unwrap();

        let ssp = assemble(&project).system_security_plan;
        let requirements = &ssp.control_implementation.implemented_requirements;
        assert_eq!(requirements.len(), 1);
        let ac2 = ssp.control_implementation.requirement("ac-2").unwrap();
        assert_eq!(ac2.by_components.len(), 1);
        assert_eq!(ac2.by_components.as_slice()[0].description, "A implements ac-2");
    }

    #[test]
    fn test_unimplemented_control_omits_by_components() {
        let mut project = snapshot();
        project
            .attach(component("A", V5, &["ac-2"]), ComponentRole::Inherited)
            .unwrap()
            .track("pe-3", ControlStatus::NotStarted)
            .unwrap();

        let value = assemble(&project).to_value().unwrap();
        let requirement = &value["system-security-plan"]["control-implementation"]["implemented-requirements"][0];
        assert_eq!(requirement["control-id"], "pe-3");
        assert!(requirement.get("by-components").is_none());
    }

    #[test]
    fn test_disabled_narrative_still_in_ssp() {
        let mut project = snapshot();
        let a = component("A", V5, &["ac-2"]);
        let a_uuid = a.uuid;
        project
            .attach(a, ComponentRole::Inherited)
            .unwrap()
            .attach(component("B", V5, &["ac-2"]), ComponentRole::Inherited)
            .unwrap()
            .track("ac-2", ControlStatus::Complete)
            .unwrap();
        project.apply_overrides(&[NarrativeOverride {
            control_id: "ac-2".into(),
            component_uuid: a_uuid,
            enabled: false,
        }]);
        assert!(!project.is_narrative_enabled("ac-2", a_uuid));

        let ssp = assemble(&project).system_security_plan;
        let ac2 = ssp.control_implementation.requirement("ac-2").unwrap();
        let by_components = ac2.by_components.as_slice();
        assert_eq!(by_components.len(), 2);
        assert_eq!(by_components[0].component_uuid, a_uuid);
        assert_eq!(by_components[0].description, "A implements ac-2");
        assert_eq!(by_components[1].description, "B implements ac-2");
    }

    #[test]
    fn test_system_component_becomes_this_system() {
        let mut project = snapshot();
        let system = component("Payments", V5, &["ac-2"]);
        let system_uuid = system.uuid;
        project
            .attach(component("AWS", V5, &[]), ComponentRole::Inherited)
            .unwrap()
            .attach(system, ComponentRole::System)
            .unwrap()
            .track("ac-2", ControlStatus::Incomplete)
            .unwrap();

        let ssp = assemble(&project).system_security_plan;
        let components = ssp.system_implementation.components.as_slice();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].title, "AWS");
        assert_eq!(components[0].component_type, ComponentType::Software);
        assert_eq!(components[1].uuid, system_uuid);
        assert_eq!(components[1].component_type, ComponentType::ThisSystem);
        assert_eq!(components[1].title, "This System");
        assert_eq!(components[1].description, "Payments Platform");

        let ac2 = ssp.control_implementation.requirement("ac-2").unwrap();
        assert_eq!(ac2.by_components.as_slice()[0].component_uuid, system_uuid);
    }

    #[test]
    fn test_system_characteristics() {
        let project = snapshot();
        let value = assemble(&project).to_value().unwrap();
        let plan = &value["system-security-plan"];
        let characteristics = &plan["system-characteristics"];

        assert_eq!(
            characteristics["system-ids"][0]["id"],
            Uuid::new_v5(&Uuid::NAMESPACE_OID, b"Payments Platform").to_string()
        );
        assert_eq!(characteristics["system-ids"][0]["identifier-type"], "https://ietf.org/rfc/rfc4122");
        assert_eq!(characteristics["system-name"], "Payments Platform");
        assert_eq!(characteristics["description"], "PAY");
        assert_eq!(characteristics["security-sensitivity-level"], "moderate");
        assert_eq!(
            characteristics["security-impact-level"]["security-objective-integrity"],
            "fips-199-moderate"
        );
        assert_eq!(characteristics["status"]["state"], "operational");
        assert_eq!(
            characteristics["authorization-boundary"]["description"],
            "INSERT AUTHORIZATION BOUNDARY"
        );
        assert_eq!(
            plan["import-profile"]["href"],
            V5.baseline_href(ImpactLevel::Moderate)
        );
        assert_eq!(plan["metadata"]["version"], "0.1");
        assert_eq!(plan["metadata"]["oscal-version"], "1.0.2");
        assert_eq!(plan["back-matter"]["resources"][0]["title"], "Test Resource");
        assert_eq!(
            plan["control-implementation"]["description"],
            "[INSERT SYSTEM DESCRIPTION HERE]"
        );
    }

    #[test]
    fn test_roles_from_stakeholders() {
        let mut project = snapshot();
        project
            .add_stakeholder(Stakeholder::new("Authorizing Official (AO)"))
            .add_stakeholder(Stakeholder::new("System Owner"));
        let ssp = assemble(&project).system_security_plan;

        let roles = ssp.metadata.roles.unwrap();
        assert_eq!(roles[0].id, "authorizing-official");
        assert_eq!(roles[1].short_name.as_deref(), Some("SO"));
        assert_eq!(ssp.system_implementation.users.len(), 2);
    }

    #[test]
    fn test_idempotent_modulo_uuids() {
        let mut project = snapshot();
        project
            .attach(component("A", V5, &["ac-2", "at-1"]), ComponentRole::Inherited)
            .unwrap()
            .attach(component("Payments", V5, &["ac-2"]), ComponentRole::System)
            .unwrap()
            .track("ac-2", ControlStatus::Complete)
            .unwrap()
            .track("at-1", ControlStatus::Incomplete)
            .unwrap()
            .add_stakeholder(Stakeholder::new("System Owner"));

        let config = SspConfig::default();
        let catalog = rev5_catalog();
        let assembler = SspAssembler::new(&config);
        let first = assembler.to_json(&project, &catalog).unwrap();
        let second = assembler.to_json(&project, &catalog).unwrap();

        let mut first: Value = serde_json::from_str(&first).unwrap();
        let mut second: Value = serde_json::from_str(&second).unwrap();
        strip_uuids(&mut first);
        strip_uuids(&mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn test_output_round_trips() {
        let mut project = snapshot();
        project
            .attach(component("A", V5, &["ac-2"]), ComponentRole::Inherited)
            .unwrap()
            .track("ac-2", ControlStatus::Complete)
            .unwrap();
        let config = SspConfig::default();
        let json = SspAssembler::new(&config)
            .to_json(&project, &rev5_catalog())
            .unwrap();
        let parsed = SspModel::from_json(&json).unwrap();
        assert_eq!(parsed.to_json_pretty().unwrap(), json);
    }

    #[test]
    fn test_catalog_mismatch_rejected() {
        let project = ProjectSnapshot::new("2", "Other", V5, ImpactLevel::High);
        let config = SspConfig::default();
        assert!(matches!(
            SspAssembler::new(&config).assemble(&project, &rev5_catalog()),
            Err(Error::CatalogNotFound { .. })
        ));
    }
}
