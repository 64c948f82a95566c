//! Per-control aggregation over a project's components

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttachedComponent, ControlStatus, ProjectSnapshot};
use crate::catalog::{Catalog, CatalogControl};
use crate::error::{Error, Result};
use crate::oscal::{Component, ImplementedRequirement, Keyed, KeyedList, Parameter, Part};

/// Computes control views and progress for one project against one catalog
#[derive(Debug, Clone, Copy)]
pub struct ControlAggregator<'a> {
    project: &'a ProjectSnapshot,
    catalog: &'a Catalog,
}

impl<'a> ControlAggregator<'a> {
    /// Pair a project with its catalog
    ///
    /// The catalog must match the project's version and impact level.
    pub fn new(project: &'a ProjectSnapshot, catalog: &'a Catalog) -> Result<Self> {
        if catalog.version() != project.catalog_version || catalog.impact_level() != project.impact_level {
            return Err(Error::CatalogNotFound {
                version: project.catalog_version,
                impact_level: project.impact_level,
            });
        }
        Ok(Self { project, catalog })
    }

    pub fn project(&self) -> &'a ProjectSnapshot {
        self.project
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Unified view of one control across every attached component
    pub fn view(&self, control_id: &str) -> Result<ControlView> {
        let control = self.catalog.control(control_id)?;
        let version = self.project.catalog_version;

        let mut inherited: KeyedList<InheritedNarrative> = KeyedList::new();
        for attached in self.project.inherited_components() {
            let component = &attached.component;
            match component.get_control(control_id, version) {
                Ok(requirement) => {
                    let narrative = InheritedNarrative {
                        key: bucket_key(&inherited, component),
                        component_uuid: component.uuid,
                        title: component.title.clone(),
                        description: requirement.description.clone(),
                        enabled: self.project.is_narrative_enabled(control_id, component.uuid),
                        responsibility: requirement.responsibility().map(str::to_string),
                        provider: requirement.provider().map(str::to_string),
                        statements: statement_narratives(requirement),
                    };
                    inherited.try_push(narrative, "inherited narratives")?;
                }
                Err(e) if e.is_component_miss() => {
                    tracing::debug!(
                        control_id,
                        component = %component.title,
                        reason = %e,
                        "Component does not implement control"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let mut private: KeyedList<PrivateNarrative> = KeyedList::new();
        if let Some(narrative) = self.private_narrative(control_id)? {
            private.try_push(narrative, "private narratives")?;
        }

        let responsibility = private
            .iter()
            .filter_map(|n| n.responsibility.clone())
            .chain(inherited.iter().filter_map(|n| n.responsibility.clone()))
            .next();

        Ok(ControlView {
            status: self.project.status(control_id),
            project: ProjectSummary {
                id: self.project.id.clone(),
                title: self.project.title.clone(),
                acronym: self.project.acronym.clone(),
                private_component: self.project.system_component().map(AttachedComponent::uuid),
            },
            control: ControlSummary::from(control),
            catalog_data: self.navigation(control)?,
            component_data: ComponentNarratives {
                responsibility,
                components: NarrativeBuckets { inherited, private },
            },
        })
    }

    fn navigation(&self, control: &CatalogControl) -> Result<CatalogNavigation> {
        let id = control.control_id.as_str();
        Ok(CatalogNavigation {
            parent: self.catalog.parent(id)?.map(ControlRef::from),
            previous: self.catalog.previous(id)?.map(ControlRef::from),
            next: self.catalog.next(id)?.map(ControlRef::from),
            children: self
                .catalog
                .children(id)?
                .into_iter()
                .map(ControlRef::from)
                .collect(),
            statements: control.statements.clone(),
            parameters: control.parameters.clone(),
        })
    }

    fn private_narrative(&self, control_id: &str) -> Result<Option<PrivateNarrative>> {
        let Some(system) = self.project.system_component() else {
            return Ok(None);
        };
        let component: &Component = &system.component;
        let requirement = match component.get_control(control_id, self.project.catalog_version) {
            Ok(requirement) => Some(requirement),
            Err(e) if e.is_component_miss() => None,
            Err(e) => return Err(e),
        };

        Ok(Some(PrivateNarrative {
            component_uuid: component.uuid,
            title: component.title.clone(),
            description: requirement.map(|r| r.description.clone()).unwrap_or_default(),
            implemented: requirement.is_some(),
            enabled: self.project.is_narrative_enabled(control_id, component.uuid),
            responsibility: requirement.and_then(|r| r.responsibility()).map(str::to_string),
            statements: requirement.map(statement_narratives).unwrap_or_default(),
        }))
    }

    /// Validate an enable/disable request and return the overrides to persist
    ///
    /// Every id must name a component attached to the project; nothing is
    /// returned unless all of them do. Enables come before disables, so an id
    /// listed in both ends up disabled.
    pub fn toggle_narratives(
        &self,
        control_id: &str,
        enable: &[&str],
        disable: &[&str],
    ) -> Result<Vec<NarrativeOverride>> {
        self.catalog.control(control_id)?;

        let resolve = |id: &&str| -> Result<Uuid> {
            Uuid::parse_str(id.trim())
                .ok()
                .filter(|uuid| self.project.attached(uuid).is_some())
                .ok_or_else(|| Error::UnknownComponent(id.to_string()))
        };
        let enable = enable.iter().map(resolve).collect::<Result<Vec<_>>>()?;
        let disable = disable.iter().map(resolve).collect::<Result<Vec<_>>>()?;

        let overrides = enable
            .into_iter()
            .map(|uuid| (uuid, true))
            .chain(disable.into_iter().map(|uuid| (uuid, false)))
            .map(|(component_uuid, enabled)| NarrativeOverride {
                control_id: control_id.to_string(),
                component_uuid,
                enabled,
            })
            .collect();
        Ok(overrides)
    }
}

/// Bucket key for a component: its title, or title and uuid when an earlier
/// component already took the title
fn bucket_key(bucket: &KeyedList<InheritedNarrative>, component: &Component) -> String {
    if bucket.contains_key(component.title.as_str()) {
        format!("{} ({})", component.title, component.uuid)
    } else {
        component.title.clone()
    }
}

fn statement_narratives(requirement: &ImplementedRequirement) -> Vec<StatementNarrative> {
    requirement
        .statements
        .iter()
        .map(|s| StatementNarrative {
            statement_id: s.statement_id.clone(),
            description: s.description.clone(),
        })
        .collect()
}

/// Enable flag for one (control, component) pair, owned by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeOverride {
    pub control_id: String,
    pub component_uuid: Uuid,
    pub enabled: bool,
}

/// Aggregated view of one control within a project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlView {
    pub status: ControlStatus,
    pub project: ProjectSummary,
    pub control: ControlSummary,
    pub catalog_data: CatalogNavigation,
    pub component_data: ComponentNarratives,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    pub acronym: String,
    /// Uuid of the project's system component
    pub private_component: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlSummary {
    pub control_id: String,
    pub control_label: String,
    pub sort_id: String,
    pub title: String,
    pub family: String,
    pub withdrawn: bool,
}

impl From<&CatalogControl> for ControlSummary {
    fn from(control: &CatalogControl) -> Self {
        Self {
            control_id: control.control_id.clone(),
            control_label: control.control_label.clone(),
            sort_id: control.sort_id.clone(),
            title: control.title.clone(),
            family: control.family.clone(),
            withdrawn: control.withdrawn,
        }
    }
}

/// Link to a neighbouring control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlRef {
    pub control_id: String,
    pub control_label: String,
}

impl From<&CatalogControl> for ControlRef {
    fn from(control: &CatalogControl) -> Self {
        Self {
            control_id: control.control_id.clone(),
            control_label: control.control_label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogNavigation {
    pub parent: Option<ControlRef>,
    pub previous: Option<ControlRef>,
    pub next: Option<ControlRef>,
    pub children: Vec<ControlRef>,
    pub statements: Vec<Part>,
    pub parameters: Vec<Parameter>,
}

/// Narratives for one control, grouped by component role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentNarratives {
    /// Responsibility of the system component's requirement, else of the
    /// first inherited requirement that declares one
    pub responsibility: Option<String>,
    pub components: NarrativeBuckets,
}

impl ComponentNarratives {
    /// Inherited narrative by component title
    pub fn inherited(&self, title: &str) -> Option<&InheritedNarrative> {
        self.components.inherited.get(title)
    }

    /// Private narrative by component title
    pub fn private(&self, title: &str) -> Option<&PrivateNarrative> {
        self.components.private.get(title)
    }

    /// The project's own narrative, if it has a system component
    pub fn system(&self) -> Option<&PrivateNarrative> {
        self.components.private.iter().next()
    }
}

/// Inherited and private narratives, each serialized as an object keyed by
/// component title in attachment order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeBuckets {
    #[serde(serialize_with = "KeyedList::serialize_as_map")]
    pub inherited: KeyedList<InheritedNarrative>,
    #[serde(serialize_with = "KeyedList::serialize_as_map")]
    pub private: KeyedList<PrivateNarrative>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementNarrative {
    pub statement_id: String,
    pub description: String,
}

/// Narrative a shared component provides for the control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritedNarrative {
    #[serde(skip)]
    key: String,
    pub component_uuid: Uuid,
    pub title: String,
    pub description: String,
    pub enabled: bool,
    pub responsibility: Option<String>,
    pub provider: Option<String>,
    pub statements: Vec<StatementNarrative>,
}

impl Keyed for InheritedNarrative {
    type Key = String;

    fn key(&self) -> &String {
        &self.key
    }
}

/// The project's own editable narrative
///
/// Present for every control once the project has a system component; empty
/// when that component does not implement the control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivateNarrative {
    pub component_uuid: Uuid,
    pub title: String,
    pub description: String,
    pub implemented: bool,
    pub enabled: bool,
    pub responsibility: Option<String>,
    pub statements: Vec<StatementNarrative>,
}

impl Keyed for PrivateNarrative {
    type Key = String;

    fn key(&self) -> &String {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{rev5_catalog, REV4};
    use crate::catalog::{CatalogLoader, CatalogVersion, ImpactLevel};
    use crate::oscal::{ComponentModel, OscalElement};
    use crate::project::tests::{component, snapshot};
    use crate::project::ComponentRole;

    const COOL_COMPONENT: &str = include_str!("../../testdata/cool_component.json");

    #[test]
    fn test_inherited_in_attachment_order_skipping_misses() {
        let catalog = rev5_catalog();
        let mut project = snapshot();
        let v5 = CatalogVersion::NistSp80053R5;
        project
            .attach(component("A", v5, &["ac-2", "ac-3"]), ComponentRole::Inherited)
            .unwrap()
            .attach(component("B", v5, &["ac-3"]), ComponentRole::Inherited)
            .unwrap()
            .attach(component("C", v5, &["at-1", "ac-2"]), ComponentRole::Inherited)
            .unwrap();

        let view = ControlAggregator::new(&project, &catalog)
            .unwrap()
            .view("ac-2")
            .unwrap();
        let inherited = &view.component_data.components.inherited;
        let titles: Vec<_> = inherited.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert_eq!(
            view.component_data.inherited("C").unwrap().description,
            "C implements ac-2"
        );
        assert!(view.component_data.inherited("B").is_none());
        assert!(inherited.iter().all(|n| n.enabled));
    }

    #[test]
    fn test_component_without_matching_version_is_skipped() {
        let catalog = rev5_catalog();
        let mut project = snapshot();
        project
            .attach(
                component("Legacy", CatalogVersion::NistSp80053R4, &["ac-2"]),
                ComponentRole::Inherited,
            )
            .unwrap();

        let view = ControlAggregator::new(&project, &catalog)
            .unwrap()
            .view("ac-2")
            .unwrap();
        assert!(view.component_data.components.inherited.is_empty());
    }

    #[test]
    fn test_cool_component_scenario() {
        let catalog = rev5_catalog();
        let cool = ComponentModel::from_json(COOL_COMPONENT)
            .unwrap()
            .into_components()
            .remove(0);
        let mut project = snapshot();
        project.attach(cool, ComponentRole::Inherited).unwrap();

        let view = ControlAggregator::new(&project, &catalog)
            .unwrap()
            .view("ac-2")
            .unwrap();
        assert_eq!(view.control.control_label, "AC-2");
        assert_eq!(view.catalog_data.next.as_ref().unwrap().control_id, "ac-3");
        assert_eq!(view.catalog_data.previous.as_ref().unwrap().control_id, "ac-1");

        let narrative = view.component_data.inherited("Cool Component").unwrap();
        assert_eq!(narrative.title, "Cool Component");
        assert_eq!(narrative.description, "This component satisfies a.");
        assert_eq!(narrative.responsibility.as_deref(), Some("Hybrid"));
        assert_eq!(narrative.statements[0].statement_id, "ac-2_smt.a");
        assert_eq!(view.component_data.responsibility.as_deref(), Some("Hybrid"));
    }

    #[test]
    fn test_private_narrative_always_present() {
        let catalog = rev5_catalog();
        let mut project = snapshot();
        let system = component("Payments", CatalogVersion::NistSp80053R5, &["ac-2"]);
        let system_uuid = system.uuid;
        project.attach(system, ComponentRole::System).unwrap();
        let aggregator = ControlAggregator::new(&project, &catalog).unwrap();

        let view = aggregator.view("ac-2").unwrap();
        let implemented = view.component_data.private("Payments").unwrap();
        assert_eq!(implemented.component_uuid, system_uuid);
        assert_eq!(implemented.description, "Payments implements ac-2");
        assert!(implemented.implemented);

        let view = aggregator.view("ac-3").unwrap();
        let missing = view.component_data.system().unwrap();
        assert_eq!(missing.component_uuid, system_uuid);
        assert_eq!(missing.description, "");
        assert!(!missing.implemented);

        let view = aggregator.view("ac-2").unwrap();
        assert!(view.component_data.components.inherited.is_empty());
        assert_eq!(view.project.private_component, Some(system_uuid));
    }

    #[test]
    fn test_private_narrative_without_system_component() {
        let catalog = rev5_catalog();
        let project = snapshot();
        let view = ControlAggregator::new(&project, &catalog)
            .unwrap()
            .view("at-1")
            .unwrap();
        assert!(view.component_data.components.private.is_empty());
        assert!(view.component_data.system().is_none());
        assert_eq!(view.component_data.responsibility, None);
        assert_eq!(view.project.private_component, None);
    }

    #[test]
    fn test_narratives_keyed_by_title() {
        let catalog = rev5_catalog();
        let mut project = snapshot();
        let v5 = CatalogVersion::NistSp80053R5;
        let first_aws = component("AWS", v5, &["ac-2"]);
        let second_aws = component("AWS", v5, &["ac-2"]);
        let second_uuid = second_aws.uuid;
        project
            .attach(component("Zeta", v5, &["ac-2"]), ComponentRole::Inherited)
            .unwrap()
            .attach(first_aws, ComponentRole::Inherited)
            .unwrap()
            .attach(second_aws, ComponentRole::Inherited)
            .unwrap()
            .attach(component("Payments", v5, &["ac-2"]), ComponentRole::System)
            .unwrap();

        let view = ControlAggregator::new(&project, &catalog)
            .unwrap()
            .view("ac-2")
            .unwrap();
        let narratives = &view.component_data;
        assert_eq!(narratives.inherited("Zeta").unwrap().description, "Zeta implements ac-2");
        assert_eq!(narratives.inherited("AWS").unwrap().title, "AWS");
        let renamed = format!("AWS ({second_uuid})");
        assert_eq!(narratives.inherited(&renamed).unwrap().component_uuid, second_uuid);
        assert!(narratives.inherited("Payments").is_none());
        assert!(narratives.private("Payments").unwrap().implemented);

        let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&view).unwrap()).unwrap();
        let buckets = &json["component_data"]["components"];
        assert!(json["component_data"].get("responsibility").is_some());
        assert_eq!(buckets["inherited"]["Zeta"]["title"], "Zeta");
        assert_eq!(buckets["inherited"][renamed.as_str()]["component_uuid"], second_uuid.to_string());
        assert_eq!(buckets["private"]["Payments"]["enabled"], true);
        assert_eq!(buckets["inherited"].as_object().unwrap().len(), 3);

        let text = serde_json::to_string(&view.component_data.components.inherited.as_slice()[0]).unwrap();
        assert!(!text.contains("\"key\""));
        let rendered = serde_json::to_string(&view.component_data).unwrap();
        let zeta = rendered.find("\"Zeta\":").unwrap();
        let aws = rendered.find("\"AWS\":").unwrap();
        assert!(zeta < aws, "buckets keep attachment order");
    }

    #[test]
    fn test_unknown_control() {
        let catalog = rev5_catalog();
        let project = snapshot();
        let aggregator = ControlAggregator::new(&project, &catalog).unwrap();
        assert!(matches!(aggregator.view("xx-1"), Err(Error::ControlNotFound(_))));
    }

    #[test]
    fn test_catalog_mismatch() {
        let catalog = CatalogLoader::new(CatalogVersion::NistSp80053R4, ImpactLevel::Moderate)
            .from_json(REV4)
            .unwrap();
        let project = snapshot();
        assert!(matches!(
            ControlAggregator::new(&project, &catalog),
            Err(Error::CatalogNotFound { .. })
        ));
    }

    #[test]
    fn test_view_reflects_status_and_overrides() {
        let catalog = rev5_catalog();
        let mut project = snapshot();
        let aws = component("AWS", CatalogVersion::NistSp80053R5, &["ac-2"]);
        let aws_uuid = aws.uuid.to_string();
        project.attach(aws, ComponentRole::Inherited).unwrap();
        project.track("ac-2", ControlStatus::Incomplete).unwrap();

        let overrides = ControlAggregator::new(&project, &catalog)
            .unwrap()
            .toggle_narratives("ac-2", &[], &[aws_uuid.as_str()])
            .unwrap();
        project.apply_overrides(&overrides);

        let view = ControlAggregator::new(&project, &catalog)
            .unwrap()
            .view("ac-2")
            .unwrap();
        assert_eq!(view.status, ControlStatus::Incomplete);
        assert!(!view.component_data.inherited("AWS").unwrap().enabled);
    }

    #[test]
    fn test_toggle_rejects_unknown_component_atomically() {
        let catalog = rev5_catalog();
        let mut project = snapshot();
        let aws = component("AWS", CatalogVersion::NistSp80053R5, &["ac-2"]);
        let aws_uuid = aws.uuid.to_string();
        project.attach(aws, ComponentRole::Inherited).unwrap();
        let aggregator = ControlAggregator::new(&project, &catalog).unwrap();

        let stranger = Uuid::new_v4().to_string();
        match aggregator.toggle_narratives("ac-2", &[aws_uuid.as_str()], &[stranger.as_str()]) {
            Err(Error::UnknownComponent(id)) => assert_eq!(id, stranger),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            aggregator.toggle_narratives("ac-2", &["not-a-uuid"], &[]),
            Err(Error::UnknownComponent(_))
        ));
        assert!(Error::UnknownComponent(stranger).is_client_error());
    }

    #[test]
    fn test_toggle_disable_wins_over_enable() {
        let catalog = rev5_catalog();
        let mut project = snapshot();
        let aws = component("AWS", CatalogVersion::NistSp80053R5, &["ac-2"]);
        let aws_uuid = aws.uuid;
        let id = aws_uuid.to_string();
        project.attach(aws, ComponentRole::Inherited).unwrap();

        let overrides = ControlAggregator::new(&project, &catalog)
            .unwrap()
            .toggle_narratives("ac-2", &[id.as_str()], &[id.as_str()])
            .unwrap();
        assert_eq!(overrides.len(), 2);
        project.apply_overrides(&overrides);
        assert!(!project.is_narrative_enabled("ac-2", aws_uuid));
    }
}
