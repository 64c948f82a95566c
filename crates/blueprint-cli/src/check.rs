//! Strict checks for component-definition files
//!
//! Loading a component definition is lenient about repeated keys so that
//! documents written by other tools still open. `check` reports what the
//! lenient load let through, plus references and targets the core cannot use.

use std::collections::HashSet;

use blueprint::catalog::Catalog;
use blueprint::oscal::{ComponentDefinition, ControlImplementation};
use serde::Serialize;

/// How bad a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Violates a uniqueness rule; the core would reject this on insert
    Error,
    /// Usable, but part of the document will be ignored
    Warning,
}

/// One problem found in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    /// Where in the document, e.g. "component e35accd9-..."
    pub location: String,
    pub message: String,
}

impl Finding {
    fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            location: location.into(),
            message: message.into(),
        }
    }

    fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Result of checking one component definition
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub title: String,
    pub components: usize,
    pub findings: Vec<Finding>,
    pub error_count: usize,
    pub warning_count: usize,
    pub passed: bool,
}

impl CheckResult {
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }
}

/// Check a component definition, optionally against a catalog
///
/// With a catalog, control ids the catalog does not contain are warnings.
pub fn check_definition(definition: &ComponentDefinition, catalog: Option<&Catalog>) -> CheckResult {
    let mut findings = Vec::new();

    if definition.components.has_duplicates() {
        findings.push(Finding::error("components", "component uuids are not unique"));
    }
    if definition.capabilities.has_duplicates() {
        findings.push(Finding::error("capabilities", "capability uuids are not unique"));
    }

    for component in definition.components.iter() {
        let location = format!("component {}", component.uuid);
        if component.control_implementations.is_empty() {
            findings.push(Finding::warning(&location, "no control implementations"));
        }

        let mut versions = HashSet::new();
        for implementation in &component.control_implementations {
            check_implementation(&location, implementation, catalog, &mut findings);
            if let Some(version) = implementation.catalog_version() {
                if !versions.insert(version) {
                    findings.push(Finding::warning(
                        &location,
                        format!("second implementation for {version} is never looked up"),
                    ));
                }
            }
        }
    }

    for capability in definition.capabilities.iter() {
        for missing in capability.unresolved_components(definition) {
            findings.push(Finding::warning(
                format!("capability {}", capability.uuid),
                format!("incorporates unknown component {missing}"),
            ));
        }
    }

    let error_count = findings.iter().filter(|f| f.severity == Severity::Error).count();
    let warning_count = findings.len() - error_count;

    CheckResult {
        title: definition.metadata.title.clone(),
        components: definition.components.len(),
        findings,
        error_count,
        warning_count,
        passed: error_count == 0,
    }
}

fn check_implementation(
    component: &str,
    implementation: &ControlImplementation,
    catalog: Option<&Catalog>,
    findings: &mut Vec<Finding>,
) {
    let location = format!("{component} / implementation {}", implementation.uuid);

    match implementation.catalog_version() {
        None => findings.push(Finding::warning(
            &location,
            format!(
                "description '{}' is not a catalog version",
                String::from(implementation.description.clone())
            ),
        )),
        Some(version) => {
            if let Some(catalog) = catalog.filter(|c| c.version() == version) {
                for requirement in implementation.implemented_requirements.iter() {
                    if !catalog.contains(&requirement.control_id) {
                        findings.push(Finding::warning(
                            &location,
                            format!("{} is not in the catalog", requirement.control_id),
                        ));
                    }
                }
            }
        }
    }

    if implementation.implemented_requirements.has_duplicates() {
        findings.push(Finding::error(&location, "implemented requirements repeat a control-id"));
    }

    for requirement in implementation.implemented_requirements.iter() {
        let location = format!("{location} / {}", requirement.control_id);
        if requirement.statements.has_duplicates() {
            findings.push(Finding::error(&location, "statements repeat a statement-id"));
        }
        if requirement.set_parameters.has_duplicates() {
            findings.push(Finding::error(&location, "set-parameters repeat a param-id"));
        }
        if requirement.props.as_ref().is_some_and(|props| props.has_duplicates()) {
            findings.push(Finding::error(&location, "props repeat a name"));
        }
    }
}
