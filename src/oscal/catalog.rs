//! OSCAL Catalog Model v1.0
//!
//! Document shapes for NIST SP 800-53 catalogs and resolved baseline profiles.
//! Navigation over a loaded catalog lives in [`crate::catalog`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{BackMatter, Link, MarkupLine, MarkupMultiLine, Metadata, Property};
use super::element::OscalElement;

/// Root wrapper: `{"catalog": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CatalogModel {
    pub catalog: CatalogDocument,
}

impl OscalElement for CatalogModel {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CatalogDocument {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<Control>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_matter: Option<BackMatter>,
}

impl OscalElement for CatalogDocument {}

/// Control family or other grouping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub title: MarkupLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<Control>>,
}

/// Control or control enhancement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Control {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub title: MarkupLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<Control>>,
}

impl Control {
    /// Value of the first property with this name
    pub fn prop(&self, name: &str) -> Option<&str> {
        self.props
            .iter()
            .flatten()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Printed label from the `label` property
    pub fn label(&self) -> Option<&str> {
        self.prop("label")
    }

    /// Sort key from the `sort-id` property
    pub fn sort_id(&self) -> Option<&str> {
        self.prop("sort-id")
    }

    /// Whether the control is marked withdrawn
    pub fn is_withdrawn(&self) -> bool {
        self.prop("status")
            .map(|s| s.eq_ignore_ascii_case("withdrawn"))
            .unwrap_or(false)
    }

    /// Child enhancements
    pub fn enhancements(&self) -> &[Control] {
        self.controls.as_deref().unwrap_or(&[])
    }

    /// Parts named `statement`
    pub fn statement_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().flatten().filter(|p| p.name == "statement")
    }
}

/// Prose part of a control (statement, guidance, objective, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MarkupLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prose: Option<MarkupMultiLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
}

impl Part {
    /// This part and all nested parts, depth first
    pub fn walk(&self) -> Vec<&Part> {
        let mut out = vec![self];
        for child in self.parts.iter().flatten() {
            out.extend(child.walk());
        }
        out
    }
}

/// Parameter declared by a control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Parameter {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<MarkupLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<MarkupMultiLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<Constraint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<Vec<Guideline>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<MarkupMultiLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<ConstraintTest>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConstraintTest {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Guideline {
    pub prose: MarkupMultiLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_many: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<Vec<MarkupLine>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = include_str!("../../testdata/NIST_SP-800-53_rev5_test.json");

    #[test]
    fn test_parse_test_catalog() {
        let model = CatalogModel::from_json(CATALOG).unwrap();
        let groups = model.catalog.groups.as_ref().unwrap();
        assert_eq!(groups[0].id.as_deref(), Some("ac"));

        let ac2 = &groups[0].controls.as_ref().unwrap()[1];
        assert_eq!(ac2.id, "ac-2");
        assert_eq!(ac2.label(), Some("AC-2"));
        assert_eq!(ac2.sort_id(), Some("ac-02"));
        assert_eq!(ac2.enhancements()[0].id, "ac-2.1");
        assert_eq!(ac2.statement_parts().count(), 1);
    }

    #[test]
    fn test_catalog_round_trip_is_stable() {
        let model = CatalogModel::from_json(CATALOG).unwrap();
        let first = model.to_json().unwrap();
        let second = CatalogModel::from_json(&first).unwrap().to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_part_walk_is_depth_first() {
        let model = CatalogModel::from_json(CATALOG).unwrap();
        let ac2 = &model.catalog.groups.as_ref().unwrap()[0].controls.as_ref().unwrap()[1];
        let ids: Vec<_> = ac2
            .statement_parts()
            .flat_map(|p| p.walk())
            .filter_map(|p| p.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["ac-2_smt", "ac-2_smt.a", "ac-2_smt.b"]);
    }

    #[test]
    fn test_withdrawn_status() {
        let model = CatalogModel::from_json(CATALOG).unwrap();
        let ac2 = &model.catalog.groups.as_ref().unwrap()[0].controls.as_ref().unwrap()[1];
        assert!(!ac2.is_withdrawn());
        assert!(ac2.enhancements()[1].is_withdrawn());
    }
}
