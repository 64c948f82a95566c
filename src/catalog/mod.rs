//! Indexed Security Control Catalogs
//!
//! A [`Catalog`] is an OSCAL catalog document flattened into an index of
//! [`CatalogControl`] nodes, built once per load. Every navigation query is a
//! hash lookup followed by at most one more lookup for the related node.
//!
//! Sibling order follows the document. Enhancements are siblings of the other
//! enhancements of the same control; top-level controls of every group form a
//! single chain, so the control after the last AC control is the first AT
//! control.
//!
//! # Usage
//!
//! ```ignore
//! use blueprint::catalog::{CatalogLoader, CatalogVersion, ImpactLevel};
//!
//! let catalog = CatalogLoader::new(CatalogVersion::NistSp80053R5, ImpactLevel::Moderate)
//!     .from_file("catalogs/NIST_SP-800-53_rev5_MODERATE.json")?;
//!
//! let ac2 = catalog.control("ac-2")?;
//! println!("{} {}", ac2.control_label, ac2.title);
//! if let Some(next) = catalog.next("ac-2")? {
//!     println!("next: {}", next.control_label);
//! }
//! ```

mod baseline;
mod control_id;
mod loader;

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::oscal::{Parameter, Part};

pub use baseline::{CatalogVersion, ImpactLevel};
pub use control_id::{family_of, ControlId};
pub use loader::{CatalogLoader, CatalogStats};

/// Control family taken from a top-level catalog group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    /// Group id (e.g., "ac")
    pub id: String,
    /// Group title (e.g., "Access Control")
    pub title: String,
}

/// One control or enhancement in a catalog index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogControl {
    pub control_id: String,
    /// Printed label (e.g., "AC-2(1)")
    pub control_label: String,
    /// Sort key (e.g., "ac-02.01")
    pub sort_id: String,
    pub title: String,
    /// Family id this control belongs to
    pub family: String,
    pub withdrawn: bool,
    /// Enclosing control for enhancements
    pub parent: Option<String>,
    pub previous: Option<String>,
    pub next: Option<String>,
    /// Enhancement ids in document order
    pub children: Vec<String>,
    /// Statement parts, nested items included
    pub statements: Vec<Part>,
    pub parameters: Vec<Parameter>,
}

impl CatalogControl {
    /// Ids of every statement part and sub-item, depth first
    pub fn statement_ids(&self) -> Vec<&str> {
        self.statements
            .iter()
            .flat_map(|part| part.walk())
            .filter_map(|part| part.id.as_deref())
            .collect()
    }

    pub fn is_enhancement(&self) -> bool {
        self.parent.is_some()
    }
}

/// A loaded catalog for one version and impact level
#[derive(Debug, Clone)]
pub struct Catalog {
    version: CatalogVersion,
    impact_level: ImpactLevel,
    title: String,
    source: String,
    families: Vec<Family>,
    controls: Vec<CatalogControl>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub(crate) fn new(
        version: CatalogVersion,
        impact_level: ImpactLevel,
        title: String,
        source: String,
    ) -> Self {
        Self {
            version,
            impact_level,
            title,
            source,
            families: Vec::new(),
            controls: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub(crate) fn push_family(&mut self, family: Family) {
        if !self.families.iter().any(|f| f.id == family.id) {
            self.families.push(family);
        }
    }

    /// Add a node; control ids are unique within a catalog
    pub(crate) fn push_control(&mut self, control: CatalogControl) -> Result<()> {
        if self.index.contains_key(&control.control_id) {
            return Err(Error::schema_field(
                "id",
                format!("duplicate control id '{}' in catalog", control.control_id),
            ));
        }
        self.index.insert(control.control_id.clone(), self.controls.len());
        self.controls.push(control);
        Ok(())
    }

    pub fn version(&self) -> CatalogVersion {
        self.version
    }

    pub fn impact_level(&self) -> ImpactLevel {
        self.impact_level
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// URI the catalog was loaded from, used as the SSP import-profile href
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn families(&self) -> &[Family] {
        &self.families
    }

    /// All controls and enhancements, depth-first document order
    pub fn controls(&self) -> &[CatalogControl] {
        &self.controls
    }

    pub fn control_ids(&self) -> impl Iterator<Item = &str> {
        self.controls.iter().map(|c| c.control_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn contains(&self, control_id: &str) -> bool {
        self.index.contains_key(control_id)
    }

    /// Look up a control by id
    pub fn control(&self, control_id: &str) -> Result<&CatalogControl> {
        self.index
            .get(control_id)
            .map(|&pos| &self.controls[pos])
            .ok_or_else(|| Error::ControlNotFound(control_id.to_string()))
    }

    fn related(&self, id: Option<&String>) -> Option<&CatalogControl> {
        id.and_then(|id| self.index.get(id.as_str()))
            .map(|&pos| &self.controls[pos])
    }

    /// Enclosing control of an enhancement; `None` for top-level controls
    pub fn parent(&self, control_id: &str) -> Result<Option<&CatalogControl>> {
        let control = self.control(control_id)?;
        Ok(self.related(control.parent.as_ref()))
    }

    /// Next sibling in document order
    pub fn next(&self, control_id: &str) -> Result<Option<&CatalogControl>> {
        let control = self.control(control_id)?;
        Ok(self.related(control.next.as_ref()))
    }

    /// Previous sibling in document order
    pub fn previous(&self, control_id: &str) -> Result<Option<&CatalogControl>> {
        let control = self.control(control_id)?;
        Ok(self.related(control.previous.as_ref()))
    }

    /// Direct enhancements in document order
    pub fn children(&self, control_id: &str) -> Result<Vec<&CatalogControl>> {
        let control = self.control(control_id)?;
        Ok(control
            .children
            .iter()
            .filter_map(|id| self.related(Some(id)))
            .collect())
    }

    /// Statement parts the control defines
    pub fn statements(&self, control_id: &str) -> Result<&[Part]> {
        Ok(&self.control(control_id)?.statements)
    }

    /// Parameters the control declares
    pub fn parameters(&self, control_id: &str) -> Result<&[Parameter]> {
        Ok(&self.control(control_id)?.parameters)
    }

    /// Controls belonging to a family
    pub fn family_controls<'a>(&'a self, family: &'a str) -> impl Iterator<Item = &'a CatalogControl> + 'a {
        self.controls.iter().filter(move |c| c.family == family)
    }
}

/// Loaded catalogs keyed by version and impact level
#[derive(Debug, Clone, Default)]
pub struct CatalogRegistry {
    catalogs: HashMap<(CatalogVersion, ImpactLevel), Catalog>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog, returning the one it replaces
    pub fn insert(&mut self, catalog: Catalog) -> Option<Catalog> {
        tracing::debug!(
            version = %catalog.version(),
            impact_level = %catalog.impact_level(),
            controls = catalog.len(),
            "Registered catalog"
        );
        self.catalogs
            .insert((catalog.version(), catalog.impact_level()), catalog)
    }

    pub fn get(&self, version: CatalogVersion, impact_level: ImpactLevel) -> Result<&Catalog> {
        self.catalogs
            .get(&(version, impact_level))
            .ok_or(Error::CatalogNotFound {
                version,
                impact_level,
            })
    }

    /// Registered (version, level) pairs, sorted
    pub fn keys(&self) -> Vec<(CatalogVersion, ImpactLevel)> {
        let mut keys: Vec<_> = self.catalogs.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const REV5: &str = include_str!("../../testdata/NIST_SP-800-53_rev5_test.json");
    pub(crate) const REV4: &str = include_str!("../../testdata/NIST_SP-800-53_rev4_test.json");

    pub(crate) fn rev5_catalog() -> Catalog {
        CatalogLoader::new(CatalogVersion::NistSp80053R5, ImpactLevel::Moderate)
            .from_json(REV5)
            .unwrap()
    }

    #[test]
    fn test_lookup_control() {
        let catalog = rev5_catalog();
        let ac2 = catalog.control("ac-2").unwrap();
        assert_eq!(ac2.control_label, "AC-2");
        assert_eq!(ac2.sort_id, "ac-02");
        assert_eq!(ac2.family, "ac");
        assert!(!ac2.is_enhancement());
    }

    #[test]
    fn test_unknown_control() {
        let catalog = rev5_catalog();
        match catalog.control("zz-99") {
            Err(Error::ControlNotFound(id)) => assert_eq!(id, "zz-99"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(catalog.next("zz-99").is_err());
        assert!(catalog.parent("zz-99").is_err());
    }

    #[test]
    fn test_next_and_previous() {
        let catalog = rev5_catalog();
        assert_eq!(catalog.next("ac-2").unwrap().unwrap().control_id, "ac-3");
        assert_eq!(catalog.previous("ac-2").unwrap().unwrap().control_id, "ac-1");
        assert!(catalog.previous("ac-1").unwrap().is_none());
        assert!(catalog.next("pe-3").unwrap().is_none());
    }

    #[test]
    fn test_top_level_chain_crosses_groups() {
        let catalog = rev5_catalog();
        assert_eq!(catalog.next("ac-3").unwrap().unwrap().control_id, "at-1");
        assert_eq!(catalog.previous("at-1").unwrap().unwrap().control_id, "ac-3");
        assert_eq!(catalog.next("at-3").unwrap().unwrap().control_id, "pe-3");
    }

    #[test]
    fn test_enhancement_navigation() {
        let catalog = rev5_catalog();
        assert_eq!(catalog.parent("ac-2.1").unwrap().unwrap().control_id, "ac-2");
        assert!(catalog.parent("ac-2").unwrap().is_none());
        assert_eq!(catalog.next("ac-2.1").unwrap().unwrap().control_id, "ac-2.2");
        assert!(catalog.next("ac-2.2").unwrap().is_none());
        assert!(catalog.previous("ac-2.1").unwrap().is_none());

        let children: Vec<_> = catalog
            .children("ac-2")
            .unwrap()
            .iter()
            .map(|c| c.control_id.as_str())
            .collect();
        assert_eq!(children, vec!["ac-2.1", "ac-2.2"]);
        assert_eq!(catalog.control("ac-2.1").unwrap().control_label, "AC-2(1)");
    }

    #[test]
    fn test_statements_and_parameters() {
        let catalog = rev5_catalog();
        assert_eq!(catalog.statements("ac-2").unwrap().len(), 1);
        assert_eq!(
            catalog.control("ac-2").unwrap().statement_ids(),
            vec!["ac-2_smt", "ac-2_smt.a", "ac-2_smt.b"]
        );
        let params: Vec<_> = catalog
            .parameters("ac-2")
            .unwrap()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(params, vec!["ac-2_prm_1", "ac-2_prm_2"]);
        assert!(catalog.parameters("at-1").unwrap().is_empty());
    }

    #[test]
    fn test_document_order() {
        let catalog = rev5_catalog();
        let ids: Vec<_> = catalog.control_ids().collect();
        assert_eq!(
            ids,
            vec!["ac-1", "ac-2", "ac-2.1", "ac-2.2", "ac-3", "at-1", "at-2", "at-3", "pe-3"]
        );
        let families: Vec<_> = catalog.families().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(families, vec!["ac", "at", "pe"]);
        assert_eq!(catalog.family_controls("at").count(), 3);
    }

    #[test]
    fn test_registry() {
        let mut registry = CatalogRegistry::new();
        registry.insert(rev5_catalog());
        registry.insert(
            CatalogLoader::new(CatalogVersion::NistSp80053R4, ImpactLevel::Low)
                .from_json(REV4)
                .unwrap(),
        );

        assert_eq!(registry.len(), 2);
        assert!(registry
            .get(CatalogVersion::NistSp80053R5, ImpactLevel::Moderate)
            .unwrap()
            .contains("ac-3"));
        assert!(matches!(
            registry.get(CatalogVersion::NistSp80053R4, ImpactLevel::High),
            Err(Error::CatalogNotFound { .. })
        ));
        assert_eq!(
            registry.keys(),
            vec![
                (CatalogVersion::NistSp80053R4, ImpactLevel::Low),
                (CatalogVersion::NistSp80053R5, ImpactLevel::Moderate),
            ]
        );
    }
}
