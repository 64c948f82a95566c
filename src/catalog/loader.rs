//! Catalog Loader
//!
//! Parses OSCAL catalog JSON (root object `catalog`) and builds the
//! navigation index of a [`Catalog`].

use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::{Catalog, CatalogControl, CatalogVersion, ControlId, Family, ImpactLevel};
use crate::error::Result;
use crate::oscal::{CatalogDocument, CatalogModel, Control, Group, OscalElement};

/// Builds [`Catalog`] indexes for one version and impact level
///
/// # Usage
///
/// ```ignore
/// use blueprint::catalog::{CatalogLoader, CatalogVersion, ImpactLevel};
///
/// let loader = CatalogLoader::new(CatalogVersion::NistSp80053R4, ImpactLevel::High);
/// let catalog = loader.from_file("catalogs/NIST_SP-800-53_rev4_HIGH.json")?;
/// println!("{}", catalog.stats());
/// ```
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    version: CatalogVersion,
    impact_level: ImpactLevel,
    source: Option<String>,
}

impl CatalogLoader {
    pub fn new(version: CatalogVersion, impact_level: ImpactLevel) -> Self {
        Self {
            version,
            impact_level,
            source: None,
        }
    }

    /// Override the source URI recorded on the catalog
    ///
    /// Defaults to the published NIST baseline location.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Load from a JSON file
    pub fn from_file(&self, path: impl AsRef<Path>) -> Result<Catalog> {
        let path = path.as_ref();
        let model = CatalogModel::from_file(path)?;
        tracing::debug!(path = %path.display(), "Read catalog file");
        self.from_model(&model)
    }

    /// Load from JSON content
    pub fn from_json(&self, json: &str) -> Result<Catalog> {
        let model = CatalogModel::from_json(json)?;
        self.from_model(&model)
    }

    /// Index an already parsed catalog
    pub fn from_model(&self, model: &CatalogModel) -> Result<Catalog> {
        let document = &model.catalog;
        let source = self
            .source
            .clone()
            .unwrap_or_else(|| self.version.baseline_href(self.impact_level));
        let mut catalog = Catalog::new(
            self.version,
            self.impact_level,
            document.metadata.title.clone(),
            source,
        );

        let top_level = top_level_controls(document, &mut catalog);
        index_chain(&mut catalog, &top_level, None)?;

        tracing::info!(
            version = %self.version,
            impact_level = %self.impact_level,
            controls = catalog.len(),
            families = catalog.families().len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }
}

/// Top-level controls of the document and all groups, in document order,
/// paired with their family id
fn top_level_controls<'a>(document: &'a CatalogDocument, catalog: &mut Catalog) -> Vec<(&'a Control, String)> {
    let mut out: Vec<(&Control, String)> = document
        .controls
        .iter()
        .flatten()
        .map(|c| (c, super::family_of(&c.id)))
        .collect();

    for group in document.groups.iter().flatten() {
        collect_group(group, None, catalog, &mut out);
    }
    out
}

fn collect_group<'a>(
    group: &'a Group,
    family: Option<&str>,
    catalog: &mut Catalog,
    out: &mut Vec<(&'a Control, String)>,
) {
    // Nested groups stay in the family of their outermost group
    let family = match family {
        Some(family) => family.to_string(),
        None => {
            let id = group.id.clone().unwrap_or_else(|| {
                group
                    .controls
                    .iter()
                    .flatten()
                    .next()
                    .map(|c| super::family_of(&c.id))
                    .unwrap_or_default()
            });
            catalog.push_family(Family {
                id: id.clone(),
                title: group.title.clone(),
            });
            id
        }
    };

    for control in group.controls.iter().flatten() {
        out.push((control, family.clone()));
    }
    for nested in group.groups.iter().flatten() {
        collect_group(nested, Some(&family), catalog, out);
    }
}

/// Index one sibling chain, then each member's enhancements depth first
fn index_chain(catalog: &mut Catalog, chain: &[(&Control, String)], parent: Option<&str>) -> Result<()> {
    for (pos, (control, family)) in chain.iter().enumerate() {
        let id = ControlId::parse(&control.id);
        let node = CatalogControl {
            control_id: control.id.clone(),
            control_label: control
                .label()
                .map(str::to_string)
                .or_else(|| id.as_ref().map(ControlId::label))
                .unwrap_or_else(|| control.id.to_uppercase()),
            sort_id: control
                .sort_id()
                .map(str::to_string)
                .or_else(|| id.as_ref().map(ControlId::sort_id))
                .unwrap_or_else(|| control.id.clone()),
            title: control.title.clone(),
            family: family.clone(),
            withdrawn: control.is_withdrawn(),
            parent: parent.map(str::to_string),
            previous: pos.checked_sub(1).map(|p| chain[p].0.id.clone()),
            next: chain.get(pos + 1).map(|(c, _)| c.id.clone()),
            children: control.enhancements().iter().map(|c| c.id.clone()).collect(),
            statements: control.statement_parts().cloned().collect(),
            parameters: control.params.clone().unwrap_or_default(),
        };
        catalog.push_control(node)?;

        let enhancements: Vec<_> = control
            .enhancements()
            .iter()
            .map(|c| (c, family.clone()))
            .collect();
        index_chain(catalog, &enhancements, Some(&control.id))?;
    }
    Ok(())
}

impl Catalog {
    /// Get statistics about the loaded catalog
    pub fn stats(&self) -> CatalogStats {
        let enhancements = self.controls().iter().filter(|c| c.is_enhancement()).count();
        CatalogStats {
            version: self.version(),
            impact_level: self.impact_level(),
            total_controls: self.len(),
            base_controls: self.len() - enhancements,
            enhancements,
            families: self.families().len(),
            withdrawn: self.controls().iter().filter(|c| c.withdrawn).count(),
        }
    }
}

/// Statistics about a loaded catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub version: CatalogVersion,
    pub impact_level: ImpactLevel,
    /// Controls plus enhancements
    pub total_controls: usize,
    pub base_controls: usize,
    pub enhancements: usize,
    pub families: usize,
    /// Entries marked withdrawn
    pub withdrawn: usize,
}

impl fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Catalog Statistics")?;
        writeln!(f, "==================")?;
        writeln!(f, "Version:          {}", self.version.name())?;
        writeln!(f, "Impact Level:     {}", self.impact_level)?;
        writeln!(f, "Total Controls:   {}", self.total_controls)?;
        writeln!(f, "  Base:           {}", self.base_controls)?;
        writeln!(f, "  Enhancements:   {}", self.enhancements)?;
        writeln!(f, "Families:         {}", self.families)?;
        writeln!(f, "Withdrawn:        {}", self.withdrawn)?;
        Ok(())
    }
}
