//! Completion statistics over a catalog's control set

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::aggregate::ControlAggregator;
use super::{ControlStatus, ProjectSnapshot};
use crate::catalog::Catalog;

/// Counts per status for a set of controls
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FamilyProgress {
    pub title: String,
    pub total: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub not_started: usize,
}

impl FamilyProgress {
    fn count(&mut self, status: ControlStatus) {
        self.total += 1;
        match status {
            ControlStatus::Complete => self.complete += 1,
            ControlStatus::Incomplete => self.incomplete += 1,
            ControlStatus::NotStarted => self.not_started += 1,
        }
    }

    /// Complete as a percentage of total
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.complete as f64 / self.total as f64) * 100.0
    }
}

/// Project progress across every control in the catalog
///
/// Controls the project does not track count as not started.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub not_started: usize,
    pub percent_complete: f64,
    /// Keyed by family id
    pub by_family: BTreeMap<String, FamilyProgress>,
}

impl Progress {
    pub fn compute(project: &ProjectSnapshot, catalog: &Catalog) -> Self {
        let mut overall = FamilyProgress::default();
        let mut by_family: BTreeMap<String, FamilyProgress> = BTreeMap::new();

        for control in catalog.controls() {
            let status = project.status(&control.control_id);
            overall.count(status);
            by_family
                .entry(control.family.clone())
                .or_insert_with(|| FamilyProgress {
                    title: catalog
                        .families()
                        .iter()
                        .find(|f| f.id == control.family)
                        .map(|f| f.title.clone())
                        .unwrap_or_else(|| control.family.to_uppercase()),
                    ..FamilyProgress::default()
                })
                .count(status);
        }

        Self {
            total: overall.total,
            complete: overall.complete,
            incomplete: overall.incomplete,
            not_started: overall.not_started,
            percent_complete: overall.percent_complete(),
            by_family,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Project Progress")?;
        writeln!(f, "================")?;
        writeln!(f, "Total Controls:  {}", self.total)?;
        writeln!(f, "  Complete:      {}", self.complete)?;
        writeln!(f, "  Incomplete:    {}", self.incomplete)?;
        writeln!(f, "  Not Started:   {}", self.not_started)?;
        writeln!(f, "Percent:         {:.1}%", self.percent_complete)?;
        Ok(())
    }
}

impl ControlAggregator<'_> {
    /// Completion statistics for the project over the catalog
    pub fn progress(&self) -> Progress {
        Progress::compute(self.project(), self.catalog())
    }
}
