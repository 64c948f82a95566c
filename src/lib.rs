//! # Blueprint
//!
//! OSCAL compliance artifacts for NIST SP 800-53 projects.
//!
//! This crate models the three OSCAL documents a compliance project works
//! with (catalogs, component definitions and system security plans) and the
//! logic that assembles components against a catalog to track control
//! implementation and produce an SSP.
//!
//! ## Features
//!
//! - **OSCAL model**: strict serde types for the catalog, component-definition
//!   and SSP subsets, with kebab-case wire names and stable round trips
//! - **Catalog navigation**: indexed controls with parent, sibling, child,
//!   statement and parameter lookup
//! - **Component lookup**: control implementations by catalog version
//! - **Control aggregation**: per-control views over a project's components,
//!   narrative toggles and completion progress
//! - **SSP assembly**: one OSCAL SSP document per project snapshot
//!
//! ## Quick Start
//!
//! ```ignore
//! use blueprint::catalog::{CatalogLoader, CatalogVersion, ImpactLevel};
//! use blueprint::project::{ControlAggregator, ProjectSnapshot};
//! use blueprint::ssp::SspAssembler;
//!
//! fn main() -> blueprint::Result<()> {
//!     let catalog = CatalogLoader::new(CatalogVersion::NistSp80053R5, ImpactLevel::Moderate)
//!         .from_file("NIST_SP-800-53_rev5_MODERATE-baseline-resolved-profile_catalog.json")?;
//!
//!     let project = ProjectSnapshot::new("1", "Payments", catalog.version(), catalog.impact_level());
//!
//!     let view = ControlAggregator::new(&project, &catalog)?.view("ac-2")?;
//!     println!("{}: {}", view.control.control_label, view.control.title);
//!
//!     let json = SspAssembler::new(blueprint::config::config()).to_json(&project, &catalog)?;
//!     println!("{json}");
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
mod error;
#[cfg(feature = "observability")]
pub mod observability;
pub mod oscal;
pub mod project;
pub mod ssp;

// Re-exports
pub use config::{SspConfig, SspConfigBuilder};
pub use error::{Error, Result};
