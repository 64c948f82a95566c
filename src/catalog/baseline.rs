//! Catalog Versions and Impact Levels
//!
//! Identifies which revision of NIST SP 800-53 a catalog, component
//! implementation or project targets, and which FIPS 199 baseline applies.
//!
//! | Version | Wire string | Baselines |
//! |---------|-------------|-----------|
//! | SP 800-53 Rev 4 | `NIST_SP80053R4` | low, moderate, high |
//! | SP 800-53 Rev 5 | `NIST_SP80053R5` | low, moderate, high |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const OSCAL_CONTENT: &str =
    "https://raw.githubusercontent.com/usnistgov/oscal-content/main/nist.gov/SP800-53";

/// NIST SP 800-53 revision a document targets
///
/// The wire form is the variant's upper-case tag, which is also the string
/// component definitions store in `control-implementations[].description`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum CatalogVersion {
    /// NIST SP 800-53 Revision 4
    #[serde(rename = "NIST_SP80053R4")]
    NistSp80053R4,

    /// NIST SP 800-53 Revision 5
    #[default]
    #[serde(rename = "NIST_SP80053R5")]
    NistSp80053R5,
}

impl CatalogVersion {
    /// Wire tag (e.g., "NIST_SP80053R5")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NistSp80053R4 => "NIST_SP80053R4",
            Self::NistSp80053R5 => "NIST_SP80053R5",
        }
    }

    /// Human-readable name for display and logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::NistSp80053R4 => "NIST SP 800-53 Rev 4",
            Self::NistSp80053R5 => "NIST SP 800-53 Rev 5",
        }
    }

    /// All supported versions, oldest first
    pub fn all() -> [Self; 2] {
        [Self::NistSp80053R4, Self::NistSp80053R5]
    }

    /// Parse a wire tag; anything else is not a catalog version
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "NIST_SP80053R4" => Some(Self::NistSp80053R4),
            "NIST_SP80053R5" => Some(Self::NistSp80053R5),
            _ => None,
        }
    }

    fn revision_dir(&self) -> &'static str {
        match self {
            Self::NistSp80053R4 => "rev4",
            Self::NistSp80053R5 => "rev5",
        }
    }

    fn file_stem(&self) -> &'static str {
        match self {
            Self::NistSp80053R4 => "NIST_SP-800-53_rev4",
            Self::NistSp80053R5 => "NIST_SP-800-53_rev5",
        }
    }

    /// Published location of the resolved baseline catalog for an impact level
    pub fn baseline_href(&self, level: ImpactLevel) -> String {
        format!(
            "{}/{}/json/{}_{}-baseline-resolved-profile_catalog.json",
            OSCAL_CONTENT,
            self.revision_dir(),
            self.file_stem(),
            level.as_str().to_uppercase()
        )
    }
}

impl fmt::Display for CatalogVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown catalog version: {s}"))
    }
}

/// FIPS 199 impact level of a baseline or project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    /// Limited adverse effect
    Low,

    /// Serious adverse effect (most common baseline)
    #[default]
    Moderate,

    /// Severe or catastrophic adverse effect
    High,
}

impl ImpactLevel {
    /// Wire form (e.g., "moderate")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    /// OSCAL security objective token (e.g., "fips-199-moderate")
    pub fn fips199(&self) -> String {
        format!("fips-199-{}", self.as_str())
    }

    /// All levels, lowest first
    pub fn all() -> [Self; 3] {
        [Self::Low, Self::Moderate, Self::High]
    }

    /// Parse a level name, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "moderate" | "mod" => Some(Self::Moderate),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown impact level: {s}"))
    }
}
