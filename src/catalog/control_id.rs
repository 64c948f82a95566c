//! OSCAL control identifiers
//!
//! SP 800-53 catalogs identify controls as `ac-2` and enhancements as
//! `ac-2.1`. The printed label form is `AC-2` / `AC-2(1)`, and the
//! zero-padded sort form is `ac-02` / `ac-02.01`.

use std::fmt;

/// A parsed OSCAL control identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlId {
    /// Control family (e.g., "ac", "ia")
    pub family: String,

    /// Control number within the family (e.g., "2")
    pub number: String,

    /// Enhancement number for control enhancements (e.g., "1" for `ac-2.1`)
    pub enhancement: Option<String>,
}

impl ControlId {
    /// Parse an id like "ac-2" or "ac-2.1"
    ///
    /// Returns `None` for anything that is not a control id, including
    /// statement part ids such as "ac-2_smt.a".
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (family, rest) = s.split_once('-')?;
        if family.is_empty() || !family.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let (number, enhancement) = match rest.split_once('.') {
            Some((number, enhancement)) => (number, Some(enhancement)),
            None => (rest, None),
        };

        let is_numeric = |v: &str| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit());
        if !is_numeric(number) || !enhancement.map(is_numeric).unwrap_or(true) {
            return None;
        }

        Some(Self {
            family: family.to_lowercase(),
            number: number.to_string(),
            enhancement: enhancement.map(str::to_string),
        })
    }

    /// Whether this is a control enhancement
    pub fn is_enhancement(&self) -> bool {
        self.enhancement.is_some()
    }

    /// Id of the base control (e.g., "ac-2" for "ac-2.1")
    pub fn base_id(&self) -> String {
        format!("{}-{}", self.family, self.number)
    }

    /// Upper-case family (e.g., "AC")
    pub fn family_label(&self) -> String {
        self.family.to_uppercase()
    }

    /// Printed label (e.g., "AC-2", "AC-2(1)")
    pub fn label(&self) -> String {
        match &self.enhancement {
            Some(enh) => format!("{}-{}({})", self.family_label(), self.number, enh),
            None => format!("{}-{}", self.family_label(), self.number),
        }
    }

    /// Zero-padded sort key (e.g., "ac-02", "ac-02.01")
    pub fn sort_id(&self) -> String {
        match &self.enhancement {
            Some(enh) => format!("{}-{:0>2}.{:0>2}", self.family, self.number, enh),
            None => format!("{}-{:0>2}", self.family, self.number),
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.enhancement {
            Some(enh) => write!(f, "{}.{}", self.base_id(), enh),
            None => write!(f, "{}", self.base_id()),
        }
    }
}

/// Family prefix of any control-like id, falling back to the text before the first dash
pub fn family_of(control_id: &str) -> String {
    ControlId::parse(control_id)
        .map(|id| id.family)
        .unwrap_or_else(|| {
            control_id
                .split('-')
                .next()
                .unwrap_or(control_id)
                .to_lowercase()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_control() {
        let id = ControlId::parse("ac-2").unwrap();
        assert_eq!(id.family, "ac");
        assert_eq!(id.number, "2");
        assert!(!id.is_enhancement());
        assert_eq!(id.label(), "AC-2");
        assert_eq!(id.sort_id(), "ac-02");
        assert_eq!(id.to_string(), "ac-2");
    }

    #[test]
    fn test_parse_enhancement() {
        let id = ControlId::parse("ac-2.13").unwrap();
        assert_eq!(id.enhancement.as_deref(), Some("13"));
        assert_eq!(id.base_id(), "ac-2");
        assert_eq!(id.label(), "AC-2(13)");
        assert_eq!(id.sort_id(), "ac-02.13");
    }

    #[test]
    fn test_rejects_non_control_ids() {
        assert!(ControlId::parse("ac-2_smt.a").is_none());
        assert!(ControlId::parse("ac").is_none());
        assert!(ControlId::parse("-2").is_none());
        assert!(ControlId::parse("ac-2.").is_none());
        assert!(ControlId::parse("not-a-control").is_none());
    }

    #[test]
    fn test_family_of() {
        assert_eq!(family_of("SC-28.1"), "sc");
        assert_eq!(family_of("pm-ops"), "pm");
    }
}
