//! Roles and users derived from project stakeholders

use std::collections::HashSet;

use uuid::Uuid;

use crate::oscal::{Role, User};
use crate::project::Stakeholder;

/// Role id for a title: spaces become dashes, then lowercased
///
/// "System Owner" becomes "system-owner".
pub fn role_id(title: &str) -> String {
    title.trim().replace(' ', "-").to_lowercase()
}

/// Split a stakeholder title into display title and short name
///
/// A parenthesized abbreviation wins ("Authorizing Official (AO)" gives
/// `("Authorizing Official", "AO")`); otherwise the short name is the first
/// letter of each word.
pub fn split_title(raw: &str) -> (String, String) {
    if let (Some(open), Some(close)) = (raw.find('('), raw.find(')')) {
        if open < close {
            let title = raw[..open].trim().to_string();
            let short = raw[open + 1..close].trim().to_string();
            return (title, short);
        }
    }
    let title = raw.trim().to_string();
    let short = title
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect();
    (title, short)
}

/// Roles for metadata and users for the system implementation
///
/// Stakeholders with an empty title are skipped; the first stakeholder for a
/// role id wins.
pub fn derive_roles(stakeholders: &[Stakeholder]) -> (Vec<Role>, Vec<User>) {
    let mut seen = HashSet::new();
    let mut roles = Vec::new();
    let mut users = Vec::new();

    for stakeholder in stakeholders {
        let (title, short_name) = split_title(&stakeholder.title);
        if title.is_empty() {
            continue;
        }
        let id = role_id(&title);
        if !seen.insert(id.clone()) {
            tracing::debug!(role_id = %id, "Skipping duplicate stakeholder role");
            continue;
        }

        users.push(User {
            uuid: Uuid::new_v4(),
            title: Some(title.clone()),
            short_name: Some(short_name.clone()),
            description: None,
            props: stakeholder.property.clone().map(|p| vec![p]),
            links: None,
            role_ids: Some(vec![id.clone()]),
            remarks: None,
        });
        roles.push(Role {
            id,
            title,
            short_name: Some(short_name.to_uppercase()),
            description: None,
            props: None,
            links: None,
            remarks: None,
        });
    }

    (roles, users)
}
