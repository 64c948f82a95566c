//! Assemblies shared by catalogs, component definitions and SSPs
//!
//! Metadata, properties, links, roles, parties and back-matter as defined by
//! the OSCAL 1.0 JSON schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::keyed::Keyed;

/// Single-line markup text
pub type MarkupLine = String;

/// Multi-line markup text
pub type MarkupMultiLine = String;

/// OSCAL version written into generated documents
pub const OSCAL_VERSION: &str = "1.0.2";

/// Property names the product interprets
///
/// Any other property name is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Who is responsible for the control (wire name `security_control_type`)
    Responsibility,
    /// Who provides the implementation (wire name `provider`)
    Provider,
}

impl PropertyKey {
    /// Property `name` on the wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Responsibility => "security_control_type",
            Self::Provider => "provider",
        }
    }

    pub fn all() -> [Self; 2] {
        [Self::Responsibility, Self::Provider]
    }

    /// Recognise a wire name
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|key| key.wire_name() == name)
    }
}

/// Name/value pair with optional namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Property {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ns: Option<String>,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: None,
            ns: None,
            value: value.into(),
            class: None,
            remarks: None,
        }
    }

    /// Property for one of the recognised keys
    pub fn keyed(key: PropertyKey, value: impl Into<String>) -> Self {
        Self::new(key.wire_name(), value)
    }
}

impl Keyed for Property {
    type Key = String;

    fn key(&self) -> &String {
        &self.name
    }
}

/// Value of the first property with a recognised key
pub fn find_property<'a>(props: impl IntoIterator<Item = &'a Property>, key: PropertyKey) -> Option<&'a str> {
    props
        .into_iter()
        .find(|p| p.name == key.wire_name())
        .map(|p| p.value.as_str())
}

/// Reference to a local or remote resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<MarkupLine>,
}

/// Role responsible for an element, optionally bound to parties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ResponsibleRole {
    pub role_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_uuids: Option<Vec<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

/// Party bound to a role in metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ResponsibleParty {
    pub role_id: String,
    pub party_uuids: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

/// Parameter value assignment made by an implementation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SetParameter {
    pub param_id: String,
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl SetParameter {
    pub fn new(param_id: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            param_id: param_id.into(),
            values,
            remarks: None,
        }
    }
}

impl Keyed for SetParameter {
    type Key = String;

    fn key(&self) -> &String {
        &self.param_id
    }
}

/// Function assumed by parties (e.g., "system-owner")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Role {
    pub id: String,
    pub title: MarkupLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<MarkupMultiLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExternalId {
    pub scheme: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TelephoneNumber {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub number_type: Option<String>,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Address {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr_lines: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Person or organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Party {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub party_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ids: Option<Vec<ExternalId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_addresses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone_numbers: Option<Vec<TelephoneNumber>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_uuids: Option<Vec<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_of_organizations: Option<Vec<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

/// Prior release of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Revision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MarkupLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oscal_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

/// Document identification and provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Metadata {
    pub title: MarkupLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
    pub version: String,
    pub oscal_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revisions: Option<Vec<Revision>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parties: Option<Vec<Party>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_parties: Option<Vec<ResponsibleParty>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl Metadata {
    /// Minimal metadata for a generated document
    pub fn new(title: impl Into<String>, version: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            published: None,
            last_modified,
            version: version.into(),
            oscal_version: OSCAL_VERSION.to_string(),
            revisions: None,
            props: None,
            links: None,
            roles: None,
            parties: None,
            responsible_parties: None,
            remarks: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ResourceHash {
    pub algorithm: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ResourceLink {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashes: Option<Vec<ResourceHash>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Citation {
    pub text: MarkupLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DocumentId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Base64 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub value: String,
}

/// Attachment or citation referenced from the document body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Resource {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MarkupLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<MarkupMultiLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_ids: Option<Vec<DocumentId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rlinks: Option<Vec<ResourceLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<Base64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<MarkupMultiLine>,
}

impl Resource {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: Some(title.into()),
            description: None,
            props: None,
            document_ids: None,
            citation: None,
            rlinks: None,
            base64: None,
            remarks: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BackMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_key_wire_names() {
        assert_eq!(PropertyKey::Responsibility.wire_name(), "security_control_type");
        assert_eq!(PropertyKey::from_wire("provider"), Some(PropertyKey::Provider));
        assert_eq!(PropertyKey::from_wire("responsibility"), None);
    }

    #[test]
    fn test_find_property_first_match() {
        let props = vec![
            Property::new("provider", "AWS"),
            Property::keyed(PropertyKey::Provider, "GCP"),
        ];
        assert_eq!(find_property(&props, PropertyKey::Provider), Some("AWS"));
        assert_eq!(find_property(&props, PropertyKey::Responsibility), None);
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let json = serde_json::to_string(&Property::new("provider", "AWS")).unwrap();
        assert_eq!(json, r#"{"name":"provider","value":"AWS"}"#);
    }

    #[test]
    fn test_kebab_case_and_declared_order() {
        let param = SetParameter::new("ac-1_prm_1", vec!["annually".to_string()]);
        assert_eq!(
            serde_json::to_string(&param).unwrap(),
            r#"{"param-id":"ac-1_prm_1","values":["annually"]}"#
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = serde_json::from_str::<Link>(r##"{"href":"#x","target":"_blank"}"##).unwrap_err();
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn test_metadata_timestamps() {
        let json = r#"{
            "title": "Cool Component",
            "published": "2021-09-04T02:25:34.558932+00:00",
            "last-modified": "2021-09-04T02:25:34.558936+00:00",
            "version": "1",
            "oscal-version": "1.0.0"
        }"#;
        let metadata: Metadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.title, "Cool Component");
        assert!(metadata.published.is_some());

        let again: Metadata = serde_json::from_str(&serde_json::to_string(&metadata).unwrap()).unwrap();
        assert_eq!(again, metadata);
    }
}
