//! Data model and persistence for people (profiles) and bonds (explicit
//! relationships).
//!
//! Bond endpoints are polymorphic at the boundary: renderers and older
//! payloads carry either a bare person id or a node object with an `id`
//! field. [`EndpointRef`] captures both shapes and normalizes to a bare id
//! before any graph logic runs.

mod people;
mod bonds;

pub use bonds::{
    dedupe_bonds, delete_bond, insert_bond, list_bonds, normalize_legacy_types, BondInput,
};
pub use people::{
    delete_person, get_person, insert_person, list_people, update_person, PersonInput,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One endpoint of a bond: a bare person id, or an object exposing an `id`
/// field (force-directed renderers swap endpoint ids for node objects in
/// place, so both shapes occur in the wild).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointRef {
    Id(String),
    Node { id: String },
}

impl EndpointRef {
    /// Normalized person id, whichever shape the endpoint arrived in.
    pub fn id(&self) -> &str {
        match self {
            EndpointRef::Id(id) => id,
            EndpointRef::Node { id } => id,
        }
    }
}

impl From<&str> for EndpointRef {
    fn from(id: &str) -> Self {
        EndpointRef::Id(id.to_string())
    }
}

impl From<String> for EndpointRef {
    fn from(id: String) -> Self {
        EndpointRef::Id(id)
    }
}

/// A person in the social graph. Only `id` matters to the graph core;
/// everything else is profile data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Person {
    /// A person carrying only an identity. Graph callers that have node ids
    /// but no profiles build their input this way.
    pub fn bare(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            vibe: None,
            img: None,
            bio: None,
            birthday: None,
            location: None,
            emoji: None,
            instagram: None,
            twitter: None,
            created_at: None,
        }
    }
}

/// An explicit relationship between two people.
///
/// Fields beyond the known set (narrative metadata added by other tooling)
/// are captured in `extra` and passed through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bond {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: EndpointRef,
    pub target: EndpointRef,
    #[serde(rename = "type")]
    pub bond_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bond {
    pub fn new(
        source: impl Into<EndpointRef>,
        target: impl Into<EndpointRef>,
        bond_type: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            bond_type: bond_type.into(),
            lore: None,
            created_at: None,
            extra: Map::new(),
        }
    }

    /// Normalized source person id.
    pub fn source_id(&self) -> &str {
        self.source.id()
    }

    /// Normalized target person id.
    pub fn target_id(&self) -> &str {
        self.target.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_ref_bare_id() {
        let endpoint: EndpointRef = serde_json::from_str(r#""person-1""#).unwrap();
        assert_eq!(endpoint.id(), "person-1");
        assert_eq!(endpoint, EndpointRef::Id("person-1".to_string()));
    }

    #[test]
    fn test_endpoint_ref_node_object() {
        // Renderers replace ids with full node objects; only `id` matters.
        let endpoint: EndpointRef =
            serde_json::from_str(r#"{"id": "person-2", "name": "Sarah", "x": 40.5}"#).unwrap();
        assert_eq!(endpoint.id(), "person-2");
    }

    #[test]
    fn test_bond_deserialize_mixed_endpoints() {
        let bond: Bond = serde_json::from_str(
            r#"{"source": "a", "target": {"id": "b"}, "type": "friend", "lore": "Met in CTIS 101"}"#,
        )
        .unwrap();
        assert_eq!(bond.source_id(), "a");
        assert_eq!(bond.target_id(), "b");
        assert_eq!(bond.bond_type, "friend");
        assert_eq!(bond.lore.as_deref(), Some("Met in CTIS 101"));
    }

    #[test]
    fn test_bond_extra_fields_pass_through() {
        let json = r#"{"source": "a", "target": "b", "type": "friend", "strength": 0.9}"#;
        let bond: Bond = serde_json::from_str(json).unwrap();
        assert_eq!(bond.extra.get("strength"), Some(&serde_json::json!(0.9)));

        let out = serde_json::to_value(&bond).unwrap();
        assert_eq!(out["strength"], serde_json::json!(0.9));
        assert_eq!(out["type"], "friend");
    }

    #[test]
    fn test_person_optional_fields_omitted() {
        let person = Person::bare("x");
        let out = serde_json::to_value(&person).unwrap();
        assert_eq!(out["id"], "x");
        assert!(out.get("vibe").is_none());
        assert!(out.get("created_at").is_none());
    }
}
