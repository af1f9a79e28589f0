//! # ACL documents
//!
//! One document per folder, stored as a sidecar object at
//! `<folder>/.permissions`. The body is a flat JSON object: the `owner` field
//! next to one entry per grantee, keyed by user id.
//!
//! ```json
//! { "owner": "alice", "bob": { "read": true, "write": false } }
//! ```
//!
//! The owner never needs a grant entry; ownership implies full access.
//! Anything that does not match this shape is a parse error. That includes the
//! legacy `_meta.owner` layout. A malformed document is never treated as an
//! empty ACL.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::path::{UserId, OWNER_FIELD};

/// The access being requested on a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Read,
    Write,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Read => write!(f, "read"),
            Mode::Write => write!(f, "write"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Mode::Read),
            "write" => Ok(Mode::Write),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// Per-user permissions on one folder. Unset modes deny.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grant {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
}

impl Grant {
    pub fn new(read: bool, write: bool) -> Self {
        Self { read, write }
    }

    pub fn allows(&self, mode: Mode) -> bool {
        match mode {
            Mode::Read => self.read,
            Mode::Write => self.write,
        }
    }

    /// A grant that allows nothing; equivalent to having no entry at all.
    pub fn is_empty(&self) -> bool {
        !self.read && !self.write
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclDocument {
    owner: UserId,
    grants: BTreeMap<UserId, Grant>,
}

impl AclDocument {
    /// A fresh document for a newly created folder.
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            grants: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn is_owner(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    pub fn grants(&self) -> &BTreeMap<UserId, Grant> {
        &self.grants
    }

    pub fn grant(&self, user: &UserId) -> Option<&Grant> {
        self.grants.get(user)
    }

    /// Overwrite `user`'s grant. This is not merged with any prior grant.
    pub fn set_grant(&mut self, user: UserId, grant: Grant) {
        self.grants.insert(user, grant);
    }

    pub fn remove_grant(&mut self, user: &UserId) -> Option<Grant> {
        self.grants.remove(user)
    }

    /// The authorization decision: owner bypass first, then the explicit
    /// grant for `mode`, denying when either is absent.
    pub fn allows(&self, user: &UserId, mode: Mode) -> bool {
        if self.is_owner(user) {
            return true;
        }
        self.grants
            .get(user)
            .map(|grant| grant.allows(mode))
            .unwrap_or(false)
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl Serialize for AclDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.grants.len() + 1))?;
        map.serialize_entry(OWNER_FIELD, self.owner.as_str())?;
        for (user, grant) in &self.grants {
            map.serialize_entry(user.as_str(), grant)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AclDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AclDocumentVisitor)
    }
}

struct AclDocumentVisitor;

impl<'de> Visitor<'de> for AclDocumentVisitor {
    type Value = AclDocument;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an object with an `owner` field and per-user grants")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut owner: Option<UserId> = None;
        let mut grants = BTreeMap::new();

        while let Some(key) = access.next_key::<String>()? {
            if key == OWNER_FIELD {
                if owner.is_some() {
                    return Err(de::Error::duplicate_field(OWNER_FIELD));
                }
                let raw: String = access.next_value()?;
                owner = Some(UserId::parse(&raw).map_err(de::Error::custom)?);
            } else {
                let user = UserId::parse(&key).map_err(de::Error::custom)?;
                let grant: Grant = access.next_value()?;
                grants.insert(user, grant);
            }
        }

        let owner = owner.ok_or_else(|| de::Error::missing_field(OWNER_FIELD))?;
        // an explicit owner entry adds nothing over the bypass
        grants.remove(&owner);

        Ok(AclDocument { owner, grants })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[test]
    fn test_encode_flat_shape() {
        let mut doc = AclDocument::new(user("alice"));
        doc.set_grant(user("bob"), Grant::new(true, false));

        let value: serde_json::Value = serde_json::from_slice(&doc.to_vec().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "owner": "alice",
                "bob": { "read": true, "write": false }
            })
        );
    }

    #[test]
    fn test_decode_flat_shape() {
        let doc = AclDocument::from_slice(
            br#"{"owner":"alice","bob":{"read":true},"carol":{"read":true,"write":true}}"#,
        )
        .unwrap();
        assert_eq!(doc.owner(), &user("alice"));
        assert_eq!(doc.grant(&user("bob")), Some(&Grant::new(true, false)));
        assert_eq!(doc.grant(&user("carol")), Some(&Grant::new(true, true)));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        // legacy layout has no top-level owner
        assert!(AclDocument::from_slice(br#"{"_meta":{"owner":"alice"}}"#).is_err());
        assert!(AclDocument::from_slice(br#"{}"#).is_err());
        assert!(AclDocument::from_slice(br#"{"owner":42}"#).is_err());
        assert!(AclDocument::from_slice(br#"{"owner":"alice","bob":true}"#).is_err());
        assert!(
            AclDocument::from_slice(br#"{"owner":"alice","bob":{"read":true,"admin":true}}"#)
                .is_err()
        );
        assert!(AclDocument::from_slice(br#"{"owner":"alice","owner":"bob"}"#).is_err());
        assert!(AclDocument::from_slice(b"not json").is_err());
        assert!(AclDocument::from_slice(br#"[]"#).is_err());
    }

    #[test]
    fn test_owner_entry_dropped_on_decode() {
        let doc = AclDocument::from_slice(
            br#"{"owner":"alice","alice":{"read":false,"write":false}}"#,
        )
        .unwrap();
        assert!(doc.grants().is_empty());
        assert!(doc.allows(&user("alice"), Mode::Write));
    }

    #[test]
    fn test_allows() {
        let mut doc = AclDocument::new(user("alice"));
        doc.set_grant(user("bob"), Grant::new(true, false));
        doc.set_grant(user("dave"), Grant::default());

        assert!(doc.allows(&user("alice"), Mode::Read));
        assert!(doc.allows(&user("alice"), Mode::Write));
        assert!(doc.allows(&user("bob"), Mode::Read));
        assert!(!doc.allows(&user("bob"), Mode::Write));
        assert!(!doc.allows(&user("carol"), Mode::Read));
        assert!(!doc.allows(&user("carol"), Mode::Write));
        assert!(!doc.allows(&user("dave"), Mode::Read));
    }

    #[test]
    fn test_set_grant_overwrites() {
        let mut doc = AclDocument::new(user("alice"));
        doc.set_grant(user("bob"), Grant::new(true, true));
        doc.set_grant(user("bob"), Grant::new(true, false));
        assert_eq!(doc.grant(&user("bob")), Some(&Grant::new(true, false)));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("read".parse::<Mode>().unwrap(), Mode::Read);
        assert_eq!("write".parse::<Mode>().unwrap(), Mode::Write);
        assert!("admin".parse::<Mode>().is_err());
        assert_eq!(Mode::Write.to_string(), "write");
    }
}
