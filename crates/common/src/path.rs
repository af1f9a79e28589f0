//! # Paths and identities
//!
//! Every store key in Sharebox is derived from a [`FolderPath`] or a
//! [`UserId`]. Both can only be built through their parsing constructors, so a
//! key is always computed from a normalized value and
//! `alice/docs/` and `alice/docs` address the same ACL.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the per-folder ACL sidecar object.
pub const ACL_FILE_NAME: &str = ".permissions";
/// Name of the per-user shortcut registry object.
pub const SHORTCUTS_FILE_NAME: &str = ".shortcuts";
/// Folder under each user's root that holds their shortcut registry.
pub const SHARED_FOLDERS_NAME: &str = "Shared Folders";

/// Reserved key in the flat ACL encoding.
pub(crate) const OWNER_FIELD: &str = "owner";

const DELIMITER: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("invalid path segment '{0}'")]
    BadSegment(String),
    #[error("invalid user id '{0}'")]
    BadUser(String),
    #[error("'{0}' is a reserved name")]
    Reserved(String),
}

fn check_segment(segment: &str) -> Result<(), PathError> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.chars().any(|c| c.is_control() || c == '\\')
    {
        return Err(PathError::BadSegment(segment.to_string()));
    }
    Ok(())
}

/// Whether `name` is one of the sidecar objects managed by Sharebox itself.
pub fn is_sidecar(name: &str) -> bool {
    name == ACL_FILE_NAME || name == SHORTCUTS_FILE_NAME
}

/// A canonical folder path: no leading or trailing slash, no empty segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FolderPath(String);

impl FolderPath {
    /// Normalize a raw folder path as it arrives from a request.
    ///
    /// Strips leading and trailing slashes and collapses repeated ones.
    pub fn normalize(raw: &str) -> Result<Self, PathError> {
        let segments: Vec<&str> = raw
            .trim()
            .split(DELIMITER)
            .filter(|s| !s.is_empty())
            .collect();
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        for segment in &segments {
            check_segment(segment)?;
        }
        Ok(Self(segments.join("/")))
    }

    /// Root folder of a user's namespace.
    pub fn user_root(user: &UserId) -> Self {
        Self(user.as_str().to_string())
    }

    /// The `<user>/Shared Folders` folder.
    pub fn shared_folders(user: &UserId) -> Self {
        Self(format!("{}/{}", user, SHARED_FOLDERS_NAME))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store key of this folder's ACL document.
    pub fn acl_key(&self) -> String {
        format!("{}/{}", self.0, ACL_FILE_NAME)
    }

    /// Store key of an object directly inside this folder.
    pub fn object_key(&self, name: &str) -> String {
        format!("{}/{}", self.0, name)
    }

    /// Last segment.
    pub fn name(&self) -> &str {
        self.0.rsplit(DELIMITER).next().unwrap_or(&self.0)
    }

    pub fn parent(&self) -> Option<FolderPath> {
        self.0
            .rsplit_once(DELIMITER)
            .map(|(parent, _)| Self(parent.to_string()))
    }

    /// Append a single segment.
    pub fn child(&self, name: &str) -> Result<FolderPath, PathError> {
        let name = name.trim().trim_matches(DELIMITER);
        if name.contains(DELIMITER) {
            return Err(PathError::BadSegment(name.to_string()));
        }
        check_segment(name)?;
        if is_sidecar(name) {
            return Err(PathError::Reserved(name.to_string()));
        }
        Ok(Self(format!("{}/{}", self.0, name)))
    }

    /// First segment, the user whose namespace this folder lives in.
    pub fn namespace(&self) -> &str {
        self.0.split(DELIMITER).next().unwrap_or(&self.0)
    }

    /// If this is some user's `Shared Folders` folder, return that user.
    pub fn shared_folders_owner(&self) -> Option<UserId> {
        let (user, rest) = self.0.split_once(DELIMITER)?;
        if rest == SHARED_FOLDERS_NAME {
            UserId::parse(user).ok()
        } else {
            None
        }
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FolderPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FolderPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<FolderPath> for String {
    fn from(value: FolderPath) -> Self {
        value.0
    }
}

/// A user identifier. Forms the first segment of that user's namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let raw = raw.trim();
        if raw.is_empty()
            || raw.contains(DELIMITER)
            || check_segment(raw).is_err()
        {
            return Err(PathError::BadUser(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store key of this user's shortcut registry.
    pub fn registry_key(&self) -> String {
        format!("{}/{}/{}", self.0, SHARED_FOLDERS_NAME, SHORTCUTS_FILE_NAME)
    }

    /// The flat ACL encoding stores the owner under this id, so it can never
    /// hold a grant.
    pub fn is_reserved(&self) -> bool {
        self.0 == OWNER_FIELD
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// An object key as sent by a client: either a folder (trailing slash) or a
/// file inside a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKey {
    Folder(FolderPath),
    File { parent: FolderPath, name: String },
}

impl ObjectKey {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let raw = raw.trim();
        if raw.ends_with(DELIMITER) {
            return FolderPath::normalize(raw).map(ObjectKey::Folder);
        }
        let folder = FolderPath::normalize(raw)?;
        match folder.parent() {
            Some(parent) => Ok(ObjectKey::File {
                name: folder.name().to_string(),
                parent,
            }),
            // a bare user id names a namespace, not a file
            None => Err(PathError::BadSegment(raw.to_string())),
        }
    }

    /// The folder whose ACL governs this key.
    pub fn governing_folder(&self) -> &FolderPath {
        match self {
            ObjectKey::Folder(folder) => folder,
            ObjectKey::File { parent, .. } => parent,
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKey::Folder(folder) => write!(f, "{}/", folder),
            ObjectKey::File { parent, name } => write!(f, "{}/{}", parent, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_slashes() {
        let a = FolderPath::normalize("alice/docs").unwrap();
        let b = FolderPath::normalize("alice/docs/").unwrap();
        let c = FolderPath::normalize("/alice//docs///").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.acl_key(), "alice/docs/.permissions");
        assert_eq!(b.acl_key(), "alice/docs/.permissions");
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert_eq!(FolderPath::normalize(""), Err(PathError::Empty));
        assert_eq!(FolderPath::normalize("///"), Err(PathError::Empty));
        assert!(matches!(
            FolderPath::normalize("alice/../bob"),
            Err(PathError::BadSegment(_))
        ));
        assert!(matches!(
            FolderPath::normalize("alice/\u{0}"),
            Err(PathError::BadSegment(_))
        ));
    }

    #[test]
    fn test_navigation() {
        let docs = FolderPath::normalize("alice/docs/reports").unwrap();
        assert_eq!(docs.name(), "reports");
        assert_eq!(docs.namespace(), "alice");
        assert_eq!(docs.parent().unwrap().as_str(), "alice/docs");
        assert!(FolderPath::normalize("alice").unwrap().parent().is_none());

        let child = docs.child("2024/").unwrap();
        assert_eq!(child.as_str(), "alice/docs/reports/2024");
        assert!(docs.child("a/b").is_err());
        assert!(matches!(
            docs.child(".permissions"),
            Err(PathError::Reserved(_))
        ));
    }

    #[test]
    fn test_shared_folders() {
        let bob = UserId::parse("bob").unwrap();
        let shared = FolderPath::shared_folders(&bob);
        assert_eq!(shared.as_str(), "bob/Shared Folders");
        assert_eq!(bob.registry_key(), "bob/Shared Folders/.shortcuts");
        assert_eq!(shared.shared_folders_owner(), Some(bob));

        let other = FolderPath::normalize("bob/Shared Folders/x").unwrap();
        assert_eq!(other.shared_folders_owner(), None);
    }

    #[test]
    fn test_user_id() {
        assert!(UserId::parse("").is_err());
        assert!(UserId::parse("a/b").is_err());
        assert!(UserId::parse("..").is_err());
        assert!(UserId::parse("owner").unwrap().is_reserved());
        assert!(!UserId::parse("alice").unwrap().is_reserved());
    }

    #[test]
    fn test_object_key() {
        let file = ObjectKey::parse("alice/docs/a.txt").unwrap();
        assert_eq!(file.governing_folder().as_str(), "alice/docs");
        assert_eq!(file.to_string(), "alice/docs/a.txt");

        let folder = ObjectKey::parse("alice/docs/").unwrap();
        assert_eq!(folder, ObjectKey::Folder(FolderPath::normalize("alice/docs").unwrap()));
        assert_eq!(folder.to_string(), "alice/docs/");

        assert!(ObjectKey::parse("alice").is_err());
    }

    #[test]
    fn test_serde_normalizes() {
        let folder: FolderPath = serde_json::from_str("\"alice/docs/\"").unwrap();
        assert_eq!(folder.as_str(), "alice/docs");
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }
}
