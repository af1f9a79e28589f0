use bytes::Bytes;
use store::{Storage, StoreError};

use crate::acl::AclDocument;
use crate::path::{FolderPath, UserId};

#[derive(Debug, thiserror::Error)]
pub enum AclError {
    #[error("no ACL document for folder '{0}'")]
    NotFound(FolderPath),
    #[error("malformed ACL document at '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode ACL document: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Reads and writes the `.permissions` sidecar of a folder.
///
/// A missing document is reported as [`AclError::NotFound`]; deciding what
/// that means is up to the caller.
#[derive(Debug, Clone)]
pub struct PermissionStore {
    storage: Storage,
}

impl PermissionStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn load(&self, folder: &FolderPath) -> Result<AclDocument, AclError> {
        let key = folder.acl_key();
        let body = self
            .storage
            .get(&key)
            .await?
            .ok_or_else(|| AclError::NotFound(folder.clone()))?;
        AclDocument::from_slice(&body).map_err(|source| AclError::Parse { key, source })
    }

    /// Whole-object overwrite. Concurrent writers race; the last one wins.
    pub async fn save(&self, folder: &FolderPath, doc: &AclDocument) -> Result<(), AclError> {
        let body = doc.to_vec().map_err(AclError::Encode)?;
        self.storage.put(&folder.acl_key(), Bytes::from(body)).await?;
        tracing::debug!(
            folder = %folder,
            owner = %doc.owner(),
            grants = doc.grants().len(),
            "saved ACL document"
        );
        Ok(())
    }

    /// Write the initial ACL for a newly created folder.
    pub async fn create(&self, folder: &FolderPath, owner: UserId) -> Result<AclDocument, AclError> {
        let doc = AclDocument::new(owner);
        self.save(folder, &doc).await?;
        tracing::info!(folder = %folder, owner = %doc.owner(), "created folder ACL");
        Ok(doc)
    }

    pub async fn exists(&self, folder: &FolderPath) -> Result<bool, AclError> {
        Ok(self.storage.exists(&folder.acl_key()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{Grant, Mode};

    fn folder(path: &str) -> FolderPath {
        FolderPath::normalize(path).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let permissions = PermissionStore::new(Storage::memory());
        let result = permissions.load(&folder("alice/docs")).await;
        assert!(matches!(result, Err(AclError::NotFound(f)) if f.as_str() == "alice/docs"));
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let storage = Storage::memory();
        let permissions = PermissionStore::new(storage.clone());

        permissions
            .create(&folder("alice/docs/"), user("alice"))
            .await
            .unwrap();

        // same document through either spelling of the path
        let doc = permissions.load(&folder("alice/docs")).await.unwrap();
        assert_eq!(doc.owner(), &user("alice"));
        assert!(doc.grants().is_empty());

        let raw = storage.get("alice/docs/.permissions").await.unwrap().unwrap();
        assert_eq!(raw.as_ref(), br#"{"owner":"alice"}"#);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let permissions = PermissionStore::new(Storage::memory());
        let docs = folder("alice/docs");

        let mut doc = permissions.create(&docs, user("alice")).await.unwrap();
        doc.set_grant(user("bob"), Grant::new(true, false));
        permissions.save(&docs, &doc).await.unwrap();

        let loaded = permissions.load(&docs).await.unwrap();
        assert!(loaded.allows(&user("bob"), Mode::Read));
        assert!(!loaded.allows(&user("bob"), Mode::Write));
    }

    #[tokio::test]
    async fn test_malformed_is_parse_error() {
        let storage = Storage::memory();
        storage
            .put("alice/docs/.permissions", "{\"_meta\":{\"owner\":\"alice\"}}".into())
            .await
            .unwrap();

        let permissions = PermissionStore::new(storage);
        let result = permissions.load(&folder("alice/docs")).await;
        assert!(matches!(result, Err(AclError::Parse { key, .. }) if key == "alice/docs/.permissions"));
    }
}
