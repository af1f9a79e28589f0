//! # Explorer
//!
//! The folder and object operations behind the HTTP API. These are thin
//! wrappers over the store. Every one checks access with the [`Authorizer`]
//! before it reads or writes any payload.

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use store::{ObjectEntry, Storage, StoreError};
use url::Url;

use crate::acl::Mode;
use crate::authz::{AuthzError, Authorizer};
use crate::path::{is_sidecar, FolderPath, ObjectKey, PathError, UserId};
use crate::permissions::{AclError, PermissionStore};
use crate::share::{ShareError, ShareOrchestrator, ShareReport, ShareTarget};
use crate::shortcuts::{ShortcutError, ShortcutRegistry, Shortcuts};

/// How long presigned download URLs stay valid.
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
    #[error("'{0}' already exists")]
    AlreadyExists(String),
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("'{0}' is managed by sharebox and cannot be accessed directly")]
    ReservedName(String),
    #[error(transparent)]
    Authz(#[from] AuthzError),
    #[error(transparent)]
    Acl(#[from] AclError),
    #[error(transparent)]
    Shortcut(#[from] ShortcutError),
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListing {
    pub folders: Vec<String>,
    pub files: Vec<ObjectEntry>,
    /// Only populated when listing a user's `Shared Folders`.
    pub shortcuts: Shortcuts,
}

/// Where a client can fetch an object from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    /// A presigned URL straight to the store.
    Signed(Url),
    /// The backend cannot sign; the object has to be proxied.
    Proxied(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provisioned {
    pub root_created: bool,
    pub shared_folders_created: bool,
}

#[derive(Debug, Clone)]
pub struct Explorer {
    storage: Storage,
    permissions: PermissionStore,
    authorizer: Authorizer,
    shortcuts: ShortcutRegistry,
    sharing: ShareOrchestrator,
}

impl Explorer {
    pub fn new(storage: Storage) -> Self {
        let permissions = PermissionStore::new(storage.clone());
        let shortcuts = ShortcutRegistry::new(storage.clone());
        Self {
            authorizer: Authorizer::new(permissions.clone()),
            sharing: ShareOrchestrator::new(permissions.clone(), shortcuts.clone()),
            storage,
            permissions,
            shortcuts,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    /// Create `user`'s root folder and their `Shared Folders`, owned by them.
    /// Existing ACLs are left alone.
    pub async fn provision_user(&self, user: &UserId) -> Result<Provisioned, ExplorerError> {
        let root = FolderPath::user_root(user);
        let shared = FolderPath::shared_folders(user);

        let mut provisioned = Provisioned::default();
        if !self.permissions.exists(&root).await? {
            self.permissions.create(&root, user.clone()).await?;
            provisioned.root_created = true;
        }
        if !self.permissions.exists(&shared).await? {
            self.permissions.create(&shared, user.clone()).await?;
            provisioned.shared_folders_created = true;
        }
        Ok(provisioned)
    }

    /// Create `parent/name`, owned by `user`. Needs write access to `parent`.
    pub async fn create_folder(
        &self,
        parent: &FolderPath,
        name: &str,
        user: &UserId,
    ) -> Result<FolderPath, ExplorerError> {
        self.authorizer.require(parent, user, Mode::Write).await?;

        let folder = parent.child(name)?;
        if self.permissions.exists(&folder).await? {
            return Err(ExplorerError::AlreadyExists(folder.to_string()));
        }
        self.permissions.create(&folder, user.clone()).await?;
        Ok(folder)
    }

    pub async fn list(&self, folder: &FolderPath, user: &UserId) -> Result<FolderListing, ExplorerError> {
        self.authorizer.require(folder, user, Mode::Read).await?;

        let listing = self.storage.list(folder.as_str()).await?;
        let files = listing
            .files
            .into_iter()
            .filter(|entry| {
                let name = entry.key.rsplit('/').next().unwrap_or(&entry.key);
                !is_sidecar(name)
            })
            .collect();

        let shortcuts = match folder.shared_folders_owner() {
            Some(owner) => self.shortcuts.load(&owner).await?,
            None => Shortcuts::new(),
        };

        Ok(FolderListing {
            folders: listing.folders,
            files,
            shortcuts,
        })
    }

    /// Store `data` as `prefix/name`. Needs write access to `prefix`.
    pub async fn upload(
        &self,
        prefix: &FolderPath,
        name: &str,
        data: Bytes,
        user: &UserId,
    ) -> Result<String, ExplorerError> {
        self.authorizer.require(prefix, user, Mode::Write).await?;

        let name = name.trim();
        if is_sidecar(name) {
            return Err(ExplorerError::ReservedName(name.to_string()));
        }
        // reuse segment validation; the result only names a key
        let key = prefix.child(name)?.to_string();
        self.storage.put(&key, data).await?;
        tracing::info!(key = %key, user = %user, "uploaded object");
        Ok(key)
    }

    /// Delete a file, or a whole folder when `key` ends with `/`.
    ///
    /// Needs write access to the folder the key names (for folders) or the
    /// folder the file is in.
    pub async fn delete(&self, key: &str, user: &UserId) -> Result<Vec<String>, ExplorerError> {
        let key = ObjectKey::parse(key)?;
        Self::check_not_sidecar(&key)?;
        self.authorizer
            .require(key.governing_folder(), user, Mode::Write)
            .await?;

        match &key {
            ObjectKey::Folder(folder) => {
                // sidecars go last so an interrupted delete stays governed by its ACL
                let deleted = self
                    .storage
                    .delete_prefix(folder.as_str(), |key| {
                        key.rsplit('/').next().is_some_and(is_sidecar)
                    })
                    .await?;
                if deleted.is_empty() {
                    return Err(ExplorerError::NotFound(key.to_string()));
                }
                tracing::info!(folder = %folder, user = %user, count = deleted.len(), "deleted folder");
                Ok(deleted)
            }
            ObjectKey::File { .. } => {
                let object_key = key.to_string();
                if !self.storage.exists(&object_key).await? {
                    return Err(ExplorerError::NotFound(object_key));
                }
                self.storage.delete(&object_key).await?;
                tracing::info!(key = %object_key, user = %user, "deleted object");
                Ok(vec![object_key])
            }
        }
    }

    /// Resolve where `user` can download `key` from. Needs read access to the
    /// file's folder.
    pub async fn download(&self, key: &str, user: &UserId) -> Result<Download, ExplorerError> {
        let object_key = self.readable_file(key, user).await?;
        if !self.storage.exists(&object_key).await? {
            return Err(ExplorerError::NotFound(object_key));
        }
        if !self.storage.can_sign() {
            return Ok(Download::Proxied(object_key));
        }
        let url = self.storage.signed_url(&object_key, DOWNLOAD_URL_TTL).await?;
        Ok(Download::Signed(url))
    }

    /// Read a file's bytes. Needs read access to the file's folder.
    pub async fn read_object(&self, key: &str, user: &UserId) -> Result<Bytes, ExplorerError> {
        let object_key = self.readable_file(key, user).await?;
        self.storage
            .get(&object_key)
            .await?
            .ok_or(ExplorerError::NotFound(object_key))
    }

    pub async fn share(
        &self,
        folder: &FolderPath,
        acting: &UserId,
        targets: &[ShareTarget],
    ) -> Result<ShareReport, ExplorerError> {
        Ok(self.sharing.share_folder(folder, acting, targets).await?)
    }

    pub async fn revoke(
        &self,
        folder: &FolderPath,
        acting: &UserId,
        users: &[UserId],
    ) -> Result<ShareReport, ExplorerError> {
        Ok(self.sharing.revoke(folder, acting, users).await?)
    }

    pub async fn shortcuts(&self, user: &UserId) -> Result<Shortcuts, ExplorerError> {
        Ok(self.shortcuts.load(user).await?)
    }

    async fn readable_file(&self, key: &str, user: &UserId) -> Result<String, ExplorerError> {
        let key = ObjectKey::parse(key)?;
        if let ObjectKey::Folder(_) = key {
            return Err(ExplorerError::InvalidPath(PathError::BadSegment(key.to_string())));
        }
        Self::check_not_sidecar(&key)?;
        self.authorizer
            .require(key.governing_folder(), user, Mode::Read)
            .await?;
        Ok(key.to_string())
    }

    fn check_not_sidecar(key: &ObjectKey) -> Result<(), ExplorerError> {
        match key {
            ObjectKey::File { name, .. } if is_sidecar(name) => {
                Err(ExplorerError::ReservedName(key.to_string()))
            }
            _ => Ok(()),
        }
    }
}
