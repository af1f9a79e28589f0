//! # Shortcut registries
//!
//! Each user has a registry at `<user>/Shared Folders/.shortcuts` that lists
//! the folders shared with them (and the folders they have shared), keyed by
//! folder path:
//!
//! ```json
//! { "alice/docs": { "path": "alice/docs", "owner": "alice" } }
//! ```
//!
//! The registry is only a navigation index. It grants nothing, so a missing
//! registry loads as empty instead of failing.
//!
//! Keys are [`FolderPath`]s, normalized on load, so an entry written as
//! `alice/docs/` is the same entry as `alice/docs`.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use store::{Storage, StoreError};

use crate::path::{FolderPath, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub path: FolderPath,
    pub owner: UserId,
}

pub type Shortcuts = BTreeMap<FolderPath, Shortcut>;

#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    #[error("malformed shortcut registry at '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode shortcut registry: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct ShortcutRegistry {
    storage: Storage,
}

impl ShortcutRegistry {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Load `user`'s registry, or an empty one if they have never had a
    /// folder shared with them.
    ///
    /// A registry that does not parse is an error and is never replaced
    /// with an empty one.
    pub async fn load(&self, user: &UserId) -> Result<Shortcuts, ShortcutError> {
        let key = user.registry_key();
        match self.storage.get(&key).await? {
            Some(body) => {
                serde_json::from_slice(&body).map_err(|source| ShortcutError::Parse { key, source })
            }
            None => Ok(Shortcuts::new()),
        }
    }

    pub async fn save(&self, user: &UserId, shortcuts: &Shortcuts) -> Result<(), ShortcutError> {
        let body = serde_json::to_vec(shortcuts).map_err(ShortcutError::Encode)?;
        self.storage
            .put(&user.registry_key(), Bytes::from(body))
            .await?;
        Ok(())
    }

    /// Point `user`'s registry at `folder`, replacing any existing entry.
    pub async fn register(
        &self,
        user: &UserId,
        folder: &FolderPath,
        owner: &UserId,
    ) -> Result<(), ShortcutError> {
        let mut shortcuts = self.load(user).await?;
        shortcuts.insert(
            folder.clone(),
            Shortcut {
                path: folder.clone(),
                owner: owner.clone(),
            },
        );
        self.save(user, &shortcuts).await?;
        tracing::debug!(user = %user, folder = %folder, "registered shortcut");
        Ok(())
    }

    /// Drop `folder` from `user`'s registry. Returns whether an entry existed.
    pub async fn unregister(&self, user: &UserId, folder: &FolderPath) -> Result<bool, ShortcutError> {
        let mut shortcuts = self.load(user).await?;
        if shortcuts.remove(folder.as_str()).is_none() {
            return Ok(false);
        }
        self.save(user, &shortcuts).await?;
        tracing::debug!(user = %user, folder = %folder, "removed shortcut");
        Ok(true)
    }
}
