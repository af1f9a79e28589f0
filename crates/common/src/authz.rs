use crate::acl::Mode;
use crate::permissions::{AclError, PermissionStore};
use crate::path::{FolderPath, UserId};

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("{user} does not have {mode} access to '{folder}'")]
    Denied {
        folder: FolderPath,
        user: UserId,
        mode: Mode,
    },
    #[error(transparent)]
    Acl(#[from] AclError),
}

/// Decides folder access from the folder's ACL document.
///
/// Every call re-reads the document, so decisions always reflect the latest
/// saved ACL.
#[derive(Debug, Clone)]
pub struct Authorizer {
    permissions: PermissionStore,
}

impl Authorizer {
    pub fn new(permissions: PermissionStore) -> Self {
        Self { permissions }
    }

    /// `Ok(false)` when the folder has no ACL document: access fails closed.
    /// Malformed documents and store failures are errors, never an allow.
    pub async fn authorize(
        &self,
        folder: &FolderPath,
        user: &UserId,
        mode: Mode,
    ) -> Result<bool, AclError> {
        let allowed = match self.permissions.load(folder).await {
            Ok(doc) => doc.allows(user, mode),
            Err(AclError::NotFound(_)) => false,
            Err(e) => return Err(e),
        };
        tracing::debug!(folder = %folder, user = %user, mode = %mode, allowed, "authorize");
        Ok(allowed)
    }

    /// Like [`Authorizer::authorize`], but turns a deny into an error so
    /// request handlers can bail out with `?` before touching any payload.
    pub async fn require(
        &self,
        folder: &FolderPath,
        user: &UserId,
        mode: Mode,
    ) -> Result<(), AuthzError> {
        if self.authorize(folder, user, mode).await? {
            Ok(())
        } else {
            Err(AuthzError::Denied {
                folder: folder.clone(),
                user: user.clone(),
                mode,
            })
        }
    }
}
