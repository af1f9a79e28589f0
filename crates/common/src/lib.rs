/**
 * ACL documents: who owns a folder and what
 *  every other user may do in it.
 */
pub mod acl;
/**
 * Access decisions over the ACL documents.
 *  Fails closed on missing documents.
 */
pub mod authz;
/**
 * Folder and object operations, each one
 *  gated by the authorizer.
 */
pub mod explorer;
/**
 * Folder paths, user ids and the store keys
 *  derived from them.
 */
pub mod path;
/**
 * Persistence of the per-folder `.permissions`
 *  sidecar.
 */
pub mod permissions;
/**
 * Owner-only sharing and revocation across the
 *  ACL and the users' shortcut registries.
 */
pub mod share;
/**
 * Per-user registries of shared folders.
 */
pub mod shortcuts;

pub mod prelude {
    pub use crate::acl::{AclDocument, Grant, Mode};
    pub use crate::authz::{AuthzError, Authorizer};
    pub use crate::explorer::{Download, Explorer, ExplorerError, FolderListing, Provisioned};
    pub use crate::path::{FolderPath, ObjectKey, PathError, UserId};
    pub use crate::permissions::{AclError, PermissionStore};
    pub use crate::share::{FailedTarget, ShareError, ShareOrchestrator, ShareReport, ShareTarget};
    pub use crate::shortcuts::{Shortcut, ShortcutError, ShortcutRegistry, Shortcuts};
    pub use store::{Storage, StoreConfig};
}
