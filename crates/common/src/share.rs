//! # Sharing
//!
//! Only a folder's owner may share it. Sharing touches several objects: each
//! grantee's shortcut registry, the owner's own registry, and the folder's
//! ACL. The store has no transactions, so the orchestrator runs these as a
//! list of steps:
//!
//! 1. check ownership and validate every target (no writes yet)
//! 2. per target: update the grantee's registry, then stage the grant in the
//!    in-memory ACL. A target whose registry update fails is skipped, so it
//!    never ends up with a grant but no shortcut
//! 3. register the folder in the owner's own registry
//! 4. save the ACL once
//!
//! Steps that already ran are not rolled back. Failed targets come back as
//! [`ShareError::Partial`], and the [`ShareJournal`] is logged so a partial
//! run can be reconciled by hand.

use serde::{Deserialize, Serialize};

use crate::acl::{AclDocument, Grant};
use crate::path::{FolderPath, UserId};
use crate::permissions::{AclError, PermissionStore};
use crate::shortcuts::{ShortcutError, ShortcutRegistry};

/// A user to share with and the permissions to give them.
///
/// `read == write == false` revokes the user's access instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareTarget {
    pub user: UserId,
    pub read: bool,
    pub write: bool,
}

impl ShareTarget {
    pub fn new(user: UserId, read: bool, write: bool) -> Self {
        Self { user, read, write }
    }

    pub fn grant(&self) -> Grant {
        Grant::new(self.read, self.write)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareReport {
    /// Users whose grant was written.
    pub granted: Vec<UserId>,
    /// Users whose grant was removed.
    pub revoked: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTarget {
    pub user: UserId,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("only the owner of '{folder}' may change its sharing")]
    Forbidden { folder: FolderPath, user: UserId },
    #[error("invalid share target '{user}': {reason}")]
    InvalidTarget { user: UserId, reason: &'static str },
    #[error("{} of the share steps failed", .failed.len())]
    Partial {
        report: ShareReport,
        failed: Vec<FailedTarget>,
    },
    #[error(transparent)]
    Acl(#[from] AclError),
}

// payloads only show up in the logged journal
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShareStep {
    RegistryUpdated(UserId),
    RegistryFailed(UserId),
    ShortcutRemoved(UserId),
    OwnerRegistryUpdated,
    OwnerRegistryFailed,
    AclSaved,
}

/// Record of the steps a share or revoke has completed.
#[derive(Debug, Clone)]
struct ShareJournal {
    folder: FolderPath,
    steps: Vec<ShareStep>,
}

impl ShareJournal {
    fn new(folder: &FolderPath) -> Self {
        Self {
            folder: folder.clone(),
            steps: Vec::new(),
        }
    }

    fn record(&mut self, step: ShareStep) {
        self.steps.push(step);
    }

    fn acl_saved(&self) -> bool {
        self.steps.contains(&ShareStep::AclSaved)
    }

    fn log_outcome(&self) {
        if self.acl_saved() {
            tracing::debug!(folder = %self.folder, steps = ?self.steps, "share journal");
        } else {
            tracing::warn!(
                folder = %self.folder,
                steps = ?self.steps,
                "ACL was not saved; completed registry steps need manual reconciliation"
            );
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShareOrchestrator {
    permissions: PermissionStore,
    shortcuts: ShortcutRegistry,
}

impl ShareOrchestrator {
    pub fn new(permissions: PermissionStore, shortcuts: ShortcutRegistry) -> Self {
        Self {
            permissions,
            shortcuts,
        }
    }

    async fn load_owned(&self, folder: &FolderPath, acting: &UserId) -> Result<AclDocument, ShareError> {
        let doc = self.permissions.load(folder).await?;
        if !doc.is_owner(acting) {
            tracing::warn!(folder = %folder, user = %acting, "non-owner attempted to change sharing");
            return Err(ShareError::Forbidden {
                folder: folder.clone(),
                user: acting.clone(),
            });
        }
        Ok(doc)
    }

    fn validate(doc: &AclDocument, user: &UserId) -> Result<(), ShareError> {
        let reason = if doc.is_owner(user) {
            "the owner already has full access"
        } else if user.is_reserved() {
            "reserved user id"
        } else {
            return Ok(());
        };
        Err(ShareError::InvalidTarget {
            user: user.clone(),
            reason,
        })
    }

    /// Grant each target access to `folder` and register the folder in their
    /// shortcut registry, on behalf of the folder's owner.
    #[tracing::instrument(skip_all, fields(folder = %folder, acting = %acting, targets = targets.len()))]
    pub async fn share_folder(
        &self,
        folder: &FolderPath,
        acting: &UserId,
        targets: &[ShareTarget],
    ) -> Result<ShareReport, ShareError> {
        let mut doc = self.load_owned(folder, acting).await?;
        for target in targets {
            Self::validate(&doc, &target.user)?;
        }

        let mut journal = ShareJournal::new(folder);
        let mut report = ShareReport::default();
        let mut failed = Vec::new();

        for target in targets {
            let grant = target.grant();
            if grant.is_empty() {
                // revocation: always drop the grant, the shortcut is best effort
                doc.remove_grant(&target.user);
                report.revoked.push(target.user.clone());
                match self.shortcuts.unregister(&target.user, folder).await {
                    Ok(_) => journal.record(ShareStep::ShortcutRemoved(target.user.clone())),
                    Err(e) => {
                        journal.record(ShareStep::RegistryFailed(target.user.clone()));
                        failed.push(Self::failure(&target.user, &e));
                    }
                }
                continue;
            }

            match self.shortcuts.register(&target.user, folder, acting).await {
                Ok(()) => {
                    journal.record(ShareStep::RegistryUpdated(target.user.clone()));
                    doc.set_grant(target.user.clone(), grant);
                    report.granted.push(target.user.clone());
                }
                Err(e) => {
                    tracing::error!(user = %target.user, error = %e, "failed to register shortcut");
                    journal.record(ShareStep::RegistryFailed(target.user.clone()));
                    failed.push(Self::failure(&target.user, &e));
                }
            }
        }

        match self.shortcuts.register(acting, folder, acting).await {
            Ok(()) => journal.record(ShareStep::OwnerRegistryUpdated),
            Err(e) => {
                tracing::error!(error = %e, "failed to register owner shortcut");
                journal.record(ShareStep::OwnerRegistryFailed);
                failed.push(Self::failure(acting, &e));
            }
        }

        let saved = self.permissions.save(folder, &doc).await;
        if saved.is_ok() {
            journal.record(ShareStep::AclSaved);
        }
        journal.log_outcome();
        saved?;

        Self::finish(report, failed)
    }

    /// Remove `users`' grants on `folder` and drop the folder from their
    /// shortcut registries.
    ///
    /// The ACL is saved before any registry is touched, so access is gone
    /// even if a registry update fails afterwards.
    #[tracing::instrument(skip_all, fields(folder = %folder, acting = %acting))]
    pub async fn revoke(
        &self,
        folder: &FolderPath,
        acting: &UserId,
        users: &[UserId],
    ) -> Result<ShareReport, ShareError> {
        let mut doc = self.load_owned(folder, acting).await?;
        for user in users {
            Self::validate(&doc, user)?;
        }

        let mut journal = ShareJournal::new(folder);
        let mut report = ShareReport::default();
        let mut failed = Vec::new();

        for user in users {
            doc.remove_grant(user);
            report.revoked.push(user.clone());
        }
        self.permissions.save(folder, &doc).await?;
        journal.record(ShareStep::AclSaved);

        for user in users {
            match self.shortcuts.unregister(user, folder).await {
                Ok(_) => journal.record(ShareStep::ShortcutRemoved(user.clone())),
                Err(e) => {
                    journal.record(ShareStep::RegistryFailed(user.clone()));
                    failed.push(Self::failure(user, &e));
                }
            }
        }

        // nobody left to share with: the folder no longer belongs in the
        // owner's shared list
        if doc.grants().is_empty() {
            match self.shortcuts.unregister(acting, folder).await {
                Ok(_) => journal.record(ShareStep::OwnerRegistryUpdated),
                Err(e) => {
                    journal.record(ShareStep::OwnerRegistryFailed);
                    failed.push(Self::failure(acting, &e));
                }
            }
        }

        journal.log_outcome();
        Self::finish(report, failed)
    }

    fn failure(user: &UserId, error: &ShortcutError) -> FailedTarget {
        FailedTarget {
            user: user.clone(),
            reason: error.to_string(),
        }
    }

    fn finish(report: ShareReport, failed: Vec<FailedTarget>) -> Result<ShareReport, ShareError> {
        if failed.is_empty() {
            Ok(report)
        } else {
            Err(ShareError::Partial { report, failed })
        }
    }
}
