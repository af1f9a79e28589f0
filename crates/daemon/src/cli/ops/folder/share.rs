use std::str::FromStr;

use clap::Args;

use sharebox_daemon::http_server::api::client::ApiError;
use sharebox_daemon::http_server::api::v0::folder::share::{
    ShareRequest, ShareResponse, TargetEntry,
};

/// A `--with` value: `<user>:<modes>`, modes being any of `r` and `w`.
/// An empty mode list (`bob:`) revokes access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetArg {
    pub user: String,
    pub read: bool,
    pub write: bool,
}

impl FromStr for TargetArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (user, modes) = s.split_once(':').unwrap_or((s, "r"));
        if user.is_empty() {
            return Err(format!("missing user in '{}'", s));
        }

        let mut target = TargetArg {
            user: user.to_string(),
            read: false,
            write: false,
        };
        for mode in modes.chars() {
            match mode {
                'r' => target.read = true,
                'w' => target.write = true,
                other => return Err(format!("unknown mode '{}' in '{}'", other, s)),
            }
        }
        Ok(target)
    }
}

#[derive(Args, Debug, Clone)]
pub struct Share {
    /// Folder to share (must be owned by --user)
    #[arg(long)]
    pub folder: String,

    /// Acting user
    #[arg(long)]
    pub user: String,

    /// Grant as `<user>:<modes>`, e.g. `bob:r` or `carol:rw`; repeatable
    #[arg(long = "with", required = true)]
    pub targets: Vec<TargetArg>,
}

#[derive(Debug, thiserror::Error)]
pub enum FolderShareError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

pub(crate) fn format_report(folder: &str, response: &ShareResponse) -> String {
    let mut lines = Vec::new();
    if !response.granted.is_empty() {
        let users: Vec<_> = response.granted.iter().map(|u| u.to_string()).collect();
        lines.push(format!("{} shared with: {}", folder, users.join(", ")));
    }
    if !response.revoked.is_empty() {
        let users: Vec<_> = response.revoked.iter().map(|u| u.to_string()).collect();
        lines.push(format!("{} revoked for: {}", folder, users.join(", ")));
    }
    for failed in &response.failed {
        lines.push(format!("failed for {}: {}", failed.user, failed.reason));
    }
    if lines.is_empty() {
        lines.push(format!("{}: nothing changed", folder));
    }
    lines.join("\n")
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Share {
    type Error = FolderShareError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let request = ShareRequest {
            folder: self.folder.clone(),
            user: self.user.clone(),
            targets: self
                .targets
                .iter()
                .map(|t| TargetEntry {
                    user: t.user.clone(),
                    read: t.read,
                    write: t.write,
                })
                .collect(),
        };

        let mut client = ctx.client.clone();
        let response: ShareResponse = client.call(request).await?;
        Ok(format_report(&self.folder, &response))
    }
}
