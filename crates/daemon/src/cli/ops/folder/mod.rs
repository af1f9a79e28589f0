use clap::{Args, Subcommand};

pub mod create;
pub mod ls;
pub mod revoke;
pub mod share;
pub mod shortcuts;

use crate::cli::op::Op;
use sharebox_daemon::http_server::api::v0::folder::{
    CreateRequest, LsRequest, RevokeRequest, ShortcutsRequest,
};

crate::command_enum! {
    (Create, CreateRequest),
    (Ls, LsRequest),
    (Share, share::Share),
    (Revoke, RevokeRequest),
    (Shortcuts, ShortcutsRequest),
}

pub type FolderCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Folder {
    #[command(subcommand)]
    pub command: FolderCommand,
}

#[async_trait::async_trait]
impl Op for Folder {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
