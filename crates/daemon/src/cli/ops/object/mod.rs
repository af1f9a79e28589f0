use clap::{Args, Subcommand};

pub mod rm;
pub mod upload;
pub mod url;

use crate::cli::op::Op;
use sharebox_daemon::http_server::api::v0::object::{RmRequest, UrlRequest};

crate::command_enum! {
    (Upload, upload::Upload),
    (Rm, RmRequest),
    (Url, UrlRequest),
}

pub type ObjectCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Object {
    #[command(subcommand)]
    pub command: ObjectCommand,
}

#[async_trait::async_trait]
impl Op for Object {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
