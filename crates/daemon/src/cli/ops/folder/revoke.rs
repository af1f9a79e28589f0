use sharebox_daemon::http_server::api::client::ApiError;
use sharebox_daemon::http_server::api::v0::folder::revoke::RevokeRequest;
use sharebox_daemon::http_server::api::v0::folder::share::ShareResponse;

use super::share::format_report;

#[derive(Debug, thiserror::Error)]
pub enum FolderRevokeError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for RevokeRequest {
    type Error = FolderRevokeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: ShareResponse = client.call(self.clone()).await?;
        Ok(format_report(&self.folder, &response))
    }
}
