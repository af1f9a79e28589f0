use sharebox_daemon::http_server::api::client::ApiError;
use sharebox_daemon::http_server::api::v0::folder::create::{CreateRequest, CreateResponse};

#[derive(Debug, thiserror::Error)]
pub enum FolderCreateError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for CreateRequest {
    type Error = FolderCreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: CreateResponse = client.call(self.clone()).await?;
        Ok(format!(
            "Created folder {} (owner: {})",
            response.folder, response.owner
        ))
    }
}
