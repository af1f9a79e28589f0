use sharebox_daemon::http_server::api::client::ApiError;
use sharebox_daemon::http_server::api::v0::object::rm::{RmRequest, RmResponse};

#[derive(Debug, thiserror::Error)]
pub enum ObjectRmError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for RmRequest {
    type Error = ObjectRmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: RmResponse = client.call(self.clone()).await?;
        Ok(format!(
            "Deleted {} object(s):\n{}",
            response.deleted.len(),
            response.deleted.join("\n")
        ))
    }
}
