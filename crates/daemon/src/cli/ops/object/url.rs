use sharebox_daemon::http_server::api::client::ApiError;
use sharebox_daemon::http_server::api::v0::object::link::{UrlRequest, UrlResponse};

#[derive(Debug, thiserror::Error)]
pub enum ObjectUrlError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for UrlRequest {
    type Error = ObjectUrlError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: UrlResponse = client.call(self.clone()).await?;
        Ok(match response.expires_in_secs {
            Some(secs) => format!("{} (expires in {}s)", response.url, secs),
            None => response.url.to_string(),
        })
    }
}
