use sharebox_daemon::http_server::api::client::ApiError;
use sharebox_daemon::http_server::api::v0::folder::shortcuts::{
    ShortcutsRequest, ShortcutsResponse,
};

#[derive(Debug, thiserror::Error)]
pub enum FolderShortcutsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for ShortcutsRequest {
    type Error = FolderShortcutsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: ShortcutsResponse = client.call(self.clone()).await?;

        if response.shortcuts.is_empty() {
            return Ok("No shared folders".to_string());
        }
        Ok(response
            .shortcuts
            .values()
            .map(|s| format!("{} (owner: {})", s.path, s.owner))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
