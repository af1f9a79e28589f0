use sharebox_daemon::http_server::api::client::ApiError;
use sharebox_daemon::http_server::api::v0::folder::ls::{LsRequest, LsResponse};

#[derive(Debug, thiserror::Error)]
pub enum FolderLsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for LsRequest {
    type Error = FolderLsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: LsResponse = client.call(self.clone()).await?;

        let mut lines = Vec::new();
        for folder in &response.folders {
            lines.push(format!("{}/ (dir)", folder));
        }
        for file in &response.files {
            lines.push(format!(
                "{} ({} bytes, {})",
                file.key,
                file.size,
                file.last_modified.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        for (path, shortcut) in &response.shortcuts {
            lines.push(format!("{} (shared by {})", path, shortcut.owner));
        }

        if lines.is_empty() {
            Ok("No items found".to_string())
        } else {
            Ok(lines.join("\n"))
        }
    }
}
