use std::path::PathBuf;

use clap::Args;

use sharebox_daemon::http_server::api::client::ApiError;
use sharebox_daemon::http_server::api::v0::object::upload::{UploadRequest, UploadResponse};

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// Folder to upload into
    #[arg(long)]
    pub prefix: String,

    /// Acting user (needs write on the folder)
    #[arg(long)]
    pub user: String,

    /// Local file to upload
    #[arg(long)]
    pub path: PathBuf,

    /// Object name (defaults to the file name of --path)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ObjectUploadError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot derive an object name from {0:?}; pass --name")]
    NoName(PathBuf),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = ObjectUploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => self
                .path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| ObjectUploadError::NoName(self.path.clone()))?,
        };

        let data = tokio::fs::read(&self.path).await?;
        let request = UploadRequest {
            prefix: self.prefix.clone(),
            user: self.user.clone(),
            name,
            data,
        };

        let mut client = ctx.client.clone();
        let response: UploadResponse = client.call(request).await?;
        Ok(format!(
            "Uploaded {} ({} bytes, {})",
            response.key, response.size, response.mime_type
        ))
    }
}
