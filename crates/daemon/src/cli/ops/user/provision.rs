use sharebox_daemon::http_server::api::client::ApiError;
use sharebox_daemon::http_server::api::v0::user::provision::{
    ProvisionRequest, ProvisionResponse,
};

#[derive(Debug, thiserror::Error)]
pub enum UserProvisionError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

fn status(created: bool) -> &'static str {
    if created {
        "created"
    } else {
        "exists"
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for ProvisionRequest {
    type Error = UserProvisionError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: ProvisionResponse = client.call(self.clone()).await?;
        Ok(format!(
            "Provisioned {}\n- {} ({})\n- {} ({})",
            self.user,
            response.root,
            status(response.provisioned.root_created),
            response.shared_folders,
            status(response.provisioned.shared_folders_created)
        ))
    }
}
