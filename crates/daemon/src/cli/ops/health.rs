use clap::Args;

use sharebox_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.sharebox_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                lines.push(format!("  api_port:     {}", state.config.api_port));
                lines.push(format!("  store:        {}", state.config.store.kind()));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        lines.push(String::new());
        lines.push(format!("Daemon ({}):", base));

        for endpoint in ["livez", "readyz"] {
            let line = match base.join(&format!("/_status/{}", endpoint)) {
                Ok(url) => match client.get(url).send().await {
                    Ok(resp) if resp.status().is_success() => format!("  {}: OK", endpoint),
                    Ok(resp) => format!("  {}: UNHEALTHY ({})", endpoint, resp.status()),
                    Err(_) => format!("  {}: NOT REACHABLE", endpoint),
                },
                Err(e) => format!("  {}: BAD URL ({})", endpoint, e),
            };
            lines.push(line);
        }

        Ok(lines.join("\n"))
    }
}
