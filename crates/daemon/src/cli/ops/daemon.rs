use clap::Args;

use sharebox_daemon::state::{AppState, StateError};
use sharebox_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Override the log level (default from config)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.sharebox)
        let state = AppState::load(ctx.config_path.clone())?;

        let log_level = self
            .log_level
            .as_deref()
            .unwrap_or(&state.config.log_level);
        let log_level = log_level
            .parse::<tracing::Level>()
            .map_err(|_| StateError::InvalidLogLevel(log_level.to_string()))?;

        let config = ServiceConfig {
            store: state.config.store.clone(),
            api_port: self.api_port.unwrap_or(state.config.api_port),
            public_url: state.config.public_url.clone(),
            log_level,
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
