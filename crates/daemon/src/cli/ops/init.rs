use clap::{Args, ValueEnum};
use url::Url;

use sharebox_daemon::state::{AppConfig, AppState, StateError};
use store::StoreConfig;

/// Object store backend type for CLI selection
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum StoreType {
    /// Local filesystem under the sharebox directory (default)
    #[default]
    Local,
    /// In-memory, lost when the daemon exits
    Memory,
    /// S3-compatible object storage
    S3,
}

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port
    #[arg(long, default_value_t = 5555)]
    pub api_port: u16,

    /// Externally reachable daemon URL for proxied download links
    #[arg(long)]
    pub public_url: Option<Url>,

    /// Default log level
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Object store backend type
    #[arg(long, value_enum, default_value_t = StoreType::Local)]
    pub store: StoreType,

    /// Directory for --store local (defaults to <config dir>/objects)
    #[arg(long)]
    pub store_path: Option<std::path::PathBuf>,

    /// S3 endpoint URL (required for --store s3)
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    /// S3 bucket name (required for --store s3)
    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// S3 access key (can also use SHAREBOX_S3_ACCESS_KEY env var)
    #[arg(long, env = "SHAREBOX_S3_ACCESS_KEY")]
    pub s3_access_key: Option<String>,

    /// S3 secret key (can also use SHAREBOX_S3_SECRET_KEY env var)
    #[arg(long, env = "SHAREBOX_S3_SECRET_KEY")]
    pub s3_secret_key: Option<String>,

    /// S3 region (optional, defaults to us-east-1)
    #[arg(long)]
    pub s3_region: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),

    #[error("missing required S3 configuration: {0}")]
    MissingS3Config(String),
}

impl Init {
    /// Build store configuration from CLI flags
    fn build_store_config(
        &self,
        sharebox_dir: &std::path::Path,
    ) -> Result<StoreConfig, InitError> {
        match self.store {
            StoreType::Memory => Ok(StoreConfig::Memory),

            StoreType::Local => Ok(StoreConfig::Local {
                path: self
                    .store_path
                    .clone()
                    .unwrap_or_else(|| AppState::objects_dir(sharebox_dir)),
            }),

            StoreType::S3 => {
                let endpoint = self
                    .s3_endpoint
                    .clone()
                    .ok_or_else(|| InitError::MissingS3Config("--s3-endpoint".to_string()))?;
                let bucket = self
                    .s3_bucket
                    .clone()
                    .ok_or_else(|| InitError::MissingS3Config("--s3-bucket".to_string()))?;
                let access_key = self.s3_access_key.clone().ok_or_else(|| {
                    InitError::MissingS3Config(
                        "--s3-access-key or SHAREBOX_S3_ACCESS_KEY".to_string(),
                    )
                })?;
                let secret_key = self.s3_secret_key.clone().ok_or_else(|| {
                    InitError::MissingS3Config(
                        "--s3-secret-key or SHAREBOX_S3_SECRET_KEY".to_string(),
                    )
                })?;

                Ok(StoreConfig::S3 {
                    endpoint,
                    access_key,
                    secret_key,
                    bucket,
                    region: self.s3_region.clone(),
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(StateError::InvalidLogLevel(self.log_level.clone()).into());
        }

        let sharebox_dir = AppState::sharebox_dir(ctx.config_path.clone())?;
        let config = AppConfig {
            api_port: self.api_port,
            public_url: self.public_url.clone(),
            log_level: self.log_level.clone(),
            store: self.build_store_config(&sharebox_dir)?,
        };

        let state = AppState::init(Some(sharebox_dir), Some(config))?;

        let public_url = match &state.config.public_url {
            Some(url) => url.to_string(),
            None => format!("http://localhost:{}", state.config.api_port),
        };

        let output = format!(
            "Initialized sharebox directory at: {}\n\
             - Config: {}\n\
             - Store: {}\n\
             - API port: {}\n\
             - Public URL: {}",
            state.sharebox_dir.display(),
            state.config_path.display(),
            state.config.store.kind(),
            state.config.api_port,
            public_url
        );

        Ok(output)
    }
}
