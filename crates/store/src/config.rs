use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the object storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory storage (for testing)
    #[default]
    Memory,

    /// Local filesystem storage
    Local {
        /// Path to the storage directory
        path: PathBuf,
    },

    /// S3-compatible storage (AWS S3, MinIO, etc.)
    S3 {
        /// S3 endpoint URL (e.g., "http://localhost:9000" for MinIO)
        endpoint: String,
        /// Access key ID
        access_key: String,
        /// Secret access key
        secret_key: String,
        /// Bucket name
        bucket: String,
        /// Optional region (defaults to "us-east-1")
        region: Option<String>,
    },
}

impl StoreConfig {
    /// Short backend name, suitable for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::Local { .. } => "local",
            StoreConfig::S3 { .. } => "s3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_toml_tagging() {
        let config: StoreConfig = toml::from_str(
            r#"
            type = "s3"
            endpoint = "http://localhost:9000"
            access_key = "minio"
            secret_key = "minio123"
            bucket = "sharebox"
            "#,
        )
        .unwrap();

        assert_eq!(config.kind(), "s3");
        match config {
            StoreConfig::S3 { bucket, region, .. } => {
                assert_eq!(bucket, "sharebox");
                assert!(region.is_none());
            }
            other => panic!("unexpected config: {:?}", other),
        }

        let memory: StoreConfig = toml::from_str(r#"type = "memory""#).unwrap();
        assert_eq!(memory, StoreConfig::Memory);
    }
}
