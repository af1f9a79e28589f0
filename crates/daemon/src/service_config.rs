use std::path::PathBuf;

use store::StoreConfig;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    // storage configuration
    /// Object storage backend. Built once into the single `Storage`
    ///  handle every component shares.
    pub store: StoreConfig,

    // http server configuration
    /// Port for the API HTTP server.
    pub api_port: u16,
    /// Externally reachable base URL for proxied download links.
    ///  If not set, `http://localhost:<api_port>` is used.
    pub public_url: Option<Url>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
