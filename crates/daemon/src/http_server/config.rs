use std::net::SocketAddr;

use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // Base URL for links back into this server (proxied downloads)
    pub public_url: Url,
    // log level for http tracing
    pub log_level: tracing::Level,
}

impl Config {
    pub fn new(
        listen_addr: SocketAddr,
        public_url: Option<Url>,
        log_level: tracing::Level,
    ) -> Result<Self, ConfigError> {
        let public_url = match public_url {
            Some(url) => url,
            None => Url::parse(&format!("http://localhost:{}", listen_addr.port()))?,
        };
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, public_url={}",
            listen_addr,
            public_url
        );
        Ok(Self {
            listen_addr,
            public_url,
            log_level,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
