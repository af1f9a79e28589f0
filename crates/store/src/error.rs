//! Error types for the object store client.

/// Errors that can occur when talking to the object store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Object storage error
    #[error("object storage error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key could not be turned into an object path
    #[error("invalid key '{0}'")]
    InvalidKey(String),

    /// The backend cannot produce presigned URLs
    #[error("backend does not support presigned URLs")]
    SigningUnsupported,

    /// S3 bucket not found - must be created before use
    #[error("S3 bucket '{0}' does not exist. Create it before starting the daemon.")]
    BucketNotFound(String),
}

/// Result type alias for object store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
