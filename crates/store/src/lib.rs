//! Object storage client for Sharebox.
//!
//! A thin, cloneable handle over the [`object_store`] crate that speaks in
//! plain string keys under a single bucket namespace. Everything above this
//! crate (ACL documents, shortcut registries, uploaded files) is just a key
//! and a body as far as the store is concerned.
//!
//! # Example
//!
//! ```rust,no_run
//! use store::{Storage, StoreConfig};
//!
//! # async fn example() -> Result<(), store::StoreError> {
//! let storage = Storage::new(StoreConfig::Memory).await?;
//! storage.put("alice/hello.txt", "hi".into()).await?;
//! assert!(storage.get("alice/hello.txt").await?.is_some());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod storage;
#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use storage::{Listing, ObjectEntry, Storage};
