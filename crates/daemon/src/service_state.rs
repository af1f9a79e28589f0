use common::prelude::{Explorer, Storage};
use store::StoreError;

use crate::service_config::Config;

/// Main service state, shared by every request handler.
#[derive(Clone, Debug)]
pub struct State {
    storage: Storage,
    explorer: Explorer,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        tracing::info!(backend = config.store.kind(), "connecting to object storage");
        let storage = Storage::new(config.store.clone()).await?;
        Ok(Self::from_storage(storage))
    }

    pub fn from_storage(storage: Storage) -> Self {
        Self {
            explorer: Explorer::new(storage.clone()),
            storage,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("object storage setup failed: {0}")]
    Storage(#[from] StoreError),
}
