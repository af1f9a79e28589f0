//! Shared test utilities for the sharing integration tests
#![allow(dead_code)]

use std::sync::Arc;

pub use common::prelude::*;
pub use store::testkit::{FaultOp, FaultyStore};

pub fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

pub fn folder(path: &str) -> FolderPath {
    FolderPath::normalize(path).unwrap()
}

/// An explorer over a fresh in-memory store, with `alice`, `bob` and `carol`
/// provisioned and `alice/docs` created by alice.
pub async fn setup_test_env() -> (Explorer, Storage) {
    let storage = Storage::memory();
    let explorer = populate(storage.clone()).await;
    (explorer, storage)
}

/// Same as [`setup_test_env`], over a store that fails wherever the
/// returned [`FaultyStore`] is told to.
pub async fn setup_faulty_env() -> (Explorer, Storage, Arc<FaultyStore>) {
    let (storage, faults) = store::testkit::faulty_storage();
    let explorer = populate(storage.clone()).await;
    (explorer, storage, faults)
}

async fn populate(storage: Storage) -> Explorer {
    let explorer = Explorer::new(storage);

    for id in ["alice", "bob", "carol"] {
        explorer.provision_user(&user(id)).await.unwrap();
    }
    explorer
        .create_folder(&folder("alice"), "docs", &user("alice"))
        .await
        .unwrap();
    explorer
}

/// Raw ACL body for `path`, if any.
pub async fn raw_acl(storage: &Storage, path: &str) -> Option<Vec<u8>> {
    storage
        .get(&folder(path).acl_key())
        .await
        .unwrap()
        .map(|b| b.to_vec())
}

/// Raw registry body for `id`, if any.
pub async fn raw_registry(storage: &Storage, id: &str) -> Option<Vec<u8>> {
    storage
        .get(&user(id).registry_key())
        .await
        .unwrap()
        .map(|b| b.to_vec())
}
