//! An in-memory backend that fails on demand, for exercising error paths.
//!
//! ```rust,ignore
//! let (storage, faults) = store::testkit::faulty_storage();
//! faults.fail(FaultOp::Get, "alice/docs/.permissions");
//! assert!(storage.get("alice/docs/.permissions").await.is_err());
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{
    GetOptions, GetResult, ListResult, MultipartUpload, ObjectMeta, ObjectStore, PutMultipartOpts,
    PutOptions, PutPayload, PutResult,
};

use crate::Storage;

/// The kind of call a fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultOp {
    /// `get` and `head`.
    Get,
    Put,
    Delete,
    /// Both recursive and delimited listings.
    List,
}

#[derive(Debug, Clone)]
struct Fault {
    op: FaultOp,
    key: String,
}

/// Wraps [`InMemory`] and fails calls whose location matches a registered
/// fault exactly.
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: InMemory,
    faults: Mutex<Vec<Fault>>,
}

/// A [`Storage`] over a fresh [`FaultyStore`], plus the store to arm faults on.
pub fn faulty_storage() -> (Storage, Arc<FaultyStore>) {
    let faults = Arc::new(FaultyStore::default());
    (Storage::from_object_store(faults.clone()), faults)
}

impl FaultyStore {
    /// Fail every `op` on `key` from now on. An empty `key` matches the
    /// bucket root for listings.
    pub fn fail(&self, op: FaultOp, key: &str) {
        self.lock().push(Fault {
            op,
            key: key.trim_matches('/').to_string(),
        });
    }

    /// Drop every registered fault.
    pub fn heal(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Fault>> {
        // a test that panicked while holding the lock already failed
        self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, op: FaultOp, location: Option<&Path>) -> object_store::Result<()> {
        let key = location.map(|p| p.as_ref()).unwrap_or("");
        let hit = self
            .lock()
            .iter()
            .any(|fault| fault.op == op && fault.key == key);
        if hit {
            return Err(object_store::Error::Generic {
                store: "faulty",
                source: format!("injected {:?} failure on '{}'", op, key).into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for FaultyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaultyStore({})", self.inner)
    }
}

#[async_trait]
impl ObjectStore for FaultyStore {
    async fn put_opts(
        &self,
        location: &Path,
        payload: PutPayload,
        opts: PutOptions,
    ) -> object_store::Result<PutResult> {
        self.check(FaultOp::Put, Some(location))?;
        self.inner.put_opts(location, payload, opts).await
    }

    async fn put_multipart_opts(
        &self,
        location: &Path,
        opts: PutMultipartOpts,
    ) -> object_store::Result<Box<dyn MultipartUpload>> {
        self.check(FaultOp::Put, Some(location))?;
        self.inner.put_multipart_opts(location, opts).await
    }

    async fn get_opts(
        &self,
        location: &Path,
        options: GetOptions,
    ) -> object_store::Result<GetResult> {
        self.check(FaultOp::Get, Some(location))?;
        self.inner.get_opts(location, options).await
    }

    async fn delete(&self, location: &Path) -> object_store::Result<()> {
        self.check(FaultOp::Delete, Some(location))?;
        self.inner.delete(location).await
    }

    fn list(&self, prefix: Option<&Path>) -> BoxStream<'_, object_store::Result<ObjectMeta>> {
        match self.check(FaultOp::List, prefix) {
            Ok(()) => self.inner.list(prefix),
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }

    async fn list_with_delimiter(
        &self,
        prefix: Option<&Path>,
    ) -> object_store::Result<ListResult> {
        self.check(FaultOp::List, prefix)?;
        self.inner.list_with_delimiter(prefix).await
    }

    async fn copy(&self, from: &Path, to: &Path) -> object_store::Result<()> {
        self.check(FaultOp::Put, Some(to))?;
        self.inner.copy(from, to).await
    }

    async fn copy_if_not_exists(&self, from: &Path, to: &Path) -> object_store::Result<()> {
        self.check(FaultOp::Put, Some(to))?;
        self.inner.copy_if_not_exists(from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_faults_hit_only_their_key() {
        let (storage, faults) = faulty_storage();
        storage.put("alice/a.txt", "a".into()).await.unwrap();
        storage.put("alice/b.txt", "b".into()).await.unwrap();

        faults.fail(FaultOp::Get, "alice/a.txt");
        assert!(storage.get("alice/a.txt").await.is_err());
        assert!(storage.get("alice/b.txt").await.unwrap().is_some());

        faults.fail(FaultOp::List, "alice");
        assert!(storage.list("alice/").await.is_err());

        faults.heal();
        assert!(storage.get("alice/a.txt").await.unwrap().is_some());
        assert_eq!(storage.list("alice").await.unwrap().files.len(), 2);
    }
}
