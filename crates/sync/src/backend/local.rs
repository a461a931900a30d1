// Local fallback backend: whole collections as JSON in the key-value store.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use lexflow_common::mapper::RemoteMapped;
use lexflow_common::types::Record;
use tracing::{debug, warn};

use super::{Backend, BackendError, LoadSource};
use crate::selector::BackendKind;
use crate::store::kv::KvStore;

#[derive(Debug)]
pub struct LocalStoreBackend {
    kv: Arc<KvStore>,
    /// Serializes read-modify-write cycles on the stored collections.
    write_lock: Mutex<()>,
    last_id: AtomicI64,
}

impl LocalStoreBackend {
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv, write_lock: Mutex::new(()), last_id: AtomicI64::new(0) }
    }

    /// The stored collection for `R`, or the seed dataset when nothing
    /// usable is stored.
    pub fn load_collection<R: Record>(&self) -> (Vec<R>, LoadSource) {
        let key = R::KIND.storage_key();
        match self.kv.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<R>>(&raw) {
                Ok(items) => return (items, LoadSource::LocalStore),
                Err(error) => warn!(key, %error, "stored collection is unreadable, using seed data"),
            },
            Ok(None) => debug!(key, "no stored collection, using seed data"),
            Err(error) => {
                warn!(key, error = %format!("{error:#}"), "failed to read stored collection, using seed data")
            }
        }
        (R::seed(), LoadSource::Seed)
    }

    fn persist<R: Record>(&self, items: &[R]) -> Result<(), BackendError> {
        let key = R::KIND.storage_key();
        let raw = serde_json::to_string(items).map_err(|error| BackendError::Storage(error.to_string()))?;
        self.kv.put(key, &raw).map_err(|error| BackendError::Storage(format!("{error:#}")))?;
        debug!(key, records = items.len(), "collection persisted");
        Ok(())
    }

    /// Apply `edit` to the current collection and write it back whole when
    /// `edit` reports a change.
    fn mutate<R: Record, T>(
        &self,
        edit: impl FnOnce(&mut Vec<R>) -> (bool, T),
    ) -> Result<T, BackendError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut items, _) = self.load_collection::<R>();
        let (changed, output) = edit(&mut items);
        if changed {
            self.persist(&items)?;
        }
        Ok(output)
    }

    /// Millisecond timestamp, bumped so that ids from this process never
    /// repeat.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    fn fresh_id<R: Record>(&self, taken: &[R]) -> String {
        loop {
            let id = self.next_timestamp().to_string();
            if !taken.iter().any(|item| item.id() == id) {
                return id;
            }
        }
    }
}

#[async_trait]
impl Backend for LocalStoreBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn load_all<R: RemoteMapped>(&self) -> Result<Vec<R>, BackendError> {
        Ok(self.load_collection().0)
    }

    async fn insert<R: RemoteMapped>(&self, mut record: R) -> Result<R, BackendError> {
        self.mutate(|items: &mut Vec<R>| {
            record.set_id(self.fresh_id(items));
            items.push(record.clone());
            (true, record)
        })
    }

    async fn update<R: RemoteMapped>(&self, id: &str, patch: &R::Patch) -> Result<(), BackendError> {
        self.mutate(|items: &mut Vec<R>| match items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.apply(patch);
                (true, ())
            }
            None => (false, ()),
        })
    }

    async fn delete<R: RemoteMapped>(&self, id: &str) -> Result<(), BackendError> {
        self.mutate(|items: &mut Vec<R>| {
            let before = items.len();
            items.retain(|item| item.id() != id);
            (items.len() != before, ())
        })
    }
}
