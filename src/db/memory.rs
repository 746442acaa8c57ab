use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::{Mutex, RwLock, broadcast};

use crate::{
    db::{CollectionStore, Filter, SubscriberStore, apply_filter, check_payload},
    errors::AppError,
    models::{CollectionName, Record, RecordPayload, Snapshot},
};

const CHANGE_FEED_CAPACITY: usize = 256;

/// Process-local store. Used when no Redis URL is configured and in tests.
pub struct MemoryStore {
    records: RwLock<HashMap<CollectionName, Vec<Record>>>,
    whatsapp: Mutex<HashSet<String>>,
    changes: broadcast::Sender<CollectionName>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            records: RwLock::new(HashMap::new()),
            whatsapp: Mutex::new(HashSet::new()),
            changes,
        }
    }

    /// Inserts an already-built record, bypassing validation. Announces the change.
    pub async fn insert(&self, record: Record) {
        let collection = record.collection();
        self.records
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(record);
        let _ = self.changes.send(collection);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn create(
        &self,
        collection: CollectionName,
        author: &str,
        payload: RecordPayload,
    ) -> Result<Record, AppError> {
        check_payload(collection, &payload)?;
        let record = Record::new(author, payload);
        self.insert(record.clone()).await;
        tracing::debug!("Created record {} in {}", record.id, collection);
        Ok(record)
    }

    async fn list(
        &self,
        collection: CollectionName,
        filter: Option<&Filter>,
    ) -> Result<Snapshot, AppError> {
        let records = self
            .records
            .read()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default();
        Ok(apply_filter(records, filter))
    }

    fn changes(&self) -> broadcast::Receiver<CollectionName> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn add_whatsapp_subscriber(&self, phone: &str) -> Result<bool, AppError> {
        Ok(self.whatsapp.lock().await.insert(phone.to_string()))
    }
}
