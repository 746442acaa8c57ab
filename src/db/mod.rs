pub mod collection;
pub mod memory;
pub mod redis_store;
pub mod subscriber;
pub mod subscription;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{
    errors::AppError,
    models::{CollectionName, Record, RecordPayload, Snapshot},
};

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use subscription::Subscription;

/// Single-field equality predicate, e.g. `type == "contractor"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let Ok(json) = serde_json::to_value(record) else {
            return false;
        };
        match json.get(&self.field) {
            Some(serde_json::Value::String(s)) => *s == self.value,
            Some(other) => other.to_string() == self.value,
            None => false,
        }
    }
}

pub fn apply_filter(records: Vec<Record>, filter: Option<&Filter>) -> Snapshot {
    match filter {
        Some(filter) => records.into_iter().filter(|r| filter.matches(r)).collect(),
        None => records,
    }
}

/// Named, server-synchronized record sets.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Assigns id, timestamp and author, stores the record and announces the change.
    async fn create(
        &self,
        collection: CollectionName,
        author: &str,
        payload: RecordPayload,
    ) -> Result<Record, AppError>;

    /// Matching records in creation order.
    async fn list(
        &self,
        collection: CollectionName,
        filter: Option<&Filter>,
    ) -> Result<Snapshot, AppError>;

    /// Feed of collection names whose contents changed.
    fn changes(&self) -> broadcast::Receiver<CollectionName>;
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Returns `true` when the phone was not subscribed before.
    async fn add_whatsapp_subscriber(&self, phone: &str) -> Result<bool, AppError>;
}

pub(crate) fn check_payload(
    collection: CollectionName,
    payload: &RecordPayload,
) -> Result<(), AppError> {
    if payload.collection() != collection {
        return Err(AppError::BadRequest(format!(
            "{} records cannot be stored in {}",
            payload.collection(),
            collection
        )));
    }
    payload.validate()
}
