use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{
    db::{
        CollectionStore, Filter, SubscriberStore, apply_filter, check_payload,
        collection::{get_records, insert_record},
        subscriber::add_whatsapp_subscriber,
    },
    errors::AppError,
    models::{CollectionName, Record, RecordPayload, Snapshot},
    state::RedisClient,
};

/// Redis-backed collections. Each collection is a list of JSON records; change
/// fan-out happens in-process.
pub struct RedisStore {
    redis: RedisClient,
    changes: broadcast::Sender<CollectionName>,
}

impl RedisStore {
    pub fn new(redis: RedisClient) -> Self {
        let (changes, _) = broadcast::channel(256);
        Self { redis, changes }
    }
}

#[async_trait]
impl CollectionStore for RedisStore {
    async fn create(
        &self,
        collection: CollectionName,
        author: &str,
        payload: RecordPayload,
    ) -> Result<Record, AppError> {
        check_payload(collection, &payload)?;
        let record = Record::new(author, payload);
        insert_record(&record, &self.redis).await?;

        if self.changes.send(collection).is_err() {
            tracing::debug!("No live subscribers for {}", collection);
        }
        Ok(record)
    }

    async fn list(
        &self,
        collection: CollectionName,
        filter: Option<&Filter>,
    ) -> Result<Snapshot, AppError> {
        let records = get_records(collection, &self.redis).await?;
        Ok(apply_filter(records, filter))
    }

    fn changes(&self) -> broadcast::Receiver<CollectionName> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl SubscriberStore for RedisStore {
    async fn add_whatsapp_subscriber(&self, phone: &str) -> Result<bool, AppError> {
        add_whatsapp_subscriber(phone, &self.redis).await
    }
}
