use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{
    db::{CollectionStore, Subscription},
    live::SeenSet,
    models::CollectionName,
    notify::{Notifier, notification_for},
};

/// Notifies once per record added to `collection` after the watcher started.
/// Records present in the first snapshot form the silent baseline.
pub fn watch_collection(
    store: Arc<dyn CollectionStore>,
    collection: CollectionName,
    notifier: Arc<dyn Notifier>,
    icon: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut subscription = Subscription::new(store, collection, None);
        let mut seen = SeenSet::default();

        while let Some(next) = subscription.next_snapshot().await {
            let snapshot = match next {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::error!("Watcher for {} failed to list: {}", collection, e);
                    continue;
                }
            };

            for record in seen.observe(&snapshot) {
                let Some(notification) = notification_for(record, &icon) else {
                    continue;
                };
                tracing::info!("{}: {}", notification.title, record.id);
                if let Err(e) = notifier.notify(&notification).await {
                    tracing::error!("Failed to notify about {}: {}", record.id, e);
                }
            }
        }

        tracing::info!("Change feed for {} closed, watcher stopped", collection);
    })
}
