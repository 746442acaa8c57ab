use futures::Stream;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
    db::{CollectionStore, Filter},
    errors::AppError,
    models::{CollectionName, Snapshot},
};

/// Standing subscription to a filtered collection. Every item is a full snapshot,
/// never a diff; the first item is the state at subscription time.
pub struct Subscription {
    store: Arc<dyn CollectionStore>,
    collection: CollectionName,
    filter: Option<Filter>,
    changes: broadcast::Receiver<CollectionName>,
    primed: bool,
}

impl Subscription {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        collection: CollectionName,
        filter: Option<Filter>,
    ) -> Self {
        // Receiver is taken before the first list so no change can slip between them.
        let changes = store.changes();
        Self {
            store,
            collection,
            filter,
            changes,
            primed: false,
        }
    }

    pub fn collection(&self) -> CollectionName {
        self.collection
    }

    /// Waits for the next snapshot. `None` once the store's change feed is gone.
    pub async fn next_snapshot(&mut self) -> Option<Result<Snapshot, AppError>> {
        if self.primed {
            loop {
                match self.changes.recv().await {
                    Ok(changed) if changed == self.collection => break,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(
                            "Subscription to {} lagged by {} changes, re-listing",
                            self.collection,
                            skipped
                        );
                        break;
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        }
        self.primed = true;

        Some(
            self.store
                .list(self.collection, self.filter.as_ref())
                .await,
        )
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Snapshot, AppError>> {
        futures::stream::unfold(self, |mut sub| async move {
            sub.next_snapshot().await.map(|snapshot| (snapshot, sub))
        })
    }
}
