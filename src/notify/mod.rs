pub mod summary;
pub mod telegram;
pub mod watcher;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{
    errors::AppError,
    models::{Record, RecordPayload, comment::Comment},
};

pub use summary::{next_run_after, spawn_daily_summary, summary_notification};
pub use telegram::TelegramNotifier;
pub use watcher::watch_collection;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
}

/// Process-wide events pushed to every open dashboard.
#[derive(Debug, Clone)]
pub enum Announcement {
    Notification(Notification),
    CommentCreated(Comment),
}

/// Where a notification is delivered.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), AppError>;
}

/// Shows the notification on every connected dashboard.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Announcement>,
}

impl BroadcastNotifier {
    pub fn new(sender: broadcast::Sender<Announcement>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), AppError> {
        // No open dashboards is not an error.
        let _ = self
            .sender
            .send(Announcement::Notification(notification.clone()));
        Ok(())
    }
}

/// Delivers to every inner notifier. One failing target does not stop the rest.
#[derive(Default, Clone)]
pub struct Notifiers {
    targets: Vec<Arc<dyn Notifier>>,
}

impl Notifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.targets.push(notifier);
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl Notifier for Notifiers {
    async fn notify(&self, notification: &Notification) -> Result<(), AppError> {
        for target in &self.targets {
            if let Err(e) = target.notify(notification).await {
                tracing::error!("Failed to deliver '{}': {}", notification.title, e);
            }
        }
        Ok(())
    }
}

/// The "new record" notification for watched collections.
pub fn notification_for(record: &Record, icon: &str) -> Option<Notification> {
    let (title, body) = match &record.payload {
        RecordPayload::Incident(incident) => ("New Incident Reported", incident.description.clone()),
        RecordPayload::Permit(permit) => ("New LA Permit Uploaded", permit.file_name.clone()),
        RecordPayload::Review(_) | RecordPayload::Contractor(_) => return None,
    };
    Some(Notification {
        title: title.to_string(),
        body,
        icon: icon.to_string(),
    })
}
