use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{
    db::CollectionStore,
    errors::AppError,
    models::CollectionName,
    notify::{Notification, Notifier},
};

pub const SUMMARY_TITLE: &str = "Daily Recovery Summary";

/// First instant strictly after `now` whose UTC hour is `hour` (minute zero).
pub fn next_run_after(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let today = now
        .date_naive()
        .and_hms_opt(hour.min(23), 0, 0)
        .map(|at| at.and_utc())
        .unwrap_or(now);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

pub fn summary_body(incidents: usize, permits: usize, contractors: usize) -> String {
    format!("Daily Summary:\nIncidents: {incidents}\nPermits: {permits}\nContractors: {contractors}")
}

pub async fn summary_notification(
    store: &dyn CollectionStore,
    icon: &str,
) -> Result<Notification, AppError> {
    let incidents = store.list(CollectionName::Incidents, None).await?.len();
    let permits = store.list(CollectionName::Permits, None).await?.len();
    let contractors = store.list(CollectionName::Contractors, None).await?.len();

    Ok(Notification {
        title: SUMMARY_TITLE.to_string(),
        body: summary_body(incidents, permits, contractors),
        icon: icon.to_string(),
    })
}

pub fn spawn_daily_summary(
    store: Arc<dyn CollectionStore>,
    notifier: Arc<dyn Notifier>,
    hour: u32,
    icon: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = next_run_after(now, hour);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::info!("Next daily summary at {}", next);
            tokio::time::sleep(wait).await;

            match summary_notification(store.as_ref(), &icon).await {
                Ok(notification) => {
                    if let Err(e) = notifier.notify(&notification).await {
                        tracing::error!("Failed to send daily summary: {}", e);
                    }
                }
                Err(e) => tracing::error!("Failed to build daily summary: {}", e),
            }
        }
    })
}
