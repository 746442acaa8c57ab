use async_trait::async_trait;
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    db::{CollectionStore, Filter, Subscription},
    live::{
        LiveBinding, MapLayerAdapter, Renderer, SeenSet,
        render::{
            ContractorRenderer, GalleryRenderer, IncidentRenderer, PermitRenderer, ReviewRenderer,
        },
    },
    models::{CollectionName, dashboard::DashboardServerMessage, record::ReviewKind},
    notify::notification_for,
    ws::handlers::dashboard::utils::DashboardSession,
};

pub const CONTRACTOR_REVIEWS: &str = "contractor-reviews-list";
pub const INSURANCE_REVIEWS: &str = "insurance-reviews-list";
pub const INCIDENT_FEED: &str = "incident-feed";
pub const ADDRESS_GALLERY: &str = "address-gallery";
pub const CONTRACTOR_REGISTRY: &str = "contractor-registry-list";
pub const LA_PERMITS: &str = "la-permits-list";
pub const COMMENTS_LIST: &str = "comments-list";

const GALLERY_LIMIT: usize = 10;

/// Where a section task delivers its output.
#[async_trait]
pub trait SectionSink: Send + Sync {
    async fn push(&self, msg: DashboardServerMessage);
}

#[async_trait]
impl SectionSink for DashboardSession {
    async fn push(&self, msg: DashboardServerMessage) {
        self.send(&msg).await;
    }
}

#[async_trait]
impl SectionSink for mpsc::UnboundedSender<DashboardServerMessage> {
    async fn push(&self, msg: DashboardServerMessage) {
        if self.send(msg).is_err() {
            tracing::debug!("Section output dropped, receiver is gone");
        }
    }
}

/// One live binding plus the optional map layer and notifications fed by the
/// same snapshots.
pub struct SectionTask<R: Renderer> {
    binding: LiveBinding<R>,
    collection: CollectionName,
    filter: Option<Filter>,
    layer: Option<MapLayerAdapter>,
    notifications: Option<SeenSet>,
}

impl<R: Renderer> SectionTask<R> {
    pub fn new(binding: LiveBinding<R>, collection: CollectionName) -> Self {
        Self {
            binding,
            collection,
            filter: None,
            layer: None,
            notifications: None,
        }
    }

    pub fn filtered(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_layer(mut self, layer: MapLayerAdapter) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn notifying(mut self, seen: SeenSet) -> Self {
        self.notifications = Some(seen);
        self
    }

    pub fn spawn(self, session: Arc<DashboardSession>) -> JoinHandle<()> {
        let store = session.state.store.clone();
        let icon = session.state.config.notification_icon.clone();
        tokio::spawn(self.run(store, icon, session))
    }

    /// Feeds every snapshot of the collection through the binding, layer and
    /// seen-set until the change feed closes.
    pub async fn run(
        mut self,
        store: Arc<dyn CollectionStore>,
        icon: String,
        sink: Arc<dyn SectionSink>,
    ) {
        let mut subscription = Subscription::new(store, self.collection, self.filter.take());
        let mut first = true;

        while let Some(next) = subscription.next_snapshot().await {
            match next {
                Ok(snapshot) => {
                    let html = self.binding.apply(&snapshot).to_string();
                    sink.push(DashboardServerMessage::Section {
                        section: self.binding.section(),
                        html,
                    })
                    .await;

                    if let Some(layer) = self.layer.as_mut() {
                        let markers = layer.apply(&snapshot).to_vec();
                        sink.push(DashboardServerMessage::Layer {
                            layer: layer.layer(),
                            live: true,
                            markers,
                        })
                        .await;
                    }

                    if let Some(seen) = self.notifications.as_mut() {
                        for record in seen.observe(&snapshot) {
                            if let Some(notification) = notification_for(record, &icon) {
                                sink.push(DashboardServerMessage::Notification { notification })
                                    .await;
                            }
                        }
                    }
                }
                Err(e) if first => {
                    tracing::error!("Setting up {} failed: {}", self.binding.section(), e);
                    let html = self.binding.fail().to_string();
                    sink.push(DashboardServerMessage::Section {
                        section: self.binding.section(),
                        html,
                    })
                    .await;
                }
                Err(e) => {
                    tracing::warn!("Snapshot for {} failed: {}", self.binding.section(), e);
                }
            }
            first = false;
        }
    }
}

/// Starts every live section of a dashboard.
pub fn spawn_sections(session: &Arc<DashboardSession>) -> Vec<JoinHandle<()>> {
    vec![
        SectionTask::new(
            LiveBinding::new(CONTRACTOR_REVIEWS, ReviewRenderer),
            CollectionName::Reviews,
        )
        .filtered(Filter::eq("type", ReviewKind::Contractor.as_str()))
        .spawn(session.clone()),
        SectionTask::new(
            LiveBinding::new(INSURANCE_REVIEWS, ReviewRenderer),
            CollectionName::Reviews,
        )
        .filtered(Filter::eq("type", ReviewKind::Insurance.as_str()))
        .spawn(session.clone()),
        SectionTask::new(
            LiveBinding::new(INCIDENT_FEED, IncidentRenderer),
            CollectionName::Incidents,
        )
        .with_layer(MapLayerAdapter::community_reports())
        .notifying(SeenSet::default())
        .spawn(session.clone()),
        SectionTask::new(
            LiveBinding::new(ADDRESS_GALLERY, GalleryRenderer).with_limit(GALLERY_LIMIT),
            CollectionName::Incidents,
        )
        .spawn(session.clone()),
        SectionTask::new(
            LiveBinding::new(CONTRACTOR_REGISTRY, ContractorRenderer),
            CollectionName::Contractors,
        )
        .with_layer(MapLayerAdapter::registered_contractors())
        .spawn(session.clone()),
        SectionTask::new(
            LiveBinding::new(LA_PERMITS, PermitRenderer),
            CollectionName::Permits,
        )
        .notifying(SeenSet::default())
        .spawn(session.clone()),
    ]
}

