mod common;

use common::{ListFailingStore, incident, shared};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{sync::mpsc, time::timeout};

use recovery_hub::{
    db::{CollectionStore, MemoryStore},
    live::{
        LiveBinding, MapLayerAdapter, SeenSet,
        binding::SECTION_UNAVAILABLE,
        render::{IncidentRenderer, PermitRenderer},
    },
    models::{CollectionName, dashboard::DashboardServerMessage},
    ws::handlers::dashboard::sections::{INCIDENT_FEED, LA_PERMITS, SectionSink, SectionTask},
};

const ICON: &str = "pali-pal-avatar.png";

async fn next(rx: &mut mpsc::UnboundedReceiver<DashboardServerMessage>) -> DashboardServerMessage {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("section output in time")
        .expect("section output")
}

fn incident_feed() -> SectionTask<IncidentRenderer> {
    SectionTask::new(
        LiveBinding::new(INCIDENT_FEED, IncidentRenderer),
        CollectionName::Incidents,
    )
}

#[tokio::test]
async fn test_failed_setup_marks_only_its_section() {
    let store = shared(ListFailingStore::new(CollectionName::Incidents, 1));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sink: Arc<dyn SectionSink> = Arc::new(tx);

    let tasks = [
        tokio::spawn(incident_feed().run(store.clone(), ICON.into(), sink.clone())),
        tokio::spawn(
            SectionTask::new(
                LiveBinding::new(LA_PERMITS, PermitRenderer),
                CollectionName::Permits,
            )
            .run(store.clone(), ICON.into(), sink.clone()),
        ),
    ];

    let mut sections = HashMap::new();
    while sections.len() < 2 {
        if let DashboardServerMessage::Section { section, html } = next(&mut rx).await {
            sections.insert(section, html);
        }
    }
    assert_eq!(sections[INCIDENT_FEED], SECTION_UNAVAILABLE);
    assert_eq!(sections[LA_PERMITS], "<p>No permits uploaded yet.</p>");

    store
        .create(CollectionName::Incidents, "dana", incident("brush fire", 34.05, -118.54))
        .await
        .unwrap();

    loop {
        if let DashboardServerMessage::Section { section, html } = next(&mut rx).await {
            if section == INCIDENT_FEED {
                assert!(html.contains("brush fire"));
                break;
            }
        }
    }

    for task in tasks {
        task.abort();
    }
}

#[tokio::test]
async fn test_new_incidents_notify_once_each() {
    let store = shared(MemoryStore::new());
    store
        .create(CollectionName::Incidents, "old", incident("old fire", 34.0, -118.5))
        .await
        .unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(
        incident_feed()
            .with_layer(MapLayerAdapter::community_reports())
            .notifying(SeenSet::default())
            .run(store.clone(), ICON.into(), Arc::new(tx)),
    );

    match next(&mut rx).await {
        DashboardServerMessage::Section { html, .. } => assert!(html.contains("old fire")),
        other => panic!("expected the first section, got {other:?}"),
    }

    store
        .create(CollectionName::Incidents, "ana", incident("fire a", 34.01, -118.51))
        .await
        .unwrap();
    store
        .create(CollectionName::Incidents, "ben", incident("fire b", 34.02, -118.52))
        .await
        .unwrap();

    let mut notified = Vec::new();
    let mut markers = 0;
    while let Ok(Some(msg)) = timeout(Duration::from_millis(300), rx.recv()).await {
        match msg {
            DashboardServerMessage::Notification { notification } => {
                assert_eq!(notification.title, "New Incident Reported");
                assert_eq!(notification.icon, ICON);
                notified.push(notification.body);
            }
            DashboardServerMessage::Layer { live, markers: m, .. } => {
                assert!(live);
                markers = m.len();
            }
            _ => {}
        }
    }

    notified.sort();
    assert_eq!(notified, vec!["fire a", "fire b"]);
    assert_eq!(markers, 3);

    task.abort();
}
