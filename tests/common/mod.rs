#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rand::{SeedableRng, rngs::StdRng};
use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::{Mutex, broadcast};

use recovery_hub::{
    chat::{CompletionClient, OfflineCompletionClient},
    comments::{CommentSource, OfflineComments},
    config::{Config, DEFAULT_CHAT_PREAMBLE},
    db::{CollectionStore, Filter, MemoryStore},
    errors::AppError,
    forms::{FileInput, Uploader},
    models::{
        CollectionName, Record, RecordPayload, Snapshot,
        chat::ChatTurn,
        comment::{Comment, CommentAuthor, CommentConnection, CommentEdge, CommentPage},
        geo::{GeoPoint, LatLng},
        record::{Contractor, Incident, Permit, Review, ReviewKind},
    },
    kyc::OfflineKycVerifier,
    live::map::MapOverlays,
    notify::{Announcement, Notification, Notifier},
    state::AppState,
};

pub const JWT_SECRET: &str = "test-secret";
pub const WEBHOOK_SECRET: &str = "hook-secret";

pub fn test_config() -> Config {
    Config {
        port: 0,
        redis_url: None,
        jwt_secret: JWT_SECRET.to_string(),
        allowed_origins: vec!["http://localhost:3000".to_string()],
        uploads_dir: PathBuf::from("uploads"),
        uploads_public_path: "/uploads".to_string(),
        max_upload_bytes: 1024 * 1024,
        chat_completions_url: None,
        chat_api_key: None,
        chat_preamble: DEFAULT_CHAT_PREAMBLE.to_string(),
        chat_history_limit: 50,
        hosting_api_base: None,
        hosting_api_key: None,
        project_id: "test_project".to_string(),
        kyc_provider_url: None,
        comment_webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        telegram_bot_token: None,
        telegram_chat_id: None,
        notification_icon: "pali-pal-avatar.png".to_string(),
        daily_summary_hour: 9,
        map_center: LatLng {
            lat: 34.055,
            lng: -118.54,
        },
    }
}

/// State over an in-memory store with offline collaborators.
pub fn app_state(
    config: Config,
    store: Arc<MemoryStore>,
    uploader: Arc<FakeUploader>,
) -> (AppState, broadcast::Receiver<Announcement>) {
    let (announcements, receiver) = broadcast::channel(16);
    let state = AppState {
        config: Arc::new(config),
        store: store.clone(),
        subscribers: store,
        uploader,
        completions: Arc::new(OfflineCompletionClient),
        comments: Arc::new(OfflineComments),
        kyc: Arc::new(OfflineKycVerifier),
        announcements,
        overlays: Arc::new(MapOverlays::generate(&mut StdRng::seed_from_u64(7))),
    };
    (state, receiver)
}

pub fn review(kind: ReviewKind, subject: &str, rating: u8, text: &str) -> RecordPayload {
    RecordPayload::Review(Review {
        kind,
        subject_name: subject.to_string(),
        rating,
        review_text: text.to_string(),
    })
}

pub fn incident(description: &str, lat: f64, lng: f64) -> RecordPayload {
    RecordPayload::Incident(Incident {
        description: description.to_string(),
        image_url: None,
        location: GeoPoint::from_lat_lng(LatLng { lat, lng }),
    })
}

pub fn incident_with_image(description: &str, image_url: &str) -> RecordPayload {
    RecordPayload::Incident(Incident {
        description: description.to_string(),
        image_url: Some(image_url.to_string()),
        location: GeoPoint::from_lat_lng(LatLng {
            lat: 34.05,
            lng: -118.54,
        }),
    })
}

pub fn contractor(name: &str, license: &str, lat: f64, lng: f64) -> RecordPayload {
    RecordPayload::Contractor(Contractor {
        name: name.to_string(),
        license: license.to_string(),
        workman_comp: "WC-1".to_string(),
        liability: "LI-1".to_string(),
        location: GeoPoint::from_lat_lng(LatLng { lat, lng }),
    })
}

pub fn permit(file_name: &str, file_url: &str) -> RecordPayload {
    RecordPayload::Permit(Permit {
        file_url: file_url.to_string(),
        file_name: file_name.to_string(),
        uploaded_at: Utc.with_ymd_and_hms(2025, 1, 20, 15, 30, 0).unwrap(),
        image_url: None,
    })
}

/// Records with distinct, increasing creation times.
pub fn records(payloads: Vec<RecordPayload>) -> Vec<Record> {
    payloads
        .into_iter()
        .enumerate()
        .map(|(i, payload)| {
            let mut record = Record::new(format!("user{i}"), payload);
            record.created_at = Utc.with_ymd_and_hms(2025, 1, 10 + i as u32, 12, 0, 0).unwrap();
            record
        })
        .collect()
}

pub fn file(name: &str) -> FileInput {
    FileInput {
        name: name.to_string(),
        content_type: Some("image/png".to_string()),
        bytes: vec![1, 2, 3],
    }
}

/// MemoryStore that counts create calls and can be told to fail them.
pub struct CountingStore {
    pub inner: MemoryStore,
    pub creates: AtomicUsize,
    pub fail_creates: bool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            creates: AtomicUsize::new(0),
            fail_creates: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_creates: true,
            ..Self::new()
        }
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollectionStore for CountingStore {
    async fn create(
        &self,
        collection: CollectionName,
        author: &str,
        payload: RecordPayload,
    ) -> Result<Record, AppError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates {
            return Err(AppError::Unavailable("backend down".into()));
        }
        self.inner.create(collection, author, payload).await
    }

    async fn list(
        &self,
        collection: CollectionName,
        filter: Option<&Filter>,
    ) -> Result<Snapshot, AppError> {
        self.inner.list(collection, filter).await
    }

    fn changes(&self) -> broadcast::Receiver<CollectionName> {
        self.inner.changes()
    }
}

/// MemoryStore whose first `failures` lists of one collection fail.
pub struct ListFailingStore {
    pub inner: MemoryStore,
    pub collection: CollectionName,
    pub failures: AtomicUsize,
}

impl ListFailingStore {
    pub fn new(collection: CollectionName, failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            collection,
            failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl CollectionStore for ListFailingStore {
    async fn create(
        &self,
        collection: CollectionName,
        author: &str,
        payload: RecordPayload,
    ) -> Result<Record, AppError> {
        self.inner.create(collection, author, payload).await
    }

    async fn list(
        &self,
        collection: CollectionName,
        filter: Option<&Filter>,
    ) -> Result<Snapshot, AppError> {
        let fail = collection == self.collection
            && self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
        if fail {
            return Err(AppError::Unavailable("list timed out".into()));
        }
        self.inner.list(collection, filter).await
    }

    fn changes(&self) -> broadcast::Receiver<CollectionName> {
        self.inner.changes()
    }
}

pub struct FakeUploader {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeUploader {
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn upload_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Uploader for FakeUploader {
    async fn upload(&self, file: &FileInput) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Upload("storage unreachable".into()));
        }
        Ok(format!("https://cdn.test/{}", file.name))
    }
}

/// Replies from a script; remembers every transcript it was sent.
pub struct ScriptedCompletions {
    pub replies: Mutex<VecDeque<Result<String, AppError>>>,
    pub transcripts: Mutex<Vec<Vec<ChatTurn>>>,
}

impl ScriptedCompletions {
    pub fn new(replies: Vec<Result<String, AppError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            transcripts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletions {
    async fn complete(&self, messages: &[ChatTurn]) -> Result<String, AppError> {
        self.transcripts.lock().await.push(messages.to_vec());
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("ok".to_string()))
    }
}

pub fn comment(id: &str, content: &str, parent: Option<&str>) -> Comment {
    Comment {
        id: id.to_string(),
        raw_content: content.to_string(),
        author: CommentAuthor {
            username: format!("{id}-author"),
            display_name: None,
        },
        created_at: Utc.with_ymd_and_hms(2025, 2, 1, 9, 5, 0).unwrap(),
        parent_comment_id: parent.map(str::to_string),
    }
}

pub fn page(ids: &[&str], has_next_page: bool) -> CommentPage {
    CommentPage {
        comments: CommentConnection {
            data: ids
                .iter()
                .map(|id| CommentEdge {
                    comment: comment(id, &format!("comment {id}"), None),
                    cursor: id.to_string(),
                })
                .collect(),
            has_next_page,
        },
    }
}

/// Serves queued pages and records which cursor each request used.
pub struct FakeComments {
    pub pages: Mutex<VecDeque<Result<CommentPage, AppError>>>,
    pub requested: Mutex<Vec<Option<String>>>,
    pub posted: Mutex<Vec<String>>,
}

impl FakeComments {
    pub fn new(pages: Vec<Result<CommentPage, AppError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requested: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CommentSource for FakeComments {
    async fn fetch_page(&self, after: Option<&str>) -> Result<CommentPage, AppError> {
        self.requested.lock().await.push(after.map(str::to_string));
        self.pages
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Upstream("no more pages".into())))
    }

    async fn post_comment(&self, content: &str) -> Result<(), AppError> {
        self.posted.lock().await.push(content.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), AppError> {
        self.sent.lock().await.push(notification.clone());
        Ok(())
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
