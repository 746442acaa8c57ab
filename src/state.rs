use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{
    chat::CompletionClient,
    comments::CommentSource,
    config::Config,
    db::{CollectionStore, SubscriberStore},
    forms::Uploader,
    kyc::KycVerifier,
    live::map::MapOverlays,
    notify::Announcement,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn CollectionStore>,
    pub subscribers: Arc<dyn SubscriberStore>,
    pub uploader: Arc<dyn Uploader>,
    pub completions: Arc<dyn CompletionClient>,
    pub comments: Arc<dyn CommentSource>,
    pub kyc: Arc<dyn KycVerifier>,
    pub announcements: broadcast::Sender<Announcement>,
    pub overlays: Arc<MapOverlays>,
}

pub type RedisClient = Pool<RedisConnectionManager>;
