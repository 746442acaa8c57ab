pub mod auth;
pub mod chat;
pub mod comments;
pub mod config;
pub mod db;
pub mod errors;
pub mod forms;
pub mod http;
pub mod kyc;
pub mod live;
mod middleware;
pub mod models;
pub mod notify;
pub mod state;
pub mod ws;

use axum::{Router, middleware as axum_middleware};
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use middleware::{
    cors_layer, create_global_rate_limiter, create_api_rate_limiter, rate_limit_middleware,
};
use rand::{SeedableRng, rngs::StdRng};
use std::{net::SocketAddr, sync::Arc};
use teloxide::Bot;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    chat::{CompletionClient, HostedCompletionClient, OfflineCompletionClient},
    comments::{CommentSource, HostingClient, OfflineComments},
    config::Config,
    db::{CollectionStore, MemoryStore, RedisStore, SubscriberStore},
    errors::AppError,
    forms::LocalUploader,
    kyc::{HostedKycVerifier, KycVerifier, OfflineKycVerifier},
    live::map::MapOverlays,
    models::CollectionName,
    notify::{
        Announcement, BroadcastNotifier, Notifier, Notifiers, TelegramNotifier,
        spawn_daily_summary, watch_collection,
    },
    state::AppState,
};

const ANNOUNCEMENT_CAPACITY: usize = 64;

pub async fn start_server() -> Result<(), AppError> {
    tracing_subscriber::fmt::init();

    let config = Arc::new(Config::from_env()?);
    let state = build_state(config.clone()).await?;

    let telegram: Option<Arc<dyn Notifier>> =
        match (&config.telegram_bot_token, config.telegram_chat_id) {
            (Some(token), Some(chat_id)) => {
                Some(Arc::new(TelegramNotifier::new(Bot::new(token), chat_id)))
            }
            _ => {
                tracing::info!("Telegram not configured, notifications stay on dashboards");
                None
            }
        };

    // Per-dashboard bindings already notify open dashboards of new records.
    if let Some(telegram) = &telegram {
        for collection in [CollectionName::Incidents, CollectionName::Permits] {
            watch_collection(
                state.store.clone(),
                collection,
                telegram.clone(),
                config.notification_icon.clone(),
            );
        }
    }

    let mut summary_targets = Notifiers::new().with(Arc::new(BroadcastNotifier::new(
        state.announcements.clone(),
    )));
    if let Some(telegram) = telegram {
        summary_targets = summary_targets.with(telegram);
    }
    spawn_daily_summary(
        state.store.clone(),
        Arc::new(summary_targets),
        config.daily_summary_hour,
        config.notification_icon.clone(),
    );

    let global_rate_limiter = create_global_rate_limiter();
    let api_rate_limiter = create_api_rate_limiter();

    let api = http::create_http_routes(state.clone()).layer(axum_middleware::from_fn(
        move |req, next| rate_limit_middleware(api_rate_limiter.clone(), req, next),
    ));

    let app = Router::new()
        .merge(api)
        .merge(ws::create_ws_routes(state.clone()))
        .nest_service(
            &config.uploads_public_path,
            ServeDir::new(&config.uploads_dir),
        )
        .layer(axum_middleware::from_fn(move |req, next| {
            rate_limit_middleware(global_rate_limiter.clone(), req, next)
        }))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .fallback(|| async { "404 Not Found" });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(|e| AppError::EnvError(format!("Failed to bind port {}: {e}", config.port)))?;

    tracing::info!("Recovery hub listening on http://0.0.0.0:{}", config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Server stopped: {}", e);
        AppError::InternalError
    })
}

async fn build_state(config: Arc<Config>) -> Result<AppState, AppError> {
    let (store, subscribers): (Arc<dyn CollectionStore>, Arc<dyn SubscriberStore>) =
        match &config.redis_url {
            Some(url) => {
                let manager = RedisConnectionManager::new(url.as_str())?;
                let pool = Pool::builder()
                    .build(manager)
                    .await
                    .map_err(AppError::RedisCommandError)?;
                tracing::info!("Using Redis collection store");
                let store = Arc::new(RedisStore::new(pool));
                (
                    store.clone() as Arc<dyn CollectionStore>,
                    store as Arc<dyn SubscriberStore>,
                )
            }
            None => {
                tracing::warn!("REDIS_URL not set, records live in memory only");
                let store = Arc::new(MemoryStore::new());
                (
                    store.clone() as Arc<dyn CollectionStore>,
                    store as Arc<dyn SubscriberStore>,
                )
            }
        };

    let http = reqwest::Client::new();

    let completions: Arc<dyn CompletionClient> = match &config.chat_completions_url {
        Some(url) => Arc::new(HostedCompletionClient::new(
            http.clone(),
            url.clone(),
            config.chat_api_key.clone(),
        )),
        None => Arc::new(OfflineCompletionClient),
    };

    let comments: Arc<dyn CommentSource> = match &config.hosting_api_base {
        Some(base) => Arc::new(HostingClient::new(
            http.clone(),
            base,
            config.project_id.clone(),
            config.hosting_api_key.clone(),
        )?),
        None => Arc::new(OfflineComments),
    };

    let kyc: Arc<dyn KycVerifier> = match &config.kyc_provider_url {
        Some(url) => Arc::new(HostedKycVerifier::new(http, url.clone())),
        None => Arc::new(OfflineKycVerifier),
    };

    let uploader = Arc::new(LocalUploader::new(
        config.uploads_dir.clone(),
        config.uploads_public_path.clone(),
        config.max_upload_bytes,
    ));

    let (announcements, _) = broadcast::channel::<Announcement>(ANNOUNCEMENT_CAPACITY);
    let overlays = Arc::new(MapOverlays::generate(&mut StdRng::from_os_rng()));

    Ok(AppState {
        config,
        store,
        subscribers,
        uploader,
        completions,
        comments,
        kyc,
        announcements,
        overlays,
    })
}
