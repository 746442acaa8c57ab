use axum::{
    extract::{ConnectInfo, Query, State, WebSocketUpgrade, ws::WebSocket},
    http::StatusCode,
    response::IntoResponse,
};
use futures::StreamExt;
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::{Mutex, broadcast::error::RecvError};

use crate::{
    auth::AuthClaims,
    comments::COMMENTS_UNAVAILABLE,
    forms::FormKind,
    models::dashboard::DashboardServerMessage,
    notify::Announcement,
    state::AppState,
    ws::handlers::dashboard::{
        message_handler,
        sections::{COMMENTS_LIST, spawn_sections},
        utils::DashboardSession,
    },
};

pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub token: Option<String>,
}

pub async fn dashboard_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<DashboardQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let username = match query.token.as_deref() {
        Some(token) => AuthClaims::from_token(token, &state.config.jwt_secret)?.0.sub,
        None => ANONYMOUS.to_string(),
    };

    tracing::info!("New dashboard connection from {} as {}", addr, username);

    Ok(ws.on_upgrade(move |socket| handle_dashboard_socket(socket, username, state)))
}

async fn handle_dashboard_socket(socket: WebSocket, username: String, state: AppState) {
    let (sender, receiver) = socket.split();
    let sender = Arc::new(Mutex::new(sender));
    let session = Arc::new(DashboardSession::new(username, state, sender));

    session
        .send(&DashboardServerMessage::Overlays {
            overlays: session.state.overlays.as_ref().clone(),
        })
        .await;

    for form in FormKind::ALL {
        session.with_form(form, |_| ()).await;
    }

    let mut tasks = spawn_sections(&session);
    tasks.push(tokio::spawn(forward_announcements(session.clone())));
    tasks.push(tokio::spawn(load_first_comments(session.clone())));

    message_handler::handle_incoming_dashboard_messages(receiver, &session).await;

    for task in tasks {
        task.abort();
    }
    tracing::info!("Dashboard session for {} closed", session.username);
}

async fn load_first_comments(session: Arc<DashboardSession>) {
    let result = {
        let mut feed = session.comments.lock().await;
        feed.load_next(session.state.comments.as_ref()).await
    };

    match result {
        Ok(Some(update)) => {
            session
                .send(&DashboardServerMessage::Comments {
                    html: update.html,
                    placement: update.placement,
                    has_more: update.has_more,
                })
                .await;
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Failed to load community forum: {}", e);
            session
                .send(&DashboardServerMessage::Section {
                    section: COMMENTS_LIST,
                    html: COMMENTS_UNAVAILABLE.to_string(),
                })
                .await;
        }
    }
}

async fn forward_announcements(session: Arc<DashboardSession>) {
    let mut announcements = session.state.announcements.subscribe();

    loop {
        match announcements.recv().await {
            Ok(Announcement::Notification(notification)) => {
                session
                    .send(&DashboardServerMessage::Notification { notification })
                    .await;
            }
            Ok(Announcement::CommentCreated(comment)) => {
                let update = session.comments.lock().await.created(&comment);
                if let Some(update) = update {
                    session
                        .send(&DashboardServerMessage::Comments {
                            html: update.html,
                            placement: update.placement,
                            has_more: update.has_more,
                        })
                        .await;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("{} missed {} announcements", session.username, skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
