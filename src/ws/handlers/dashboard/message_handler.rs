use axum::extract::ws::Message;
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;

use crate::{
    chat::OFFLINE_REPLY,
    errors::AppError,
    forms::{BeginOutcome, FileInput, FormKind, controller::LOCATION_TIMEOUT},
    live::render::render_chat_turn,
    models::{
        chat::ChatRole,
        dashboard::{DashboardClientMessage, DashboardServerMessage},
        geo::LatLng,
    },
    ws::handlers::dashboard::utils::{DashboardSession, PendingAttachment},
};

pub async fn handle_incoming_dashboard_messages(
    mut receiver: impl StreamExt<Item = Result<Message, axum::Error>> + Unpin,
    session: &Arc<DashboardSession>,
) {
    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match serde_json::from_str::<DashboardClientMessage>(&text)
            {
                Ok(parsed) => handle_message(parsed, session).await,
                Err(e) => {
                    tracing::warn!("Invalid dashboard message from {}: {}", session.username, e);
                    session
                        .send(&DashboardServerMessage::Error {
                            message: "Invalid message".to_string(),
                        })
                        .await;
                }
            },
            Ok(Message::Binary(bytes)) => handle_file(bytes.to_vec(), session).await,
            Ok(Message::Close(_)) => {
                tracing::info!("{} closed the dashboard", session.username);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Dashboard socket error for {}: {}", session.username, e);
                break;
            }
        }
    }
}

async fn handle_message(message: DashboardClientMessage, session: &Arc<DashboardSession>) {
    match message {
        DashboardClientMessage::Ping { ts } => {
            let now = Utc::now().timestamp_millis() as u64;
            session
                .send(&DashboardServerMessage::Pong {
                    ts,
                    pong: now.saturating_sub(ts),
                })
                .await;
        }
        DashboardClientMessage::Submit { form, fields } => {
            let outcome = session
                .with_form(form, |controller| controller.begin(&fields))
                .await;
            match outcome {
                Some(BeginOutcome::Ready(submission)) => session.spawn_submission(submission),
                Some(BeginOutcome::NeedsLocation { request }) => {
                    session
                        .send(&DashboardServerMessage::RequestGeolocation { form })
                        .await;
                    expire_location_later(session, form, request);
                }
                Some(BeginOutcome::Busy) => {
                    tracing::debug!("Ignored duplicate {:?} submit", form);
                }
                Some(BeginOutcome::Rejected) | None => {}
            }
        }
        DashboardClientMessage::AttachFile {
            form,
            name,
            content_type,
        } => {
            *session.pending_attachment.lock().await = Some(PendingAttachment {
                form,
                name,
                content_type,
            });
        }
        DashboardClientMessage::Geolocation { lat, lng } => {
            let submission = session
                .with_form(FormKind::Incident, |controller| {
                    controller.resolve_location(Some(LatLng { lat, lng }))
                })
                .await
                .flatten();
            if let Some(submission) = submission {
                session.spawn_submission(submission);
            }
        }
        DashboardClientMessage::GeolocationDenied => {
            session
                .with_form(FormKind::Incident, |controller| {
                    controller.resolve_location(None)
                })
                .await;
        }
        DashboardClientMessage::MapClick { lat, lng } => {
            session
                .with_form(FormKind::Incident, |controller| {
                    controller.map_click(LatLng { lat, lng })
                })
                .await;
        }
        DashboardClientMessage::Chat { text } => {
            let text = text.trim().to_string();
            if text.is_empty() {
                return;
            }
            session
                .send(&DashboardServerMessage::ChatMessage {
                    role: ChatRole::User,
                    html: render_chat_turn(ChatRole::User, &text),
                })
                .await;

            let session = session.clone();
            tokio::spawn(async move {
                let reply = {
                    let mut chat = session.chat.lock().await;
                    chat.ask(session.state.completions.as_ref(), &text).await
                };
                let reply = reply.unwrap_or_else(|e| {
                    tracing::error!("Chat completion failed: {}", e);
                    OFFLINE_REPLY.to_string()
                });
                session
                    .send(&DashboardServerMessage::ChatMessage {
                        role: ChatRole::Assistant,
                        html: render_chat_turn(ChatRole::Assistant, &reply),
                    })
                    .await;
            });
        }
        DashboardClientMessage::LoadMoreComments => {
            let session = session.clone();
            tokio::spawn(async move {
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
                        tracing::error!("Failed to load more comments: {}", e);
                        session
                            .send(&DashboardServerMessage::Error {
                                message: "Could not load more comments.".to_string(),
                            })
                            .await;
                    }
                }
            });
        }
        DashboardClientMessage::PostComment { content } => {
            let content = content.trim().to_string();
            if content.is_empty() {
                return;
            }
            let session = session.clone();
            tokio::spawn(async move {
                match session.state.comments.post_comment(&content).await {
                    Ok(()) => session.send(&DashboardServerMessage::CommentPosted).await,
                    Err(e) => {
                        tracing::error!("Failed to post comment: {}", e);
                        session
                            .alert(format!("Could not post message: {}", post_error(&e)))
                            .await;
                    }
                }
            });
        }
    }
}

/// Falls back to the map-click prompt when the client never answers.
fn expire_location_later(session: &Arc<DashboardSession>, form: FormKind, request: u64) {
    let session = session.clone();
    tokio::spawn(async move {
        tokio::time::sleep(LOCATION_TIMEOUT).await;
        let expired = {
            let mut forms = session.forms.lock().await;
            forms
                .get_mut(&form)
                .is_some_and(|controller| controller.expire_location(request))
        };
        if expired {
            tracing::debug!("Geolocation for {} timed out", session.username);
            session.with_form(form, |_| ()).await;
        }
    });
}

fn post_error(e: &AppError) -> String {
    match e {
        AppError::BadRequest(msg) | AppError::Unavailable(msg) => msg.clone(),
        other => other.to_string(),
    }
}

async fn handle_file(bytes: Vec<u8>, session: &Arc<DashboardSession>) {
    let Some(pending) = session.pending_attachment.lock().await.take() else {
        session
            .send(&DashboardServerMessage::Error {
                message: "File received without an attachFile announcement".to_string(),
            })
            .await;
        return;
    };

    if bytes.len() > session.state.config.max_upload_bytes {
        session
            .alert(format!("{} is too large to upload.", pending.name))
            .await;
        return;
    }

    tracing::debug!("Staged {} for {:?}", pending.name, pending.form);
    session
        .attach(
            FileInput {
                name: pending.name,
                content_type: pending.content_type,
                bytes,
            },
            pending.form,
        )
        .await;
}
