use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::{
    errors::AppError, models::comment::CommentCreatedEvent, notify::Announcement,
    state::AppState,
};

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Checks the shared secret of a webhook call. Nothing is accepted while no
/// secret is configured.
pub fn verify_webhook_secret(headers: &HeaderMap, expected: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Err(AppError::Unauthorized("Webhooks are not enabled".into()));
    };
    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing webhook secret".into()))?;

    // Constant-time comparison.
    let matches = provided.len() == expected.len()
        && provided
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0;
    if !matches {
        return Err(AppError::Unauthorized("Invalid webhook secret".into()));
    }
    Ok(())
}

/// `comment:created` push from the hosting platform, relayed to every dashboard.
pub async fn comment_created_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<CommentCreatedEvent>,
) -> Result<StatusCode, (StatusCode, String)> {
    verify_webhook_secret(&headers, state.config.comment_webhook_secret.as_deref()).map_err(
        |e| {
            tracing::warn!("Rejected comment webhook: {}", e);
            e.to_response()
        },
    )?;

    tracing::debug!("Comment {} created", event.comment.id);
    let receivers = state
        .announcements
        .send(Announcement::CommentCreated(event.comment))
        .unwrap_or(0);
    tracing::debug!("Comment relayed to {} dashboards", receivers);
    Ok(StatusCode::ACCEPTED)
}
