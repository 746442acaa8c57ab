use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::{errors::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SubscribePayload {
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub subscribed: bool,
}

/// Optional leading `+`, then 8 to 15 digits. Spaces and dashes are ignored.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let (plus, rest) = match raw.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", raw),
    };
    let digits: String = rest.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    if !(8..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{plus}{digits}"))
}

pub async fn subscribe_whatsapp_handler(
    State(state): State<AppState>,
    Json(payload): Json<SubscribePayload>,
) -> Result<Json<SubscribeResponse>, (StatusCode, String)> {
    let phone = normalize_phone(&payload.phone).ok_or_else(|| {
        AppError::BadRequest("Please enter a valid phone number.".into()).to_response()
    })?;

    let added = state
        .subscribers
        .add_whatsapp_subscriber(&phone)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store WhatsApp subscriber: {}", e);
            e.to_response()
        })?;

    if added {
        tracing::info!("New WhatsApp subscriber");
    }

    Ok(Json(SubscribeResponse { subscribed: true }))
}
