use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    auth::AuthClaims,
    db::Filter,
    models::{CollectionName, Record, RecordPayload},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct CollectionQuery {
    /// Equality filter on the `type` field (reviews).
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl CollectionQuery {
    pub fn filter(&self) -> Option<Filter> {
        self.kind
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|k| Filter::eq("type", k.trim()))
    }
}

pub async fn create_record_handler(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Path(name): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<Record>), (StatusCode, String)> {
    let collection = name.parse::<CollectionName>().map_err(|e| e.to_response())?;
    let payload = RecordPayload::from_body(collection, body).map_err(|e| {
        tracing::warn!("Rejected body for {}: {}", collection, e);
        e.to_response()
    })?;

    let record = state
        .store
        .create(collection, &claims.sub, payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create record in {}: {}", collection, e);
            e.to_response()
        })?;

    tracing::info!("{} added {} to {}", claims.sub, record.id, collection);
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_records_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CollectionQuery>,
) -> Result<Json<Vec<Record>>, (StatusCode, String)> {
    let collection = name.parse::<CollectionName>().map_err(|e| e.to_response())?;
    let filter = query.filter();

    let records = state
        .store
        .list(collection, filter.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to list {}: {}", collection, e);
            e.to_response()
        })?;

    Ok(Json(records))
}
