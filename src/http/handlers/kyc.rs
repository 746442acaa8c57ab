use axum::{Json, extract::State, http::StatusCode};

use crate::{kyc::KycResult, state::AppState};

pub async fn verify_kyc_handler(
    State(state): State<AppState>,
    Json(assertion): Json<serde_json::Value>,
) -> Result<Json<KycResult>, (StatusCode, String)> {
    let result = state.kyc.verify(&assertion).await.map_err(|e| {
        tracing::error!("KYC verification failed: {}", e);
        e.to_response()
    })?;

    tracing::info!("KYC verification finished, success: {}", result.success);
    Ok(Json(result))
}
