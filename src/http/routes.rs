use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower::limit::ConcurrencyLimitLayer;

use crate::{
    http::handlers::{
        comment_created_handler, create_record_handler, list_records_handler,
        subscribe_whatsapp_handler, upload_handler, verify_kyc_handler,
    },
    state::AppState,
};

const MAX_CONCURRENT_UPLOADS: usize = 8;

pub fn create_http_routes(state: AppState) -> Router {
    // Multipart framing needs a little room on top of the file itself.
    let upload_body_limit = state.config.max_upload_bytes + 64 * 1024;

    let uploads = Router::new()
        .route("/upload", post(upload_handler))
        .route_layer(DefaultBodyLimit::max(upload_body_limit))
        .route_layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_UPLOADS));

    Router::new()
        .route(
            "/collections/{name}",
            get(list_records_handler).post(create_record_handler),
        )
        .route("/subscribe-whatsapp", post(subscribe_whatsapp_handler))
        .route("/kyc/verify", post(verify_kyc_handler))
        .route("/webhooks/comment-created", post(comment_created_handler))
        .merge(uploads)
        .with_state(state)
}
