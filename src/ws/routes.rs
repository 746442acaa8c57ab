use axum::{Router, routing::get};

use crate::{
    state::AppState,
    ws::handlers::{collection_ws_handler, dashboard_handler},
};

pub fn create_ws_routes(state: AppState) -> Router {
    Router::new()
        .route("/ws/collections/{name}", get(collection_ws_handler))
        .route("/ws/dashboard", get(dashboard_handler))
        .with_state(state)
}
