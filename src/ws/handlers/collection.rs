use axum::{
    extract::{
        ConnectInfo, Path, Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::net::SocketAddr;

use crate::{
    db::{Filter, Subscription},
    http::handlers::collection::CollectionQuery,
    models::{CollectionName, Snapshot},
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum SnapshotMessage<'a> {
    Snapshot {
        collection: CollectionName,
        records: &'a Snapshot,
    },
    Error {
        message: String,
    },
}

/// Raw snapshot stream of one (optionally filtered) collection.
pub async fn collection_ws_handler(
    ws: WebSocketUpgrade,
    Path(name): Path<String>,
    Query(query): Query<CollectionQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let collection = name.parse::<CollectionName>().map_err(|e| e.to_response())?;
    tracing::info!("New {} snapshot subscriber from {}", collection, addr);

    let filter = query.filter();
    Ok(ws.on_upgrade(move |socket| handle_collection_socket(socket, state, collection, filter)))
}

async fn handle_collection_socket(
    socket: WebSocket,
    state: AppState,
    collection: CollectionName,
    filter: Option<Filter>,
) {
    let (mut sender, mut receiver) = socket.split();
    let mut snapshots = Box::pin(Subscription::new(state.store.clone(), collection, filter).into_stream());

    loop {
        tokio::select! {
            next = snapshots.next() => {
                let Some(next) = next else { break };
                let message = match &next {
                    Ok(records) => SnapshotMessage::Snapshot { collection, records },
                    Err(e) => {
                        tracing::error!("Snapshot of {} failed: {}", collection, e);
                        SnapshotMessage::Error { message: e.to_string() }
                    }
                };
                let serialized = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to serialize snapshot: {}", e);
                        continue;
                    }
                };
                if sender.send(Message::Text(serialized.into())).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    }

    tracing::info!("{} snapshot subscriber disconnected", collection);
}
