use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    forms::{FormKind, FormState},
    live::map::{LayerId, Marker, MapOverlays},
    models::chat::ChatRole,
    notify::Notification,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DashboardClientMessage {
    Submit {
        form: FormKind,
        #[serde(default)]
        fields: HashMap<String, String>,
    },
    /// Announces that the next binary frame is a file for `form`.
    AttachFile {
        form: FormKind,
        name: String,
        #[serde(default)]
        content_type: Option<String>,
    },
    Geolocation {
        lat: f64,
        lng: f64,
    },
    GeolocationDenied,
    MapClick {
        lat: f64,
        lng: f64,
    },
    Chat {
        text: String,
    },
    LoadMoreComments,
    PostComment {
        content: String,
    },
    Ping {
        ts: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Append,
    Prepend,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DashboardServerMessage {
    /// Full replacement of one container's markup.
    Section {
        section: &'static str,
        html: String,
    },
    /// Full replacement of one live marker layer.
    Layer {
        layer: LayerId,
        live: bool,
        markers: Vec<Marker>,
    },
    Overlays {
        overlays: MapOverlays,
    },
    Notification {
        notification: Notification,
    },
    Form {
        form: FormKind,
        state: FormState,
    },
    RequestGeolocation {
        form: FormKind,
    },
    Alert {
        message: String,
    },
    ChatMessage {
        role: ChatRole,
        html: String,
    },
    Comments {
        html: String,
        placement: Placement,
        #[serde(rename = "hasMore")]
        has_more: Option<bool>,
    },
    CommentPosted,
    Pong {
        ts: u64,
        pong: u64,
    },
    Error {
        message: String,
    },
}
