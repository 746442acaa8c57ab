use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, stream::SplitSink};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use crate::{
    chat::ChatAssistant,
    comments::CommentsFeed,
    forms::{FileInput, FormController, FormKind, Submission},
    models::dashboard::DashboardServerMessage,
    state::AppState,
};

pub type DashboardSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// File announced by `attachFile`, waiting for its binary frame.
#[derive(Debug, Clone)]
pub struct PendingAttachment {
    pub form: FormKind,
    pub name: String,
    pub content_type: Option<String>,
}

/// Everything one open dashboard owns. Nothing here is shared between sessions.
pub struct DashboardSession {
    pub username: String,
    pub state: AppState,
    pub sender: DashboardSender,
    pub forms: Mutex<HashMap<FormKind, FormController>>,
    pub chat: Mutex<ChatAssistant>,
    pub comments: Mutex<CommentsFeed>,
    pub pending_attachment: Mutex<Option<PendingAttachment>>,
}

impl DashboardSession {
    pub fn new(username: String, state: AppState, sender: DashboardSender) -> Self {
        let map_center = state.config.map_center;
        let forms = FormKind::ALL
            .into_iter()
            .map(|kind| (kind, FormController::new(kind, map_center)))
            .collect();
        let chat = ChatAssistant::new(
            state.config.chat_preamble.clone(),
            state.config.chat_history_limit,
        );

        Self {
            username,
            state,
            sender,
            forms: Mutex::new(forms),
            chat: Mutex::new(chat),
            comments: Mutex::new(CommentsFeed::new()),
            pending_attachment: Mutex::new(None),
        }
    }

    pub async fn send(&self, msg: &DashboardServerMessage) {
        send_dashboard_message(&self.sender, msg, &self.username).await;
    }

    pub async fn alert(&self, message: impl Into<String>) {
        self.send(&DashboardServerMessage::Alert {
            message: message.into(),
        })
        .await;
    }

    /// Runs `f` on the controller of `form` and pushes the resulting form state.
    pub async fn with_form<T>(
        &self,
        form: FormKind,
        f: impl FnOnce(&mut FormController) -> T,
    ) -> Option<T> {
        let (result, state) = {
            let mut forms = self.forms.lock().await;
            let controller = forms.get_mut(&form)?;
            let result = f(controller);
            (result, controller.state().clone())
        };
        self.send(&DashboardServerMessage::Form { form, state })
            .await;
        Some(result)
    }

    pub async fn attach(&self, file: FileInput, form: FormKind) {
        let mut forms = self.forms.lock().await;
        if let Some(controller) = forms.get_mut(&form) {
            controller.attach(file);
        }
    }

    /// Executes a submission in the background and applies its outcome.
    pub fn spawn_submission(self: &Arc<Self>, submission: Submission) {
        let session = self.clone();
        tokio::spawn(async move {
            let form = submission.kind();
            let outcome = submission
                .execute(
                    session.state.store.as_ref(),
                    session.state.uploader.as_ref(),
                    &session.username,
                )
                .await;

            let alert = session
                .with_form(form, |controller| controller.finish(&outcome))
                .await
                .flatten();
            if let Some(message) = alert {
                session.alert(message).await;
            }
        });
    }
}

pub async fn send_dashboard_message(
    sender: &DashboardSender,
    msg: &DashboardServerMessage,
    username: &str,
) {
    let serialized = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize dashboard message: {}", e);
            return;
        }
    };

    let mut sender = sender.lock().await;
    if let Err(e) = sender.send(Message::Text(serialized.into())).await {
        tracing::debug!("Failed to send dashboard message to {}: {}", username, e);
    }
}
