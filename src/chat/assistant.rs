use std::collections::VecDeque;

use crate::{
    chat::CompletionClient,
    errors::AppError,
    models::chat::{ChatRole, ChatTurn},
};

pub const OFFLINE_REPLY: &str = "Sorry, I'm offline.";

/// Ordered conversation with a fixed system preamble. Only the most recent
/// `max_history` messages are kept; the oldest exchanges go first, whole.
#[derive(Debug, Clone)]
pub struct ChatAssistant {
    preamble: String,
    history: VecDeque<ChatTurn>,
    max_history: usize,
}

impl ChatAssistant {
    pub fn new(preamble: impl Into<String>, max_history: usize) -> Self {
        Self {
            preamble: preamble.into(),
            history: VecDeque::new(),
            max_history: max_history.max(2),
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatTurn> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The message list sent to the completion service: preamble first, then history.
    pub fn transcript(&self) -> Vec<ChatTurn> {
        std::iter::once(ChatTurn::system(self.preamble.clone()))
            .chain(self.history.iter().cloned())
            .collect()
    }

    /// Appends `text`, sends the whole conversation, appends the reply. On
    /// failure the user turn is taken back out so the history stays paired.
    pub async fn ask(
        &mut self,
        client: &dyn CompletionClient,
        text: &str,
    ) -> Result<String, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("Message cannot be empty".into()));
        }

        self.history.push_back(ChatTurn::user(text));
        let transcript = self.transcript();

        match client.complete(&transcript).await {
            Ok(reply) => {
                self.history.push_back(ChatTurn::assistant(reply.clone()));
                self.trim();
                Ok(reply)
            }
            Err(e) => {
                self.history.pop_back();
                Err(e)
            }
        }
    }

    /// History always opens with a user turn.
    fn trim(&mut self) {
        while self.history.len() > self.max_history {
            self.history.pop_front();
            while self
                .history
                .front()
                .is_some_and(|turn| turn.role != ChatRole::User)
            {
                self.history.pop_front();
            }
        }
    }
}
