use async_trait::async_trait;
use teloxide::{
    Bot,
    payloads::SendMessageSetters,
    prelude::{Request, Requester},
    types::{ChatId, ParseMode},
};

use crate::{
    errors::AppError,
    notify::{Notification, Notifier},
};

/// Mirrors dashboard notifications into a Telegram chat.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: i64,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self { bot, chat_id }
    }
}

pub fn telegram_text(notification: &Notification) -> String {
    format!(
        "🔔 <b>{}</b>\n\n{}",
        html_escape::encode_text(&notification.title),
        html_escape::encode_text(&notification.body)
    )
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), AppError> {
        self.bot
            .send_message(ChatId(self.chat_id), telegram_text(notification))
            .parse_mode(ParseMode::Html)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;
        Ok(())
    }
}
