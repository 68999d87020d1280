use async_trait::async_trait;
use meditrack_models::settings::TelegramSettings;
use meditrack_scheduler::NotificationChannel;
use teloxide::{
    prelude::*,
    types::ParseMode,
    utils::markdown::{bold, escape},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramDeliveryError {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),
}

/// Sends reminder notifications to a single Telegram chat.
pub struct TelegramNotificationChannel {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotificationChannel {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    pub fn from_settings(settings: &TelegramSettings) -> Self {
        Self::new(Bot::new(&settings.token), ChatId(settings.chat_id))
    }

    pub async fn send(&self, title: &str, body: &str) -> Result<(), TelegramDeliveryError> {
        self.bot
            .send_message(self.chat_id, get_message_text(title, body))
            .parse_mode(ParseMode::MarkdownV2)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for TelegramNotificationChannel {
    async fn notify(&self, title: &str, body: &str) {
        if let Err(e) = self.send(title, body).await {
            log::error!(
                "Failed to deliver notification to Telegram. [chat_id = {}, error = {e}]",
                self.chat_id.0
            );
        }
    }
}

fn get_message_text(title: &str, body: &str) -> String {
    format!("💊 {}\n{}", bold(&escape(title)), escape(body))
}
