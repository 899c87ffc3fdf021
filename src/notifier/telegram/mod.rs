pub mod sender;

use crate::model::NotifyError;
use crate::notifier::traits::{Notifier, Severity};
use reqwest::Client;
use std::time::Duration;

/// Delivers notifications as Telegram bot messages.
pub struct TelegramNotifier {
    pub bot_token: String,
    pub chat_id: i64,
    pub client: Client,
    pub api_base: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: i64) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            bot_token,
            chat_id,
            client,
            api_base: "https://api.telegram.org".to_string(),
        })
    }

    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str, severity: Severity) -> Result<(), NotifyError> {
        sender::send_text(self, &sender::decorate(message, severity)).await
    }
}
