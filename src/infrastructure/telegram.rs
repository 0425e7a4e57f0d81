//! Notification transports: the Telegram Bot API, and a log-only fallback
//! used when no bot token is configured.

use crate::domain::notification::NotificationSender;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

pub struct TelegramNotificationSender {
    client: Client,
    endpoint: String,
}

impl TelegramNotificationSender {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_base: &str, bot_token: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: send_message_url(api_base, bot_token),
        })
    }
}

fn send_message_url(api_base: &str, bot_token: &str) -> String {
    format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), bot_token)
}

#[async_trait]
impl NotificationSender for TelegramNotificationSender {
    #[instrument(skip(self, text))]
    async fn send(&self, chat_id: &str, text: &str) {
        let result = self
            .client
            .post(&self.endpoint)
            .json(&SendMessage { chat_id, text })
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => info!("Telegram notification delivered"),
            Err(e) => warn!(error = %e, "Telegram notification failed"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send(&self, chat_id: &str, text: &str) {
        info!(chat_id = chat_id, text = text, "Notification");
    }
}
