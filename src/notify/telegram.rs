use crate::config::NotifyConfig;
use crate::error::NotifyError;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Longest message the Bot API accepts, in characters
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Pushes reports to a chat through the Telegram Bot API
///
/// Delivery is a single `sendMessage` GET. Failures are logged and reported
/// as `false`; nothing is retried.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Create a notifier for the given bot and chat
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::MissingCredentials` if the token or chat id is
    /// blank, so no request is ever attempted without them.
    pub fn new(
        bot_token: &str,
        chat_id: &str,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let (bot_token, chat_id) = (bot_token.trim(), chat_id.trim());
        if bot_token.is_empty() || chat_id.is_empty() {
            return Err(NotifyError::MissingCredentials);
        }

        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| NotifyError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }

    /// Create a notifier from the `[notify]` configuration section
    pub fn from_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let (token, chat_id) = config
            .credentials()
            .ok_or(NotifyError::MissingCredentials)?;
        Self::new(
            token,
            chat_id,
            &config.api_base,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    /// Deliver one message, surfacing the reason on failure
    pub async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
        let text = truncate_message(text, TELEGRAM_MESSAGE_LIMIT);
        let response = self
            .client
            .get(self.send_message_url())
            .query(&[("chat_id", self.chat_id.as_str()), ("text", text.as_str())])
            .send()
            .await
            // the URL carries the bot token
            .map_err(|e| NotifyError::HttpError(e.without_url()))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(NotifyError::UnexpectedStatus(status.as_u16())),
        }
    }

    /// Send a report, returning whether it was delivered
    ///
    /// Never fails past this boundary: transport errors and non-200
    /// responses are logged and yield `false`.
    pub async fn send(&self, text: &str) -> bool {
        match self.deliver(text).await {
            Ok(()) => {
                info!("Report sent to chat {}", self.chat_id);
                true
            }
            Err(e) => {
                warn!("Failed to send report to chat {}: {}", self.chat_id, e);
                false
            }
        }
    }
}

/// Shorten a message to at most `max_chars` characters, marking the cut with "..."
pub fn truncate_message(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
