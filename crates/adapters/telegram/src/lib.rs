//! # plugwatch-adapter-telegram
//!
//! Implements the [`Notifier`] port against the Telegram bot API.
//!
//! The bot token and optional message thread are constructor parameters,
//! sourced once at process start by the composition root rather than read
//! from ambient globals. Message text is escaped for `MarkdownV2` before
//! sending, and the API's `ok` field is passed through as the delivery
//! acknowledgment so the policy can retry on a negative answer.

use std::time::Duration;

use serde::Deserialize;

use plugwatch_app::ports::{DeliveryAck, Notifier};
use plugwatch_domain::error::PlugwatchError;

pub mod error;

use error::TelegramError;

const API_BASE: &str = "https://api.telegram.org";

/// Characters with reserved meaning in Telegram `MarkdownV2`.
const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Per-request timeout; a hanging API call must not stall the poll loop.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram bot transport.
pub struct TelegramNotifier {
    http: reqwest::Client,
    base: String,
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    ok: bool,
}

impl TelegramNotifier {
    /// Create a transport using `token`; messages go into `thread_id`
    /// within the target chat when set.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the HTTP client cannot be built.
    pub fn new(token: &str, thread_id: Option<String>) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: format!("{API_BASE}/bot{}/sendMessage", token.trim()),
            thread_id,
        })
    }

    async fn send_message(
        &self,
        text: &str,
        chat_id: &str,
        muted: bool,
    ) -> Result<DeliveryAck, TelegramError> {
        let escaped = escape_markdown(text);
        let mut query: Vec<(&str, String)> = vec![
            ("chat_id", chat_id.to_string()),
            ("parse_mode", "MarkdownV2".to_string()),
            ("text", escaped),
            ("disable_notification", muted.to_string()),
        ];
        if let Some(thread_id) = &self.thread_id {
            query.push(("message_thread_id", thread_id.clone()));
        }

        let response: SendResponse = self
            .http
            .get(&self.base)
            .query(&query)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            tracing::warn!(chat_id, "telegram refused message");
        }
        Ok(DeliveryAck { ok: response.ok })
    }
}

/// Escape every `MarkdownV2` reserved character (and the backslash itself).
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Notifier for TelegramNotifier {
    async fn send(
        &self,
        text: &str,
        target: &str,
        muted: bool,
    ) -> Result<DeliveryAck, PlugwatchError> {
        Ok(self.send_message(text, target, muted).await?)
    }
}
