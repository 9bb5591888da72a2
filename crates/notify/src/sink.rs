use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{ComposedMessage, MessageEntity, NotifyError};

/// Destination for composed per-wallet reports
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, wallet: &str, message: &ComposedMessage) -> Result<(), NotifyError>;
}

/// Telegram Bot API `sendMessage` delivery
pub struct TelegramSink {
    base_url: String,
    bot_token: String,
    chat_id: i64,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "no_entities")]
    entities: &'a [MessageEntity],
}

fn no_entities(entities: &&[MessageEntity]) -> bool {
    entities.is_empty()
}

impl TelegramSink {
    pub fn new(bot_token: impl Into<String>, chat_id: i64) -> Result<Self, NotifyError> {
        Self::with_base_url("https://api.telegram.org", bot_token, chat_id)
    }

    /// Sink against a Bot API compatible server
    pub fn with_base_url(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: i64,
    ) -> Result<Self, NotifyError> {
        let bot_token = bot_token.into();
        if bot_token.trim().is_empty() {
            return Err(NotifyError::InvalidConfig("bot token is empty".to_string()));
        }
        if chat_id == 0 {
            return Err(NotifyError::InvalidConfig("chat id is zero".to_string()));
        }

        Ok(Self {
            base_url: base_url.into(),
            bot_token,
            chat_id,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl MessageSink for TelegramSink {
    async fn deliver(&self, wallet: &str, message: &ComposedMessage) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let request = SendMessageRequest {
            chat_id: self.chat_id,
            text: &message.text,
            entities: &message.entities,
        };

        debug!(wallet, entities = message.entities.len(), "Sending Telegram report");

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(wallet, %status, "Telegram API error");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Writes reports to the log when Telegram delivery is disabled
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl MessageSink for LogSink {
    async fn deliver(&self, wallet: &str, message: &ComposedMessage) -> Result<(), NotifyError> {
        info!(wallet, "Report:\n{}", message.text);
        Ok(())
    }
}

/// Keeps every delivery in memory, in delivery order
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<(String, ComposedMessage)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(String, ComposedMessage)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn deliver(&self, wallet: &str, message: &ComposedMessage) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .await
            .push((wallet.to_string(), message.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;

    #[test]
    fn test_telegram_requires_credentials() {
        assert!(matches!(
            TelegramSink::new("", 42),
            Err(NotifyError::InvalidConfig(_))
        ));
        assert!(matches!(
            TelegramSink::new("123:abc", 0),
            Err(NotifyError::InvalidConfig(_))
        ));
        assert!(TelegramSink::new("123:abc", 42).is_ok());
    }

    #[test]
    fn test_request_body_shape() {
        let composed = ComposedMessage::compose(&[Message::success_with_link("ok", "u/", "s")]);
        let request = SendMessageRequest {
            chat_id: 7,
            text: &composed.text,
            entities: &composed.entities,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["chat_id"], 7);
        assert_eq!(value["entities"][0]["type"], "text_link");

        let plain = ComposedMessage::compose(&[Message::plain("hi")]);
        let request = SendMessageRequest {
            chat_id: 7,
            text: &plain.text,
            entities: &plain.entities,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("entities").is_none());
    }

    #[tokio::test]
    async fn test_delivery_error_hides_bot_token() {
        let sink = TelegramSink::with_base_url("http://127.0.0.1:1", "123456:SECRET_TOKEN", 42)
            .unwrap();
        let message = ComposedMessage::compose(&[Message::plain("report")]);

        let err = sink.deliver("wallet", &message).await.unwrap_err();

        assert!(matches!(err, NotifyError::Request(_)));
        assert!(!err.to_string().contains("SECRET_TOKEN"));
        assert!(!format!("{err:?}").contains("SECRET_TOKEN"));
    }

    #[tokio::test]
    async fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.deliver("a", &ComposedMessage::compose(&[Message::plain("1")]))
            .await
            .unwrap();
        sink.deliver("b", &ComposedMessage::compose(&[Message::plain("2")]))
            .await
            .unwrap();

        let sent = sink.sent().await;
        assert_eq!(sent[0].0, "a");
        assert_eq!(sent[1].1.text, "2");
    }
}
