//! Per-wallet notification queue for the batch runner
//!
//! Modules append report lines for the wallet they operate on; the executor
//! flushes each wallet's queue once the account is done, producing a single
//! composed message for the configured sink.

pub mod message;
pub mod notifier;
pub mod sink;

pub use message::{ComposedMessage, EntityKind, Message, MessageEntity};
pub use notifier::Notifier;
pub use sink::{LogSink, MemorySink, MessageSink, TelegramSink};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery request failed: {0}")]
    Request(String),

    #[error("delivery rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid sink configuration: {0}")]
    InvalidConfig(String),
}

/// The request URL carries the bot token, so it is stripped from the message
impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Request(e.without_url().to_string())
    }
}
