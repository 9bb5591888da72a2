use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{ComposedMessage, Message, MessageSink, NotifyError};

/// Per-wallet message queues behind one lock.
///
/// Workers only ever touch the wallet they are processing, so the lock is
/// held for a push or a removal and never across a delivery.
pub struct Notifier {
    queues: Mutex<HashMap<String, Vec<Message>>>,
    sink: Arc<dyn MessageSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            sink,
        }
    }

    async fn push(&self, wallet: &str, message: Message) {
        self.queues
            .lock()
            .await
            .entry(wallet.to_string())
            .or_default()
            .push(message);
    }

    pub async fn add_message(&self, wallet: &str, text: impl Into<String>) {
        self.push(wallet, Message::plain(text)).await;
    }

    pub async fn add_success(&self, wallet: &str, text: &str) {
        self.push(wallet, Message::plain(format!("✅ {text}"))).await;
    }

    pub async fn add_error(&self, wallet: &str, text: &str) {
        self.push(wallet, Message::plain(format!("❌ {text}"))).await;
    }

    pub async fn add_success_with_link(
        &self,
        wallet: &str,
        text: &str,
        scan_url: &str,
        signature: &str,
    ) {
        self.push(wallet, Message::success_with_link(text, scan_url, signature))
            .await;
    }

    /// Messages queued for a wallet, oldest first
    pub async fn pending(&self, wallet: &str) -> Vec<Message> {
        self.queues
            .lock()
            .await
            .get(wallet)
            .cloned()
            .unwrap_or_default()
    }

    /// Take the wallet's queue and deliver it as one message.
    ///
    /// The queue is removed before delivery, so a failed send drops it.
    pub async fn flush(&self, wallet: &str) -> Result<(), NotifyError> {
        let messages = self.queues.lock().await.remove(wallet);

        let Some(messages) = messages.filter(|m| !m.is_empty()) else {
            debug!(wallet, "No messages to flush");
            return Ok(());
        };

        let composed = ComposedMessage::compose(&messages);
        self.sink.deliver(wallet, &composed).await
    }

    pub async fn clear_all(&self) {
        self.queues.lock().await.clear();
    }
}
