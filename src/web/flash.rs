//! Flash messages
//!
//! Toasts queued by one request and shown on the next rendered page.

use serde::Serialize;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Flash {
    queue: Mutex<Vec<FlashMessage>>,
}

impl Flash {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, kind: FlashKind, text: impl Into<String>) {
        self.queue.lock().await.push(FlashMessage {
            kind,
            text: text.into(),
        });
    }

    pub async fn success(&self, text: impl Into<String>) {
        self.push(FlashKind::Success, text).await;
    }

    pub async fn info(&self, text: impl Into<String>) {
        self.push(FlashKind::Info, text).await;
    }

    pub async fn error(&self, text: impl Into<String>) {
        self.push(FlashKind::Error, text).await;
    }

    /// Drain every queued message
    pub async fn take(&self) -> Vec<FlashMessage> {
        std::mem::take(&mut *self.queue.lock().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_take_drains_queue() {
        let flash = Flash::new();
        flash.success("Script created successfully").await;
        flash.error("Failed to fetch scripts").await;

        let messages = flash.take().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].kind, FlashKind::Success);
        assert!(flash.take().await.is_empty());
    }
}
