//! Clipboard seam
//!
//! Browsers copy on click. When that fails the web front-end keeps the
//! text for the next page, which shows it for a manual copy. The CLI
//! writes to the system clipboard when built with the `clipboard` feature.

use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write clipboard: {0}")]
    Write(String),
}

/// Destination for copied snippets
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Holds the last copied text until a page picks it up
#[derive(Debug, Default)]
pub struct PendingClipboard {
    pending: Mutex<Option<String>>,
}

impl PendingClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the pending text
    pub fn take(&self) -> Option<String> {
        self.pending.lock().ok().and_then(|mut pending| pending.take())
    }
}

impl Clipboard for PendingClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| ClipboardError::Write(e.to_string()))?;
        *pending = Some(text.to_string());
        Ok(())
    }
}

/// System clipboard via arboard
#[cfg(feature = "clipboard")]
#[derive(Debug, Default)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_clipboard_take_once() {
        let clipboard = PendingClipboard::new();
        clipboard.write_text("first").unwrap();
        clipboard.write_text("second").unwrap();

        assert_eq!(clipboard.take().as_deref(), Some("second"));
        assert_eq!(clipboard.take(), None);
    }
}
