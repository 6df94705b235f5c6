//! Dashboard
//!
//! Script registry view model, snippet template and clipboard seam.

mod clipboard;
mod registry;
pub mod snippet;

#[cfg(feature = "clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{Clipboard, ClipboardError, PendingClipboard};
pub use registry::{
    RegistryConfig, RegistryError, RegistryResult, RegistrySnapshot, ScriptRegistry, ScriptView,
    COPY_CONFIRMATION,
};
