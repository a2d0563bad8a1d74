//! The raw-text interception slot.
//!
//! The host exposes exactly one mutable slot for "the chat interception
//! callback". Rather than ambient global state, the slot is an explicit
//! coordination object constructed once by the embedding glue and passed by
//! reference to both the host's chat pipeline and the shim controller.
//! Single-writer discipline: the shim is the only component that sets or
//! clears the callback; installing a new callback replaces the old one.

use std::sync::{Arc, RwLock};

/// Chat interception callback. Returns `true` when the text was consumed
/// as a command and the host must suppress normal chat processing.
pub type ChatCallback = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Process-wide coordination object holding the chat interception slot.
#[derive(Default)]
pub struct GameHooks {
    chat_send: RwLock<Option<ChatCallback>>,
}

impl GameHooks {
    /// Create an empty hook slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the chat interception callback, replacing any previous one.
    pub fn set_chat_callback(&self, callback: ChatCallback) {
        if let Ok(mut slot) = self.chat_send.write() {
            *slot = Some(callback);
        }
    }

    /// Clear the chat interception callback.
    pub fn clear_chat_callback(&self) {
        if let Ok(mut slot) = self.chat_send.write() {
            *slot = None;
        }
    }

    /// Whether a callback is currently installed.
    pub fn is_armed(&self) -> bool {
        self.chat_send.read().map(|s| s.is_some()).unwrap_or(false)
    }

    /// Called by the host for every outgoing chat text before default
    /// handling. Returns `true` when the text was consumed.
    pub fn dispatch_chat(&self, text: &str) -> bool {
        let callback = match self.chat_send.read() {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        match callback {
            Some(cb) => cb(text),
            None => false,
        }
    }
}
