//! Session-scoped host access.

use crate::engine::CommandSender;
use crate::host::registry::RegistryHandle;
use std::fmt;
use std::sync::Arc;

/// Identity of one host instance (e.g. one client session).
///
/// Stop notifications carry the instance they concern; a shim bound to one
/// instance must ignore notifications about siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Wrap a host-assigned instance identity.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance-{}", self.0)
    }
}

/// Callback invoked when the host announces an instance is stopping.
pub type StopCallback = Box<dyn Fn(InstanceId) + Send + Sync>;

/// Guard for a stop-notification subscription; dropping it unsubscribes.
pub struct StopSubscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl StopSubscription {
    /// Create a subscription guard that runs `cancel` on drop.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription that needs no teardown.
    pub fn noop() -> Self {
        Self { cancel: None }
    }
}

impl Drop for StopSubscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for StopSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopSubscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Session-scoped host capabilities consumed by the shim.
///
/// `current_registry` may return `None` before the host has a live session
/// (no player yet); that is the normal "retry next poll" signal, not an
/// error. Callbacks subscribed here may fire on the host's main thread or
/// an unspecified host thread.
pub trait HostBridge: Send + Sync {
    /// The live command registry handle, if the host has one right now.
    fn current_registry(&self) -> Option<RegistryHandle>;

    /// The sender (e.g. the client player) commands execute as, if any.
    fn active_sender(&self) -> Option<Arc<dyn CommandSender>>;

    /// Subscribe to stop notifications. The returned guard unsubscribes on
    /// drop.
    fn subscribe_stop(&self, callback: StopCallback) -> StopSubscription;

    /// Append raw text to the host's chat history for local audit/display.
    fn add_to_chat_history(&self, text: &str);
}
