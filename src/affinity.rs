//! Main-thread identity and thread-affine execution.
//!
//! The host designates a single privileged thread (its main/event thread)
//! for engine-mutating work. This module resolves and caches that thread's
//! identity and offers the one sanctioned way to run work on it. Identity
//! only lives here; stack sampling belongs to the engine.

use std::sync::{Arc, OnceLock};

/// Opaque comparable token for a host thread, minted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadToken(u64);

impl ThreadToken {
    /// Wrap a host-assigned thread identity.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// A captured stack of one thread.
#[derive(Debug, Clone)]
pub struct ThreadDump {
    /// Name of the dumped thread
    pub thread_name: String,
    /// Stack frames, innermost first
    pub frames: Vec<String>,
}

/// A unit of work deferred to the host's main thread.
pub type MainThreadTask = Box<dyn FnOnce() + Send>;

/// Thread capabilities consumed from the host.
pub trait ThreadAccess: Send + Sync {
    /// The main thread's token, once the host has one.
    fn main_thread(&self) -> Option<ThreadToken>;

    /// The calling thread's token.
    fn current_thread(&self) -> ThreadToken;

    /// Capture the stack of `thread`, if the host can.
    fn capture_stack(&self, thread: &ThreadToken) -> Option<ThreadDump>;

    /// Queue `task` for the host's next main-thread processing opportunity.
    /// FIFO in submission order.
    fn submit_main(&self, task: MainThreadTask);
}

/// Resolves and caches the host's main-thread identity.
///
/// Resolution is lazy and write-once: concurrent first resolutions race
/// benignly and converge to a single cached token, because the host's
/// answer is stable once it has one.
pub struct MainThreadProbe {
    host: Arc<dyn ThreadAccess>,
    cached: OnceLock<ThreadToken>,
}

impl MainThreadProbe {
    /// Create a probe over the host's thread capabilities.
    pub fn new(host: Arc<dyn ThreadAccess>) -> Self {
        Self {
            host,
            cached: OnceLock::new(),
        }
    }

    /// The main thread's token, resolving and caching on first success.
    /// Safe to call from any thread.
    pub fn resolve(&self) -> Option<ThreadToken> {
        if let Some(token) = self.cached.get() {
            return Some(*token);
        }
        let token = self.host.main_thread()?;
        // A concurrent resolver may have won; either value is the same
        // identity, so the set result is irrelevant.
        let _ = self.cached.set(token);
        Some(*self.cached.get().unwrap_or(&token))
    }

    /// Whether the calling thread is the host's main thread. `false` while
    /// the main thread is still unresolved.
    pub fn is_on_main_thread(&self) -> bool {
        match self.resolve() {
            Some(main) => self.host.current_thread() == main,
            None => false,
        }
    }

    /// Capture the main thread's stack, if resolvable and supported.
    pub fn capture_main_thread_stack(&self) -> Option<ThreadDump> {
        let main = self.resolve()?;
        self.host.capture_stack(&main)
    }

    /// Run `task` on the host's main thread: immediately when already
    /// there, otherwise deferred to the host's next processing opportunity.
    pub fn run_on_main_thread(&self, task: MainThreadTask) {
        if self.is_on_main_thread() {
            task();
        } else {
            self.host.submit_main(task);
        }
    }
}
