//! # pulse-shim
//!
//! Host-integration shim binding the Pulse diagnostics engine into a game
//! client that offers no stable extension point for custom commands. The
//! host replaces its command registry at arbitrary times, so the shim
//! reconciles by polling and keeps a raw-text fallback armed for contexts
//! the formal dispatcher does not cover.
//!
//! ## Core Components
//!
//! - **Parser**: pure classification of raw input into argument vectors
//! - **Reconciler**: fixed-delay polling of the host's registry handle,
//!   re-registering exactly once per identity change
//! - **Ingest**: dual-path command entry (formal dispatcher + chat
//!   interception) converging on the engine's executor
//! - **Affinity**: cached main-thread identity and thread-affine execution
//! - **Lifecycle**: idempotent enable/disable wired to the host's stop
//!   notification
//!
//! ## Example
//!
//! ```rust,ignore
//! use pulse_shim::{ShimConfig, ShimController, InstanceId, GameHooks};
//!
//! let hooks = std::sync::Arc::new(GameHooks::new());
//! let controller = ShimController::new(
//!     ShimConfig::default(),
//!     InstanceId::new(0),
//!     host,     // Arc<dyn HostBridge>
//!     threads,  // Arc<dyn ThreadAccess>
//!     engine,   // Arc<dyn DiagnosticsEngine>
//!     hooks.clone(),
//! );
//! controller.enable();
//!
//! // Host chat pipeline, before default handling:
//! if hooks.dispatch_chat("/pulsec profiler start") {
//!     // consumed as a command, suppress normal display
//! }
//! ```

pub mod affinity;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod ingest;
pub mod lifecycle;
pub mod parser;
pub mod reconcile;

// Re-exports for convenience
pub use affinity::{MainThreadProbe, MainThreadTask, ThreadAccess, ThreadDump, ThreadToken};
pub use config::ShimConfig;
pub use engine::{CommandSender, DiagnosticsEngine};
pub use error::{Error, Result};
pub use host::{
    ChatCallback, CommandHandler, CommandRegistry, GameHooks, HostBridge, InstanceId,
    RegistryHandle, StopCallback, StopSubscription,
};
pub use ingest::CommandIngest;
pub use lifecycle::ShimController;
pub use parser::{InvocationParser, InvocationPrefixSet};
pub use reconcile::{ReconcilerState, RegistrationReconciler};
