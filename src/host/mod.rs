//! Host capability seams.
//!
//! The host (the embedding game client) is reached only through the traits
//! in this module; the shim never assumes a concrete host type. Three
//! capabilities are consumed:
//!
//! - **bridge**: session-scoped access to the live command registry handle,
//!   the active command sender, stop notifications, and chat history.
//! - **registry**: the opaque "can register a named command with execute and
//!   suggest callbacks" capability, with identity-compared handles.
//! - **hooks**: the process-wide raw-text interception slot.

pub mod bridge;
pub mod hooks;
pub mod registry;

pub use bridge::{HostBridge, InstanceId, StopCallback, StopSubscription};
pub use hooks::{ChatCallback, GameHooks};
pub use registry::{CommandHandler, CommandRegistry, RegistryHandle};
