//! Engine-side interfaces.
//!
//! The diagnostics engine (sampler, tick statistics, platform metadata) is
//! an external collaborator; the shim only routes commands and suggestion
//! requests into it and tells it to shut down. Nothing in this crate
//! implements sampling.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The surface command output is written back to (e.g. the client player's
/// chat).
pub trait CommandSender: Send + Sync {
    /// Display name of the sender.
    fn name(&self) -> &str;

    /// Deliver a line of command output to the sender.
    fn send_message(&self, message: &str);
}

/// The external diagnostics engine, by interface only.
#[async_trait]
pub trait DiagnosticsEngine: Send + Sync {
    /// Execute a parsed command (prefix already stripped) as `sender`.
    ///
    /// Errors are surfaced back to the sender by the caller, not swallowed.
    fn execute_command(&self, sender: Arc<dyn CommandSender>, args: &[String]) -> Result<()>;

    /// Generate completion suggestions for a partial argument vector.
    async fn generate_suggestions(
        &self,
        sender: Arc<dyn CommandSender>,
        args: &[String],
    ) -> Vec<String>;

    /// Release engine resources. Idempotent.
    fn shutdown(&self);
}
