//! Configuration for the client shim.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the client shim.
///
/// Invocation aliases are configuration, not protocol: a deployment may
/// recognize `/pulsec` and `/pulseclient` as equivalent names for the same
/// command tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShimConfig {
    /// Invocation aliases the parser recognizes, in priority order
    pub aliases: Vec<String>,
    /// Fixed delay between registry reconciliation polls, in seconds
    pub poll_interval_secs: u64,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            aliases: vec!["/pulsec".to_string(), "/pulseclient".to_string()],
            poll_interval_secs: 10,
        }
    }
}

impl ShimConfig {
    /// Create a config for testing with a fast poll cadence.
    pub fn testing() -> Self {
        Self {
            aliases: vec!["/pulsec".to_string(), "/pulseclient".to_string()],
            poll_interval_secs: 1,
        }
    }

    /// Set the invocation aliases.
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Set the poll interval in seconds.
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// The poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// The primary command name: the first alias with any leading `/`
    /// stripped (e.g. `/pulsec` -> `pulsec`).
    pub fn primary_command_name(&self) -> Option<&str> {
        self.aliases
            .first()
            .map(|a| a.strip_prefix('/').unwrap_or(a))
    }
}
