//! The host's command registry capability.
//!
//! The host may replace its registry with a structurally-identical but
//! logically distinct instance at any time, so [`RegistryHandle`] equality
//! is reference identity, never structural comparison.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Callbacks the shim installs for a registered command alias.
///
/// `execute` is a committed, run-to-completion call; `suggest` is async
/// because the host's completion machinery expects a future rather than a
/// parked thread.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Execute the command for the full input line.
    fn execute(&self, input: &str) -> Result<()>;

    /// Produce suggestions for a partial input line.
    async fn suggest(&self, partial: &str) -> Vec<String>;
}

/// The opaque "can register a named command" capability the host exposes.
///
/// Registering an alias that already exists may be rejected or may
/// overwrite; the shim accepts either behavior.
pub trait CommandRegistry: Send + Sync {
    /// Register a literal command node under `alias`.
    fn register_literal(&self, alias: &str, handler: Arc<dyn CommandHandler>) -> Result<()>;
}

/// Identity token for the host's current command-registry instance.
///
/// Cloning a handle preserves identity; two handles are equal iff they
/// refer to the same registry instance.
#[derive(Clone)]
pub struct RegistryHandle {
    inner: Arc<dyn CommandRegistry>,
}

impl RegistryHandle {
    /// Wrap a host-provided registry instance.
    pub fn new(inner: Arc<dyn CommandRegistry>) -> Self {
        Self { inner }
    }

    /// Whether `self` and `other` refer to the same registry instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Register a literal command node under `alias`.
    pub fn register_literal(&self, alias: &str, handler: Arc<dyn CommandHandler>) -> Result<()> {
        self.inner.register_literal(alias, handler)
    }
}

impl PartialEq for RegistryHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other)
    }
}

impl Eq for RegistryHandle {}

impl fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegistryHandle")
            .field(&Arc::as_ptr(&self.inner))
            .finish()
    }
}
