//! Dual-path command ingestion.
//!
//! Commands reach the engine along two routes that converge on the same
//! executor:
//!
//! - **Formal path**: literal command nodes registered against the host's
//!   current registry handle, with execute and async suggest callbacks.
//! - **Fallback path**: interception of raw chat text, for contexts where
//!   the formal path is not yet wired or not available.
//!
//! The fallback is armed when a bind succeeds. Formal registration is
//! best-effort, so the fallback can be live before every alias is visible
//! in the host's dispatcher; that window is accepted rather than strictly
//! sequenced.

use crate::engine::DiagnosticsEngine;
use crate::error::{Error, Result};
use crate::host::{CommandHandler, GameHooks, HostBridge, RegistryHandle};
use crate::parser::{InvocationParser, InvocationPrefixSet};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Aliases already registered under one registry handle. A partially
/// failed bind keeps its progress so the retry submits only the missing
/// aliases, never re-offering a node the host already accepted.
struct BindProgress {
    handle: RegistryHandle,
    registered: Vec<String>,
}

/// Composes the parser with the formal dispatcher path and the raw-text
/// fallback, terminating both in the engine's command executor.
pub struct CommandIngest {
    parser: InvocationParser,
    engine: Arc<dyn DiagnosticsEngine>,
    host: Arc<dyn HostBridge>,
    hooks: Arc<GameHooks>,
    bound: Mutex<Option<BindProgress>>,
}

impl CommandIngest {
    /// Create an ingestor for the given prefix set.
    pub fn new(
        prefixes: InvocationPrefixSet,
        engine: Arc<dyn DiagnosticsEngine>,
        host: Arc<dyn HostBridge>,
        hooks: Arc<GameHooks>,
    ) -> Self {
        Self {
            parser: InvocationParser::new(prefixes),
            engine,
            host,
            hooks,
            bound: Mutex::new(None),
        }
    }

    /// The parser shared by both paths.
    pub fn parser(&self) -> &InvocationParser {
        &self.parser
    }

    /// Register the formal path against `handle` and arm the fallback.
    ///
    /// One literal node per alias (registry node names carry no leading
    /// slash). A failed alias fails the bind so the reconciler retries the
    /// same handle next poll; aliases the handle already accepted are
    /// skipped on retry, so a duplicate-rejecting host cannot wedge a
    /// partially registered bind. A new handle identity resets the
    /// progress and registers everything afresh.
    pub fn bind(self: &Arc<Self>, handle: &RegistryHandle) -> Result<()> {
        let mut bound = self
            .bound
            .lock()
            .map_err(|_| Error::Internal("Lock error".into()))?;
        let progress = match bound.take() {
            Some(progress) if progress.handle.same_instance(handle) => progress,
            _ => BindProgress {
                handle: handle.clone(),
                registered: Vec::new(),
            },
        };
        let progress = bound.insert(progress);

        for alias in self.parser.prefixes().iter() {
            let node = alias.strip_prefix('/').unwrap_or(alias);
            if progress.registered.iter().any(|r| r == node) {
                continue;
            }
            let handler: Arc<dyn CommandHandler> = self.clone();
            handle
                .register_literal(node, handler)
                .map_err(|e| Error::registration(node, e.to_string()))?;
            progress.registered.push(node.to_string());
            debug!(alias = node, "registered command node");
        }
        drop(bound);

        self.hooks.set_chat_callback({
            let ingest = self.clone();
            Arc::new(move |text| ingest.on_raw_text(text))
        });

        info!(handle = ?handle, "command aliases bound, fallback armed");
        Ok(())
    }

    /// Fallback-path entry: classify and possibly consume raw chat text.
    ///
    /// Returns `false` when the text is not addressed to this tool (the
    /// caller continues normal chat processing) and `true` when it was
    /// executed as a command (the caller suppresses normal processing; the
    /// original text is re-added to chat history here for local audit).
    pub fn on_raw_text(&self, text: &str) -> bool {
        let args = match self.parser.parse(text, false) {
            Some(args) => args,
            None => return false,
        };

        let sender = match self.host.active_sender() {
            Some(sender) => sender,
            None => {
                // Without a session there is nothing to execute against;
                // let the host handle the text normally.
                debug!("matched invocation with no active sender, not consuming");
                return false;
            }
        };

        debug!(?args, "consuming raw text as command");
        if let Err(e) = self.engine.execute_command(sender.clone(), &args) {
            warn!(error = %e, "command execution failed");
            sender.send_message(&format!("Command failed: {e}"));
        }

        self.host.add_to_chat_history(text);
        true
    }

    /// Suggestion-path entry: completion candidates for a partial input
    /// line, with trailing-empty preservation so `"/pulsec "` requests
    /// top-level suggestions.
    pub async fn suggestions(&self, partial: &str) -> Vec<String> {
        let args = match self.parser.parse(partial, true) {
            Some(args) => args,
            None => return Vec::new(),
        };

        let sender = match self.host.active_sender() {
            Some(sender) => sender,
            None => return Vec::new(),
        };

        self.engine.generate_suggestions(sender, &args).await
    }
}

#[async_trait]
impl CommandHandler for CommandIngest {
    fn execute(&self, input: &str) -> Result<()> {
        // The dispatcher hands us the full typed line; malformed or
        // foreign input is classified out, never a fatal error.
        let args = match self.parser.parse(input, false) {
            Some(args) => args,
            None => {
                debug!(input, "dispatcher input did not classify, ignoring");
                return Ok(());
            }
        };

        let sender = self.host.active_sender().ok_or(Error::NoActiveSender)?;
        if let Err(e) = self.engine.execute_command(sender.clone(), &args) {
            warn!(error = %e, "command execution failed");
            sender.send_message(&format!("Command failed: {e}"));
        }
        Ok(())
    }

    async fn suggest(&self, partial: &str) -> Vec<String> {
        self.suggestions(partial).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CommandSender;
    use crate::host::{CommandRegistry, StopCallback, StopSubscription};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Registry that records registrations, rejects duplicate nodes, and
    /// can be told to reject a specific alias until cleared.
    struct RecordingRegistry {
        registered: Mutex<Vec<String>>,
        reject_alias: Mutex<Option<String>>,
    }

    impl RecordingRegistry {
        fn new() -> Self {
            Self {
                registered: Mutex::new(Vec::new()),
                reject_alias: Mutex::new(None),
            }
        }

        fn set_rejected(&self, alias: Option<&str>) {
            *self.reject_alias.lock().unwrap() = alias.map(str::to_string);
        }

        fn aliases(&self) -> Vec<String> {
            self.registered.lock().unwrap().clone()
        }
    }

    impl CommandRegistry for RecordingRegistry {
        fn register_literal(&self, alias: &str, _handler: Arc<dyn CommandHandler>) -> Result<()> {
            if self.reject_alias.lock().unwrap().as_deref() == Some(alias) {
                return Err(Error::registration(alias, "host rejected"));
            }
            let mut registered = self.registered.lock().unwrap();
            if registered.iter().any(|a| a == alias) {
                return Err(Error::registration(alias, "duplicate node"));
            }
            registered.push(alias.to_string());
            Ok(())
        }
    }

    struct FakeSender {
        messages: Mutex<Vec<String>>,
    }

    impl FakeSender {
        fn new() -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
            }
        }
    }

    impl CommandSender for FakeSender {
        fn name(&self) -> &str {
            "player"
        }

        fn send_message(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    struct FakeHost {
        sender: Mutex<Option<Arc<FakeSender>>>,
        history: Mutex<Vec<String>>,
    }

    impl FakeHost {
        fn with_sender() -> Self {
            Self {
                sender: Mutex::new(Some(Arc::new(FakeSender::new()))),
                history: Mutex::new(Vec::new()),
            }
        }

        fn without_sender() -> Self {
            Self {
                sender: Mutex::new(None),
                history: Mutex::new(Vec::new()),
            }
        }

        fn sender(&self) -> Arc<FakeSender> {
            self.sender.lock().unwrap().as_ref().unwrap().clone()
        }

        fn history(&self) -> Vec<String> {
            self.history.lock().unwrap().clone()
        }
    }

    impl HostBridge for FakeHost {
        fn current_registry(&self) -> Option<RegistryHandle> {
            None
        }

        fn active_sender(&self) -> Option<Arc<dyn CommandSender>> {
            self.sender
                .lock()
                .unwrap()
                .clone()
                .map(|s| s as Arc<dyn CommandSender>)
        }

        fn subscribe_stop(&self, _callback: StopCallback) -> StopSubscription {
            StopSubscription::noop()
        }

        fn add_to_chat_history(&self, text: &str) {
            self.history.lock().unwrap().push(text.to_string());
        }
    }

    struct FakeEngine {
        executed: Mutex<Vec<Vec<String>>>,
        suggestion_args: Mutex<Vec<Vec<String>>>,
        fail_execution: bool,
    }

    impl FakeEngine {
        fn new() -> Self {
            Self {
                executed: Mutex::new(Vec::new()),
                suggestion_args: Mutex::new(Vec::new()),
                fail_execution: false,
            }
        }

        fn failing() -> Self {
            Self {
                executed: Mutex::new(Vec::new()),
                suggestion_args: Mutex::new(Vec::new()),
                fail_execution: true,
            }
        }

        fn executed(&self) -> Vec<Vec<String>> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DiagnosticsEngine for FakeEngine {
        fn execute_command(
            &self,
            _sender: Arc<dyn CommandSender>,
            args: &[String],
        ) -> Result<()> {
            self.executed.lock().unwrap().push(args.to_vec());
            if self.fail_execution {
                return Err(Error::command("sampler not running"));
            }
            Ok(())
        }

        async fn generate_suggestions(
            &self,
            _sender: Arc<dyn CommandSender>,
            args: &[String],
        ) -> Vec<String> {
            self.suggestion_args.lock().unwrap().push(args.to_vec());
            vec!["profiler".to_string(), "health".to_string()]
        }

        fn shutdown(&self) {}
    }

    fn ingest_with(
        engine: Arc<FakeEngine>,
        host: Arc<FakeHost>,
        hooks: Arc<GameHooks>,
    ) -> Arc<CommandIngest> {
        Arc::new(CommandIngest::new(
            InvocationPrefixSet::new(["/pulsec", "/pulseclient"]),
            engine,
            host,
            hooks,
        ))
    }

    #[test]
    fn test_bind_registers_each_alias_without_slash() {
        let registry = Arc::new(RecordingRegistry::new());
        let hooks = Arc::new(GameHooks::new());
        let ingest = ingest_with(
            Arc::new(FakeEngine::new()),
            Arc::new(FakeHost::with_sender()),
            hooks,
        );

        let handle = RegistryHandle::new(registry.clone());
        ingest.bind(&handle).unwrap();

        assert_eq!(registry.aliases(), vec!["pulsec", "pulseclient"]);
    }

    #[test]
    fn test_bind_arms_fallback() {
        let registry = Arc::new(RecordingRegistry::new());
        let hooks = Arc::new(GameHooks::new());
        let ingest = ingest_with(
            Arc::new(FakeEngine::new()),
            Arc::new(FakeHost::with_sender()),
            hooks.clone(),
        );

        assert!(!hooks.is_armed());
        ingest.bind(&RegistryHandle::new(registry)).unwrap();
        assert!(hooks.is_armed());
        assert!(hooks.dispatch_chat("/pulsec profiler"));
    }

    #[test]
    fn test_rebind_same_handle_never_reoffers_nodes() {
        let registry = Arc::new(RecordingRegistry::new());
        let hooks = Arc::new(GameHooks::new());
        let ingest = ingest_with(
            Arc::new(FakeEngine::new()),
            Arc::new(FakeHost::with_sender()),
            hooks.clone(),
        );

        let handle = RegistryHandle::new(registry.clone());
        ingest.bind(&handle).unwrap();
        // Binding the same handle again succeeds without re-offering
        // nodes the duplicate-rejecting host already accepted.
        ingest.bind(&handle).unwrap();
        assert_eq!(registry.aliases(), vec!["pulsec", "pulseclient"]);
    }

    #[test]
    fn test_partial_bind_retries_only_missing_aliases() {
        let registry = Arc::new(RecordingRegistry::new());
        registry.set_rejected(Some("pulseclient"));
        let hooks = Arc::new(GameHooks::new());
        let ingest = ingest_with(
            Arc::new(FakeEngine::new()),
            Arc::new(FakeHost::with_sender()),
            hooks.clone(),
        );

        let handle = RegistryHandle::new(registry.clone());
        let err = ingest.bind(&handle).unwrap_err();
        assert!(matches!(err, Error::Registration { .. }));
        assert!(!hooks.is_armed());
        assert_eq!(registry.aliases(), vec!["pulsec"]);

        // Host recovers; the retry submits only the missing alias, so the
        // already-accepted node is never rejected as a duplicate.
        registry.set_rejected(None);
        ingest.bind(&handle).unwrap();
        assert!(hooks.is_armed());
        assert_eq!(registry.aliases(), vec!["pulsec", "pulseclient"]);
    }

    #[test]
    fn test_new_handle_registers_everything_afresh() {
        let first = Arc::new(RecordingRegistry::new());
        let second = Arc::new(RecordingRegistry::new());
        let ingest = ingest_with(
            Arc::new(FakeEngine::new()),
            Arc::new(FakeHost::with_sender()),
            Arc::new(GameHooks::new()),
        );

        ingest.bind(&RegistryHandle::new(first.clone())).unwrap();
        ingest.bind(&RegistryHandle::new(second.clone())).unwrap();
        assert_eq!(first.aliases(), vec!["pulsec", "pulseclient"]);
        assert_eq!(second.aliases(), vec!["pulsec", "pulseclient"]);
    }

    #[test]
    fn test_raw_text_not_mine_is_not_consumed() {
        let engine = Arc::new(FakeEngine::new());
        let host = Arc::new(FakeHost::with_sender());
        let ingest = ingest_with(engine.clone(), host.clone(), Arc::new(GameHooks::new()));

        assert!(!ingest.on_raw_text("hello world"));
        assert!(engine.executed().is_empty());
        assert!(host.history().is_empty());
    }

    #[test]
    fn test_raw_text_match_executes_and_audits() {
        let engine = Arc::new(FakeEngine::new());
        let host = Arc::new(FakeHost::with_sender());
        let ingest = ingest_with(engine.clone(), host.clone(), Arc::new(GameHooks::new()));

        assert!(ingest.on_raw_text("/pulsec profiler start"));
        assert_eq!(engine.executed(), vec![vec!["profiler", "start"]]);
        // Consumed text is re-added to history exactly once for audit.
        assert_eq!(host.history(), vec!["/pulsec profiler start"]);
    }

    #[test]
    fn test_raw_text_bare_invocation_executes_with_empty_args() {
        let engine = Arc::new(FakeEngine::new());
        let host = Arc::new(FakeHost::with_sender());
        let ingest = ingest_with(engine.clone(), host.clone(), Arc::new(GameHooks::new()));

        assert!(ingest.on_raw_text("/pulsec"));
        assert_eq!(engine.executed(), vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_raw_text_without_sender_is_not_consumed() {
        let engine = Arc::new(FakeEngine::new());
        let host = Arc::new(FakeHost::without_sender());
        let ingest = ingest_with(engine.clone(), host.clone(), Arc::new(GameHooks::new()));

        assert!(!ingest.on_raw_text("/pulsec profiler"));
        assert!(engine.executed().is_empty());
    }

    #[test]
    fn test_engine_error_is_surfaced_to_sender() {
        let engine = Arc::new(FakeEngine::failing());
        let host = Arc::new(FakeHost::with_sender());
        let ingest = ingest_with(engine, host.clone(), Arc::new(GameHooks::new()));

        assert!(ingest.on_raw_text("/pulsec profiler start"));
        let messages = host.sender().messages.lock().unwrap().clone();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("sampler not running"));
    }

    #[tokio::test]
    async fn test_suggestions_preserve_trailing_empty() {
        let engine = Arc::new(FakeEngine::new());
        let host = Arc::new(FakeHost::with_sender());
        let ingest = ingest_with(engine.clone(), host, Arc::new(GameHooks::new()));

        let suggestions = ingest.suggestions("/pulsec ").await;
        assert_eq!(suggestions, vec!["profiler", "health"]);
        assert_eq!(
            engine.suggestion_args.lock().unwrap().clone(),
            vec![vec![""]]
        );
    }

    #[tokio::test]
    async fn test_suggestions_for_foreign_text_are_empty() {
        let engine = Arc::new(FakeEngine::new());
        let host = Arc::new(FakeHost::with_sender());
        let ingest = ingest_with(engine.clone(), host, Arc::new(GameHooks::new()));

        assert!(ingest.suggestions("/othertool ").await.is_empty());
        assert!(engine.suggestion_args.lock().unwrap().is_empty());
    }

    #[test]
    fn test_formal_execute_parses_full_line() {
        let engine = Arc::new(FakeEngine::new());
        let host = Arc::new(FakeHost::with_sender());
        let ingest = ingest_with(engine.clone(), host, Arc::new(GameHooks::new()));

        CommandHandler::execute(ingest.as_ref(), "/pulsec health --memory").unwrap();
        assert_eq!(engine.executed(), vec![vec!["health", "--memory"]]);
    }

    #[test]
    fn test_formal_execute_without_sender_errors() {
        let engine = Arc::new(FakeEngine::new());
        let host = Arc::new(FakeHost::without_sender());
        let ingest = ingest_with(engine, host, Arc::new(GameHooks::new()));

        let err = CommandHandler::execute(ingest.as_ref(), "/pulsec health").unwrap_err();
        assert!(matches!(err, Error::NoActiveSender));
    }
}
