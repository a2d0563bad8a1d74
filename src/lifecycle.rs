//! Shim lifecycle: enable, scheduled reconciliation, shutdown.
//!
//! The controller owns the enabled/disabled state and wires the reconciler,
//! ingestor, and main-thread probe together. Disable is idempotent under
//! concurrency: the host's stop notification may fire multiple times or
//! race an explicit `disable()`, and teardown must happen exactly once.

use crate::affinity::{MainThreadProbe, ThreadAccess};
use crate::config::ShimConfig;
use crate::engine::DiagnosticsEngine;
use crate::host::{GameHooks, HostBridge, InstanceId, StopSubscription};
use crate::ingest::CommandIngest;
use crate::parser::InvocationPrefixSet;
use crate::reconcile::RegistrationReconciler;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

const DISABLED: u8 = 0;
const ENABLED: u8 = 1;

/// One enable cycle's reconciliation schedule: the task and the shutdown
/// signal that stops exactly that task. Each `enable()` creates a fresh
/// pair, so a stale task from a previous cycle can never observe a later
/// cycle's signal reset and keep running.
struct Schedule {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns the shim's lifecycle within one host instance.
pub struct ShimController {
    config: ShimConfig,
    host: Arc<dyn HostBridge>,
    engine: Arc<dyn DiagnosticsEngine>,
    hooks: Arc<GameHooks>,
    ingest: Arc<CommandIngest>,
    probe: Arc<MainThreadProbe>,
    instance: InstanceId,
    state: AtomicU8,
    schedule: Mutex<Option<Schedule>>,
    stop_subscription: Mutex<Option<StopSubscription>>,
}

impl ShimController {
    /// Wire a controller for one host instance. Construction performs no
    /// host side effects; nothing happens until [`enable`](Self::enable).
    pub fn new(
        config: ShimConfig,
        instance: InstanceId,
        host: Arc<dyn HostBridge>,
        threads: Arc<dyn ThreadAccess>,
        engine: Arc<dyn DiagnosticsEngine>,
        hooks: Arc<GameHooks>,
    ) -> Arc<Self> {
        let ingest = Arc::new(CommandIngest::new(
            InvocationPrefixSet::new(config.aliases.clone()),
            engine.clone(),
            host.clone(),
            hooks.clone(),
        ));
        let probe = Arc::new(MainThreadProbe::new(threads));

        Arc::new(Self {
            config,
            host,
            engine,
            hooks,
            ingest,
            probe,
            instance,
            state: AtomicU8::new(DISABLED),
            schedule: Mutex::new(None),
            stop_subscription: Mutex::new(None),
        })
    }

    /// The ingestor, for host glue that routes raw text and suggestion
    /// requests.
    pub fn ingest(&self) -> &Arc<CommandIngest> {
        &self.ingest
    }

    /// The main-thread probe, for the engine's thread-dumper wiring.
    pub fn probe(&self) -> &Arc<MainThreadProbe> {
        &self.probe
    }

    /// The instance this controller serves.
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Whether the controller is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.state.load(Ordering::SeqCst) == ENABLED
    }

    /// Transition to enabled: start the reconciliation schedule and
    /// subscribe to the host's stop notification. No-op when already
    /// enabled. Must be called within a tokio runtime.
    pub fn enable(self: &Arc<Self>) {
        if self
            .state
            .compare_exchange(DISABLED, ENABLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("enable() on an already-enabled controller, ignoring");
            return;
        }

        info!(instance = %self.instance, "enabling shim");

        let mut reconciler = RegistrationReconciler::new(self.host.clone(), self.ingest.clone());
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let period = self.config.poll_interval();
        let task = tokio::spawn(async move {
            // Fixed delay: first poll happens one period after enable, and
            // a missed tick delays rather than bursts.
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => reconciler.poll(),
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("reconciliation schedule stopped");
        });
        *self.schedule.lock().unwrap() = Some(Schedule { shutdown, task });

        // Only our own instance's stop concerns us; sibling sessions in
        // multi-instance hosts are ignored.
        let own = self.instance;
        let weak: Weak<Self> = Arc::downgrade(self);
        let subscription = self.host.subscribe_stop(Box::new(move |stopping| {
            if stopping != own {
                return;
            }
            if let Some(controller) = weak.upgrade() {
                controller.disable();
            }
        }));
        *self.stop_subscription.lock().unwrap() = Some(subscription);
    }

    /// Transition to disabled: stop the schedule, unsubscribe, disarm the
    /// fallback, release engine resources. Safe to call repeatedly and
    /// concurrently; exactly one caller performs teardown.
    pub fn disable(&self) {
        if self
            .state
            .compare_exchange(ENABLED, DISABLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("disable() on an already-disabled controller, ignoring");
            return;
        }

        info!(instance = %self.instance, "disabling shim");

        // The poll task observes its own cycle's signal between ticks; an
        // in-flight poll drains rather than being interrupted.
        if let Some(schedule) = self.schedule.lock().unwrap().take() {
            let _ = schedule.shutdown.send(true);
            drop(schedule.task);
        }

        drop(self.stop_subscription.lock().unwrap().take());
        self.hooks.clear_chat_callback();
        self.engine.shutdown();
    }
}
