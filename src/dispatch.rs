//! Effect runtime — intent queue with per-kind scheduling policies.
//!
//! DESIGN
//! ======
//! One loop owns all scheduling state. Latest-wins kinds keep the abort
//! handle of their in-flight handler task; a new intent of the same kind
//! aborts it before spawning the replacement, so a stale handler parked on
//! its HTTP await can never update shared state afterwards. Throttle kinds
//! run through a [`ThrottleGate`]: an intent inside the window is dropped
//! on the floor, not queued.
//!
//! The loop ends when every intent sender is gone. In-flight handler tasks
//! are left to finish on their own.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::config::DispatchConfig;
use crate::intent::{Intent, IntentKind, Policy};
use crate::services;
use crate::state::AppState;

// =============================================================================
// THROTTLE GATE
// =============================================================================

/// Fixed-window drop gate: the first intent is accepted, anything arriving
/// within `window` of the last accepted one is discarded.
#[derive(Debug)]
pub struct ThrottleGate {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl ThrottleGate {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { window, last_accepted: None }
    }

    /// Accept or drop an intent arriving now.
    pub fn accept(&mut self) -> bool {
        self.accept_at(Instant::now())
    }

    /// Internal: accept with an explicit timestamp (for testing).
    pub(crate) fn accept_at(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }
}

// =============================================================================
// DISPATCHER
// =============================================================================

/// Spawn the dispatch runtime with config from the environment.
#[must_use]
pub fn spawn_dispatcher(state: AppState) -> (mpsc::UnboundedSender<Intent>, JoinHandle<()>) {
    spawn_dispatcher_with(state, DispatchConfig::from_env())
}

/// Spawn the dispatch runtime. Returns the intent sender and the loop's
/// join handle; dropping every sender terminates the loop.
#[must_use]
pub fn spawn_dispatcher_with(
    state: AppState,
    config: DispatchConfig,
) -> (mpsc::UnboundedSender<Intent>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Intent>();

    let handle = tokio::spawn(async move {
        let mut gates: HashMap<IntentKind, ThrottleGate> = HashMap::new();
        let mut in_flight: HashMap<IntentKind, AbortHandle> = HashMap::new();

        while let Some(intent) = rx.recv().await {
            let kind = intent.kind();
            match kind.policy() {
                Policy::Throttle => {
                    let gate = gates
                        .entry(kind)
                        .or_insert_with(|| ThrottleGate::new(config.check_throttle));
                    if !gate.accept() {
                        debug!(?kind, "inside throttle window; dropping intent");
                        continue;
                    }
                    let _ = run_handler(state.clone(), intent);
                }
                Policy::Latest => {
                    if let Some(stale) = in_flight.remove(&kind) {
                        stale.abort();
                    }
                    in_flight.insert(kind, run_handler(state.clone(), intent));
                }
            }
        }
    });

    (tx, handle)
}

fn run_handler(state: AppState, intent: Intent) -> AbortHandle {
    let task = tokio::spawn(async move {
        match intent {
            Intent::Login(payload) => services::auth::login(&state, payload).await,
            Intent::GetLoginUser(payload) => services::auth::get_login_user(&state, payload).await,
            Intent::Active(payload) => services::auth::activate(&state, payload).await,
            Intent::UpdateProfile(payload) => services::profile::update_profile(&state, payload).await,
            Intent::ChangeUserPassword(payload) => {
                services::profile::change_user_password(&state, payload).await;
            }
            Intent::CheckName(payload) => services::naming::check_name(&state, payload).await,
            Intent::ProjectsCheckName(payload) => {
                services::naming::projects_check_name(&state, payload).await;
            }
        }
    });
    task.abort_handle()
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
