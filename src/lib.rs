//! Authflow — the async side-effect layer for the auth and profile area.
//!
//! ARCHITECTURE
//! ============
//! Callers dispatch typed intents (login, activation, session fetch, name
//! checks, profile update, password change) into a queue. The dispatch
//! runtime applies a per-kind scheduling policy — latest-wins for session
//! mutations, throttle-drop for name checks — and runs one handler task per
//! accepted intent. Each handler issues exactly one HTTP call through the
//! [`api::AuthApi`] boundary, branches on the backend's response envelope
//! code, and reports back three ways: state events on the event channel,
//! localized notices on the notice channel, and oneshot replies carried in
//! the intent payload.
//!
//! DESIGN
//! ======
//! - One session record. Every successful login/activation/fetch/update
//!   overwrites it wholesale, in memory and in the persistent slot, through
//!   a single [`session::SessionStore`] operation.
//! - No retries, no backoff, no caller-visible cancellation. Scheduling
//!   policy is the only concurrency control this layer adds.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod intent;
pub mod notice;
pub mod services;
pub mod session;
pub mod state;

pub use api::{ApiError, AuthApi, HttpApi};
pub use config::{ApiConfig, ApiPaths, ConfigError, DispatchConfig};
pub use dispatch::{ThrottleGate, spawn_dispatcher, spawn_dispatcher_with};
pub use envelope::{Envelope, Header};
pub use intent::{Intent, IntentKind, Policy, StateEvent};
pub use notice::Notice;
pub use session::{FileSlot, LOGIN_USER_KEY, MemorySlot, SessionSlot, SessionStore, SessionUser, SlotError};
pub use state::{AppState, StateStreams};
