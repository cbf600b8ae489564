//! Intents in, state events out — the vocabulary of the effect layer.
//!
//! ARCHITECTURE
//! ============
//! Each intent kind is consumed by exactly one handler dispatch under a
//! fixed scheduling policy. Payloads carry the operation's parameters plus
//! optional oneshot reply channels; a dropped reply channel is the "no
//! answer" case, matching handlers whose contracts reply only on specific
//! envelope codes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::session::SessionUser;

/// Oneshot reply channel carried in an intent payload.
pub type Reply<T> = oneshot::Sender<T>;

/// Reply for name checks: `Ok(msg)` on code 200, `Err(msg)` on code 400,
/// dropped otherwise.
pub type CheckReply = Reply<Result<String, String>>;

// =============================================================================
// KINDS AND POLICIES
// =============================================================================

/// Intent discriminant, used by the dispatch runtime to key scheduling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Login,
    GetLoginUser,
    CheckName,
    Active,
    UpdateProfile,
    ChangeUserPassword,
    ProjectsCheckName,
}

/// Scheduling policy applied to an intent kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// A new intent aborts a still-pending handler of the same kind.
    Latest,
    /// Intents inside the throttle window are dropped, not queued.
    Throttle,
}

impl IntentKind {
    #[must_use]
    pub fn policy(self) -> Policy {
        match self {
            Self::CheckName | Self::ProjectsCheckName => Policy::Throttle,
            Self::Login
            | Self::GetLoginUser
            | Self::Active
            | Self::UpdateProfile
            | Self::ChangeUserPassword => Policy::Latest,
        }
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

#[derive(Debug)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
    pub resolve: Option<Reply<()>>,
}

#[derive(Debug, Default)]
pub struct GetLoginUserPayload {
    pub resolve: Option<Reply<()>>,
}

#[derive(Debug)]
pub struct ActivePayload {
    pub token: String,
    pub resolve: Option<Reply<()>>,
}

/// Profile fields sent on update. Absent options are omitted from the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilePatch {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug)]
pub struct UpdateProfilePayload {
    pub id: u64,
    pub patch: ProfilePatch,
    pub resolve: Option<Reply<()>>,
}

/// Password change request body, camelCased on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub email: String,
    pub old_pass: String,
    pub new_pass: String,
}

#[derive(Debug)]
pub struct ChangeUserPasswordPayload {
    pub info: PasswordChange,
    pub reply: Option<Reply<Result<(), String>>>,
}

/// The two name-check shapes sharing the CHECK_NAME intent kind and its
/// throttle window: entity checks keyed by type, and path-keyed uniqueness
/// checks with a caller-built query.
#[derive(Debug)]
pub enum CheckNamePayload {
    Scoped {
        id: Option<u64>,
        name: String,
        kind: String,
        params: HashMap<String, String>,
        reply: Option<CheckReply>,
    },
    Unique {
        pathname: String,
        query: HashMap<String, String>,
        reply: Option<CheckReply>,
    },
}

#[derive(Debug)]
pub struct ProjectsCheckNamePayload {
    pub project_id: u64,
    /// Omitted from the query when absent (creation-time checks).
    pub id: Option<u64>,
    pub name: String,
    pub kind: String,
    pub reply: Option<CheckReply>,
}

// =============================================================================
// INTENTS
// =============================================================================

/// A triggering event with its payload.
#[derive(Debug)]
pub enum Intent {
    Login(LoginPayload),
    GetLoginUser(GetLoginUserPayload),
    CheckName(CheckNamePayload),
    Active(ActivePayload),
    UpdateProfile(UpdateProfilePayload),
    ChangeUserPassword(ChangeUserPasswordPayload),
    ProjectsCheckName(ProjectsCheckNamePayload),
}

impl Intent {
    #[must_use]
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::Login(_) => IntentKind::Login,
            Self::GetLoginUser(_) => IntentKind::GetLoginUser,
            Self::CheckName(_) => IntentKind::CheckName,
            Self::Active(_) => IntentKind::Active,
            Self::UpdateProfile(_) => IntentKind::UpdateProfile,
            Self::ChangeUserPassword(_) => IntentKind::ChangeUserPassword,
            Self::ProjectsCheckName(_) => IntentKind::ProjectsCheckName,
        }
    }
}

// =============================================================================
// STATE EVENTS
// =============================================================================

/// Follow-up state transitions emitted by handlers, one success/error pair
/// per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    Logged(SessionUser),
    LoginError,
    GetLoginUserError,
    ActiveSuccess(SessionUser),
    ActiveError,
    UpdateProfileSuccess(SessionUser),
    UpdateProfileError,
    UserPasswordChanged(PasswordChange),
    ChangeUserPasswordFail,
}

#[cfg(test)]
#[path = "intent_test.rs"]
mod tests;
