//! Name availability checks.
//!
//! These handlers reply only on the two codes their contract names: 400
//! rejects with the server message, 200 resolves with it, anything else —
//! including a missing header — answers nobody. Transport errors are logged
//! and swallowed for the shared CHECK_NAME variants; the project-scoped
//! check hands the transport error to the caller's reject side instead.

use tracing::debug;

use crate::envelope::{CODE_BAD_REQUEST, CODE_OK, Envelope};
use crate::intent::{CheckNamePayload, CheckReply, ProjectsCheckNamePayload};
use crate::state::AppState;

fn answer(envelope: &Envelope, reply: Option<CheckReply>) {
    let Some(reply) = reply else {
        return;
    };
    match envelope.header.code {
        CODE_BAD_REQUEST => {
            let _ = reply.send(Err(envelope.header.msg.clone()));
        }
        CODE_OK => {
            let _ = reply.send(Ok(envelope.header.msg.clone()));
        }
        _ => {}
    }
}

/// CHECK_NAME — availability check in either shape (entity-scoped or
/// path-keyed uniqueness).
pub async fn check_name(state: &AppState, payload: CheckNamePayload) {
    match payload {
        CheckNamePayload::Scoped { id, name, kind, params, reply } => {
            match state.api.check_name(&kind, id, &name, &params).await {
                Ok(envelope) => answer(&envelope, reply),
                Err(e) => debug!(error = %e, "name check failed"),
            }
        }
        CheckNamePayload::Unique { pathname, query, reply } => {
            match state.api.check_name_unique(&pathname, &query).await {
                Ok(envelope) => answer(&envelope, reply),
                Err(e) => debug!(error = %e, "name uniqueness check failed"),
            }
        }
    }
}

/// PROJECTS_CHECK_NAME — availability check scoped to one project.
pub async fn projects_check_name(state: &AppState, payload: ProjectsCheckNamePayload) {
    let ProjectsCheckNamePayload { project_id, id, name, kind, reply } = payload;

    match state.api.projects_check_name(project_id, id, &name, &kind).await {
        Ok(envelope) => answer(&envelope, reply),
        Err(e) => {
            if let Some(reply) = reply {
                let _ = reply.send(Err(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
#[path = "naming_test.rs"]
mod tests;
