//! Profile mutation handlers: profile update and password change.

use tracing::{error, warn};

use crate::envelope::{self, CODE_BAD_REQUEST, CODE_NOT_FOUND, CODE_OK};
use crate::intent::{ChangeUserPasswordPayload, StateEvent, UpdateProfilePayload};
use crate::notice::messages;
use crate::session::SessionUser;
use crate::state::AppState;

/// UPDATE_PROFILE — post the changed fields, overwrite the session record
/// with the backend's updated user.
pub async fn update_profile(state: &AppState, payload: UpdateProfilePayload) {
    let UpdateProfilePayload { id, patch, resolve } = payload;

    let envelope = match state.api.update_profile(id, &patch).await {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "profile update request failed");
            state.emit(StateEvent::UpdateProfileError);
            state.notify_error(messages::UPDATE_PROFILE_FAILED);
            return;
        }
    };

    match envelope.header.code {
        CODE_BAD_REQUEST => {
            state.notify_error(&envelope.header.msg);
            state.emit(StateEvent::UpdateProfileError);
        }
        CODE_NOT_FOUND => {
            state.notify_error(messages::USER_NOT_FOUND);
            state.emit(StateEvent::UpdateProfileError);
        }
        _ => {
            let user: SessionUser = match envelope::read_list(&envelope) {
                Ok(user) => user,
                Err(e) => {
                    error!(error = %e, "profile payload adapt failed");
                    state.emit(StateEvent::UpdateProfileError);
                    state.notify_error(messages::UPDATE_PROFILE_FAILED);
                    return;
                }
            };
            if let Err(e) = state.sessions.replace(user.clone()).await {
                error!(error = %e, "session persist failed");
                state.emit(StateEvent::UpdateProfileError);
                state.notify_error(messages::UPDATE_PROFILE_FAILED);
                return;
            }
            state.emit(StateEvent::UpdateProfileSuccess(user));
            if let Some(resolve) = resolve {
                let _ = resolve.send(());
            }
        }
    }
}

/// CHANGE_USER_PASSWORD — post the change, reply per envelope code.
///
/// Code 400 rejects with the server message and emits nothing; code 200
/// emits the changed event and resolves; any other code answers nobody.
pub async fn change_user_password(state: &AppState, payload: ChangeUserPasswordPayload) {
    let ChangeUserPasswordPayload { info, reply } = payload;

    let envelope = match state.api.change_password(&info).await {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "password change request failed");
            state.emit(StateEvent::ChangeUserPasswordFail);
            state.notify_error(messages::CHANGE_PASSWORD_FAILED);
            return;
        }
    };

    match envelope.header.code {
        CODE_BAD_REQUEST => {
            if let Some(reply) = reply {
                let _ = reply.send(Err(envelope.header.msg));
            }
        }
        CODE_OK => {
            state.emit(StateEvent::UserPasswordChanged(info));
            if let Some(reply) = reply {
                let _ = reply.send(Ok(()));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
