//! Session-establishing handlers: login, account activation, session fetch.

use tracing::{error, warn};

use crate::envelope::{self, CODE_BAD_REQUEST, CODE_NOT_FOUND, CODE_OK};
use crate::intent::{ActivePayload, GetLoginUserPayload, LoginPayload, StateEvent};
use crate::notice::messages;
use crate::session::SessionUser;
use crate::state::AppState;

/// LOGIN — post credentials, establish the session on success.
///
/// Envelope code 400 means a wrong password and 404 an unknown user; any
/// other code is treated as success, matching the backend's login contract.
pub async fn login(state: &AppState, payload: LoginPayload) {
    let LoginPayload { username, password, resolve } = payload;

    let envelope = match state.api.login(&username, &password).await {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "login request failed");
            state.emit(StateEvent::LoginError);
            state.notify_error(messages::LOGIN_FAILED);
            return;
        }
    };

    match envelope.header.code {
        CODE_BAD_REQUEST => {
            state.notify_error(messages::WRONG_PASSWORD);
            state.emit(StateEvent::LoginError);
        }
        CODE_NOT_FOUND => {
            state.notify_error(messages::USER_NOT_FOUND);
            state.emit(StateEvent::LoginError);
        }
        _ => {
            let user: SessionUser = match envelope::read_list(&envelope) {
                Ok(user) => user,
                Err(e) => {
                    error!(error = %e, "login payload adapt failed");
                    state.emit(StateEvent::LoginError);
                    state.notify_error(messages::LOGIN_FAILED);
                    return;
                }
            };
            if let Err(e) = state.sessions.replace(user.clone()).await {
                error!(error = %e, "session persist failed");
                state.emit(StateEvent::LoginError);
                state.notify_error(messages::LOGIN_FAILED);
                return;
            }
            state.emit(StateEvent::Logged(user));
            if let Some(resolve) = resolve {
                let _ = resolve.send(());
            }
        }
    }
}

/// ACTIVE — redeem a signup activation token, establish the session.
///
/// Only code 200 succeeds; any other code surfaces the server's own message.
pub async fn activate(state: &AppState, payload: ActivePayload) {
    let ActivePayload { token, resolve } = payload;

    let envelope = match state.api.activate(&token).await {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "activation request failed");
            state.emit(StateEvent::ActiveError);
            state.notify_error(messages::ACTIVATE_FAILED);
            return;
        }
    };

    if envelope.header.code == CODE_OK {
        let user: SessionUser = match envelope::read_list(&envelope) {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, "activation payload adapt failed");
                state.emit(StateEvent::ActiveError);
                state.notify_error(messages::ACTIVATE_FAILED);
                return;
            }
        };
        if let Err(e) = state.sessions.replace(user.clone()).await {
            error!(error = %e, "session persist failed");
            state.emit(StateEvent::ActiveError);
            state.notify_error(messages::ACTIVATE_FAILED);
            return;
        }
        state.emit(StateEvent::ActiveSuccess(user));
        if let Some(resolve) = resolve {
            let _ = resolve.send(());
        }
    } else {
        state.emit(StateEvent::ActiveError);
        state.notify_error(&envelope.header.msg);
    }
}

/// GET_LOGIN_USER — fetch the session user for the current token.
///
/// No envelope-code branch: the endpoint either answers with the user or the
/// whole call fails.
pub async fn get_login_user(state: &AppState, payload: GetLoginUserPayload) {
    let GetLoginUserPayload { resolve } = payload;

    let user: Option<SessionUser> = match state.api.fetch_login_user().await {
        Ok(envelope) => envelope::read_object(&envelope)
            .map_err(|e| error!(error = %e, "login user payload adapt failed"))
            .ok(),
        Err(e) => {
            warn!(error = %e, "login user fetch failed");
            None
        }
    };

    let Some(user) = user else {
        state.emit(StateEvent::GetLoginUserError);
        state.notify_error(messages::FETCH_LOGIN_USER_FAILED);
        return;
    };

    if let Err(e) = state.sessions.replace(user.clone()).await {
        error!(error = %e, "session persist failed");
        state.emit(StateEvent::GetLoginUserError);
        state.notify_error(messages::FETCH_LOGIN_USER_FAILED);
        return;
    }
    state.emit(StateEvent::Logged(user));
    if let Some(resolve) = resolve {
        let _ = resolve.send(());
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
