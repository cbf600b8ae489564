use super::*;
use crate::api::test_helpers::MockApi;
use crate::envelope::Envelope;
use crate::intent::{
    ChangeUserPasswordPayload, CheckNamePayload, LoginPayload, PasswordChange, ProjectsCheckNamePayload, StateEvent,
};
use crate::session::SessionUser;
use crate::state::test_helpers::test_state;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::oneshot;

// =============================================================================
// ThrottleGate
// =============================================================================

#[test]
fn gate_accepts_first_intent() {
    let mut gate = ThrottleGate::new(Duration::from_millis(1000));
    assert!(gate.accept_at(Instant::now()));
}

#[test]
fn gate_drops_inside_window() {
    let mut gate = ThrottleGate::new(Duration::from_millis(1000));
    let start = Instant::now();

    assert!(gate.accept_at(start));
    assert!(!gate.accept_at(start + Duration::from_millis(10)));
    assert!(!gate.accept_at(start + Duration::from_millis(999)));
}

#[test]
fn gate_reopens_after_window() {
    let mut gate = ThrottleGate::new(Duration::from_millis(1000));
    let start = Instant::now();

    assert!(gate.accept_at(start));
    assert!(gate.accept_at(start + Duration::from_millis(1000)));
}

#[test]
fn gate_window_restarts_from_last_accepted() {
    let mut gate = ThrottleGate::new(Duration::from_millis(1000));
    let start = Instant::now();

    assert!(gate.accept_at(start));
    // Dropped intents do not extend the window.
    assert!(!gate.accept_at(start + Duration::from_millis(900)));
    assert!(gate.accept_at(start + Duration::from_millis(1100)));
    assert!(!gate.accept_at(start + Duration::from_millis(1200)));
}

// =============================================================================
// THROTTLE-DROP SCHEDULING
// =============================================================================

fn unique_check() -> Intent {
    Intent::CheckName(CheckNamePayload::Unique {
        pathname: "project".into(),
        query: std::collections::HashMap::new(),
        reply: None,
    })
}

#[tokio::test]
async fn rapid_check_intents_issue_one_request() {
    let api = Arc::new(MockApi::new());
    let (state, _streams) = test_state(api.clone());
    let (tx, handle) = spawn_dispatcher_with(state, DispatchConfig::new(Duration::from_millis(500)));

    for _ in 0..5 {
        tx.send(unique_check()).unwrap();
    }
    drop(tx);
    handle.await.unwrap();

    // Give the single accepted handler task a moment to run.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn throttle_windows_are_per_kind() {
    let api = Arc::new(MockApi::new());
    let (state, _streams) = test_state(api.clone());
    let (tx, handle) = spawn_dispatcher_with(state, DispatchConfig::new(Duration::from_millis(500)));

    tx.send(unique_check()).unwrap();
    tx.send(Intent::ProjectsCheckName(ProjectsCheckNamePayload {
        project_id: 1,
        id: None,
        name: "widget".into(),
        kind: "widget".into(),
        reply: None,
    }))
    .unwrap();
    drop(tx);
    handle.await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(api.calls().len(), 2);
}

// =============================================================================
// LATEST-WINS SCHEDULING
// =============================================================================

fn user(id: u64, username: &str) -> SessionUser {
    SessionUser {
        id,
        username: username.into(),
        email: format!("{username}@example.com"),
        admin: false,
        name: None,
        description: None,
        department: None,
    }
}

fn user_envelope(user: &SessionUser) -> Envelope {
    Envelope::ok(json!([serde_json::to_value(user).unwrap()]))
}

#[tokio::test]
async fn second_login_wins_over_pending_first() {
    let first = user(1, "first");
    let second = user(2, "second");

    let api = Arc::new(MockApi::new());
    api.delay("login", Duration::from_millis(80));
    api.push("login", Ok(user_envelope(&first)));
    api.push("login", Ok(user_envelope(&second)));

    let (state, mut streams) = test_state(api.clone());
    let (tx, _handle) = spawn_dispatcher_with(state.clone(), DispatchConfig::default());

    let (first_resolve, first_resolved) = oneshot::channel();
    tx.send(Intent::Login(LoginPayload {
        username: "first".into(),
        password: "pw".into(),
        resolve: Some(first_resolve),
    }))
    .unwrap();

    // Let the first handler start and park on its in-flight response.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (second_resolve, second_resolved) = oneshot::channel();
    tx.send(Intent::Login(LoginPayload {
        username: "second".into(),
        password: "pw".into(),
        resolve: Some(second_resolve),
    }))
    .unwrap();

    second_resolved.await.unwrap();
    assert_eq!(state.sessions.current().await, Some(second.clone()));
    assert_eq!(streams.events.try_recv().unwrap(), StateEvent::Logged(second.clone()));

    // The aborted first handler never resolves and never overwrites.
    assert!(first_resolved.await.is_err());
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(state.sessions.current().await, Some(second));
    assert_eq!(api.calls().len(), 2);
}

#[tokio::test]
async fn settled_handler_is_not_aborted_retroactively() {
    let first = user(1, "first");
    let second = user(2, "second");

    let api = Arc::new(MockApi::new());
    api.push("login", Ok(user_envelope(&first)));
    api.push("login", Ok(user_envelope(&second)));

    let (state, _streams) = test_state(api);
    let (tx, _handle) = spawn_dispatcher_with(state.clone(), DispatchConfig::default());

    let (first_resolve, first_resolved) = oneshot::channel();
    tx.send(Intent::Login(LoginPayload {
        username: "first".into(),
        password: "pw".into(),
        resolve: Some(first_resolve),
    }))
    .unwrap();
    first_resolved.await.unwrap();

    let (second_resolve, second_resolved) = oneshot::channel();
    tx.send(Intent::Login(LoginPayload {
        username: "second".into(),
        password: "pw".into(),
        resolve: Some(second_resolve),
    }))
    .unwrap();
    second_resolved.await.unwrap();

    assert_eq!(state.sessions.current().await, Some(second));
}

// =============================================================================
// ROUTING
// =============================================================================

#[tokio::test]
async fn dispatcher_routes_password_change() {
    let api = Arc::new(MockApi::new());
    api.push("change_password", Ok(Envelope::new(200, "", Value::Null)));

    let (state, _streams) = test_state(api);
    let (tx, _handle) = spawn_dispatcher_with(state, DispatchConfig::default());

    let (reply, replied) = oneshot::channel();
    tx.send(Intent::ChangeUserPassword(ChangeUserPasswordPayload {
        info: PasswordChange { email: "a@example.com".into(), old_pass: "old".into(), new_pass: "new".into() },
        reply: Some(reply),
    }))
    .unwrap();

    assert_eq!(replied.await.unwrap(), Ok(()));
}
