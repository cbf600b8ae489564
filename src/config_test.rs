use super::*;

// =============================================================================
// ApiPaths
// =============================================================================

#[test]
fn paths_derive_from_base() {
    let paths = ApiPaths::new("http://backend:8080/api/v3");
    assert_eq!(paths.login, "http://backend:8080/api/v3/login");
    assert_eq!(paths.signup, "http://backend:8080/api/v3/signup");
    assert_eq!(paths.user, "http://backend:8080/api/v3/user");
    assert_eq!(paths.check_name, "http://backend:8080/api/v3/checkName");
    assert_eq!(paths.check_name_unique, "http://backend:8080/api/v3/checkNameUnique");
    assert_eq!(paths.changepwd, "http://backend:8080/api/v3/changepwd");
    assert_eq!(paths.projects_check_name, "http://backend:8080/api/v3/projectsCheckName");
}

#[test]
fn paths_trim_trailing_slash() {
    let paths = ApiPaths::new("http://backend:8080/");
    assert_eq!(paths.login, "http://backend:8080/login");
}

// =============================================================================
// ApiConfig
// =============================================================================

/// # Safety
/// Tests must run with `--test-threads=1` to avoid env races.
unsafe fn clear_auth_env() {
    unsafe {
        std::env::remove_var("AUTH_API_BASE_URL");
        std::env::remove_var("AUTH_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("AUTH_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("AUTH_CHECK_THROTTLE_MS");
    }
}

#[test]
fn new_uses_default_timeouts() {
    let config = ApiConfig::new("http://backend");
    assert_eq!(
        config.timeouts,
        HttpTimeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
}

#[test]
fn from_env_requires_base_url() {
    unsafe { clear_auth_env() };

    let err = ApiConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("AUTH_API_BASE_URL"));
}

#[test]
fn from_env_reads_overrides() {
    unsafe {
        clear_auth_env();
        std::env::set_var("AUTH_API_BASE_URL", "http://backend:9000/");
        std::env::set_var("AUTH_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("AUTH_CONNECT_TIMEOUT_SECS", "2");
    }

    let config = ApiConfig::from_env().unwrap();
    assert_eq!(config.paths.login, "http://backend:9000/login");
    assert_eq!(config.timeouts, HttpTimeouts { request_secs: 5, connect_secs: 2 });

    unsafe { clear_auth_env() };
}

// =============================================================================
// DispatchConfig
// =============================================================================

#[test]
fn dispatch_default_window_is_one_second() {
    assert_eq!(DispatchConfig::default().check_throttle, Duration::from_millis(1000));
}

#[test]
fn dispatch_from_env_reads_window() {
    unsafe {
        clear_auth_env();
        std::env::set_var("AUTH_CHECK_THROTTLE_MS", "250");
    }

    assert_eq!(DispatchConfig::from_env().check_throttle, Duration::from_millis(250));

    unsafe { clear_auth_env() };
}

#[test]
fn env_parse_falls_back_on_garbage() {
    unsafe {
        clear_auth_env();
        std::env::set_var("AUTH_CHECK_THROTTLE_MS", "not-a-number");
    }

    assert_eq!(DispatchConfig::from_env().check_throttle, Duration::from_millis(DEFAULT_CHECK_THROTTLE_MS));

    unsafe { clear_auth_env() };
}
