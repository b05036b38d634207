use fyp_portal_shell::{
    AppConfig,
    config::{Env, SessionScope},
};
use serial_test::serial;
use std::{env, panic, path::PathBuf};

const CONFIG_VARS: [&str; 5] = [
    "APP_ENV",
    "API_BASE_URL",
    "SHELL_BIND_ADDR",
    "SESSION_SCOPE",
    "ROUTE_TABLE_PATH",
];

// --- Setup/Teardown Utilities ---

/// Clears every config variable, applies `vars`, runs `test` and restores the original
/// environment afterwards (even if the test panics).
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://localhost:3000");
    assert_eq!(config.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.session_scope, SessionScope::Persistent);
    assert_eq!(config.route_table_path, None);
}

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    // API_BASE_URL is mandatory in production.
    let result = run_with_env(&[("APP_ENV", "production")], || {
        panic::catch_unwind(AppConfig::load)
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without API_BASE_URL"
    );
}

#[test]
#[serial]
fn test_app_config_production_reads_everything() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://api.example.com"),
            ("SHELL_BIND_ADDR", "127.0.0.1:4000"),
            ("SESSION_SCOPE", "session"),
            ("ROUTE_TABLE_PATH", "/etc/portal/routes.json"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.api_base_url, "https://api.example.com");
    assert_eq!(config.bind_addr, "127.0.0.1:4000");
    assert_eq!(config.session_scope, SessionScope::Session);
    assert_eq!(
        config.route_table_path,
        Some(PathBuf::from("/etc/portal/routes.json"))
    );
}

#[test]
#[serial]
fn test_app_config_rejects_unknown_session_scope() {
    for raw in ["forever", "local"] {
        let result = run_with_env(&[("SESSION_SCOPE", raw)], || {
            panic::catch_unwind(AppConfig::load)
        });

        assert!(result.is_err(), "SESSION_SCOPE={raw} should be refused");
    }
}

#[test]
fn test_session_scope_parsing() {
    assert_eq!(SessionScope::parse("persistent"), Some(SessionScope::Persistent));
    assert_eq!(SessionScope::parse(" Persistent "), Some(SessionScope::Persistent));
    assert_eq!(SessionScope::parse("SESSION"), Some(SessionScope::Session));
    assert_eq!(SessionScope::parse("cookie"), None);
    // "local" names an APP_ENV value, not a cookie lifetime.
    assert_eq!(SessionScope::parse("local"), None);
}
