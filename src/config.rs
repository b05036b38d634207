use std::{env, path::PathBuf};

/// AppConfig
///
/// Holds the shell's configuration. Immutable once loaded and pulled into handlers and
/// extractors through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and how strict loading is.
    pub env: Env,
    // Base URL of the backend API; `/api/*` is forwarded here.
    pub api_base_url: String,
    // Address the shell server listens on.
    pub bind_addr: String,
    // Lifetime of the session cookies.
    pub session_scope: SessionScope,
    // Optional JSON route table replacing the built-in one.
    pub route_table_path: Option<PathBuf>,
}

/// Env
///
/// Runtime context. `Local` gets pretty logs and a default backend URL; `Production`
/// gets JSON logs and must be told where the backend is.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// SessionScope
///
/// Where the session lives in the browser. `Persistent` survives browser restarts (the
/// localStorage behaviour); `Session` ends with the browser session (sessionStorage).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SessionScope {
    #[default]
    Persistent,
    Session,
}

impl SessionScope {
    /// parse
    ///
    /// Reads a `SESSION_SCOPE` value: `persistent` or `session`, case-insensitive and
    /// ignoring surrounding whitespace. Anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "persistent" => Some(SessionScope::Persistent),
            "session" => Some(SessionScope::Session),
            _ => None,
        }
    }
}

// Dev API server, matching the backend's own default bind address.
const LOCAL_API_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking values for test state setup; no environment variables are read.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: LOCAL_API_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_scope: SessionScope::Persistent,
            route_table_path: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables at startup.
    ///
    /// # Panics
    /// Panics if `API_BASE_URL` is missing in production, or if `SESSION_SCOPE` holds an
    /// unrecognised value. The shell must not start half-configured.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // The backend location is mandatory in production. Locally it defaults to the
        // dev API server.
        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| LOCAL_API_BASE_URL.to_string())
            }
        };

        let session_scope = match env::var("SESSION_SCOPE") {
            Ok(raw) => SessionScope::parse(&raw)
                .expect("FATAL: SESSION_SCOPE must be 'persistent' or 'session'."),
            Err(_) => SessionScope::default(),
        };

        Self {
            env,
            api_base_url,
            bind_addr: env::var("SHELL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            session_scope,
            route_table_path: env::var("ROUTE_TABLE_PATH").ok().map(PathBuf::from),
        }
    }
}
