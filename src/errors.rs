use thiserror::Error;

// --- Error Types ---

// An unauthorized navigation is never an error: the guard answers it with a redirect
// (see `guard::Decision`). The types below cover the plumbing around it.

/// ClientError
///
/// Failure surfaced by `ApiClient::send`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered 401. By the time the caller sees this, the session keys are
    /// gone and the navigator sits on the home route. The untouched response is kept so
    /// callers can still read the backend's body.
    #[error("request was rejected as unauthorized; the session has been cleared")]
    Unauthorized(reqwest::Response),
    /// Connection, timeout or decoding failure, passed through unchanged.
    #[error("request to the API failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// NavigationError
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches '{0}'")]
    NotFound(String),
    #[error("navigation to '{0}' exceeded the redirect limit")]
    RedirectLoop(String),
}

/// PolicyError
///
/// Raised when a route's `meta` flags do not describe a valid access policy.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("a route cannot require both the admin and the user role")]
    ConflictingRoles,
    #[error("a role requirement must be combined with requiresAuth")]
    RoleWithoutAuth,
}

/// RouteTableError
#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error("failed to read route table: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed route table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("route path '{0}' must be an absolute literal path without a trailing slash")]
    InvalidPath(String),
    #[error("route path '{0}' is reserved by the shell")]
    ReservedPath(String),
    #[error("route '{path}' has an invalid view name '{view}'")]
    InvalidView { path: String, view: String },
    #[error("route path '{0}' is declared more than once")]
    DuplicatePath(String),
    #[error("route table has no home route '/'")]
    MissingHome,
    #[error("route '{path}' has an invalid policy: {source}")]
    InvalidPolicy {
        path: String,
        #[source]
        source: PolicyError,
    },
}

/// SessionError
///
/// Only raised while opening a file-backed store. Once open, stores are infallible
/// from the caller's point of view.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session file: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// UnknownRole
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);
