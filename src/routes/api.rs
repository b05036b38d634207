use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{any, get, post},
};

/// Plumbing Router Module
///
/// Endpoints that sit beside the views and are reachable without a session.
///
/// These paths are reserved: `RouteTable::new` refuses tables that declare `/health`,
/// `/session` or anything under `/api`, so a loaded table can never collide with them
/// when the routers are merged.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /session, DELETE /session
        // Sign-in stores the backend-issued credential in cookies; sign-out clears it.
        .route("/session", post(handlers::sign_in).delete(handlers::sign_out))
        // ANY /api/{*path}
        // Forwards to API_BASE_URL with the bearer token attached. A backend 401 clears
        // the session cookies.
        .route("/api/{*path}", any(handlers::proxy_api))
}
