use axum::{
    Router,
    extract::{FromRef, MatchedPath, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Navigation core: policy, guard, session access, route table, navigator.
pub mod errors;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod route_table;
pub mod session;

// Outgoing request decoration and 401 invalidation.
pub mod client;

// Shell server components.
pub mod auth;
pub mod config;
pub mod handlers;
pub mod routes;

use auth::BrowserSession;
use guard::{Decision, DenyReason};
use routes::{api, views};

// --- Public Re-exports ---

pub use client::ApiClient;
pub use config::AppConfig;
pub use navigation::Navigator;
pub use route_table::{RouteDescriptor, RouteTable};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionState, SessionStore};

/// RouteTableState
///
/// Shared handle to the immutable route table.
pub type RouteTableState = Arc<RouteTable>;

/// AppState
///
/// The single, immutable container shared by every request of the shell server.
#[derive(Clone)]
pub struct AppState {
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
    /// The routes served as views, and consulted by the guard.
    pub routes: RouteTableState,
    /// Connection-pooling HTTP client reused for every proxied API call.
    pub http: reqwest::Client,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for RouteTableState {
    fn from_ref(app_state: &AppState) -> RouteTableState {
        app_state.routes.clone()
    }
}

/// guard_middleware
///
/// Runs the access guard before every view route.
///
/// *Mechanism*: the matched route's policy is checked against the browser's cookie
/// session. An allowed request continues to the view; a denied one is answered with
/// `303 See Other` pointing at the guard's redirect target.
///
/// A matched path missing from the route table is refused the same way: without an
/// entry there is no policy, and an unchecked view must never be served.
async fn guard_middleware(
    State(routes): State<RouteTableState>,
    matched: MatchedPath,
    browser: BrowserSession,
    request: Request,
    next: Next,
) -> Response {
    match guard::check_path(&routes, matched.as_str(), &browser.session) {
        Decision::Allow => next.run(request).await,
        Decision::Redirect {
            to,
            reason: DenyReason::UnknownRoute,
        } => {
            tracing::warn!(path = matched.as_str(), to, "view has no route table entry; refusing");
            Redirect::to(to).into_response()
        }
        Decision::Redirect { to, reason } => {
            tracing::info!(path = matched.as_str(), to, ?reason, "view access denied");
            Redirect::to(to).into_response()
        }
    }
}

/// create_router
///
/// Assembles the shell's routing structure, applies the guard to the view routes and
/// wraps everything in the observability layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // View Routes: every one passes the access guard first.
        .merge(
            views::view_routes(&state.routes).route_layer(middleware::from_fn_with_state(
                state.clone(),
                guard_middleware,
            )),
        )
        // Health, session and API proxy routes: no guard.
        .merge(api::api_routes())
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span, tagged with the `x-request-id` set by the layer above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
