use crate::{
    AppState,
    auth::BrowserSession,
    client::ApiClient,
    errors::ClientError,
    models::SignInRequest,
    navigation::Navigator,
};
use axum::{
    Json,
    body::{self, Bytes},
    extract::{Request, State},
    http::{HeaderValue, StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

/// Path prefix under which the shell proxies the backend API.
pub const API_PREFIX: &str = "/api";

/// Largest request body forwarded by the API proxy.
pub const MAX_PROXY_BODY: usize = 10 * 1024 * 1024;

// --- View Handlers ---

/// render_view
///
/// [Guarded Route] Serves the SPA mount point for `view`. The view components
/// themselves are client-side; the shell only names which one to mount.
///
/// `view` is written into the page unescaped; `RouteTable::new` only admits names made
/// of `[A-Za-z0-9_-]`.
pub async fn render_view(view: String) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{view}</title></head>\n\
         <body><div id=\"app\" data-view=\"{view}\"></div></body>\n</html>\n"
    ))
}

// --- Session Handlers ---

/// sign_in
///
/// [Public Route] Stores the token, role and user name handed out by the backend's
/// login endpoint. The session lives in cookies scoped per `SESSION_SCOPE`.
pub async fn sign_in(
    browser: BrowserSession,
    Json(payload): Json<SignInRequest>,
) -> impl IntoResponse {
    browser.session.sign_in(&payload);
    tracing::info!(role = %payload.role, "session started");
    (StatusCode::NO_CONTENT, browser.jar())
}

/// sign_out
///
/// [Public Route] Removes all three session keys.
pub async fn sign_out(browser: BrowserSession) -> impl IntoResponse {
    browser.session.clear();
    (StatusCode::NO_CONTENT, browser.jar())
}

// --- API Proxy ---

/// proxy_api
///
/// [Public Route] Forwards `/api/{path}` to the backend through an `ApiClient` built over
/// the caller's cookie session, so the bearer token is attached from the cookies.
///
/// *401 handling*: the client clears the session and navigates home; the response keeps
/// the backend's 401, removes the three cookies and points `Location` at the home route.
/// Any other backend status is relayed unchanged. Transport failures answer 502.
pub async fn proxy_api(
    State(state): State<AppState>,
    browser: BrowserSession,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match body::to_bytes(body, MAX_PROXY_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let navigator = Arc::new(Navigator::new(state.routes.clone(), browser.session.clone()));
    let client = ApiClient::new(state.http.clone(), state.config.api_base_url.clone(), navigator);

    let target = backend_target(&parts.uri);

    let mut outbound = client.request(parts.method, &target).body(body);
    if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
        outbound = outbound.header(header::CONTENT_TYPE, content_type.clone());
    }

    match client.send(outbound).await {
        Ok(response) => relay(response).await,
        Err(ClientError::Unauthorized(response)) => {
            let mut relayed = relay(response).await;
            if let Ok(location) = HeaderValue::from_str(&client.navigator().current()) {
                relayed.headers_mut().insert(header::LOCATION, location);
            }
            (browser.jar(), relayed).into_response()
        }
        Err(ClientError::Transport(e)) => {
            tracing::warn!(error = %e, "api proxy request failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// backend_target
///
/// The backend path and query for a proxied request, taken from the raw request URI
/// with the `/api` prefix removed. Percent-encoding is left exactly as the browser sent
/// it, so `%3F` or `%2F` inside a segment stay encoded.
pub fn backend_target(uri: &Uri) -> String {
    let path = uri.path().strip_prefix(API_PREFIX).unwrap_or(uri.path());
    match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}

/// Copies status, content type and body of a backend response.
async fn relay(response: reqwest::Response) -> Response {
    let status = response.status();
    let content_type = response.headers().get(header::CONTENT_TYPE).cloned();

    let body: Bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read api response body");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    let mut relayed = (status, body).into_response();
    if let Some(content_type) = content_type {
        relayed.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    relayed
}
