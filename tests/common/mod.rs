#![allow(dead_code)]

use axum::{
    Router,
    body::Bytes,
    http::{HeaderMap, StatusCode, Uri, header},
    routing::{get, post},
};
use fyp_portal_shell::{
    Navigator, RouteTable, Session,
    models::{Role, SignInRequest},
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// A stand-in for the backend API.
///
/// - GET  /whoami   echoes the Authorization header ("anonymous" when absent)
/// - GET  /private  always answers 401
/// - GET  /broken   always answers 500
/// - POST /echo     echoes the body with its content type
/// - GET  /files/*  echoes the request target exactly as it arrived
pub async fn spawn_backend() -> String {
    let router = Router::new()
        .route(
            "/whoami",
            get(|headers: HeaderMap| async move {
                headers
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("anonymous")
                    .to_string()
            }),
        )
        .route(
            "/private",
            get(|| async { (StatusCode::UNAUTHORIZED, "token expired") }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/echo",
            post(|headers: HeaderMap, body: Bytes| async move {
                let content_type = headers
                    .get(header::CONTENT_TYPE)
                    .cloned()
                    .unwrap_or(header::HeaderValue::from_static("text/plain"));
                ([(header::CONTENT_TYPE, content_type)], body)
            }),
        )
        .route(
            "/files/{*rest}",
            get(|uri: Uri| async move { uri.to_string() }),
        );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

pub fn sign_in(session: &Session, role: Role) {
    session.sign_in(&SignInRequest {
        token: "test-token".to_string(),
        role,
        user_name: "Alice".to_string(),
    });
}

pub fn navigator(session: Session) -> Arc<Navigator> {
    Arc::new(Navigator::new(Arc::new(RouteTable::builtin()), session))
}
