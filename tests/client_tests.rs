use fyp_portal_shell::{
    ApiClient, Session, SessionStore,
    errors::ClientError,
    models::Role,
    session::SessionKey,
};
use reqwest::{Method, StatusCode};

mod common;

async fn client_with(session: Session) -> ApiClient {
    let base_url = common::spawn_backend().await;
    ApiClient::new(reqwest::Client::new(), base_url, common::navigator(session))
}

#[tokio::test]
async fn test_bearer_header_attached_when_token_present() {
    let session = Session::in_memory();
    common::sign_in(&session, Role::User);
    let client = client_with(session).await;

    let response = client.get("/whoami").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "Bearer test-token");
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let client = client_with(Session::in_memory()).await;

    let response = client.get("whoami").await.unwrap();

    assert_eq!(response.text().await.unwrap(), "anonymous");
}

#[tokio::test]
async fn test_unauthorized_response_clears_session_and_goes_home() {
    let session = Session::in_memory();
    common::sign_in(&session, Role::Admin);
    let client = client_with(session.clone()).await;
    client.navigator().push("/admin").unwrap();
    assert_eq!(client.navigator().current(), "/admin");

    let result = client.get("/private").await;

    match result {
        Err(ClientError::Unauthorized(response)) => {
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(response.text().await.unwrap(), "token expired");
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
    for key in SessionKey::ALL {
        assert_eq!(session.store().get(key), None, "{} should be cleared", key.as_str());
    }
    assert_eq!(client.navigator().current(), "/");
}

#[tokio::test]
async fn test_requests_after_invalidation_are_undecorated() {
    let session = Session::in_memory();
    common::sign_in(&session, Role::User);
    let client = client_with(session).await;

    let _ = client.get("/private").await;
    let response = client.get("/whoami").await.unwrap();

    assert_eq!(response.text().await.unwrap(), "anonymous");
}

#[tokio::test]
async fn test_other_failures_pass_through_untouched() {
    let session = Session::in_memory();
    common::sign_in(&session, Role::User);
    let client = client_with(session.clone()).await;
    client.navigator().push("/user").unwrap();

    let response = client.get("/broken").await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text().await.unwrap(), "boom");
    assert!(session.is_authenticated());
    assert_eq!(client.navigator().current(), "/user");
}

#[tokio::test]
async fn test_post_json_is_decorated_and_sent() {
    let session = Session::in_memory();
    common::sign_in(&session, Role::User);
    let client = client_with(session).await;

    let response = client
        .post_json("/echo", &serde_json::json!({ "title": "Rust Backend" }))
        .await
        .unwrap();

    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Rust Backend");
}

#[tokio::test]
async fn test_transport_errors_surface_unchanged() {
    // Nothing listens on port 9 locally.
    let client = ApiClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:9",
        common::navigator(Session::in_memory()),
    );

    let result = client.send(client.request(Method::GET, "/whoami")).await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
}

#[test]
fn test_url_joining() {
    let client = ApiClient::new(
        reqwest::Client::new(),
        "http://localhost:3000/",
        common::navigator(Session::in_memory()),
    );

    assert_eq!(client.url("/projects"), "http://localhost:3000/projects");
    assert_eq!(client.url("projects?year=2024"), "http://localhost:3000/projects?year=2024");
}
