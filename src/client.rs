use reqwest::{Method, RequestBuilder, Response, StatusCode, header::AUTHORIZATION};
use serde::Serialize;
use std::sync::Arc;

use crate::{errors::ClientError, guard::HOME_PATH, navigation::Navigator, session::Session};

/// ApiClient
///
/// HTTP client for the backend API. It plays the role of a request/response interceptor
/// pair around `reqwest`:
///
/// - **Outgoing**: every request built through `request` carries
///   `Authorization: Bearer <token>` while the session holds a token.
/// - **Incoming**: a 401 clears the session and navigates to the home route before the
///   failure reaches the caller. Every other response, success or not, is returned as is.
///
/// The session is the navigator's, so the guard and the decoration always read the same
/// store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    navigator: Arc<Navigator>,
}

impl ApiClient {
    /// new
    ///
    /// `http` is reused for connection pooling. `base_url` may carry a path prefix; it
    /// is joined with each request path by `url`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, navigator: Arc<Navigator>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            navigator,
        }
    }

    /// The session requests are decorated from (the navigator's).
    pub fn session(&self) -> &Session {
        self.navigator.session()
    }

    /// The navigator pushed home after a 401.
    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    /// Joins `path` onto the base URL with exactly one slash between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// A decorated request builder for `path`.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.decorate(self.http.request(method, self.url(path)))
    }

    /// Attaches the bearer token, if any. The token is read now, not when sent.
    pub fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session().bearer() {
            Some(bearer) => request.header(AUTHORIZATION, bearer),
            None => request,
        }
    }

    /// send
    ///
    /// Executes the request. A 401 triggers `invalidate` and comes back as
    /// `ClientError::Unauthorized`; transport errors come back unchanged.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!(url = %response.url(), "api rejected credentials; clearing session");
            self.invalidate();
            return Err(ClientError::Unauthorized(response));
        }

        Ok(response)
    }

    /// Clears the stored credential, role and user name, then navigates home.
    pub fn invalidate(&self) {
        self.session().clear();
        if let Err(e) = self.navigator.push(HOME_PATH) {
            tracing::warn!(error = %e, "could not navigate home after clearing session");
        }
    }

    /// Decorated `GET`.
    pub async fn get(&self, path: &str) -> Result<Response, ClientError> {
        self.send(self.request(Method::GET, path)).await
    }

    /// Decorated `POST` with a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, ClientError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// Decorated `DELETE`.
    pub async fn delete(&self, path: &str) -> Result<Response, ClientError> {
        self.send(self.request(Method::DELETE, path)).await
    }
}
