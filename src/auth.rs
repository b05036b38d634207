use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::{
    convert::Infallible,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    config::{AppConfig, SessionScope},
    session::{Session, SessionKey, SessionStore},
};

/// CookieSessionStore
///
/// A `SessionStore` over the browser's cookies for a single request. Reads come from the
/// incoming `Cookie` header; writes and removals are recorded in the jar and reach the
/// browser as `Set-Cookie` headers once the jar is returned with the response.
pub struct CookieSessionStore {
    jar: Mutex<CookieJar>,
    scope: SessionScope,
}

impl CookieSessionStore {
    /// Wraps the request's jar. `scope` decides whether written cookies are permanent.
    pub fn new(jar: CookieJar, scope: SessionScope) -> Self {
        Self {
            jar: Mutex::new(jar),
            scope,
        }
    }

    /// Snapshot of the jar including every change made so far.
    pub fn jar(&self) -> CookieJar {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionStore for CookieSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        let jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        jar.get(key.as_str()).map(|cookie| cookie.value().to_string())
    }

    fn set(&self, key: SessionKey, value: &str) {
        let builder = Cookie::build((key.as_str(), value.to_string()))
            .path("/")
            .same_site(SameSite::Lax);
        let cookie = match self.scope {
            SessionScope::Persistent => builder.permanent().build(),
            // No Max-Age/Expires: the browser drops it when the session ends.
            SessionScope::Session => builder.build(),
        };

        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        *jar = jar.clone().add(cookie);
    }

    fn remove(&self, key: SessionKey) {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        *jar = jar.clone().remove(Cookie::build(key.as_str()).path("/"));
    }
}

/// BrowserSession Extractor Result
///
/// The session of the browser making the request. Handlers read and change it through
/// `session`, then hand `jar()` back in the response so changes reach the browser.
#[derive(Clone)]
pub struct BrowserSession {
    pub session: Session,
    store: Arc<CookieSessionStore>,
}

impl BrowserSession {
    /// The jar to return with the response; carries every change made to `session`.
    pub fn jar(&self) -> CookieJar {
        self.store.jar()
    }
}

/// BrowserSession Extractor Implementation
///
/// Builds a cookie-backed `Session` from the request headers. The cookie lifetime for
/// writes comes from `AppConfig::session_scope`. Never rejects: a request without
/// cookies simply has an empty session.
impl<S> FromRequestParts<S> for BrowserSession
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let store = Arc::new(CookieSessionStore::new(jar, config.session_scope));

        Ok(BrowserSession {
            session: Session::new(store.clone()),
            store,
        })
    }
}
