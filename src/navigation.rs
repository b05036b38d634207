use std::sync::{Arc, PoisonError, RwLock};

use crate::{
    errors::NavigationError,
    guard::{self, Decision, HOME_PATH},
    route_table::{RouteDescriptor, RouteTable},
    session::Session,
};

/// Consecutive redirects followed before a navigation is abandoned.
pub const MAX_REDIRECTS: usize = 10;

/// Navigation
///
/// Outcome of a completed `Navigator::push`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// The path that was asked for, as given.
    pub requested: String,
    /// The route that ended up current.
    pub route: RouteDescriptor,
    /// Number of guard redirects followed on the way.
    pub redirects: usize,
}

impl Navigation {
    /// redirected
    ///
    /// True when the guard turned the requested path away and the navigator landed
    /// somewhere else (`route` then names the redirect target, not the request).
    pub fn redirected(&self) -> bool {
        self.redirects > 0
    }
}

/// Navigator
///
/// Client-side navigation over a `RouteTable`. Every `push` runs the access guard on
/// the target route; a redirect re-enters navigation with the redirect target, which is
/// guarded in turn.
///
/// Shared as `Arc<Navigator>` between the application and the `ApiClient`, which pushes
/// the home route after clearing a rejected session.
pub struct Navigator {
    routes: Arc<RouteTable>,
    session: Session,
    current: RwLock<String>,
}

impl Navigator {
    /// Starts on the home route without running the guard.
    pub fn new(routes: Arc<RouteTable>, session: Session) -> Self {
        Self {
            routes,
            session,
            current: RwLock::new(HOME_PATH.to_string()),
        }
    }

    /// current
    ///
    /// Path of the route the navigator is on. Only a successful `push` changes it.
    pub fn current(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The session the guard reads on every `push`.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The table `push` resolves paths against.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// push
    ///
    /// Navigates to `path`. On error the current route is left unchanged.
    ///
    /// *Errors*: `NotFound` when `path` (or a redirect target) has no route;
    /// `RedirectLoop` after `MAX_REDIRECTS` consecutive redirects, which only happens
    /// when the home route itself is protected.
    pub fn push(&self, path: &str) -> Result<Navigation, NavigationError> {
        let mut target = path.to_string();

        for redirects in 0..=MAX_REDIRECTS {
            let route = self
                .routes
                .resolve(&target)
                .ok_or_else(|| NavigationError::NotFound(target.clone()))?;

            match guard::check(&route.policy, &self.session) {
                Decision::Allow => {
                    *self.current.write().unwrap_or_else(PoisonError::into_inner) =
                        route.path.clone();
                    return Ok(Navigation {
                        requested: path.to_string(),
                        route: route.clone(),
                        redirects,
                    });
                }
                Decision::Redirect { to, reason } => {
                    tracing::debug!(from = %route.path, to, ?reason, "navigation redirected");
                    target = to.to_string();
                }
            }
        }

        tracing::warn!(path, "navigation abandoned after {MAX_REDIRECTS} redirects");
        Err(NavigationError::RedirectLoop(path.to_string()))
    }
}
