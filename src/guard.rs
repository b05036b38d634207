//! Route access decisions.
//!
//! Pure and synchronous: the guard reads a policy, whether a token is present and the
//! stored role, and returns a `Decision`. It does no I/O and no logging; callers act on
//! the decision.

use crate::{
    models::{Role, RoutePolicy},
    route_table::RouteTable,
    session::Session,
};

/// Path of the public landing route. Every redirect the guard issues points here.
pub const HOME_PATH: &str = "/";

/// DenyReason
///
/// Why a navigation was turned away. Carried in the redirect for logging only; it
/// never changes the redirect target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The route needs a session token and none is stored.
    Unauthenticated,
    /// The route is admin-only and the stored role is something else.
    AdminRequired,
    /// The route is user-only and the stored role is something else.
    UserRequired,
    /// The path has no entry in the route table, so no policy could be read.
    UnknownRoute,
}

/// Decision
///
/// Outcome of a guard check. There is no error case: an unauthorized navigation is
/// answered by redirecting, never by failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Continue to the requested route.
    Allow,
    /// Go to `to` instead.
    Redirect {
        to: &'static str,
        reason: DenyReason,
    },
}

impl Decision {
    /// True for `Decision::Allow`.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn redirect(reason: DenyReason) -> Self {
        Decision::Redirect {
            to: HOME_PATH,
            reason,
        }
    }
}

/// decide
///
/// Evaluates the rules in order; the first that matches wins:
/// 1. authentication required and no token
/// 2. admin required and the role is not admin
/// 3. user required and the role is not user
///
/// Anything else is allowed. A role mismatch never downgrades to the other dashboard.
pub fn decide(policy: &RoutePolicy, has_token: bool, role: Option<Role>) -> Decision {
    if policy.requires_auth() && !has_token {
        return Decision::redirect(DenyReason::Unauthenticated);
    }

    match policy.required_role() {
        Some(Role::Admin) if role != Some(Role::Admin) => {
            Decision::redirect(DenyReason::AdminRequired)
        }
        Some(Role::User) if role != Some(Role::User) => Decision::redirect(DenyReason::UserRequired),
        _ => Decision::Allow,
    }
}

/// Runs `decide` against the current contents of a session.
pub fn check(policy: &RoutePolicy, session: &Session) -> Decision {
    decide(policy, session.is_authenticated(), session.role())
}

/// check_path
///
/// Looks `path` up in `routes` and checks its policy. A path the table cannot resolve
/// has no policy to check and is refused rather than let through.
pub fn check_path(routes: &RouteTable, path: &str, session: &Session) -> Decision {
    match routes.resolve(path) {
        Some(route) => check(&route.policy, session),
        None => Decision::redirect(DenyReason::UnknownRoute),
    }
}
