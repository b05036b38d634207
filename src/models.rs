use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;

use crate::errors::{PolicyError, UnknownRole};

// --- Identity ---

/// Role
///
/// The coarse privilege tag stored next to the session token under `userRole`.
/// Only the literal strings "user" and "admin" are recognised; anything else read back
/// from storage is treated as "no role".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// as_str
    ///
    /// The exact string stored under `userRole` and compared by the guard.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    // Exact match only. "Admin" is not "admin".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// SignInRequest
///
/// The three values written into the session store after a successful login with the
/// backend (POST /session on the shell).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SignInRequest {
    pub token: String,
    pub role: Role,
    pub user_name: String,
}

// --- Access Policy ---

/// RoutePolicy
///
/// The closed access policy attached to every route. A required role always implies
/// authentication: the only constructors are `public`, `authenticated` and `role`, so a
/// policy asking for a role without asking for a token cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoutePolicy {
    requires_auth: bool,
    required_role: Option<Role>,
}

impl RoutePolicy {
    /// No credential needed.
    pub const fn public() -> Self {
        Self {
            requires_auth: false,
            required_role: None,
        }
    }

    /// Any session token will do.
    pub const fn authenticated() -> Self {
        Self {
            requires_auth: true,
            required_role: None,
        }
    }

    /// A session token plus the given stored role.
    pub const fn role(role: Role) -> Self {
        Self {
            requires_auth: true,
            required_role: Some(role),
        }
    }

    /// Whether a session token must be present. Always true when a role is required.
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// The stored role the route is reserved for, if any.
    pub fn required_role(&self) -> Option<Role> {
        self.required_role
    }
}

/// RouteMeta
///
/// Wire form of a `RoutePolicy`, as route tables are written in JSON:
/// `{"requiresAuth": true, "requiresAdmin": true}`. Missing flags default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RouteMeta {
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    pub requires_admin: bool,
    #[serde(default)]
    pub requires_user: bool,
}

impl From<RoutePolicy> for RouteMeta {
    fn from(policy: RoutePolicy) -> Self {
        Self {
            requires_auth: policy.requires_auth,
            requires_admin: policy.required_role == Some(Role::Admin),
            requires_user: policy.required_role == Some(Role::User),
        }
    }
}

/// Validating conversion used when a route table is loaded. Rejects both role flags at
/// once, and a role flag without `requiresAuth`.
impl TryFrom<RouteMeta> for RoutePolicy {
    type Error = PolicyError;

    fn try_from(meta: RouteMeta) -> Result<Self, Self::Error> {
        let required_role = match (meta.requires_admin, meta.requires_user) {
            (true, true) => return Err(PolicyError::ConflictingRoles),
            (true, false) => Some(Role::Admin),
            (false, true) => Some(Role::User),
            (false, false) => None,
        };

        match (meta.requires_auth, required_role) {
            (false, Some(_)) => Err(PolicyError::RoleWithoutAuth),
            (requires_auth, required_role) => Ok(Self {
                requires_auth,
                required_role,
            }),
        }
    }
}
