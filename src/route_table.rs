use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};

use crate::{
    errors::RouteTableError,
    guard::HOME_PATH,
    models::{Role, RouteMeta, RoutePolicy},
};

/// RouteDescriptor
///
/// Static entry mapping a path to a view and the policy guarding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: String,
    /// Route name, e.g. "AdminDashboard".
    pub name: String,
    /// Name of the view component mounted for this route.
    pub view: String,
    pub policy: RoutePolicy,
}

impl RouteDescriptor {
    /// Builds a descriptor. Nothing is validated until it goes into a `RouteTable`.
    pub fn new(path: &str, name: &str, view: &str, policy: RoutePolicy) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            view: view.to_string(),
            policy,
        }
    }
}

/// RouteRecord
///
/// JSON shape of a single route table entry. `meta` may be omitted for public routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RouteRecord {
    path: String,
    name: String,
    view: String,
    #[serde(default)]
    meta: RouteMeta,
}

/// RouteTable
///
/// Ordered, immutable list of routes. Resolution returns the first entry whose path
/// equals the normalized request path.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    /// new
    ///
    /// Validates and wraps a list of descriptors. The table must contain the home route,
    /// and every entry must satisfy:
    ///
    /// - **Literal path**: absolute, made of non-empty segments of `[A-Za-z0-9._~-]`
    ///   (no `.`/`..`). A path that `normalize_path` would change (trailing slash,
    ///   query, fragment) can never be resolved, so it is refused here.
    /// - **Not reserved**: `/health`, `/session` and `/api/*` belong to the shell.
    /// - **Plain view name**: `[A-Za-z0-9_-]`, since it is written into the served page.
    /// - **Unique path**.
    pub fn new(routes: Vec<RouteDescriptor>) -> Result<Self, RouteTableError> {
        let mut seen = HashSet::new();
        for route in &routes {
            if !is_literal_path(&route.path) {
                return Err(RouteTableError::InvalidPath(route.path.clone()));
            }
            if is_reserved_path(&route.path) {
                return Err(RouteTableError::ReservedPath(route.path.clone()));
            }
            if !is_view_name(&route.view) {
                return Err(RouteTableError::InvalidView {
                    path: route.path.clone(),
                    view: route.view.clone(),
                });
            }
            if !seen.insert(route.path.as_str()) {
                return Err(RouteTableError::DuplicatePath(route.path.clone()));
            }
        }
        if !seen.contains(HOME_PATH) {
            return Err(RouteTableError::MissingHome);
        }

        Ok(Self { routes })
    }

    /// builtin
    ///
    /// The portal's own routes: three public pages and one dashboard per role.
    pub fn builtin() -> Self {
        Self {
            routes: vec![
                RouteDescriptor::new("/", "Home", "HomePage", RoutePolicy::public()),
                RouteDescriptor::new("/login", "Login", "LoginPage", RoutePolicy::public()),
                RouteDescriptor::new("/register", "Register", "RegisterPage", RoutePolicy::public()),
                RouteDescriptor::new(
                    "/user",
                    "UserDashboard",
                    "UserDashboard",
                    RoutePolicy::role(Role::User),
                ),
                RouteDescriptor::new(
                    "/admin",
                    "AdminDashboard",
                    "AdminDashboard",
                    RoutePolicy::role(Role::Admin),
                ),
            ],
        }
    }

    /// from_json
    ///
    /// Parses an array of `{path, name, view, meta}` records, rejecting metas that do not
    /// map onto a `RoutePolicy`.
    pub fn from_json(raw: &str) -> Result<Self, RouteTableError> {
        let records: Vec<RouteRecord> = serde_json::from_str(raw)?;

        let routes = records
            .into_iter()
            .map(|record| {
                let policy = RoutePolicy::try_from(record.meta).map_err(|source| {
                    RouteTableError::InvalidPolicy {
                        path: record.path.clone(),
                        source,
                    }
                })?;
                Ok(RouteDescriptor {
                    path: record.path,
                    name: record.name,
                    view: record.view,
                    policy,
                })
            })
            .collect::<Result<Vec<_>, RouteTableError>>()?;

        Self::new(routes)
    }

    /// load
    ///
    /// Reads and parses a JSON route table file (`ROUTE_TABLE_PATH`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RouteTableError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// to_json
    ///
    /// Serializes the table back into its `{path, name, view, meta}` wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let records: Vec<RouteRecord> = self
            .routes
            .iter()
            .map(|route| RouteRecord {
                path: route.path.clone(),
                name: route.name.clone(),
                view: route.view.clone(),
                meta: route.policy.into(),
            })
            .collect();
        serde_json::to_string_pretty(&records)
    }

    /// resolve
    ///
    /// Query string and fragment are ignored, as is a single trailing slash.
    pub fn resolve(&self, path: &str) -> Option<&RouteDescriptor> {
        let wanted = normalize_path(path);
        self.routes.iter().find(|route| route.path == wanted)
    }

    /// iter
    ///
    /// Walks the routes in declaration order. The shell mounts one view per entry.
    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter()
    }

    /// Number of declared routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Never true for a validated table, which always holds the home route.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Built-in table.
impl Default for RouteTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Strips `?query` and `#fragment`, then one trailing slash (except on "/" itself).
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ if path.is_empty() => HOME_PATH,
        _ => path,
    }
}

/// Paths owned by the shell's own endpoints (see `routes::api`).
const RESERVED_PATHS: [&str; 3] = ["/health", "/session", "/api"];

fn is_reserved_path(path: &str) -> bool {
    RESERVED_PATHS
        .iter()
        .any(|reserved| path == *reserved || path.starts_with(&format!("{reserved}/")))
}

// Literal paths only: no captures, wildcards or empty segments, which axum would
// either treat specially or refuse to mount.
fn is_literal_path(path: &str) -> bool {
    if path == HOME_PATH {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    rest.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
    })
}

fn is_view_name(view: &str) -> bool {
    !view.is_empty()
        && view
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}
