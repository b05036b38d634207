/// Router Module Index
///
/// Splits the shell's routing into the guarded view routes and the unguarded plumbing
/// (health check, session endpoints, API proxy). The access guard is applied as a route
/// layer on the view router only.

/// SPA view routes generated from the route table. Guarded.
pub mod views;

/// Health, session and `/api` proxy routes. Not guarded: the backend enforces its own
/// authorization on proxied calls.
pub mod api;
