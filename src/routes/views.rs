use crate::{AppState, handlers, route_table::RouteTable};
use axum::{Router, routing::get};

/// View Router Module
///
/// One `GET` route per route table entry, each serving the mount point for its view.
///
/// Access Control:
/// This router must be wrapped in the guard middleware (see `create_router`), which runs
/// the access decision for the matched route before the handler is reached.
pub fn view_routes(table: &RouteTable) -> Router<AppState> {
    table.iter().fold(Router::new(), |router, route| {
        let view = route.view.clone();
        router.route(&route.path, get(move || handlers::render_view(view.clone())))
    })
}
