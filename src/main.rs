use fyp_portal_shell::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    route_table::RouteTable,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point of the shell server: configuration, logging, route table, HTTP client
/// and the server itself.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate, info for the HTTP stack.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fyp_portal_shell=debug,tower_http=info,axum=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Shell starting in {:?} mode", config.env);

    // 4. Route Table
    // A table from ROUTE_TABLE_PATH is fully validated on load (paths, views, policies,
    // reserved shell paths), so mounting it below cannot fail.
    let routes = match &config.route_table_path {
        Some(path) => RouteTable::load(path).unwrap_or_else(|e| {
            panic!("FATAL: could not load route table from {}: {e}", path.display())
        }),
        None => RouteTable::builtin(),
    };
    tracing::info!(routes = routes.len(), "route table ready");

    // 5. Unified State Assembly
    // One reqwest client for the process: proxied calls share its connection pool.
    let app_state = AppState {
        routes: Arc::new(routes),
        http: reqwest::Client::new(),
        config,
    };
    let bind_addr = app_state.config.bind_addr.clone();
    let api_base_url = app_state.config.api_base_url.clone();

    // 6. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind SHELL_BIND_ADDR.");

    tracing::info!("Listening on {bind_addr}");
    tracing::info!("Proxying /api to {api_base_url}");

    axum::serve(listener, app).await.unwrap();
}
