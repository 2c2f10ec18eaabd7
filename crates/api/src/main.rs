use std::net::SocketAddr;
use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use framecast_api::config::ServerConfig;
use framecast_api::delivery::served_cache;
use framecast_api::router::build_app_router;
use framecast_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framecast=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        port = config.port,
        db_path = %config.db_path,
        data_dir = %config.data_dir,
        "Loaded server configuration"
    );

    // --- Data directories ---
    for dir in [
        config.data_dir.clone(),
        format!("{}/photos", config.data_dir),
        format!("{}/thumbnails", config.data_dir),
    ] {
        if let Err(e) = std::fs::create_dir_all(&dir) {
            fatal(&format!("Failed to create data directory {dir}: {e}"));
        }
    }
    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                fatal(&format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ));
            }
        }
    }

    // --- Database ---
    let pool = match framecast_db::create_pool(&config.db_path).await {
        Ok(pool) => pool,
        Err(e) => fatal(&format!("Failed to open database: {e}")),
    };
    if let Err(e) = framecast_db::run_migrations(&pool).await {
        fatal(&format!("Failed to run database migrations: {e}"));
    }
    if let Err(e) = framecast_db::health_check(&pool).await {
        fatal(&format!("Database health check failed: {e}"));
    }
    tracing::info!("Database ready");

    // --- Startup hygiene: orphaned served thumbnails ---
    served_cache::sweep_orphans(&config.data_dir).await;

    // --- App state & router ---
    let state = AppState::new(pool, config.clone());
    let render = state.render.clone();
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => fatal(&format!("Failed to bind to {addr}: {e}")),
    };

    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = serve.await {
        fatal(&format!("Server error: {e}"));
    }

    // --- Post-shutdown cleanup ---
    render.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Log a fatal init failure and exit with code 1.
fn fatal(message: &str) -> ! {
    tracing::error!("{message}");
    eprintln!("{message}");
    std::process::exit(1);
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
