//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Initializes the embedded database
//! - Starts the HTTP server with graceful shutdown support

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use dotenvy::dotenv;
use tower_http::trace::TraceLayer;

// Module declarations
mod config;
mod database;
mod error;
mod handler;
mod middleware;
mod model;
mod publish;
mod route;
mod staging;

use config::Config;
use database::{init_db, AppState};
use publish::MediaHost;
use route::create_app;
use staging::Staging;

/// Application entry point
///
/// 1. Loads environment variables from a .env file if present
/// 2. Builds the [`Config`] once; nothing else reads the environment
/// 3. Initializes the embedded database with its three collections
/// 4. Creates the application state and router
/// 5. Starts the HTTP server with graceful shutdown handling
#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("portfolio=debug,tower_http=debug")
        .init();

    let config = Config::from_env();

    let db = init_db(&config.database_path).expect("Failed to initialize database");

    let port = config.port;
    let database_path = config.database_path.clone();

    let state = AppState {
        db: Arc::new(db),
        media_host: MediaHost::new(config.media_host_url.clone()),
        staging: Staging::new(config.upload_dir.clone()),
        config: Arc::new(config),
    };

    let app = create_app(state)
        .layer(TraceLayer::new_for_http())
        // Exposes the peer address so visitor tracking works without a proxy
        .into_make_service_with_connect_info::<std::net::SocketAddr>();

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await.unwrap();

    println!("🚀 Server running at http://localhost:{}", port);
    println!("📂 Using database: {}", database_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

/// Handles graceful shutdown signals
///
/// Returns when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received so the
/// server can drain open connections and close database transactions
/// cleanly before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    println!("\n🛑 Shutdown signal received, stopping server.");
}
