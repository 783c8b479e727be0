use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_db::common::AppState;
use weather_db::config::Config;
use weather_db::db::DbPool;
use weather_db::routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,weather_db=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting weather-db...");

    // Load configuration (fail-fast)
    let config = Config::from_env()?;
    tracing::info!(
        port = config.api_port,
        pool_size = config.max_db_conn,
        default_timezone = %config.default_timezone,
        "Configuration loaded"
    );

    // Open the connection pool (fail-fast)
    tracing::info!("Connecting to database...");
    let pool = DbPool::connect(&config.database_url(), config.max_db_conn).await?;
    tracing::info!(size = pool.size(), "Connection pool ready");

    // Create application state
    let state = AppState::new(pool, config.clone());

    // Build router
    let app = routes::build_router(state)
        .into_make_service_with_connect_info::<SocketAddr>();

    // Start server with graceful shutdown
    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
