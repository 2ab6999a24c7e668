use axum::{ServiceExt, extract::Request};
use clap::Parser;
use recipe_api::db::{self, readiness, schema};
use recipe_api::server::config::ServerConfig;
use recipe_api::server::logging::init_logging;
use recipe_api::web::create_axum_router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal.");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // --- Server Config Setup ---
    let server_config = Arc::new(ServerConfig::load(args.config.as_deref())?);

    let _log_guard = init_logging(&server_config.log_dir, "server.log");
    info!(version = env!("CARGO_PKG_VERSION"), "Starting server");

    // --- Database Setup ---
    readiness::wait_for_database(
        &readiness::DatabaseUrlProbe::new(server_config.database_url.clone()),
        &readiness::TokioSleeper,
    )
    .await;

    let db_pool = db::connect(&server_config).await?;
    schema::create_tables(&db_pool).await?;
    info!("Database schema is ready.");

    // --- Axum HTTP Server Setup ---
    let http_router = create_axum_router(db_pool.clone(), server_config.clone());

    let addr: SocketAddr = server_config.listen_addr.parse()?;
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4()?
    } else {
        tokio::net::TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.set_keepalive(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(1024)?;
    info!(address = %addr, "HTTP server listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(http_router))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await?;
    info!("Server stopped.");
    Ok(())
}
