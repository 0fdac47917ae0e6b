//! Private Chat Server - Entry Point
//!
//! Parses the bind address, starts the TCP listener and serves until Ctrl-C.

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use private_chat_server::{serve_until_ctrl_c, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=private_chat_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("private_chat_server=info")),
        )
        .init();

    let config = Config::parse();

    // Bind failure is fatal
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Private chat server listening on {}", listener.local_addr()?);

    serve_until_ctrl_c(listener).await;

    info!("Server closed");
    Ok(())
}
