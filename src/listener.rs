//! Accept loop
//!
//! Starts the ChatServer actor and hands every accepted TCP connection to
//! its own handler task until the shutdown future resolves.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::handler::handle_connection;
use crate::server::{ChatServer, ServerCommand};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Serve connections on `listener` until `shutdown` completes
///
/// Accept failures are logged and never stop the loop. On shutdown the
/// listener is dropped; sessions already running are left to finish.
pub async fn serve<F>(listener: TcpListener, shutdown: F)
where
    F: Future<Output = ()> + Send,
{
    // Create ChatServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    tokio::spawn(ChatServer::new(cmd_rx).run());

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, no longer accepting connections");
                break;
            }
            accept_result = listener.accept() => {
                handle_accept_result(accept_result, &cmd_tx);
            }
        }
    }
}

fn handle_accept_result(
    result: std::io::Result<(TcpStream, SocketAddr)>,
    cmd_tx: &mpsc::Sender<ServerCommand>,
) {
    match result {
        Ok((stream, addr)) => {
            info!("New connection from {}", addr);
            let cmd_tx = cmd_tx.clone();

            // Spawn handler task for each connection
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, addr, cmd_tx).await {
                    error!("Connection handler error: {}", e);
                }
            });
        }
        Err(e) => {
            error!("Failed to accept connection: {}", e);
        }
    }
}

/// Serve until Ctrl-C
pub async fn serve_until_ctrl_c(listener: TcpListener) {
    serve(listener, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    })
    .await
}
