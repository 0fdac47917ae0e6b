//! Connection handler
//!
//! Drives one client's byte stream through the session lifecycle:
//! registration, the receive loop, and teardown. Outbound messages are
//! written by a separate task so the ChatServer never touches the socket.
//!
//! Every send caused by a client's own command is performed here, in that
//! client's task. A peer that stops reading can stall the sessions that
//! message it, never the ChatServer.

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::client::Envelope;
use crate::error::AppError;
use crate::message::{Command, Outbound};
use crate::server::ServerCommand;
use crate::session::{CloseReason, Session};
use crate::types::ClientId;

/// Maximum bytes taken from the stream per read
pub const READ_BUFFER_SIZE: usize = 1024;

/// Queued outbound messages per client before senders wait
const OUTBOUND_BUFFER_SIZE: usize = 32;

/// Handle a new connection
///
/// Registers the client, runs the receive loop until the peer leaves,
/// quits or fails, then deregisters so the others get a departure notice.
/// A failed read is reported as `AppError::Io` once teardown is done.
pub async fn handle_connection<S>(
    stream: S,
    peer: SocketAddr,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let mut session = Session::new(peer);
    let (mut reader, mut writer) = tokio::io::split(stream);

    // Create channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<Outbound>(OUTBOUND_BUFFER_SIZE);

    // Spawn write task (Outbound -> stream)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            if let Err(e) = writer.write_all(msg.render().as_bytes()).await {
                debug!("Write failed, ending write task: {}", e);
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    // Register with ChatServer
    let (reply_tx, reply_rx) = oneshot::channel();
    if cmd_tx
        .send(ServerCommand::Connect {
            client_id: session.id,
            addr: peer,
            sender: msg_tx,
            reply: reply_tx,
        })
        .await
        .is_err()
    {
        error!("Failed to register {} - server closed", peer);
        return Err(AppError::ChannelSend);
    }
    let joined = reply_rx.await.map_err(|_| AppError::ServerClosed)?;

    // Welcome and join notice go out before the session counts as active
    deliver_all(joined.envelopes).await;
    session.activate(joined.name);

    // Wait for either side to stop
    let reason = tokio::select! {
        reason = read_loop(&mut reader, session.id, &cmd_tx) => reason,
        _ = &mut write_task => CloseReason::WriterClosed,
    };
    let writer_done = matches!(reason, CloseReason::WriterClosed);
    session.close(&reason);

    // Deregistering drops the client's sender, which ends the write task
    let (reply_tx, reply_rx) = oneshot::channel();
    if cmd_tx
        .send(ServerCommand::Disconnect {
            client_id: session.id,
            reply: reply_tx,
        })
        .await
        .is_ok()
    {
        if let Ok(departure) = reply_rx.await {
            deliver_all(departure).await;
        }
    }
    if !writer_done {
        let _ = write_task.await;
    }

    session.finish();
    info!("Client {} disconnected ({})", session.display_name(), reason);

    match reason {
        CloseReason::ReadError(e) => Err(AppError::Io(e)),
        _ => Ok(()),
    }
}

/// Enqueue each envelope in order, skipping recipients that already left
pub(crate) async fn deliver_all(envelopes: Vec<Envelope>) {
    for envelope in envelopes {
        if envelope.deliver().await.is_err() {
            debug!("Recipient already closed, dropping message");
        }
    }
}

/// Read, parse and forward lines until the session should close
async fn read_loop<R>(
    reader: &mut R,
    client_id: ClientId,
    cmd_tx: &mpsc::Sender<ServerCommand>,
) -> CloseReason
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => return CloseReason::PeerClosed,
            Ok(n) => n,
            Err(e) => return CloseReason::ReadError(e),
        };

        let command = Command::parse(&String::from_utf8_lossy(&buf[..n]));
        if command == Command::Quit {
            return CloseReason::Quit;
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        if cmd_tx
            .send(ServerCommand::Dispatch {
                client_id,
                command,
                reply: reply_tx,
            })
            .await
            .is_err()
        {
            return CloseReason::ServerClosed;
        }
        match reply_rx.await {
            Ok(envelopes) => deliver_all(envelopes).await,
            Err(_) => return CloseReason::ServerClosed,
        }
    }
}
