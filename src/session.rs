//! Session lifecycle
//!
//! Tracks one connection through `Connecting → Active → Closing → Closed`.
//! Every exit path goes through `Closing`, which is where the handler
//! deregisters the client.

use std::fmt;
use std::io;
use std::net::SocketAddr;

use tracing::debug;

use crate::types::ClientId;

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closing,
    Closed,
}

/// Why a session left the `Active` state
#[derive(Debug)]
pub enum CloseReason {
    /// Peer closed its side (zero-byte read)
    PeerClosed,
    /// Client sent `quit`
    Quit,
    /// Receive path failed
    ReadError(io::Error),
    /// Outbound writer stopped (write failed)
    WriterClosed,
    /// Chat server actor is gone
    ServerClosed,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerClosed => write!(f, "peer closed"),
            CloseReason::Quit => write!(f, "quit"),
            CloseReason::ReadError(e) => write!(f, "read error: {}", e),
            CloseReason::WriterClosed => write!(f, "writer closed"),
            CloseReason::ServerClosed => write!(f, "server closed"),
        }
    }
}

/// One connection's identity and lifecycle state
#[derive(Debug)]
pub struct Session {
    pub id: ClientId,
    pub peer: SocketAddr,
    /// Assigned display name once active
    pub name: Option<String>,
    state: SessionState,
}

impl Session {
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            id: ClientId::new(),
            peer,
            name: None,
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Registration finished
    pub fn activate(&mut self, name: String) {
        debug_assert_eq!(self.state, SessionState::Connecting);
        debug!("Session {} active as {}", self.id, name);
        self.name = Some(name);
        self.state = SessionState::Active;
    }

    /// Start tearing down; a no-op once already closing
    pub fn close(&mut self, reason: &CloseReason) {
        if matches!(self.state, SessionState::Closing | SessionState::Closed) {
            return;
        }
        debug!("Session {} closing: {}", self.display_name(), reason);
        self.state = SessionState::Closing;
    }

    /// Teardown complete
    pub fn finish(&mut self) {
        debug_assert_eq!(self.state, SessionState::Closing);
        self.state = SessionState::Closed;
    }

    /// Name if assigned, otherwise the peer address
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.peer.to_string(),
        }
    }
}
