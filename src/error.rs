//! Error types for the chat server
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (session termination) and
/// usage errors (send a readable message back to the client).
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal for the session)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// The server actor dropped a reply before answering
    #[error("Chat server closed")]
    ServerClosed,

    /// Private message target is not online
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// `#private` without both a name and a message
    #[error("Malformed private message")]
    PrivateUsage,
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
