//! Multi-user TCP Chat Server Library
//!
//! A small text chat service built on tokio. Clients connect over TCP,
//! send plain-text commands or free text, and the server broadcasts public
//! messages or routes private ones between two named users.
//!
//! # Commands
//! - `#users` - list online users
//! - `#private <name> <message>` - private message
//! - `#help` - command overview
//! - `quit` - leave the chat
//! - anything else - public message to everyone else
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the `Registry` and the
//!   private chat history
//! - Each connection has a `handler` task plus a writer task draining the
//!   client's outbound queue
//! - `router` decides who receives what; it only reads registry state
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use private_chat_server::serve_until_ctrl_c;
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     serve_until_ctrl_c(listener).await;
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod listener;
pub mod message;
pub mod private_chat;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use client::{Client, Envelope};
pub use config::Config;
pub use error::{AppError, SendError};
pub use handler::handle_connection;
pub use listener::{serve, serve_until_ctrl_c};
pub use message::{Command, Outbound};
pub use private_chat::{PrivateChats, PrivateEntry};
pub use registry::Registry;
pub use server::{ChatServer, Joined, ServerCommand};
pub use session::{CloseReason, Session, SessionState};
pub use types::{ClientId, Color};
