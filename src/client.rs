//! Client struct definition
//!
//! Represents a registered client with its display attributes and
//! outbound message channel, plus the `Envelope` used to hand a message
//! for that client to whichever task performs the send.

use std::net::SocketAddr;

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::Outbound;
use crate::types::{ClientId, Color};

/// Registered client information
///
/// All attributes are fixed at registration; only the registry creates
/// and drops these.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for this client
    pub id: ClientId,
    /// Assigned display name, unique among registered clients
    pub name: String,
    /// Assigned palette color for public messages
    pub color: Color,
    /// Remote address (informational)
    pub addr: SocketAddr,
    /// Registration order, used for stable listings
    pub number: u64,
    /// Server → Client message channel
    pub sender: mpsc::Sender<Outbound>,
}

impl Client {
    /// Address a message to this client without sending it yet
    pub fn envelope(&self, message: Outbound) -> Envelope {
        Envelope {
            sender: self.sender.clone(),
            message,
        }
    }
}

/// A message bound to one client's outbound queue
///
/// Built while the registry is read, delivered after it is released.
#[derive(Debug)]
pub struct Envelope {
    sender: mpsc::Sender<Outbound>,
    pub message: Outbound,
}

impl Envelope {
    /// Enqueue the message, waiting while the client's queue is full
    ///
    /// Returns an error if the channel is closed (client disconnected).
    pub async fn deliver(self) -> Result<(), SendError> {
        self.sender
            .send(self.message)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }
}
