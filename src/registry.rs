//! Registry of online clients
//!
//! Single source of truth for who is online. Owns the name counter and
//! the palette cursor so both advance together with each registration.
//! The registry performs no I/O; it lives inside the `ChatServer` actor,
//! which serializes every access.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::sync::mpsc;

use crate::client::Client;
use crate::message::Outbound;
use crate::types::{ClientId, Color};

/// Online clients keyed by connection, with a name index for lookups
#[derive(Debug)]
pub struct Registry {
    clients: HashMap<ClientId, Client>,
    names: HashMap<String, ClientId>,
    /// Next number used to mint `User<n>` names, starts at 1
    next_number: u64,
    /// Next palette position
    color_cursor: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
            names: HashMap::new(),
            next_number: 1,
            color_cursor: 0,
        }
    }

    /// Register a client under the next name and color
    ///
    /// Names are never reused, so the minted name cannot collide with a
    /// registered one. Returns the assigned name and color.
    pub fn add(
        &mut self,
        id: ClientId,
        addr: SocketAddr,
        sender: mpsc::Sender<Outbound>,
    ) -> (String, Color) {
        let number = self.next_number;
        self.next_number += 1;
        let name = format!("User{}", number);

        let color = Color::nth(self.color_cursor);
        self.color_cursor = (self.color_cursor + 1) % Color::COUNT;

        self.names.insert(name.clone(), id);
        self.clients.insert(
            id,
            Client {
                id,
                name: name.clone(),
                color,
                addr,
                number,
                sender,
            },
        );

        (name, color)
    }

    /// Remove a client, returning its record if it was registered
    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        let client = self.clients.remove(&id)?;
        self.names.remove(&client.name);
        Some(client)
    }

    /// Find a client by exact (case-sensitive) display name
    pub fn lookup(&self, name: &str) -> Option<&Client> {
        self.names.get(name).and_then(|id| self.clients.get(id))
    }

    /// Find a client by connection
    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Point-in-time list of `(id, name)` in registration order
    pub fn snapshot(&self) -> Vec<(ClientId, String)> {
        let mut clients: Vec<&Client> = self.clients.values().collect();
        clients.sort_by_key(|c| c.number);
        clients
            .into_iter()
            .map(|c| (c.id, c.name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
