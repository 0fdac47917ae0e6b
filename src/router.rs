//! Message routing
//!
//! Turns a parsed `Command` from one client into the list of deliveries it
//! causes. Routing only reads the registry; the caller performs the sends.

use chrono::Local;

use crate::error::AppError;
use crate::message::{Command, Outbound, HELP_TEXT};
use crate::registry::Registry;
use crate::types::{ClientId, Color};

/// One message addressed to one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: ClientId,
    pub message: Outbound,
}

impl Delivery {
    fn new(to: ClientId, message: Outbound) -> Self {
        Self { to, message }
    }
}

/// A private message that reached its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateExchange {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// Result of routing one command
#[derive(Debug, Default)]
pub struct Routing {
    pub deliveries: Vec<Delivery>,
    /// Set when a private message should be appended to history
    pub private: Option<PrivateExchange>,
}

/// Current local time as `HH:MM:SS`
pub fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Route a command sent by `source`
///
/// Commands from a client that is no longer registered produce nothing.
pub fn route(registry: &Registry, source: ClientId, command: Command, timestamp: &str) -> Routing {
    let Some(sender) = registry.get(source) else {
        return Routing::default();
    };

    match command {
        Command::Users => {
            let snapshot = registry.snapshot();
            let mut text = format!("Online users ({}):\n", snapshot.len());
            for (id, name) in &snapshot {
                let marker = if *id == source { " (you)" } else { "" };
                text.push_str(&format!("  {}{}\n", name, marker));
            }
            reply(source, Outbound::plain(text))
        }
        Command::Private { target, body } => {
            let Some(recipient) = registry.lookup(&target) else {
                return reply(source, AppError::UserNotFound(target).into());
            };
            let to_target = format!("[{}] PRIVATE from {}: {}", timestamp, sender.name, body);
            let to_source = format!("[{}] PRIVATE to {}: {}", timestamp, recipient.name, body);
            Routing {
                deliveries: vec![
                    Delivery::new(recipient.id, Outbound::colored(to_target, Color::MAGENTA)),
                    Delivery::new(source, Outbound::colored(to_source, Color::MAGENTA)),
                ],
                private: Some(PrivateExchange {
                    from: sender.name.clone(),
                    to: recipient.name.clone(),
                    body,
                }),
            }
        }
        Command::PrivateUsage => reply(source, AppError::PrivateUsage.into()),
        Command::Help => reply(source, help()),
        // Departure is announced when the session closes
        Command::Quit => Routing::default(),
        Command::Public(text) => {
            let line = format!("[{}] {}: {}", timestamp, sender.name, text);
            Routing {
                deliveries: others(registry, source, &Outbound::colored(line, sender.color)),
                private: None,
            }
        }
    }
}

/// Welcome, help and join notice for a freshly registered client
pub fn announce_join(registry: &Registry, id: ClientId) -> Vec<Delivery> {
    let Some(client) = registry.get(id) else {
        return Vec::new();
    };

    let welcome = format!(
        "Welcome {}! Your color: {}",
        client.name,
        client.color.paint("This text is colored")
    );
    let mut deliveries = vec![
        Delivery::new(id, Outbound::plain(welcome)),
        Delivery::new(id, help()),
    ];
    let joined = Outbound::colored(format!("{} joined the chat!", client.name), Color::GREEN);
    deliveries.extend(others(registry, id, &joined));
    deliveries
}

/// Departure notice for everyone still registered
///
/// Call after the departing client has been removed.
pub fn announce_leave(registry: &Registry, name: &str) -> Vec<Delivery> {
    let left = Outbound::colored(format!("{} left the chat", name), Color::YELLOW);
    registry
        .snapshot()
        .into_iter()
        .map(|(id, _)| Delivery::new(id, left.clone()))
        .collect()
}

fn help() -> Outbound {
    Outbound::colored(HELP_TEXT, Color::BLUE)
}

fn reply(to: ClientId, message: Outbound) -> Routing {
    Routing {
        deliveries: vec![Delivery::new(to, message)],
        private: None,
    }
}

fn others(registry: &Registry, except: ClientId, message: &Outbound) -> Vec<Delivery> {
    registry
        .snapshot()
        .into_iter()
        .filter(|(id, _)| *id != except)
        .map(|(id, _)| Delivery::new(id, message.clone()))
        .collect()
}
