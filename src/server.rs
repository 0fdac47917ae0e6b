//! ChatServer Actor implementation
//!
//! The central actor that owns all shared state: the registry of online
//! clients and the private conversation history. Every read and write of
//! that state happens inside this task, one command at a time.
//!
//! The actor never waits on a client's queue. It resolves each routing
//! decision into `Envelope`s and replies with them; the handler task that
//! sent the command performs the sends after the registry is released.

use std::net::SocketAddr;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::client::Envelope;
use crate::message::{Command, Outbound};
use crate::private_chat::PrivateChats;
use crate::registry::Registry;
use crate::router::{self, Delivery};
use crate::types::{ClientId, Color};

/// Registration result returned to the connecting handler
#[derive(Debug)]
pub struct Joined {
    pub name: String,
    pub color: Color,
    /// Welcome and help for the new client, join notice for the others
    pub envelopes: Vec<Envelope>,
}

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New client connected
    Connect {
        client_id: ClientId,
        addr: SocketAddr,
        sender: mpsc::Sender<Outbound>,
        reply: oneshot::Sender<Joined>,
    },
    /// Client sent a line; replies with the resulting deliveries
    Dispatch {
        client_id: ClientId,
        command: Command,
        reply: oneshot::Sender<Vec<Envelope>>,
    },
    /// Client disconnected; replies with the departure notices
    Disconnect {
        client_id: ClientId,
        reply: oneshot::Sender<Vec<Envelope>>,
    },
}

/// The main ChatServer actor
pub struct ChatServer {
    /// Online clients
    registry: Registry,
    /// Private conversations, kept for the process lifetime
    private_chats: PrivateChats,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            registry: Registry::new(),
            private_chats: PrivateChats::new(),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    ///
    /// A dropped reply means the handler is gone; its envelopes are
    /// discarded with it.
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                client_id,
                addr,
                sender,
                reply,
            } => {
                let _ = reply.send(self.handle_connect(client_id, addr, sender));
            }
            ServerCommand::Dispatch {
                client_id,
                command,
                reply,
            } => {
                let _ = reply.send(self.handle_dispatch(client_id, command));
            }
            ServerCommand::Disconnect { client_id, reply } => {
                let _ = reply.send(self.handle_disconnect(client_id));
            }
        }
    }

    /// Handle new client connection
    fn handle_connect(
        &mut self,
        client_id: ClientId,
        addr: SocketAddr,
        sender: mpsc::Sender<Outbound>,
    ) -> Joined {
        let (name, color) = self.registry.add(client_id, addr, sender);
        info!(
            "New connection: {} from {}. Total: {}",
            name,
            addr,
            self.registry.len()
        );

        let deliveries = router::announce_join(&self.registry, client_id);
        Joined {
            name,
            color,
            envelopes: self.address(deliveries),
        }
    }

    /// Handle one parsed line
    fn handle_dispatch(&mut self, client_id: ClientId, command: Command) -> Vec<Envelope> {
        debug!("Client {} sent {:?}", client_id, command);

        let timestamp = router::timestamp();
        let routing = router::route(&self.registry, client_id, command, &timestamp);

        if let Some(exchange) = routing.private {
            self.private_chats
                .record(&exchange.from, &exchange.to, &exchange.body, &timestamp);
            debug!(
                "Private message {} -> {} ({} messages in conversation, {} conversations)",
                exchange.from,
                exchange.to,
                self.private_chats.history(&exchange.from, &exchange.to).len(),
                self.private_chats.conversation_count()
            );
        }

        self.address(routing.deliveries)
    }

    /// Handle client disconnection
    ///
    /// Removing an unknown client is a no-op, so the departure notice is
    /// produced at most once per client.
    fn handle_disconnect(&mut self, client_id: ClientId) -> Vec<Envelope> {
        let Some(client) = self.registry.remove(client_id) else {
            return Vec::new();
        };

        info!(
            "Client {} ({}) disconnected. Total: {}",
            client.name,
            client.addr,
            self.registry.len()
        );

        let deliveries = router::announce_leave(&self.registry, &client.name);
        self.address(deliveries)
    }

    /// Helper: Resolve each delivery to its target's queue
    fn address(&self, deliveries: Vec<Delivery>) -> Vec<Envelope> {
        deliveries
            .into_iter()
            .filter_map(|Delivery { to, message }| {
                self.registry.get(to).map(|client| client.envelope(message))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::handler::deliver_all;

    struct TestClient {
        id: ClientId,
        name: String,
        rx: mpsc::Receiver<Outbound>,
    }

    impl TestClient {
        async fn next(&mut self) -> Outbound {
            timeout(Duration::from_secs(1), self.rx.recv())
                .await
                .expect("timed out waiting for message")
                .expect("channel closed")
        }

        fn drain(&mut self) -> Vec<Outbound> {
            let mut messages = Vec::new();
            while let Ok(msg) = self.rx.try_recv() {
                messages.push(msg);
            }
            messages
        }

        fn assert_idle(&mut self) {
            assert!(self.rx.try_recv().is_err(), "{} got unexpected message", self.name);
        }
    }

    fn spawn_server() -> mpsc::Sender<ServerCommand> {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        tokio::spawn(ChatServer::new(cmd_rx).run());
        cmd_tx
    }

    async fn connect(cmd_tx: &mpsc::Sender<ServerCommand>) -> TestClient {
        let (tx, mut rx) = mpsc::channel(32);
        let (reply, reply_rx) = oneshot::channel();
        let id = ClientId::new();
        cmd_tx
            .send(ServerCommand::Connect {
                client_id: id,
                addr: "127.0.0.1:50000".parse().unwrap(),
                sender: tx,
                reply,
            })
            .await
            .unwrap();
        let joined = reply_rx.await.unwrap();
        deliver_all(joined.envelopes).await;

        // welcome + help
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();
        TestClient {
            id,
            name: joined.name,
            rx,
        }
    }

    async fn dispatch(cmd_tx: &mpsc::Sender<ServerCommand>, client_id: ClientId, line: &str) {
        let (reply, reply_rx) = oneshot::channel();
        cmd_tx
            .send(ServerCommand::Dispatch {
                client_id,
                command: Command::parse(line),
                reply,
            })
            .await
            .unwrap();
        deliver_all(reply_rx.await.unwrap()).await;
    }

    async fn disconnect(cmd_tx: &mpsc::Sender<ServerCommand>, client_id: ClientId) {
        let (reply, reply_rx) = oneshot::channel();
        cmd_tx
            .send(ServerCommand::Disconnect { client_id, reply })
            .await
            .unwrap();
        deliver_all(reply_rx.await.unwrap()).await;
    }

    #[tokio::test]
    async fn test_join_notifies_existing_clients() {
        let cmd_tx = spawn_server();
        let mut first = connect(&cmd_tx).await;
        let mut second = connect(&cmd_tx).await;

        assert_eq!(first.name, "User1");
        assert_eq!(second.name, "User2");
        assert_eq!(first.next().await.text, "User2 joined the chat!");
        second.assert_idle();
    }

    #[test]
    fn test_private_message_recorded() {
        let (_cmd_tx, cmd_rx) = mpsc::channel(1);
        let mut server = ChatServer::new(cmd_rx);
        let mut ids = Vec::new();
        let mut _receivers = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = mpsc::channel(32);
            let id = ClientId::new();
            server.handle_connect(id, "127.0.0.1:50000".parse().unwrap(), tx);
            ids.push(id);
            _receivers.push(rx);
        }

        let envelopes = server.handle_dispatch(ids[1], Command::parse("#private User1 Hello there"));
        let texts: Vec<_> = envelopes.iter().map(|e| e.message.text.clone()).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("PRIVATE from User2: Hello there"));
        assert!(texts[1].contains("PRIVATE to User1: Hello there"));

        server.handle_dispatch(ids[0], Command::parse("#private User2 hi back"));
        server.handle_dispatch(ids[0], Command::parse("#private Ghost hello?"));

        let log = server.private_chats.history("User1", "User2");
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].from, "User2");
        assert_eq!(log[0].body, "Hello there");
        assert_eq!(log[1].from, "User1");
        assert_eq!(server.private_chats.conversation_count(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_announces_once() {
        let cmd_tx = spawn_server();
        let leaving = connect(&cmd_tx).await;
        let mut staying = connect(&cmd_tx).await;

        disconnect(&cmd_tx, leaving.id).await;
        disconnect(&cmd_tx, leaving.id).await;

        assert_eq!(staying.next().await.text, "User1 left the chat");
        staying.assert_idle();

        dispatch(&cmd_tx, staying.id, "#users").await;
        let users = staying.next().await.text;
        assert!(users.starts_with("Online users (1):"));
        assert!(!users.contains("User1"));
    }

    #[tokio::test]
    async fn test_broadcast_during_removal_is_all_or_nothing() {
        for _ in 0..20 {
            let cmd_tx = spawn_server();
            let mut leaving = connect(&cmd_tx).await;
            let mut speaker = connect(&cmd_tx).await;
            let mut watcher = connect(&cmd_tx).await;
            leaving.drain();
            speaker.drain();

            let removal = {
                let cmd_tx = cmd_tx.clone();
                let id = leaving.id;
                tokio::spawn(async move { disconnect(&cmd_tx, id).await })
            };
            let broadcast = {
                let cmd_tx = cmd_tx.clone();
                let id = speaker.id;
                tokio::spawn(async move { dispatch(&cmd_tx, id, "Hello all").await })
            };
            removal.await.unwrap();
            broadcast.await.unwrap();

            let got = leaving.drain();
            match got.as_slice() {
                [] => {}
                [msg] => assert!(msg.text.ends_with("User2: Hello all"), "partial message {:?}", msg),
                other => panic!("unexpected messages {:?}", other),
            }

            let seen = watcher.drain();
            let departures = seen
                .iter()
                .filter(|m| m.text == "User1 left the chat")
                .count();
            assert_eq!(departures, 1);
            assert!(seen.iter().any(|m| m.text.ends_with("User2: Hello all")));
            let _ = speaker.drain();
        }
    }

    #[tokio::test]
    async fn test_concurrent_connects_get_distinct_names() {
        let cmd_tx = spawn_server();
        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let cmd_tx = cmd_tx.clone();
                tokio::spawn(async move {
                    let (tx, _rx) = mpsc::channel(128);
                    let (reply, rx) = oneshot::channel();
                    cmd_tx
                        .send(ServerCommand::Connect {
                            client_id: ClientId::new(),
                            addr: "127.0.0.1:50000".parse().unwrap(),
                            sender: tx,
                            reply,
                        })
                        .await
                        .unwrap();
                    rx.await.unwrap().name
                })
            })
            .collect();

        let mut names = std::collections::HashSet::new();
        for task in tasks {
            assert!(names.insert(task.await.unwrap()));
        }
        assert_eq!(names.len(), 32);
    }
}
