//! Message protocol definitions
//!
//! Plain-text protocol: every line a client sends is parsed into a closed
//! set of `Command` variants, and everything the server sends back is an
//! `Outbound` text optionally wrapped in an ANSI color.

use crate::error::AppError;
use crate::types::Color;

/// Static command overview sent on join and on `#help`
pub const HELP_TEXT: &str = "\nAvailable commands:\n\
#users - Show online users\n\
#private <username> <message> - Send private message\n\
#help - Show this help\n\
quit - Exit chat\n";

/// Client → Server command
///
/// Parsed from one received line. Anything that is not a recognised
/// command keyword is a public message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List online users
    Users,
    /// Private message to a named user
    Private { target: String, body: String },
    /// `#private` without a name and a message
    PrivateUsage,
    /// Show the command overview
    Help,
    /// Leave the chat
    Quit,
    /// Broadcast to everyone else
    Public(String),
}

impl Command {
    /// Parse one received line
    ///
    /// The line is trimmed first. `#users`, `#help` and `quit` must be the
    /// whole line; `#private` is matched on its first token and split into
    /// at most three parts so the message keeps its spaces.
    pub fn parse(raw: &str) -> Self {
        let line = raw.trim();

        if line.eq_ignore_ascii_case("#users") {
            return Command::Users;
        }
        if line.eq_ignore_ascii_case("#help") {
            return Command::Help;
        }
        if line.eq_ignore_ascii_case("quit") {
            return Command::Quit;
        }

        let mut parts = line.splitn(3, ' ');
        let keyword = parts.next().unwrap_or_default();
        if keyword.eq_ignore_ascii_case("#private") {
            return match (parts.next(), parts.next()) {
                (Some(target), Some(body)) => Command::Private {
                    target: target.to_string(),
                    body: body.to_string(),
                },
                _ => Command::PrivateUsage,
            };
        }

        Command::Public(line.to_string())
    }
}

/// Server → Client message
///
/// One discrete write on the client's stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub text: String,
    pub color: Option<Color>,
}

impl Outbound {
    /// Uncolored message
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    /// Message wrapped in a palette color
    pub fn colored(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }

    /// Wire form of the message
    pub fn render(&self) -> String {
        match self.color {
            Some(color) => color.paint(&self.text),
            None => self.text.clone(),
        }
    }
}

/// Convert AppError to Outbound for client notification
impl From<AppError> for Outbound {
    fn from(err: AppError) -> Self {
        let text = match &err {
            AppError::UserNotFound(name) => format!("User '{}' not found or offline", name),
            AppError::PrivateUsage => "Usage: #private <username> <message>".to_string(),
            // Fatal errors are not typically converted (session closes)
            _ => "Internal error".to_string(),
        };
        Outbound::colored(text, Color::RED)
    }
}
