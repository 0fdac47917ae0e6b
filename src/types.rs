//! Basic type definitions for the chat server
//!
//! Provides small value types shared across modules:
//! - `ClientId`: UUID-based unique connection identifier
//! - `Color`: index into the fixed ANSI palette

use uuid::Uuid;

/// Unique client identifier (newtype pattern)
///
/// Wraps a UUID v4 so a live connection handle is never reused.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ANSI escape that ends a colored run of text
pub const RESET: &str = "\x1b[0m";

const PALETTE: [&str; 6] = [
    "\x1b[91m", "\x1b[92m", "\x1b[93m", "\x1b[94m", "\x1b[95m", "\x1b[96m",
];

/// Display color (position in the ANSI palette)
///
/// User colors are handed out round-robin with [`Color::nth`]; system
/// messages use the named constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(usize);

impl Color {
    pub const RED: Color = Color(0);
    pub const GREEN: Color = Color(1);
    pub const YELLOW: Color = Color(2);
    pub const BLUE: Color = Color(3);
    pub const MAGENTA: Color = Color(4);
    pub const CYAN: Color = Color(5);

    /// Number of distinct palette entries
    pub const COUNT: usize = PALETTE.len();

    /// Palette entry for a cursor value, wrapping past the end
    pub fn nth(cursor: usize) -> Self {
        Self(cursor % Self::COUNT)
    }

    /// ANSI escape sequence that starts this color
    pub fn code(self) -> &'static str {
        PALETTE[self.0]
    }

    /// Wrap text in this color's escape prefix and the reset suffix
    pub fn paint(self, text: &str) -> String {
        format!("{}{}{}", self.code(), text, RESET)
    }
}
