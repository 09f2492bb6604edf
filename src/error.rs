//! Link error types with retry classification.
//!
//! [`LinkError`] is the central error type for the console bridge. Every
//! variant except [`LinkError::Config`] is recovered by the reconnect loop;
//! the variant only decides how the failure is reported.

use tokio_tungstenite::tungstenite;

/// Errors raised while configuring, connecting, or running a session.
///
/// # Recovery
///
/// | Variant     | Raised by               | Recovery            |
/// |-------------|-------------------------|---------------------|
/// | `Config`    | startup validation      | fatal, process exit |
/// | `Connect`   | TCP connect / DNS       | backoff + retry     |
/// | `Handshake` | URI / HTTP upgrade      | backoff + retry     |
/// | `Transport` | socket I/O mid-session  | backoff + retry     |
/// | `Protocol`  | WebSocket framing       | backoff + retry     |
/// | `Frame`     | command encoding        | backoff + retry     |
/// | `Console`   | reading standard input  | backoff + retry     |
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Configuration is unusable; nothing can be retried.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The endpoint could not be reached (refused, unreachable, DNS).
    #[error("{0}")]
    Connect(String),

    /// The endpoint answered but the WebSocket upgrade failed.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The established connection failed at the I/O level.
    #[error("{0}")]
    Transport(String),

    /// The peer violated the WebSocket protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A command line could not be encoded for the wire.
    #[error("framing failed: {0}")]
    Frame(String),

    /// Standard input could not be read.
    #[error("console read failed: {0}")]
    Console(#[source] std::io::Error),
}

impl LinkError {
    /// Returns `true` if the error must stop the process instead of
    /// triggering a reconnect.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns `true` for handshake, protocol, and framing failures as
    /// opposed to plain I/O failures.
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(self, Self::Handshake(_) | Self::Protocol(_) | Self::Frame(_))
    }
}

impl From<tungstenite::Error> for LinkError {
    fn from(err: tungstenite::Error) -> Self {
        use tungstenite::Error as WsError;
        use tungstenite::error::ProtocolError;

        let detail = err.to_string();
        match err {
            WsError::Io(_)
            | WsError::ConnectionClosed
            | WsError::AlreadyClosed
            | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
                Self::Transport(detail)
            }
            WsError::Url(_) | WsError::Http(_) | WsError::HttpFormat(_) => Self::Handshake(detail),
            _ => Self::Protocol(detail),
        }
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Frame(err.to_string())
    }
}
