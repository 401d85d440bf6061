use std::fmt;

/// Errors surfaced to client code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    // Rejected locally, before any network I/O.
    NoGameInProgress,
    NotConnected,
    Transport(String),
    Protocol(String),
    // The server answered the command with an error.
    Command { code: String, message: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::NoGameInProgress => write!(f, "no game in progress"),
            ClientError::NotConnected => write!(f, "not connected to the town"),
            ClientError::Transport(detail) => write!(f, "transport error: {detail}"),
            ClientError::Protocol(detail) => write!(f, "protocol error: {detail}"),
            ClientError::Command { code, message } => write!(f, "{code}: {message}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Protocol(err.to_string())
    }
}
