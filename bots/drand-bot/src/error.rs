use std::time::Duration;

use thiserror::Error;

/// Failure to obtain a beacon from the drand network. Always transient from
/// the bot's point of view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("beacon endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("beacon request timed out after {0:?}")]
    Timeout(Duration),

    #[error("round {round} is not available yet")]
    NotAvailable { round: u64 },

    #[error("malformed beacon for round {round}: {reason}")]
    Malformed { round: u64, reason: String },
}

/// Why the registry refused an execute message, recovered from the contract
/// error text the chain reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("invalid beacon: {0}")]
    InvalidBeacon(String),

    #[error("already registered")]
    AlreadyRegistered,

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Other(String),
}

impl Rejection {
    pub fn classify(message: &str) -> Self {
        const INVALID_BEACON: &str = "invalid beacon:";
        let lower = message.to_lowercase();
        if let Some(pos) = message.find(INVALID_BEACON) {
            let reason = message[pos + INVALID_BEACON.len()..].trim();
            Rejection::InvalidBeacon(reason.to_string())
        } else if lower.contains("already registered") {
            Rejection::AlreadyRegistered
        } else if lower.contains("unauthorized") {
            Rejection::Unauthorized
        } else {
            Rejection::Other(message.to_string())
        }
    }
}

/// Errors talking to the host chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("chain transport error: {0}")]
    Transport(String),

    #[error("chain request timed out after {0:?}")]
    Timeout(Duration),

    #[error("rejected by registry: {0}")]
    Rejected(Rejection),

    #[error("unexpected registry response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Timeout(_))
    }
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("failed to connect to registry {address}: {reason}")]
    Connect { address: String, reason: String },

    #[error("bot is already registered")]
    AlreadyRegistered,

    #[error("bot is not registered")]
    NotRegistered,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("registry rejected beacon for round {round}: {reason}")]
    RejectedBeacon { round: u64, reason: String },

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl BotError {
    /// Whether the same operation may succeed if tried again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            BotError::Fetch(_) => true,
            BotError::Client(e) => e.is_retryable(),
            BotError::Connect { .. }
            | BotError::AlreadyRegistered
            | BotError::NotRegistered
            | BotError::RejectedBeacon { .. } => false,
        }
    }

    /// Whether the relay loop must stop. Everything else, including chain
    /// errors the registry did not raise, is waited out.
    pub fn halts(&self) -> bool {
        matches!(
            self,
            BotError::RejectedBeacon { .. } | BotError::NotRegistered
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
