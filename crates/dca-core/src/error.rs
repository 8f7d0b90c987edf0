//! Error Types for the DCA bot

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DcaError>;

#[derive(Error, Debug)]
pub enum DcaError {
    /// Required setting missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Calculator preconditions violated
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Market data missing or ambiguous for the instrument
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Network failure or timeout talking to the exchange
    #[error("Transport error: {message}")]
    Transport { message: String, timeout: bool },

    /// Response body not JSON or missing expected fields
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DcaError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timeout: true,
        }
    }

    /// A later run may succeed without any change on our side.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether the run must be reported as failed.
    ///
    /// `DataUnavailable` is a business outcome (skip this run), not a fault.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::DataUnavailable(_))
    }
}

impl From<serde_json::Error> for DcaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
