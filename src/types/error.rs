use thiserror::Error;

/// storepulse error types
#[derive(Error, Debug)]
pub enum StorePulseError {
    /// A source has no credentials, identifiers or data location
    #[error("{source_name} source is not configured: {reason}")]
    Misconfigured {
        source_name: &'static str,
        reason: String,
    },

    /// A source call failed (network, remote or read error)
    #[error("failed to fetch {source_name} data: {message}")]
    Fetch {
        source_name: &'static str,
        message: String,
    },

    /// Failed to parse a token, query parameter or data file
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("config error: {0}")]
    Config(String),

    /// No order with this id at the commerce source
    #[error("order {0} not found")]
    OrderNotFound(u64),
}

impl StorePulseError {
    pub fn fetch(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::Fetch {
            source_name,
            message: message.into(),
        }
    }

    pub fn misconfigured(source_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Misconfigured {
            source_name,
            reason: reason.into(),
        }
    }

    /// "Not set up" as opposed to "temporarily down"
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, Self::Misconfigured { .. })
    }
}

/// Result type alias for storepulse
pub type Result<T> = std::result::Result<T, StorePulseError>;
