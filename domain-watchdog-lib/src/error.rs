//! Error handling for domain status lookups.
//!
//! Three layers of failure are kept apart here: the WHOIS transport
//! ([`TransportError`]), the WHOIS text parser ([`ParseError`]) and the
//! library-level [`DomainWatchdogError`] returned from the public API.

use std::fmt;
use std::time::Duration;

/// Main error type for domain watchdog operations.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainWatchdogError {
    /// Invalid domain name format
    InvalidDomain { domain: String, reason: String },

    /// The WHOIS query itself failed. No outcome exists for the domain.
    WhoisQuery { source: TransportError },

    /// Configuration errors (invalid settings, malformed TOML, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading configuration
    FileError { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl DomainWatchdogError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from the WHOIS transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::WhoisQuery { .. })
    }
}

impl fmt::Display for DomainWatchdogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::WhoisQuery { source } => write!(f, "whois query error: {}", source),
            Self::ConfigError { message } => write!(f, "Configuration error: {}", message),
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for DomainWatchdogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::WhoisQuery { source } => Some(source),
            _ => None,
        }
    }
}

/// Failure of the WHOIS transport: the query never produced response text.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// No WHOIS server is known or discoverable for the TLD
    ServerNotFound { tld: String },

    /// TCP connection to the WHOIS server failed
    Connect { server: String, message: String },

    /// Sending the query or reading the response failed
    Io { server: String, message: String },

    /// The server did not answer within the configured timeout
    Timeout { server: String, duration: Duration },

    /// The response exceeded the size limit
    ResponseTooLarge { server: String, limit: usize },

    /// Any other transport failure
    Other { message: String },
}

impl TransportError {
    /// Create a transport error from a plain message.
    pub fn other<M: Into<String>>(message: M) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Create a new I/O error for a server.
    pub fn io<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::Io {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error for a server.
    pub fn timeout<S: Into<String>>(server: S, duration: Duration) -> Self {
        Self::Timeout {
            server: server.into(),
            duration,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerNotFound { tld } => {
                write!(f, "no whois server known for TLD '{}'", tld)
            }
            Self::Connect { server, message } => {
                write!(f, "failed to connect to {}: {}", server, message)
            }
            Self::Io { server, message } => write!(f, "{}: {}", server, message),
            Self::Timeout { server, duration } => {
                write!(f, "{} timed out after {:?}", server, duration)
            }
            Self::ResponseTooLarge { server, limit } => {
                write!(f, "response from {} exceeds {} bytes", server, limit)
            }
            Self::Other { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for TransportError {}

/// The parser could not interpret a WHOIS response.
///
/// This is distinct from the not-found/reserved/premium/blocked conditions,
/// which are definite answers and live in [`crate::ParseOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new<M: Into<String>>(message: M) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<toml::de::Error> for DomainWatchdogError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
