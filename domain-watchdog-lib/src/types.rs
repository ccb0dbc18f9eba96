//! Core data types for domain status lookups.
//!
//! This module defines the classification outcome, the structured WHOIS
//! record, the closed set of parser results, and the per-domain report and
//! configuration used by the checker.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Registration status of a domain as decided by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Status tokens show the domain is actively held by someone
    Registered,

    /// The registry has no record of the domain
    NotFound,

    /// The name is reserved and not open for public registration
    Reserved,

    /// The domain can only be registered at a premium price
    Premium,

    /// The domain is blocked, e.g. by a brand-protection mechanism
    Blocked,

    /// None of the above matched
    Unknown,
}

impl Outcome {
    /// Whether the domain is taken.
    pub fn is_registered(&self) -> bool {
        matches!(self, Outcome::Registered)
    }

    /// Human-readable description, also used for log lines.
    pub fn description(&self) -> &'static str {
        match self {
            Outcome::Registered => "domain is given",
            Outcome::NotFound => "domain not found",
            Outcome::Reserved => "domain is reserved to register",
            Outcome::Premium => "domain is available at premium price",
            Outcome::Blocked => "domain is blocked due to brand protection",
            Outcome::Unknown => "status is unknown",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Structured data extracted from a WHOIS response.
///
/// Dates are kept as the registry printed them; registries disagree on
/// date formats and nothing downstream needs them parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisRecord {
    /// Domain name as reported by the registry
    pub domain_name: String,

    /// Sponsoring registrar, when the registry publishes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,

    /// Raw registry status tokens (e.g. "ok", "clientTransferProhibited")
    pub status: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Nameservers associated with the domain
    pub name_servers: Vec<String>,
}

impl WhoisRecord {
    /// Create a record carrying only status tokens.
    pub fn with_status<I, S>(status: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: status.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// Everything a WHOIS parser can report for one response.
///
/// The four named conditions are definite answers from the registry, not
/// failures; only [`ParseOutcome::Failed`] means the response could not be
/// interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// The response described a domain record
    Parsed(WhoisRecord),

    /// The registry reported that the domain does not exist
    NotFound,

    /// The registry reported that the name is reserved
    Reserved,

    /// The registry reported premium-only availability
    Premium,

    /// The registry reported the name as blocked
    Blocked,

    /// The response could not be interpreted
    Failed(ParseError),
}

/// Result of classifying one parser outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// The decided outcome; always present
    pub outcome: Outcome,

    /// Parser failure behind an `Unknown` outcome, passed through unchanged
    pub cause: Option<ParseError>,
}

impl Classification {
    /// A classification with no underlying failure.
    pub fn certain(outcome: Outcome) -> Self {
        Self {
            outcome,
            cause: None,
        }
    }
}

/// Per-domain result of a batch check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainReport {
    /// The domain name that was checked (e.g., "example.com")
    pub domain: String,

    /// Decided outcome. `None` when the lookup failed before classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,

    /// Transport, validation or parser error, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// How long the lookup took, in milliseconds
    pub duration_ms: u64,
}

impl DomainReport {
    /// Whether this report carries an error of any kind.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Configuration options for domain lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    /// Maximum number of concurrent lookups
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// Timeout applied to each network step of a WHOIS query
    /// Default: 10 seconds
    pub timeout: Duration,

    /// TLD -> WHOIS server overrides from config files
    /// Default: empty
    pub servers: HashMap<String, String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            timeout: Duration::from_secs(10),
            servers: HashMap::new(),
        }
    }
}

impl CheckConfig {
    /// Set concurrency, clamped to 1..=100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set the per-step network timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pin the WHOIS server used for a TLD.
    pub fn with_server<T: Into<String>, S: Into<String>>(mut self, tld: T, server: S) -> Self {
        self.servers
            .insert(tld.into().to_lowercase(), server.into());
        self
    }
}
