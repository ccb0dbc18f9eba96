//! # Domain Watchdog Library
//!
//! Decides whether domain names are registered by querying WHOIS, parsing
//! the response and classifying the registry status codes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_watchdog_lib::DomainWatchdog;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let watchdog = DomainWatchdog::new();
//!     let classification = watchdog.check_domain("example.com").await?;
//!
//!     println!("example.com: {}", classification.outcome);
//!     Ok(())
//! }
//! ```
//!
//! The classifier is usable on its own:
//!
//! ```rust
//! use domain_watchdog_lib::{classify_parse_result, is_registered, Outcome, ParseOutcome};
//!
//! assert!(is_registered(&["clientTransferProhibited"]));
//! assert!(!is_registered(&["free"]));
//! assert_eq!(classify_parse_result(ParseOutcome::Reserved).outcome, Outcome::Reserved);
//! ```
//!
//! ## Features
//!
//! - **Status classification**: DENIC, ICANN EPP, IANA and generic markers
//! - **WHOIS transport**: TCP port 43 with IANA server discovery
//! - **Concurrent processing**: bounded parallel lookups
//! - **Configurable**: TOML files and `DW_*` environment variables

pub use checker::DomainWatchdog;
pub use classifier::{
    classify_parse_result, classify_transport_error, is_registered, matching_rule, rules,
    ClassificationRule, RegistryFamily,
};
pub use config::{
    load_env_config, parse_timeout_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
};
pub use error::{DomainWatchdogError, ParseError, TransportError};
pub use parser::{WhoisParser, WhoisTextParser};
pub use protocols::{builtin_whois_server, TcpWhoisClient, WhoisTransport};
pub use types::{CheckConfig, Classification, DomainReport, Outcome, ParseOutcome, WhoisRecord};
pub use utils::{normalize_domain, split_domain_list};

pub mod classifier;
pub mod parser;

mod checker;
mod config;
mod error;
mod protocols;
mod types;
mod utils;
