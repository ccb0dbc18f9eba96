//! Protocol implementations for domain lookups.
//!
//! This module contains the WHOIS transport and the TLD to WHOIS server
//! resolution it relies on.

/// WHOIS transport over TCP port 43
pub mod whois;

/// TLD to WHOIS server mappings and IANA discovery
pub mod servers;

pub use servers::{builtin_whois_server, parse_iana_refer_response};
pub use whois::{TcpWhoisClient, WhoisTransport};
