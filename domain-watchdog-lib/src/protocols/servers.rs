//! WHOIS server resolution for TLDs.
//!
//! Servers come from a built-in table of common registries or are discovered
//! through IANA (`whois.iana.org`). Discovered servers are cached for the
//! lifetime of the process; lookup results are never cached.

use crate::error::DomainWatchdogError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Root WHOIS server used to discover the authoritative server for a TLD.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

/// Well-known registry WHOIS servers, so common TLDs skip IANA discovery.
const BUILTIN_SERVERS: &[(&str, &str)] = &[
    ("ai", "whois.nic.ai"),
    ("app", "whois.nic.google"),
    ("at", "whois.nic.at"),
    ("be", "whois.dns.be"),
    ("ch", "whois.nic.ch"),
    ("co", "whois.nic.co"),
    ("com", "whois.verisign-grs.com"),
    ("de", "whois.denic.de"),
    ("dev", "whois.nic.google"),
    ("dk", "whois.dk-hostmaster.dk"),
    ("eu", "whois.eu"),
    ("fr", "whois.nic.fr"),
    ("io", "whois.nic.io"),
    ("it", "whois.nic.it"),
    ("net", "whois.verisign-grs.com"),
    ("nl", "whois.domain-registry.nl"),
    ("org", "whois.publicinterestregistry.org"),
    ("se", "whois.iis.se"),
    ("uk", "whois.nic.uk"),
];

lazy_static::lazy_static! {
    // TLD -> server discovered via IANA. An empty string marks a TLD that
    // IANA has no server for.
    static ref WHOIS_SERVER_CACHE: Mutex<HashMap<String, String>> = Mutex::new(HashMap::new());
}

/// Built-in WHOIS server for a TLD, if any.
pub fn builtin_whois_server(tld: &str) -> Option<&'static str> {
    let tld = tld.to_lowercase();
    BUILTIN_SERVERS
        .iter()
        .find(|(known, _)| *known == tld)
        .map(|(_, server)| *server)
}

/// Cache a discovered WHOIS server for a TLD. An empty `server` records
/// that none exists.
pub fn cache_whois_server(tld: &str, server: &str) -> Result<(), DomainWatchdogError> {
    let mut cache = WHOIS_SERVER_CACHE.lock().map_err(|_| {
        DomainWatchdogError::internal("Failed to acquire whois server cache lock for writing")
    })?;

    cache.insert(tld.to_lowercase(), server.to_string());
    Ok(())
}

/// Look up a previously discovered WHOIS server for a TLD.
pub fn get_cached_whois_server(tld: &str) -> Option<String> {
    let cache = WHOIS_SERVER_CACHE.lock().ok()?;
    let server = cache.get(&tld.to_lowercase())?;
    if server.is_empty() {
        None
    } else {
        Some(server.clone())
    }
}

/// Whether IANA was already asked and had no server for the TLD.
pub fn is_whois_negatively_cached(tld: &str) -> bool {
    match WHOIS_SERVER_CACHE.lock() {
        Ok(cache) => matches!(cache.get(&tld.to_lowercase()), Some(s) if s.is_empty()),
        Err(_) => false,
    }
}

/// Parse an IANA WHOIS response for the authoritative WHOIS server.
///
/// IANA uses either `refer:` or `whois:`; `refer:` wins when both exist.
///
/// ```text
/// refer:        whois.verisign-grs.com
/// whois:        whois.verisign-grs.com
/// ```
pub fn parse_iana_refer_response(response: &str) -> Option<String> {
    let mut whois_server = None;

    for line in response.lines() {
        let line = line.trim();
        if let Some(server) = line.strip_prefix("refer:") {
            let server = server.trim();
            if !server.is_empty() {
                return Some(server.to_string());
            }
        } else if let Some(server) = line.strip_prefix("whois:") {
            let server = server.trim();
            if !server.is_empty() {
                whois_server = Some(server.to_string());
            }
        }
    }

    whois_server
}

/// Build the query line for a server.
///
/// Some registries need flags to return the status field at all.
pub fn build_query(server: &str, domain: &str) -> String {
    match server {
        "whois.denic.de" => format!("-T dn,ace {}", domain),
        "whois.dk-hostmaster.dk" => format!("--show-handles {}", domain),
        _ => domain.to_string(),
    }
}
