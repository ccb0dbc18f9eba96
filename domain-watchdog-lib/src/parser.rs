//! WHOIS response parsing.
//!
//! Turns the free-text answer of a WHOIS server into a [`ParseOutcome`]:
//! either a [`WhoisRecord`] or one of the registry conditions (not found,
//! reserved, premium, blocked). Responses without a domain record are
//! inspected for those conditions by keyword.

use crate::error::ParseError;
use crate::types::{ParseOutcome, WhoisRecord};
use regex::Regex;

/// Turns raw WHOIS text into a [`ParseOutcome`].
pub trait WhoisParser: Send + Sync {
    fn parse(&self, raw: &str) -> ParseOutcome;
}

const NOT_FOUND_PATTERNS: &[&str] = &[
    "no match",
    "not found",
    "no found",
    "no data found",
    "no entries found",
    "no matching record",
    "no matching entry",
    "no object found",
    "object does not exist",
    "the queried object does not exist",
    "not registered",
    "has not been registered",
    "status: free",
    "status: available",
    "domain available",
    "is available for registration",
];

const BLOCKED_PATTERNS: &[&str] = &[
    "the domain has been blocked",
    "blocked by dpml",
    "brand protection",
    "domain is blocked",
];

const PREMIUM_PATTERNS: &[&str] = &[
    "premium domain",
    "available at premium price",
    "this is a premium name",
];

const RESERVED_PATTERNS: &[&str] = &[
    "reserved domain name",
    "reserved by the registry",
    "domain is reserved",
    "name is reserved",
    "status: reserved",
    "prohibited string",
];

const LIMIT_PATTERNS: &[&str] = &[
    "limit exceeded",
    "quota exceeded",
    "too many requests",
    "rate limit",
    "try again later",
];

lazy_static::lazy_static! {
    static ref DOMAIN_NAME: Regex = field(r"domain(?: name)?|domainname");
    static ref REGISTRAR: Regex = field(r"registrar(?: name)?|sponsoring registrar");
    static ref STATUS: Regex = field(r"(?:domain )?status|state");
    static ref CREATED: Regex = field(r"creation date|created(?: on| date)?|registered(?: on)?|registration date");
    static ref UPDATED: Regex = field(r"updated date|last updated(?: on)?|changed|last modified|modified");
    static ref EXPIRES: Regex = field(r"(?:registry )?expir(?:y|ation) date|expires(?: on)?|paid-till");
    static ref NAME_SERVER: Regex = field(r"name ?servers?|nserver");
    static ref SECTION_HEADER: Regex = Regex::new(r"^([A-Za-z][A-Za-z /-]*):$")
        .unwrap_or_else(|e| panic!("invalid whois section pattern: {}", e));
}

/// Build a line-anchored, case-insensitive `key: value` matcher.
fn field(keys: &str) -> Regex {
    let pattern = format!(r"(?im)^[ \t]*(?:{})[ \t]*:[ \t]*(\S[^\r\n]*)", keys);
    Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid whois field pattern: {}", e))
}

/// Default parser for the common `Key: Value` WHOIS layout.
///
/// DENIC, ICANN thick/thin registries and IANA all use this layout closely
/// enough for status extraction. Responses with no inline domain name are
/// retried as a section layout (Nominet), where each value sits on the
/// lines below its key.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhoisTextParser;

impl WhoisTextParser {
    pub fn new() -> Self {
        Self
    }
}

impl WhoisParser for WhoisTextParser {
    fn parse(&self, raw: &str) -> ParseOutcome {
        if raw.trim().is_empty() {
            return ParseOutcome::Failed(ParseError::new("whois response is empty"));
        }

        let Some(domain_name) = first_value(&DOMAIN_NAME, raw) else {
            return parse_sections(raw).unwrap_or_else(|| classify_missing_record(raw));
        };

        ParseOutcome::Parsed(WhoisRecord {
            domain_name: domain_name.to_lowercase(),
            registrar: first_value(&REGISTRAR, raw),
            status: extract_status(raw),
            creation_date: first_value(&CREATED, raw),
            updated_date: first_value(&UPDATED, raw),
            expiration_date: first_value(&EXPIRES, raw),
            name_servers: extract_name_servers(raw),
        })
    }
}

/// Decide which registry condition a record-less response describes.
fn classify_missing_record(raw: &str) -> ParseOutcome {
    let lower = raw.to_lowercase();
    let contains_any = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));

    if contains_any(NOT_FOUND_PATTERNS) {
        ParseOutcome::NotFound
    } else if contains_any(BLOCKED_PATTERNS) {
        ParseOutcome::Blocked
    } else if contains_any(PREMIUM_PATTERNS) {
        ParseOutcome::Premium
    } else if contains_any(RESERVED_PATTERNS) {
        ParseOutcome::Reserved
    } else if contains_any(LIMIT_PATTERNS) {
        ParseOutcome::Failed(ParseError::new("whois query limit exceeded"))
    } else {
        ParseOutcome::Failed(ParseError::new("whois response contains no domain data"))
    }
}

/// Parse the section layout used by Nominet for `.uk`:
///
/// ```text
///     Domain name:
///         example.co.uk
///
///     Registration status:
///         Registered until expiry date.
/// ```
///
/// Returns `None` when there is no `Domain name:` section.
fn parse_sections(raw: &str) -> Option<ParseOutcome> {
    let sections = collect_sections(raw);
    let first = |key: &str| section_values(&sections, key).next().cloned();

    let domain_name = first("domain name")?;

    let mut status: Vec<String> = Vec::new();
    let tokens = section_values(&sections, "registration status")
        .filter_map(|value| section_status_token(value));
    for token in tokens {
        if !status.contains(&token) {
            status.push(token);
        }
    }

    let name_servers = section_values(&sections, "name servers")
        .filter_map(|v| v.split_whitespace().next())
        .map(|host| host.trim_end_matches('.').to_lowercase())
        .filter(|host| host.contains('.'))
        .collect();

    Some(ParseOutcome::Parsed(WhoisRecord {
        domain_name: domain_name.to_lowercase(),
        registrar: first("registrar"),
        status,
        // Newer Nominet output nests the dates as `Key: value` lines.
        creation_date: first("registration date").or_else(|| first_value(&CREATED, raw)),
        updated_date: first("last updated").or_else(|| first_value(&UPDATED, raw)),
        expiration_date: first("expiry date").or_else(|| first_value(&EXPIRES, raw)),
        name_servers,
    }))
}

/// Split a response into `(lowercased key, value lines)` blocks. A block
/// starts at a `Key:` line with nothing after the colon and ends at a blank
/// line.
fn collect_sections(raw: &str) -> Vec<(String, Vec<String>)> {
    let mut sections: Vec<(String, Vec<String>)> = Vec::new();
    let mut open = false;

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            open = false;
        } else if let Some(caps) = SECTION_HEADER.captures(trimmed) {
            sections.push((caps[1].trim().to_lowercase(), Vec::new()));
            open = true;
        } else if open {
            if let Some((_, values)) = sections.last_mut() {
                values.push(trimmed.to_string());
            }
        }
    }

    sections
}

fn section_values<'a>(
    sections: &'a [(String, Vec<String>)],
    key: &'a str,
) -> impl Iterator<Item = &'a String> + 'a {
    sections
        .iter()
        .filter(move |(name, _)| name == key)
        .flat_map(|(_, values)| values.iter())
}

/// Nominet prints sentences rather than codes. "Registered until expiry
/// date." and the renewal states mean the domain is held.
fn section_status_token(value: &str) -> Option<String> {
    let lower = value.trim().trim_end_matches('.').to_lowercase();
    if lower.starts_with("registered") || lower.starts_with("renewal") {
        Some("registered".to_string())
    } else {
        lower.split_whitespace().next().map(str::to_string)
    }
}

fn first_value(re: &Regex, raw: &str) -> Option<String> {
    re.captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .find(|value| !value.is_empty() && !value.eq_ignore_ascii_case("redacted"))
}

/// Collect status tokens.
///
/// A status value may list several codes separated by commas; each code
/// keeps its first word so trailing ICANN URLs are dropped. Registry casing
/// is preserved.
fn extract_status(raw: &str) -> Vec<String> {
    let mut status = Vec::new();

    for caps in STATUS.captures_iter(raw) {
        let Some(value) = caps.get(1) else { continue };
        for part in value.as_str().split(',') {
            if let Some(token) = part.split_whitespace().next() {
                if !status.iter().any(|s: &String| s == token) {
                    status.push(token.to_string());
                }
            }
        }
    }

    status
}

fn extract_name_servers(raw: &str) -> Vec<String> {
    let mut servers = Vec::new();

    for caps in NAME_SERVER.captures_iter(raw) {
        let Some(value) = caps.get(1) else { continue };
        if let Some(host) = value.as_str().split_whitespace().next() {
            let host = host.trim_end_matches('.').to_lowercase();
            if host.contains('.') && !servers.contains(&host) {
                servers.push(host);
            }
        }
    }

    servers
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN_TAKEN: &str = "   Domain Name: GOOGLE.COM\r\n\
   Registry Domain ID: 2138514_DOMAIN_COM-VRSN\r\n\
   Registrar WHOIS Server: whois.markmonitor.com\r\n\
   Updated Date: 2019-09-09T15:39:04Z\r\n\
   Creation Date: 1997-09-15T04:00:00Z\r\n\
   Registry Expiry Date: 2028-09-14T04:00:00Z\r\n\
   Registrar: MarkMonitor Inc.\r\n\
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited\r\n\
   Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\r\n\
   Domain Status: serverUpdateProhibited https://icann.org/epp#serverUpdateProhibited\r\n\
   Name Server: NS1.GOOGLE.COM\r\n\
   Name Server: NS2.GOOGLE.COM\r\n\
   DNSSEC: unsigned\r\n";

    const DENIC_TAKEN: &str = "Domain: denic.de\n\
Nserver: ns1.denic.de\n\
Nserver: ns2.denic.de\n\
Status: connect\n\
Changed: 2018-03-12T21:44:25+01:00\n";

    const DENIC_FREE: &str = "Domain: this-is-free-123.de\nStatus: free\n";

    const IANA_TLD: &str = "% IANA WHOIS server\n\
domain:       COM\n\
organisation: VeriSign Global Registry Services\n\
whois:        whois.verisign-grs.com\n\
status:       ACTIVE\n\
created:      1985-01-01\n";

    const NOMINET_TAKEN: &str = "\r
    Domain name:\r
        example.co.uk\r
\r
    Data validation:\r
        Nominet was able to match the registrant's name and address against a 3rd party data source on 10-Dec-2012\r
\r
    Registrar:\r
        Nominet UK [Tag = NOMINET]\r
        URL: https://www.nominet.uk\r
\r
    Relevant dates:\r
        Registered on: 26-Nov-1996\r
        Expiry date:  26-Nov-2030\r
\r
    Registration status:\r
        Registered until expiry date.\r
\r
    Name servers:\r
        ns1.example.co.uk   192.0.2.1\r
        ns2.example.co.uk.\r
\r
    WHOIS lookup made at 10:00:00 01-May-2024\r
";

    const NOMINET_NO_MATCH: &str = "\n    No match for \"free-watchdog-test.co.uk\".\n\n    This domain name has not been registered.\n";

    fn parse(raw: &str) -> ParseOutcome {
        WhoisTextParser::new().parse(raw)
    }

    fn record(raw: &str) -> WhoisRecord {
        match parse(raw) {
            ParseOutcome::Parsed(record) => record,
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_verisign_record() {
        let record = record(VERISIGN_TAKEN);
        assert_eq!(record.domain_name, "google.com");
        assert_eq!(record.registrar.as_deref(), Some("MarkMonitor Inc."));
        assert_eq!(
            record.status,
            vec![
                "clientDeleteProhibited",
                "clientTransferProhibited",
                "serverUpdateProhibited"
            ]
        );
        assert_eq!(record.creation_date.as_deref(), Some("1997-09-15T04:00:00Z"));
        assert_eq!(record.updated_date.as_deref(), Some("2019-09-09T15:39:04Z"));
        assert_eq!(record.expiration_date.as_deref(), Some("2028-09-14T04:00:00Z"));
        assert_eq!(record.name_servers, vec!["ns1.google.com", "ns2.google.com"]);
    }

    #[test]
    fn test_parse_denic_records() {
        let taken = record(DENIC_TAKEN);
        assert_eq!(taken.domain_name, "denic.de");
        assert_eq!(taken.status, vec!["connect"]);
        assert_eq!(taken.name_servers, vec!["ns1.denic.de", "ns2.denic.de"]);

        let free = record(DENIC_FREE);
        assert_eq!(free.status, vec!["free"]);
    }

    #[test]
    fn test_parse_iana_record() {
        let record = record(IANA_TLD);
        assert_eq!(record.domain_name, "com");
        assert_eq!(record.status, vec!["ACTIVE"]);
        assert_eq!(record.creation_date.as_deref(), Some("1985-01-01"));
    }

    #[test]
    fn test_parse_nominet_sections() {
        let record = record(NOMINET_TAKEN);
        assert_eq!(record.domain_name, "example.co.uk");
        assert_eq!(record.registrar.as_deref(), Some("Nominet UK [Tag = NOMINET]"));
        assert_eq!(record.status, vec!["registered"]);
        assert_eq!(record.creation_date.as_deref(), Some("26-Nov-1996"));
        assert_eq!(record.expiration_date.as_deref(), Some("26-Nov-2030"));
        assert_eq!(
            record.name_servers,
            vec!["ns1.example.co.uk", "ns2.example.co.uk"]
        );
        assert!(crate::classifier::is_registered(&record.status));
    }

    #[test]
    fn test_nominet_not_found() {
        assert_eq!(parse(NOMINET_NO_MATCH), ParseOutcome::NotFound);
    }

    #[test]
    fn test_section_status_tokens() {
        assert_eq!(
            section_status_token("Registered until expiry date.").as_deref(),
            Some("registered")
        );
        assert_eq!(
            section_status_token("Renewal required.").as_deref(),
            Some("registered")
        );
        assert_eq!(
            section_status_token("Suspended").as_deref(),
            Some("suspended")
        );
    }

    #[test]
    fn test_comma_separated_status() {
        let raw = "Domain Name: example.io\nStatus: ok, clientHold\n";
        assert_eq!(record(raw).status, vec!["ok", "clientHold"]);
    }

    #[test]
    fn test_not_found_response() {
        let raw = "No match for \"THIS-DOES-NOT-EXIST-12345.COM\".\r\n>>> Last update of whois database: 2024-01-01T00:00:00Z <<<\r\n";
        assert_eq!(parse(raw), ParseOutcome::NotFound);
        assert_eq!(parse("NOT FOUND\n"), ParseOutcome::NotFound);
    }

    #[test]
    fn test_registry_conditions() {
        assert_eq!(
            parse("The domain has been blocked by DPML.\n"),
            ParseOutcome::Blocked
        );
        assert_eq!(
            parse("This is a premium domain. Please contact your registrar.\n"),
            ParseOutcome::Premium
        );
        assert_eq!(
            parse("Reserved Domain Name\nThis name is held by the registry.\n"),
            ParseOutcome::Reserved
        );
    }

    #[test]
    fn test_failures() {
        assert_eq!(
            parse("   \n"),
            ParseOutcome::Failed(ParseError::new("whois response is empty"))
        );
        assert_eq!(
            parse("Query limit exceeded, please wait.\n"),
            ParseOutcome::Failed(ParseError::new("whois query limit exceeded"))
        );
        assert_eq!(
            parse("Welcome to the registry.\n"),
            ParseOutcome::Failed(ParseError::new("whois response contains no domain data"))
        );
    }

    #[test]
    fn test_redacted_values_are_skipped() {
        let raw = "Domain Name: example.org\nRegistrar: REDACTED\nRegistrar Name: Example Registrar\n";
        assert_eq!(
            record(raw).registrar.as_deref(),
            Some("Example Registrar")
        );
    }
}
