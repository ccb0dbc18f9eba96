// domain-watchdog-lib/tests/integration.rs

//! Integration tests for the lookup pipeline: canned WHOIS responses go
//! through the real parser and classifier.

use domain_watchdog_lib::{
    CheckConfig, DomainWatchdog, Outcome, TransportError, WhoisTextParser, WhoisTransport,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Serves canned WHOIS text per domain.
struct CannedTransport {
    responses: HashMap<String, Result<String, TransportError>>,
    calls: Arc<AtomicUsize>,
}

impl CannedTransport {
    fn new(entries: &[(&str, Result<&str, &str>)]) -> Self {
        let responses = entries
            .iter()
            .map(|(domain, response)| {
                let response = response
                    .map(str::to_string)
                    .map_err(TransportError::other);
                (domain.to_string(), response)
            })
            .collect();
        Self {
            responses,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl WhoisTransport for CannedTransport {
    async fn query(&self, domain: &str) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Stagger responses so completion order differs from input order.
        let delay = domain.len() as u64 % 3;
        tokio::time::sleep(Duration::from_millis(delay * 5)).await;
        self.responses
            .get(domain)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::other("connection refused")))
    }
}

const VERISIGN_TAKEN: &str = "Domain Name: EXAMPLE.COM\r\n\
Registrar: RESERVED-Internet Assigned Numbers Authority\r\n\
Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited\r\n\
Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\r\n\
Name Server: A.IANA-SERVERS.NET\r\n";

const VERISIGN_NO_MATCH: &str = "No match for \"NONEXISTENT-WATCHDOG-TEST.COM\".\r\n\
>>> Last update of whois database: 2024-05-01T10:00:00Z <<<\r\n";

const DENIC_CONNECT: &str = "Domain: denic.de\nNserver: ns1.denic.de\nStatus: connect\n";

const DENIC_FREE: &str = "Domain: free-watchdog-test.de\nStatus: free\n";

const NOMINET_REGISTERED: &str = "
    Domain name:
        example.co.uk

    Registrar:
        Example Registrar Ltd [Tag = EXAMPLE]

    Registration status:
        Registered until expiry date.

    Name servers:
        ns1.example.co.uk
";

const PIR_OK: &str = "Domain Name: example.org\nDomain Status: ok https://icann.org/epp#ok\n";

fn watchdog(transport: CannedTransport) -> DomainWatchdog<CannedTransport, WhoisTextParser> {
    DomainWatchdog::with_components(
        CheckConfig::default().with_concurrency(3),
        transport,
        WhoisTextParser::new(),
    )
}

#[tokio::test]
async fn test_registered_domains_across_registries() {
    let watchdog = watchdog(CannedTransport::new(&[
        ("example.com", Ok(VERISIGN_TAKEN)),
        ("denic.de", Ok(DENIC_CONNECT)),
        ("example.org", Ok(PIR_OK)),
        ("example.co.uk", Ok(NOMINET_REGISTERED)),
    ]));

    for domain in ["example.com", "denic.de", "example.org", "example.co.uk"] {
        let classification = watchdog.check_domain(domain).await.unwrap();
        assert_eq!(classification.outcome, Outcome::Registered, "{}", domain);
        assert!(classification.cause.is_none());
    }
}

#[tokio::test]
async fn test_available_domains() {
    let watchdog = watchdog(CannedTransport::new(&[
        ("nonexistent-watchdog-test.com", Ok(VERISIGN_NO_MATCH)),
        ("free-watchdog-test.de", Ok(DENIC_FREE)),
    ]));

    let not_found = watchdog
        .check_domain("nonexistent-watchdog-test.com")
        .await
        .unwrap();
    assert_eq!(not_found.outcome, Outcome::NotFound);

    let free = watchdog.check_domain("free-watchdog-test.de").await.unwrap();
    assert_eq!(free.outcome, Outcome::Unknown);
    assert!(free.cause.is_none());
}

#[tokio::test]
async fn test_unparsable_response_surfaces_cause() {
    let watchdog = watchdog(CannedTransport::new(&[(
        "example.net",
        Ok("Service temporarily unavailable\n"),
    )]));

    let classification = watchdog.check_domain("example.net").await.unwrap();
    assert_eq!(classification.outcome, Outcome::Unknown);
    assert_eq!(
        classification.cause.map(|c| c.to_string()),
        Some("whois response contains no domain data".to_string())
    );
}

#[tokio::test]
async fn test_batch_keeps_order_and_isolates_failures() {
    let transport = CannedTransport::new(&[
        ("example.com", Ok(VERISIGN_TAKEN)),
        ("down.example", Err("connection reset by peer")),
        ("nonexistent-watchdog-test.com", Ok(VERISIGN_NO_MATCH)),
        ("denic.de", Ok(DENIC_CONNECT)),
    ]);
    let watchdog = watchdog(transport);

    let domains: Vec<String> = [
        "example.com",
        "down.example",
        "nonexistent-watchdog-test.com",
        "not a domain",
        "denic.de",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let reports = watchdog.check_domains(&domains).await;
    let names: Vec<&str> = reports.iter().map(|r| r.domain.as_str()).collect();
    assert_eq!(names, domains.iter().map(String::as_str).collect::<Vec<_>>());

    assert_eq!(reports[0].outcome, Some(Outcome::Registered));
    assert!(!reports[0].has_error());

    assert_eq!(reports[1].outcome, None);
    assert_eq!(
        reports[1].error.as_deref(),
        Some("whois query error: connection reset by peer")
    );

    assert_eq!(reports[2].outcome, Some(Outcome::NotFound));

    assert_eq!(reports[3].outcome, None);
    assert!(reports[3]
        .error
        .as_deref()
        .unwrap()
        .starts_with("Invalid domain"));

    assert_eq!(reports[4].outcome, Some(Outcome::Registered));
}

#[tokio::test]
async fn test_invalid_domains_never_reach_transport() {
    let transport = CannedTransport::new(&[]);
    let calls = Arc::clone(&transport.calls);
    let watchdog = watchdog(transport);

    let reports = watchdog
        .check_domains(&["".to_string(), "localhost".to_string()])
        .await;
    assert!(reports.iter().all(|r| r.outcome.is_none() && r.has_error()));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_repeated_lookups_are_identical() {
    let watchdog = watchdog(CannedTransport::new(&[("example.com", Ok(VERISIGN_TAKEN))]));

    let first = watchdog.check_domain("example.com").await.unwrap();
    let second = watchdog.check_domain("EXAMPLE.COM").await.unwrap();
    assert_eq!(first, second);
}
