//! Main domain watchdog implementation.
//!
//! [`DomainWatchdog`] runs the lookup pipeline for each domain: WHOIS
//! transport, then the WHOIS parser, then the status classifier.

use crate::classifier::{classify_parse_result, classify_transport_error};
use crate::error::DomainWatchdogError;
use crate::parser::{WhoisParser, WhoisTextParser};
use crate::protocols::{TcpWhoisClient, WhoisTransport};
use crate::types::{CheckConfig, Classification, DomainReport};
use crate::utils::normalize_domain;
use futures::stream::{self, Stream, StreamExt};
use std::time::Instant;
use tracing::{debug, warn};

/// Looks up domains and classifies their registration status.
///
/// The transport and parser are type parameters so either can be swapped,
/// e.g. for tests or for a different WHOIS backend.
///
/// # Example
///
/// ```rust,no_run
/// use domain_watchdog_lib::{DomainWatchdog, Outcome};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let watchdog = DomainWatchdog::new();
///     let classification = watchdog.check_domain("example.com").await?;
///     println!("{}", classification.outcome);
///     assert_eq!(classification.outcome, Outcome::Registered);
///     Ok(())
/// }
/// ```
pub struct DomainWatchdog<T = TcpWhoisClient, P = WhoisTextParser> {
    /// Configuration settings for this instance
    config: CheckConfig,
    /// Source of raw WHOIS text
    transport: T,
    /// Turns raw WHOIS text into a parse outcome
    parser: P,
}

impl DomainWatchdog {
    /// Create a watchdog with default configuration, the TCP transport and
    /// the text parser.
    ///
    /// Default settings:
    /// - Concurrency: 10
    /// - Timeout: 10 seconds per network step
    pub fn new() -> Self {
        Self::with_config(CheckConfig::default())
    }

    /// Create a watchdog with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_watchdog_lib::{CheckConfig, DomainWatchdog};
    /// use std::time::Duration;
    ///
    /// let config = CheckConfig::default()
    ///     .with_concurrency(4)
    ///     .with_timeout(Duration::from_secs(5))
    ///     .with_server("de", "whois.denic.de");
    ///
    /// let watchdog = DomainWatchdog::with_config(config);
    /// assert_eq!(watchdog.config().concurrency, 4);
    /// ```
    pub fn with_config(config: CheckConfig) -> Self {
        let transport = build_transport(&config);
        Self {
            config,
            transport,
            parser: WhoisTextParser::new(),
        }
    }

    /// Replace the configuration. The TCP transport is rebuilt with the new
    /// timeout and server overrides.
    pub fn set_config(&mut self, config: CheckConfig) {
        self.transport = build_transport(&config);
        self.config = config;
    }
}

impl Default for DomainWatchdog {
    fn default() -> Self {
        Self::new()
    }
}

fn build_transport(config: &CheckConfig) -> TcpWhoisClient {
    TcpWhoisClient::with_timeout(config.timeout).with_servers(config.servers.clone())
}

impl<T: WhoisTransport, P: WhoisParser> DomainWatchdog<T, P> {
    /// Create a watchdog from explicit components.
    pub fn with_components(config: CheckConfig, transport: T, parser: P) -> Self {
        Self {
            config,
            transport,
            parser,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Classify a single domain.
    ///
    /// # Errors
    ///
    /// Returns `DomainWatchdogError` if:
    /// - The domain name is invalid
    /// - The WHOIS query fails (`DomainWatchdogError::WhoisQuery`)
    ///
    /// A response the parser cannot interpret is not an error here; it
    /// classifies as `Outcome::Unknown` with the parser failure as `cause`.
    pub async fn check_domain(&self, domain: &str) -> Result<Classification, DomainWatchdogError> {
        let domain = normalize_domain(domain)?;

        let raw = self
            .transport
            .query(&domain)
            .await
            .map_err(classify_transport_error)?;

        let classification = classify_parse_result(self.parser.parse(&raw));

        if let Some(cause) = &classification.cause {
            warn!(domain = %domain, error = %cause, "Could not interpret whois response");
        }
        debug!(domain = %domain, outcome = ?classification.outcome, "Classified domain");

        Ok(classification)
    }

    /// Classify a single domain and fold any error into a report.
    pub async fn check_domain_report(&self, domain: &str) -> DomainReport {
        let start_time = Instant::now();
        let result = self.check_domain(domain).await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(classification) => DomainReport {
                domain: domain.trim().to_string(),
                outcome: Some(classification.outcome),
                error: classification.cause.map(|cause| cause.to_string()),
                duration_ms,
            },
            Err(e) => DomainReport {
                domain: domain.trim().to_string(),
                outcome: None,
                error: Some(e.to_string()),
                duration_ms,
            },
        }
    }

    /// Check several domains concurrently.
    ///
    /// At most `concurrency` lookups are in flight. Results come back in
    /// input order; a failure for one domain never affects another.
    pub async fn check_domains(&self, domains: &[String]) -> Vec<DomainReport> {
        stream::iter(domains)
            .map(|domain| self.check_domain_report(domain))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    /// Check several domains concurrently, yielding reports as they complete.
    pub fn check_domains_stream<'a>(
        &'a self,
        domains: &'a [String],
    ) -> impl Stream<Item = DomainReport> + 'a {
        stream::iter(domains)
            .map(move |domain| self.check_domain_report(domain))
            .buffer_unordered(self.config.concurrency.max(1))
    }
}
