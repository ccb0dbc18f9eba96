//! WHOIS transport over TCP port 43.
//!
//! The transport only moves text: it resolves the registry server for the
//! TLD, sends one query line and reads until the server closes the
//! connection. Referrals to registrar WHOIS servers are not followed, and
//! nothing is retried.

use crate::error::TransportError;
use crate::protocols::servers::{
    build_query, builtin_whois_server, cache_whois_server, get_cached_whois_server,
    is_whois_negatively_cached, parse_iana_refer_response, IANA_WHOIS_SERVER,
};
use crate::utils::extract_tld;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

pub const WHOIS_PORT: u16 = 43;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB

/// Issues a WHOIS query for a domain and returns the raw response text.
pub trait WhoisTransport: Send + Sync {
    fn query(&self, domain: &str) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// WHOIS client speaking the plain-text protocol on TCP port 43.
#[derive(Debug, Clone)]
pub struct TcpWhoisClient {
    /// Timeout for connect, write and each read
    timeout: Duration,
    /// TLD -> server overrides, consulted before any other source
    servers: HashMap<String, String>,
}

impl TcpWhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            servers: HashMap::new(),
        }
    }

    /// Create a new WHOIS client with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::new()
        }
    }

    /// Use fixed servers for some TLDs.
    pub fn with_servers(mut self, servers: HashMap<String, String>) -> Self {
        self.servers = servers
            .into_iter()
            .map(|(tld, server)| (tld.to_lowercase(), server))
            .collect();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Find the WHOIS server responsible for a TLD.
    ///
    /// Lookup order: configured override, discovery cache, built-in table,
    /// then IANA. The IANA answer (including "none") is cached.
    pub async fn resolve_server(&self, tld: &str) -> Result<String, TransportError> {
        let tld = tld.to_lowercase();

        if let Some(server) = self.servers.get(&tld) {
            return Ok(server.clone());
        }
        if let Some(server) = get_cached_whois_server(&tld) {
            return Ok(server);
        }
        if is_whois_negatively_cached(&tld) {
            return Err(TransportError::ServerNotFound { tld });
        }
        if let Some(server) = builtin_whois_server(&tld) {
            return Ok(server.to_string());
        }

        debug!(tld = %tld, "Discovering whois server via IANA");
        let response = self.query_server(IANA_WHOIS_SERVER, &tld).await?;

        match parse_iana_refer_response(&response) {
            Some(server) => {
                if let Err(e) = cache_whois_server(&tld, &server) {
                    warn!(tld = %tld, error = %e, "Could not cache whois server");
                }
                Ok(server)
            }
            None => {
                if let Err(e) = cache_whois_server(&tld, "") {
                    warn!(tld = %tld, error = %e, "Could not cache whois server");
                }
                Err(TransportError::ServerNotFound { tld })
            }
        }
    }

    /// Send one query line to `server` and return the full response.
    pub async fn query_server(&self, server: &str, query: &str) -> Result<String, TransportError> {
        let mut stream = timeout(self.timeout, TcpStream::connect((server, WHOIS_PORT)))
            .await
            .map_err(|_| TransportError::timeout(server, self.timeout))?
            .map_err(|e| TransportError::Connect {
                server: server.to_string(),
                message: e.to_string(),
            })?;

        exchange(&mut stream, server, query, self.timeout).await
    }
}

impl Default for TcpWhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisTransport for TcpWhoisClient {
    #[instrument(skip(self), fields(domain = %domain))]
    async fn query(&self, domain: &str) -> Result<String, TransportError> {
        let tld = extract_tld(domain).map_err(|e| TransportError::other(e.to_string()))?;
        let server = self.resolve_server(&tld).await?;
        let query = build_query(&server, domain);

        debug!(server = %server, query = %query, "Querying whois server");
        self.query_server(&server, &query).await
    }
}

/// Write a CRLF-terminated query and read the response until EOF.
///
/// A read timeout after some data has arrived ends the response instead of
/// failing it; some servers keep the connection open.
async fn exchange<S>(
    stream: &mut S,
    server: &str,
    query: &str,
    step_timeout: Duration,
) -> Result<String, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let line = format!("{}\r\n", query);
    timeout(step_timeout, stream.write_all(line.as_bytes()))
        .await
        .map_err(|_| TransportError::timeout(server, step_timeout))?
        .map_err(|e| TransportError::io(server, format!("failed to send query: {}", e)))?;

    let mut response = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        match timeout(step_timeout, stream.read(&mut buf)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                response.extend_from_slice(&buf[..n]);
                if response.len() > MAX_RESPONSE_SIZE {
                    return Err(TransportError::ResponseTooLarge {
                        server: server.to_string(),
                        limit: MAX_RESPONSE_SIZE,
                    });
                }
            }
            Ok(Err(e)) => {
                return Err(TransportError::io(server, format!("read error: {}", e)));
            }
            Err(_) if !response.is_empty() => break,
            Err(_) => return Err(TransportError::timeout(server, step_timeout)),
        }
    }

    Ok(decode_response(response))
}

/// Decode as UTF-8, falling back to Latin-1 byte-for-byte.
fn decode_response(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}
