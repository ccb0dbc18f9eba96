//! Utility functions for domain processing and validation.

use crate::error::DomainWatchdogError;

/// Normalise user input into a bare, lowercase domain name.
///
/// Strips surrounding whitespace, a URL scheme, any path, a leading `www.`
/// and a trailing root dot, then validates the result.
pub fn normalize_domain(input: &str) -> Result<String, DomainWatchdogError> {
    let domain = input.trim().to_lowercase();

    let domain = domain
        .strip_prefix("http://")
        .or_else(|| domain.strip_prefix("https://"))
        .unwrap_or(&domain);
    let domain = domain.split('/').next().unwrap_or(domain);
    let domain = domain.strip_prefix("www.").unwrap_or(domain);
    let domain = domain.strip_suffix('.').unwrap_or(domain);

    validate_domain(domain)?;
    Ok(domain.to_string())
}

/// Validate a domain name format.
///
/// This is a syntactic check only; whether the TLD has a WHOIS server is
/// decided by the transport.
pub fn validate_domain(domain: &str) -> Result<(), DomainWatchdogError> {
    if domain.is_empty() {
        return Err(DomainWatchdogError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if !domain.contains('.') {
        return Err(DomainWatchdogError::invalid_domain(
            domain,
            "Domain name must contain a TLD",
        ));
    }

    if domain.len() > 253 {
        return Err(DomainWatchdogError::invalid_domain(
            domain,
            "Domain name exceeds 253 characters",
        ));
    }

    for label in domain.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(DomainWatchdogError::invalid_domain(
                domain,
                "Each label must be 1-63 characters",
            ));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainWatchdogError::invalid_domain(
                domain,
                "Labels cannot start or end with a hyphen",
            ));
        }

        // Unicode letters are allowed for IDNs; registries accept them in
        // the query when the server supports it.
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Err(DomainWatchdogError::invalid_domain(
                domain,
                "Only letters, digits and hyphens are allowed",
            ));
        }
    }

    Ok(())
}

/// Extract the TLD (last label) from a domain, lowercased.
pub fn extract_tld(domain: &str) -> Result<String, DomainWatchdogError> {
    match domain.trim_end_matches('.').rsplit_once('.') {
        Some((name, tld)) if !name.is_empty() && !tld.is_empty() => Ok(tld.to_lowercase()),
        _ => Err(DomainWatchdogError::invalid_domain(
            domain,
            "Domain must contain at least one dot",
        )),
    }
}

/// Split a comma-separated domain list, dropping blanks.
pub fn split_domain_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("example.com").unwrap(), "example.com");
        assert_eq!(normalize_domain(" EXAMPLE.COM ").unwrap(), "example.com");
        assert_eq!(
            normalize_domain("https://www.example.com/path").unwrap(),
            "example.com"
        );
        assert_eq!(normalize_domain("example.de.").unwrap(), "example.de");
        assert!(normalize_domain("invalid").is_err());
        assert!(normalize_domain("").is_err());
    }

    #[test]
    fn test_validate_domain() {
        assert!(validate_domain("example.com").is_ok());
        assert!(validate_domain("sub.example.co.uk").is_ok());
        assert!(validate_domain("xn--bcher-kva.de").is_ok());
        assert!(validate_domain("bücher.de").is_ok());

        assert!(validate_domain("").is_err());
        assert!(validate_domain("example").is_err());
        assert!(validate_domain(".com").is_err());
        assert!(validate_domain("example..com").is_err());
        assert!(validate_domain("-example.com").is_err());
        assert!(validate_domain("example-.com").is_err());
        assert!(validate_domain("exa mple.com").is_err());
        assert!(validate_domain("exa_mple.com").is_err());
        assert!(validate_domain(&format!("{}.com", "a".repeat(64))).is_err());
    }

    #[test]
    fn test_extract_tld() {
        assert_eq!(extract_tld("example.com").unwrap(), "com");
        assert_eq!(extract_tld("test.ORG").unwrap(), "org");
        assert_eq!(extract_tld("sub.example.co.uk").unwrap(), "uk");
        assert!(extract_tld("invalid").is_err());
        assert!(extract_tld("").is_err());
        assert!(extract_tld(".com").is_err());
    }

    #[test]
    fn test_split_domain_list() {
        assert_eq!(
            split_domain_list("example.com, example.net,,  "),
            vec!["example.com", "example.net"]
        );
        assert!(split_domain_list("").is_empty());
    }
}
