//! Registry status classification.
//!
//! Registries report domain state with inconsistent vocabularies: DENIC
//! answers `connect`, EPP-based registries print ICANN status codes such as
//! `clientTransferProhibited`, IANA prints `ACTIVE`. The rule table below
//! collects the tokens that mean "this domain is taken". A missing rule makes
//! a registered domain look available.

use crate::error::{DomainWatchdogError, TransportError};
use crate::types::{Classification, Outcome, ParseOutcome};
use regex::Regex;

/// Registry family a rule was collected from. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFamily {
    Denic,
    /// ICANN EPP status codes,
    /// see <https://www.icann.org/resources/pages/epp-status-codes-2014-06-16-en>
    Icann,
    Iana,
    Generic,
}

/// One "domain exists" marker.
#[derive(Debug)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub family: RegistryFamily,
    pattern: Regex,
}

impl ClassificationRule {
    fn new(name: &'static str, family: RegistryFamily, pattern: &str) -> Self {
        Self {
            name,
            family,
            pattern: Regex::new(pattern).unwrap_or_else(|e| {
                panic!("invalid classification rule '{}': {}", name, e)
            }),
        }
    }

    /// Whether the whole token matches this rule.
    pub fn matches(&self, token: &str) -> bool {
        self.pattern.is_match(token)
    }
}

lazy_static::lazy_static! {
    // Literal rules are case-sensitive. The EPP families match in any case.
    static ref RULES: Vec<ClassificationRule> = vec![
        ClassificationRule::new("DENIC", RegistryFamily::Denic, r"^connect$"),
        ClassificationRule::new("EPP inactive", RegistryFamily::Icann, r"^inactive$"),
        ClassificationRule::new("EPP ok", RegistryFamily::Icann, r"^ok$"),
        ClassificationRule::new(
            "EPP pending",
            RegistryFamily::Icann,
            r"(?i)^pending(?:Create|Renew|Restore|Transfer|Update)$",
        ),
        ClassificationRule::new(
            "EPP period",
            RegistryFamily::Icann,
            r"(?i)^(?:add|autoRenew|renew|transfer)Period$",
        ),
        ClassificationRule::new(
            "EPP hold",
            RegistryFamily::Icann,
            r"(?i)^(?:server|client)Hold$",
        ),
        ClassificationRule::new(
            "EPP prohibited",
            RegistryFamily::Icann,
            r"(?i)^(?:server|client)(?:Delete|Renew|Transfer|Update)Prohibited$",
        ),
        ClassificationRule::new("IANA", RegistryFamily::Iana, r"^ACTIVE$"),
        ClassificationRule::new("Generic", RegistryFamily::Generic, r"^registered$"),
    ];
}

/// The fixed, ordered rule table.
pub fn rules() -> &'static [ClassificationRule] {
    &RULES
}

/// First rule matching `token`, if any.
pub fn matching_rule(token: &str) -> Option<&'static ClassificationRule> {
    RULES.iter().find(|rule| rule.matches(token))
}

/// Returns true iff at least one status token matches at least one rule.
///
/// An empty token set is not evidence of registration.
pub fn is_registered<S: AsRef<str>>(tokens: &[S]) -> bool {
    tokens
        .iter()
        .any(|token| matching_rule(token.as_ref()).is_some())
}

/// Map a parser result to an outcome.
///
/// The four registry conditions win over token inspection. A parser failure
/// yields [`Outcome::Unknown`] with the failure kept as the cause, unchanged.
pub fn classify_parse_result(parsed: ParseOutcome) -> Classification {
    match parsed {
        ParseOutcome::NotFound => Classification::certain(Outcome::NotFound),
        ParseOutcome::Reserved => Classification::certain(Outcome::Reserved),
        ParseOutcome::Premium => Classification::certain(Outcome::Premium),
        ParseOutcome::Blocked => Classification::certain(Outcome::Blocked),
        ParseOutcome::Failed(cause) => Classification {
            outcome: Outcome::Unknown,
            cause: Some(cause),
        },
        ParseOutcome::Parsed(record) => {
            if is_registered(&record.status) {
                Classification::certain(Outcome::Registered)
            } else {
                Classification::certain(Outcome::Unknown)
            }
        }
    }
}

/// Wrap a transport failure. There is no outcome for the domain in this case.
pub fn classify_transport_error(err: TransportError) -> DomainWatchdogError {
    DomainWatchdogError::WhoisQuery { source: err }
}
