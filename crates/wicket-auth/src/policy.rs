//! Company-domain admission policy.

use std::fmt;
use std::str::FromStr;

use crate::PolicyError;

/// Who may sign in.
///
/// Parsed from the configured company-domain string: `@example.com` admits
/// every address at that domain, anything else admits exactly that address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainPolicy {
    /// Any `local@domain` whose domain matches exactly (case-sensitive).
    Domain(String),
    /// A single email address.
    Exact(String),
}

impl DomainPolicy {
    /// Whether `email` satisfies the policy.
    pub fn admits(&self, email: &str) -> bool {
        match self {
            DomainPolicy::Domain(domain) => {
                let mut parts = email.split('@');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(_), Some(actual), None) => actual == domain,
                    _ => false,
                }
            }
            DomainPolicy::Exact(expected) => email == expected,
        }
    }
}

impl FromStr for DomainPolicy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PolicyError::Empty);
        }
        match s.strip_prefix('@') {
            Some("") => Err(PolicyError::EmptyDomain),
            Some(domain) => Ok(DomainPolicy::Domain(domain.to_string())),
            None => Ok(DomainPolicy::Exact(s.to_string())),
        }
    }
}

impl fmt::Display for DomainPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainPolicy::Domain(domain) => write!(f, "@{domain}"),
            DomainPolicy::Exact(email) => f.write_str(email),
        }
    }
}
