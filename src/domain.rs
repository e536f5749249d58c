//! Splitting a fully-qualified name into the registered domain and the
//! subdomain the zone API addresses records by.

use crate::error::Error;

/// The subdomain label the API uses for the zone apex.
pub const APEX: &str = "@";

/// Raw output of a domain breakdown, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdown {
    pub registered_domain: String,
    pub subdomain: String,
}

/// Something that can tell where the registrable part of a name begins.
pub trait DomainBreakdown: Send + Sync {
    /// Returns `None` when the name has no recognised public suffix plus
    /// registrable label.
    fn breakdown(&self, domain: &str) -> Option<Breakdown>;
}

/// Breakdown backed by the compiled-in public suffix list.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicSuffixList;

impl DomainBreakdown for PublicSuffixList {
    fn breakdown(&self, domain: &str) -> Option<Breakdown> {
        let name = domain.trim();
        let name = name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase();
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return None;
        }

        let registered_len = {
            let registered = psl::domain(name.as_bytes())?;
            if !registered.suffix().is_known() {
                return None;
            }
            registered.as_bytes().len()
        };

        // Subdomain is everything before the dot preceding the registered domain
        let split_at = name.len() - registered_len;
        let subdomain = name[..split_at].strip_suffix('.').unwrap_or("");

        Some(Breakdown {
            registered_domain: name[split_at..].to_string(),
            subdomain: subdomain.to_string(),
        })
    }
}

/// A validated `(registered domain, subdomain)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneName {
    registered_domain: String,
    subdomain: String,
}

impl ZoneName {
    /// Builds a zone name from parts the caller already knows.
    pub fn new(registered_domain: &str, subdomain: &str) -> Result<Self, Error> {
        if registered_domain.is_empty() {
            return Err(Error::EmptyRegisteredDomain);
        }
        if subdomain.is_empty() {
            return Err(Error::EmptySubdomain);
        }

        Ok(Self {
            registered_domain: registered_domain.to_string(),
            subdomain: subdomain.to_string(),
        })
    }

    /// Splits `domain` with `breakdown`. An apex name gets the `@` subdomain.
    pub fn split(breakdown: &dyn DomainBreakdown, domain: &str) -> Result<Self, Error> {
        let parts = breakdown
            .breakdown(domain)
            .ok_or_else(|| Error::InvalidDomain(domain.to_string()))?;

        let subdomain = if parts.subdomain.is_empty() {
            APEX
        } else {
            parts.subdomain.as_str()
        };

        Self::new(&parts.registered_domain, subdomain)
    }

    pub fn registered_domain(&self) -> &str {
        &self.registered_domain
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }
}

impl std::fmt::Display for ZoneName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.subdomain == APEX {
            write!(f, "{}", self.registered_domain)
        } else {
            write!(f, "{}.{}", self.subdomain, self.registered_domain)
        }
    }
}
