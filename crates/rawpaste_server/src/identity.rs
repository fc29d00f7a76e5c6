//! Owner identity resolution.
//!
//! The server runs behind an authenticating proxy that forwards the
//! verified owner id in a request header.

use axum::http::HeaderName;
use hyper::HeaderMap;
use rawpaste_core::{models::snippet::OwnerId, Config, DEFAULT_OWNER_HEADER};

/// Supplies the current owner id for a request, if any.
pub trait IdentityProvider: Send + Sync {
    fn current_owner_id(&self, headers: &HeaderMap) -> Option<OwnerId>;
}

/// Reads the owner id from a single trusted header.
#[derive(Debug, Clone)]
pub struct TrustedHeaderIdentity {
    header: HeaderName,
}

impl TrustedHeaderIdentity {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Build from `config.owner_header`, falling back to the default header
    /// name when the configured one is not a valid header name.
    pub fn from_config(config: &Config) -> Self {
        let header = match HeaderName::from_bytes(config.owner_header.as_bytes()) {
            Ok(name) => name,
            Err(err) => {
                tracing::warn!(
                    "Invalid OWNER_HEADER='{}': {}. Falling back to {}",
                    config.owner_header,
                    err,
                    DEFAULT_OWNER_HEADER
                );
                HeaderName::from_static(DEFAULT_OWNER_HEADER)
            }
        };
        Self::new(header)
    }
}

impl Default for TrustedHeaderIdentity {
    fn default() -> Self {
        Self::new(HeaderName::from_static(DEFAULT_OWNER_HEADER))
    }
}

impl IdentityProvider for TrustedHeaderIdentity {
    fn current_owner_id(&self, headers: &HeaderMap) -> Option<OwnerId> {
        headers
            .get(&self.header)
            .and_then(|value| value.to_str().ok())
            .and_then(OwnerId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::{IdentityProvider, TrustedHeaderIdentity};
    use axum::http::{HeaderMap, HeaderValue};
    use rawpaste_core::Config;

    fn config_with_header(owner_header: &str) -> Config {
        Config {
            db_path: String::from("/tmp/rawpaste-identity"),
            port: 38411,
            max_snippet_size: 1024,
            max_snippets_per_owner: 10,
            identifier_length: 12,
            identifier_max_attempts: 5,
            interstitial_prefix: String::from("/raw/check"),
            owner_header: owner_header.to_string(),
        }
    }

    #[test]
    fn reads_and_trims_owner_header() {
        let identity = TrustedHeaderIdentity::default();
        let mut headers = HeaderMap::new();
        assert!(identity.current_owner_id(&headers).is_none());

        headers.insert("x-rawpaste-owner", HeaderValue::from_static("  alice "));
        let owner = identity.current_owner_id(&headers).expect("owner");
        assert_eq!(owner.as_str(), "alice");
    }

    #[test]
    fn blank_or_non_ascii_header_is_anonymous() {
        let identity = TrustedHeaderIdentity::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-rawpaste-owner", HeaderValue::from_static("   "));
        assert!(identity.current_owner_id(&headers).is_none());

        let opaque = HeaderValue::from_bytes(&[0xC3, 0xA9]).expect("opaque header");
        headers.insert("x-rawpaste-owner", opaque);
        assert!(identity.current_owner_id(&headers).is_none());
    }

    #[test]
    fn configured_header_replaces_default() {
        let identity = TrustedHeaderIdentity::from_config(&config_with_header("x-forwarded-user"));
        let mut headers = HeaderMap::new();
        headers.insert("x-rawpaste-owner", HeaderValue::from_static("mallory"));
        assert!(identity.current_owner_id(&headers).is_none());

        headers.insert("x-forwarded-user", HeaderValue::from_static("carol"));
        let owner = identity.current_owner_id(&headers).expect("owner");
        assert_eq!(owner.as_str(), "carol");
    }

    #[test]
    fn invalid_configured_header_falls_back_to_default() {
        let identity = TrustedHeaderIdentity::from_config(&config_with_header("bad header"));
        let mut headers = HeaderMap::new();
        headers.insert("x-rawpaste-owner", HeaderValue::from_static("alice"));
        let owner = identity.current_owner_id(&headers).expect("owner");
        assert_eq!(owner.as_str(), "alice");
    }
}
