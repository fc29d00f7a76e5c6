//! Requester classification for the raw delivery path.

use axum::http::header;
use hyper::HeaderMap;
use rawpaste_core::models::snippet::RequesterClass;

/// User-agent substrings that mark a browser.
pub const BROWSER_AGENT_MARKERS: [&str; 5] = ["Mozilla", "Chrome", "Safari", "Firefox", "Edg"];

/// Decides whether a request comes from a browser or a program.
pub trait RequesterClassifier: Send + Sync {
    fn classify(&self, headers: &HeaderMap) -> RequesterClass;
}

/// Case-sensitive substring match on the `User-Agent` header.
///
/// A missing or non-text header is treated as programmatic.
#[derive(Debug, Clone)]
pub struct UserAgentClassifier {
    markers: Vec<String>,
}

impl UserAgentClassifier {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Classify a raw user-agent string.
    pub fn classify_agent(&self, user_agent: Option<&str>) -> RequesterClass {
        match user_agent {
            Some(agent)
                if self
                    .markers
                    .iter()
                    .any(|marker| agent.contains(marker.as_str())) =>
            {
                RequesterClass::Interactive
            }
            _ => RequesterClass::Programmatic,
        }
    }
}

impl Default for UserAgentClassifier {
    fn default() -> Self {
        Self::new(BROWSER_AGENT_MARKERS)
    }
}

impl RequesterClassifier for UserAgentClassifier {
    fn classify(&self, headers: &HeaderMap) -> RequesterClass {
        let agent = headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok());
        self.classify_agent(agent)
    }
}
