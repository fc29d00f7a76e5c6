//! Snippet data models shared by the store, gateway and HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME type used for every raw delivery.
pub const RAW_MIME_TYPE: &str = "text/plain; charset=utf-8";

/// Who may read a snippet through the raw path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Opaque owner id supplied by the identity provider.
///
/// Never empty: construction trims and rejects blank values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Build an owner id from a raw credential value.
    ///
    /// # Returns
    /// `None` when the value is empty after trimming.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted snippet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub storage_key: String,
    pub identifier: String,
    pub content: String,
    pub visibility: Visibility,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Snippet fields chosen by the gateway; the store assigns the rest.
#[derive(Debug, Clone)]
pub struct NewSnippet {
    pub identifier: String,
    pub content: String,
    pub visibility: Visibility,
    pub owner_id: OwnerId,
}

/// Owner-facing view of a snippet returned by listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetSummary {
    pub identifier: String,
    pub content: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

impl From<Snippet> for SnippetSummary {
    fn from(value: Snippet) -> Self {
        Self {
            identifier: value.identifier,
            content: value.content,
            visibility: value.visibility,
            created_at: value.created_at,
        }
    }
}

/// Current quota usage for one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub used: usize,
    pub limit: usize,
    pub remaining: usize,
}

impl QuotaStatus {
    pub fn new(used: usize, limit: usize) -> Self {
        Self {
            used,
            limit,
            remaining: limit.saturating_sub(used),
        }
    }

    /// True once `used` reaches `limit`; a zero limit is always full.
    pub fn is_full(&self) -> bool {
        self.used >= self.limit
    }
}

/// Request payload for submitting a snippet.
#[derive(Debug, Deserialize)]
pub struct SubmitSnippetRequest {
    pub content: String,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

/// Response payload for a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitSnippetResponse {
    pub identifier: String,
    pub raw_path: String,
}

/// Coarse classification of a retrieval caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequesterClass {
    /// A human-driven browser.
    Interactive,
    /// A script, tool or loader fetching raw bytes.
    Programmatic,
}

/// Raw body handed to the transport for programmatic callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    pub content: String,
    pub mime_type: &'static str,
    /// The transport must forbid content-type sniffing of the body.
    pub nosniff: bool,
}

impl RawContent {
    pub fn plain_text(content: String) -> Self {
        Self {
            content,
            mime_type: RAW_MIME_TYPE,
            nosniff: true,
        }
    }
}

/// Terminal outcome of a successful retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    Raw(RawContent),
    Redirect { location: String },
}
