//! Data models for API requests and persistence.

/// Snippet records, summaries and retrieval outcomes.
pub mod snippet;
