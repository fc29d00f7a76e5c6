//! HTTP request handlers.

/// Raw delivery endpoint.
pub mod raw;
/// Owner-scoped snippet endpoints.
pub mod snippet;
