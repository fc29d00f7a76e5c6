//! Snippet store collaborator interface consumed by the gateway.

use crate::error::AppError;
use crate::models::snippet::{NewSnippet, OwnerId, Snippet};

/// Result of an atomic insert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row committed; carries the store-assigned key and timestamp.
    Inserted(Snippet),
    /// Another live snippet already holds the identifier. Nothing was written.
    IdentifierTaken,
    /// The owner already holds `used` snippets, at or above the quota. Nothing was written.
    QuotaExceeded { used: usize },
}

/// Durable snippet persistence with equality lookups.
///
/// `insert` must check identifier absence and the owner's count in the same
/// atomic step as the write.
pub trait SnippetStore: Send + Sync {
    /// Insert `snippet` if its identifier is free and the owner holds fewer
    /// than `owner_quota` snippets.
    fn insert(&self, snippet: &NewSnippet, owner_quota: usize) -> Result<InsertOutcome, AppError>;

    /// Look up a snippet by its public identifier.
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Snippet>, AppError>;

    /// All snippets of `owner_id`, newest first.
    fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Snippet>, AppError>;

    /// Number of live snippets held by `owner_id`.
    fn count_by_owner(&self, owner_id: &OwnerId) -> Result<usize, AppError>;

    /// Remove a snippet by storage key.
    ///
    /// # Returns
    /// The removed row, or `None` when no row had that key.
    fn delete(&self, storage_key: &str) -> Result<Option<Snippet>, AppError>;

    /// Whether `identifier` is currently in use.
    fn identifier_exists(&self, identifier: &str) -> Result<bool, AppError> {
        Ok(self.find_by_identifier(identifier)?.is_some())
    }
}
