//! Snippet storage operations backed by redb.

mod helpers;

use crate::db::tables::*;
use crate::error::AppError;
use crate::models::snippet::{NewSnippet, OwnerId, Snippet};
use crate::store::{InsertOutcome, SnippetStore};
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;
use uuid::Uuid;

use self::helpers::{
    deserialize_snippet, micros_to_datetime, next_created_micros, owner_storage_keys,
    reverse_micros_key,
};

/// Accessor for snippet-related redb tables.
pub struct SnippetDb {
    db: Arc<redb::Database>,
}

impl SnippetDb {
    /// Initialize snippet tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(SNIPPETS)?;
        write_txn.open_table(SNIPPETS_BY_IDENTIFIER)?;
        write_txn.open_table(SNIPPETS_BY_OWNER)?;
        write_txn.open_table(STORE_META)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a snippet when its identifier is free and the owner is under quota.
    ///
    /// The identifier check, owner count, timestamp assignment and all three
    /// row writes share one write transaction. redb admits a single writer at
    /// a time, so two concurrent inserts cannot both pass the checks.
    ///
    /// # Arguments
    /// - `new`: Gateway-chosen fields.
    /// - `owner_quota`: Maximum live snippets for the owner.
    ///
    /// # Returns
    /// [`InsertOutcome::Inserted`] with the stored row, or the reason nothing
    /// was written.
    ///
    /// # Errors
    /// Returns an error when serialization or storage operations fail.
    pub fn insert(&self, new: &NewSnippet, owner_quota: usize) -> Result<InsertOutcome, AppError> {
        let write_txn = self.db.begin_write()?;
        let inserted = {
            let mut snippets = write_txn.open_table(SNIPPETS)?;
            let mut identifiers = write_txn.open_table(SNIPPETS_BY_IDENTIFIER)?;
            let mut owners = write_txn.open_table(SNIPPETS_BY_OWNER)?;
            let mut meta = write_txn.open_table(STORE_META)?;

            if identifiers.get(new.identifier.as_str())?.is_some() {
                return Ok(InsertOutcome::IdentifierTaken);
            }

            let used = owner_storage_keys(&owners, new.owner_id.as_str())?.len();
            if used >= owner_quota {
                return Ok(InsertOutcome::QuotaExceeded { used });
            }

            let last_micros = meta
                .get(LAST_CREATED_MICROS_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0);
            let created_micros = next_created_micros(Utc::now(), last_micros);

            let snippet = Snippet {
                storage_key: Uuid::new_v4().to_string(),
                identifier: new.identifier.clone(),
                content: new.content.clone(),
                visibility: new.visibility,
                owner_id: new.owner_id.as_str().to_string(),
                created_at: micros_to_datetime(created_micros)?,
            };
            let encoded = bincode::serialize(&snippet)?;
            let key = snippet.storage_key.as_str();

            snippets.insert(key, encoded.as_slice())?;
            identifiers.insert(snippet.identifier.as_str(), key)?;
            owners.insert(
                (
                    snippet.owner_id.as_str(),
                    reverse_micros_key(created_micros),
                    key,
                ),
                (),
            )?;
            meta.insert(LAST_CREATED_MICROS_KEY, created_micros)?;
            snippet
        };

        write_txn.commit()?;
        Ok(InsertOutcome::Inserted(inserted))
    }

    /// Fetch a snippet by public identifier.
    ///
    /// # Returns
    /// `Ok(Some(snippet))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn find_by_identifier(&self, identifier: &str) -> Result<Option<Snippet>, AppError> {
        let read_txn = self.db.begin_read()?;
        let identifiers = read_txn.open_table(SNIPPETS_BY_IDENTIFIER)?;
        let snippets = read_txn.open_table(SNIPPETS)?;

        let Some(key_guard) = identifiers.get(identifier)? else {
            return Ok(None);
        };
        let storage_key = key_guard.value();
        match snippets.get(storage_key)? {
            Some(value) => Ok(Some(deserialize_snippet(value.value())?)),
            None => {
                tracing::warn!(
                    "Identifier '{}' points at missing snippet row '{}'",
                    identifier,
                    storage_key
                );
                Ok(None)
            }
        }
    }

    /// List an owner's snippets newest first.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Snippet>, AppError> {
        let read_txn = self.db.begin_read()?;
        let owners = read_txn.open_table(SNIPPETS_BY_OWNER)?;
        let snippets = read_txn.open_table(SNIPPETS)?;

        let mut rows = Vec::new();
        for storage_key in owner_storage_keys(&owners, owner_id)? {
            let Some(value) = snippets.get(storage_key.as_str())? else {
                continue;
            };
            rows.push(deserialize_snippet(value.value())?);
        }
        Ok(rows)
    }

    /// Count an owner's live snippets.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn count_by_owner(&self, owner_id: &str) -> Result<usize, AppError> {
        let read_txn = self.db.begin_read()?;
        let owners = read_txn.open_table(SNIPPETS_BY_OWNER)?;
        Ok(owner_storage_keys(&owners, owner_id)?.len())
    }

    /// Delete a snippet and its index rows by storage key.
    ///
    /// # Returns
    /// `Ok(Some(snippet))` when deleted, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete(&self, storage_key: &str) -> Result<Option<Snippet>, AppError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut snippets = write_txn.open_table(SNIPPETS)?;
            let mut identifiers = write_txn.open_table(SNIPPETS_BY_IDENTIFIER)?;
            let mut owners = write_txn.open_table(SNIPPETS_BY_OWNER)?;

            let Some(old_guard) = snippets.get(storage_key)? else {
                return Ok(None);
            };
            let snippet = deserialize_snippet(old_guard.value())?;
            drop(old_guard);

            let created_micros = snippet.created_at.timestamp_micros().max(0) as u64;
            let _ = owners.remove((
                snippet.owner_id.as_str(),
                reverse_micros_key(created_micros),
                storage_key,
            ))?;

            let indexed_here = identifiers
                .get(snippet.identifier.as_str())?
                .map(|guard| guard.value() == storage_key)
                .unwrap_or(false);
            if indexed_here {
                let _ = identifiers.remove(snippet.identifier.as_str())?;
            }
            let _ = snippets.remove(storage_key)?;
            Some(snippet)
        };

        write_txn.commit()?;
        Ok(deleted)
    }
}

impl SnippetStore for SnippetDb {
    fn insert(&self, snippet: &NewSnippet, owner_quota: usize) -> Result<InsertOutcome, AppError> {
        SnippetDb::insert(self, snippet, owner_quota)
    }

    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Snippet>, AppError> {
        SnippetDb::find_by_identifier(self, identifier)
    }

    fn find_by_owner(&self, owner_id: &OwnerId) -> Result<Vec<Snippet>, AppError> {
        SnippetDb::find_by_owner(self, owner_id.as_str())
    }

    fn count_by_owner(&self, owner_id: &OwnerId) -> Result<usize, AppError> {
        SnippetDb::count_by_owner(self, owner_id.as_str())
    }

    fn delete(&self, storage_key: &str) -> Result<Option<Snippet>, AppError> {
        SnippetDb::delete(self, storage_key)
    }
}

#[cfg(test)]
mod tests;
