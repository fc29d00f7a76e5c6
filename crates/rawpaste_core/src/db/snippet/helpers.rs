//! Helper functions shared by snippet storage operations.

use crate::error::AppError;
use crate::models::snippet::Snippet;
use chrono::{DateTime, Utc};
use redb::ReadableTable;

pub(crate) fn deserialize_snippet(bytes: &[u8]) -> Result<Snippet, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Key component that sorts newer timestamps first.
pub(crate) fn reverse_micros_key(created_micros: u64) -> u64 {
    u64::MAX.saturating_sub(created_micros)
}

/// Next creation timestamp: wall clock, but strictly after `last_micros`.
pub(crate) fn next_created_micros(now: DateTime<Utc>, last_micros: u64) -> u64 {
    // Pre-epoch clocks are clamped to keep the u64 ordering well defined.
    let now_micros = now.timestamp_micros().max(0) as u64;
    now_micros.max(last_micros.saturating_add(1))
}

pub(crate) fn micros_to_datetime(micros: u64) -> Result<DateTime<Utc>, AppError> {
    i64::try_from(micros)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .ok_or_else(|| {
            AppError::StorageMessage(format!("Creation timestamp {} is out of range", micros))
        })
}

/// Storage keys of `owner_id` in index order (newest first).
pub(super) fn owner_storage_keys<T>(owners: &T, owner_id: &str) -> Result<Vec<String>, AppError>
where
    T: ReadableTable<(&'static str, u64, &'static str), ()>,
{
    let mut keys = Vec::new();
    for item in owners.range((owner_id, 0u64, "")..)? {
        let (key, _) = item?;
        let (row_owner, _, storage_key) = key.value();
        if row_owner != owner_id {
            break;
        }
        keys.push(storage_key.to_string());
    }
    Ok(keys)
}
