//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical snippet rows keyed by storage key (`Snippet`, bincode-encoded).
pub const SNIPPETS: TableDefinition<&str, &[u8]> = TableDefinition::new("snippets");
/// Public identifier to storage key.
pub const SNIPPETS_BY_IDENTIFIER: TableDefinition<&str, &str> =
    TableDefinition::new("snippets_by_identifier");
/// Owner index ordered by owner, reverse-micros, then storage key.
pub const SNIPPETS_BY_OWNER: TableDefinition<(&str, u64, &str), ()> =
    TableDefinition::new("snippets_by_owner");
/// Store-wide counters.
pub const STORE_META: TableDefinition<&str, u64> = TableDefinition::new("store_meta");

/// `STORE_META` key holding the last assigned `created_at` in micros.
pub const LAST_CREATED_MICROS_KEY: &str = "last_created_micros";
