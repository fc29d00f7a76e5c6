//! Shared constants used across RawPaste crates.

/// Default API port for RawPaste.
pub const DEFAULT_PORT: u16 = 38412;

/// Default maximum snippet size accepted by the API layer.
pub const DEFAULT_MAX_SNIPPET_SIZE: usize = 10 * 1024 * 1024;

/// Default number of live snippets a single owner may keep.
pub const DEFAULT_MAX_SNIPPETS_PER_OWNER: usize = 10;

/// Identifier alphabet: lowercase ASCII letters followed by digits.
pub const IDENTIFIER_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";
/// Shortest identifier the allocator will issue.
pub const MIN_IDENTIFIER_LENGTH: usize = 2;
/// Longest identifier the allocator will issue.
pub const MAX_IDENTIFIER_LENGTH: usize = 20;
/// Identifier length used when none is configured.
pub const DEFAULT_IDENTIFIER_LENGTH: usize = 12;
/// Consecutive collisions tolerated before allocation gives up.
pub const DEFAULT_IDENTIFIER_MAX_ATTEMPTS: usize = 5;

/// Path prefix browsers are redirected to instead of receiving raw content.
pub const DEFAULT_INTERSTITIAL_PREFIX: &str = "/raw/check";

/// Request header carrying the owner id set by the authenticating proxy.
pub const DEFAULT_OWNER_HEADER: &str = "x-rawpaste-owner";

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:38412";
