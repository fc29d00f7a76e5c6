//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_IDENTIFIER_LENGTH, DEFAULT_IDENTIFIER_MAX_ATTEMPTS, DEFAULT_INTERSTITIAL_PREFIX,
    DEFAULT_MAX_SNIPPETS_PER_OWNER, DEFAULT_MAX_SNIPPET_SIZE, DEFAULT_OWNER_HEADER, DEFAULT_PORT,
};
use crate::env::{
    DB_PATH, IDENTIFIER_LENGTH, IDENTIFIER_MAX_ATTEMPTS, INTERSTITIAL_PREFIX, MAX_SNIPPETS_PER_OWNER,
    MAX_SNIPPET_SIZE, OWNER_HEADER, PORT,
};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration for RawPaste.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_snippet_size: usize,
    pub max_snippets_per_owner: usize,
    pub identifier_length: usize,
    pub identifier_max_attempts: usize,
    pub interstitial_prefix: String,
    pub owner_header: String,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_non_empty(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Strip trailing slashes so `prefix/identifier` joins cleanly.
fn normalize_prefix(prefix: String) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_INTERSTITIAL_PREFIX.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var(DB_PATH).map(expand_tilde).unwrap_or_else(|_| {
                let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                let cache_dir = home.join(".cache").join("rawpaste");
                cache_dir.join("db").to_string_lossy().to_string()
            }),
            port: env_parsed(PORT, DEFAULT_PORT),
            max_snippet_size: env_parsed(MAX_SNIPPET_SIZE, DEFAULT_MAX_SNIPPET_SIZE),
            max_snippets_per_owner: env_parsed(
                MAX_SNIPPETS_PER_OWNER,
                DEFAULT_MAX_SNIPPETS_PER_OWNER,
            ),
            identifier_length: env_parsed(IDENTIFIER_LENGTH, DEFAULT_IDENTIFIER_LENGTH),
            identifier_max_attempts: env_parsed(
                IDENTIFIER_MAX_ATTEMPTS,
                DEFAULT_IDENTIFIER_MAX_ATTEMPTS,
            ),
            interstitial_prefix: normalize_prefix(env_non_empty(
                INTERSTITIAL_PREFIX,
                DEFAULT_INTERSTITIAL_PREFIX,
            )),
            owner_header: env_non_empty(OWNER_HEADER, DEFAULT_OWNER_HEADER)
                .to_ascii_lowercase(),
        }
    }
}
