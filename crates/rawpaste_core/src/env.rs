//! Environment variable names read by RawPaste, plus a scoped override used
//! by tests that exercise env-driven configuration.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

pub const DB_PATH: &str = "DB_PATH";
pub const PORT: &str = "PORT";
pub const MAX_SNIPPET_SIZE: &str = "MAX_SNIPPET_SIZE";
pub const MAX_SNIPPETS_PER_OWNER: &str = "MAX_SNIPPETS_PER_OWNER";
pub const IDENTIFIER_LENGTH: &str = "IDENTIFIER_LENGTH";
pub const IDENTIFIER_MAX_ATTEMPTS: &str = "IDENTIFIER_MAX_ATTEMPTS";
pub const INTERSTITIAL_PREFIX: &str = "INTERSTITIAL_PREFIX";
pub const OWNER_HEADER: &str = "OWNER_HEADER";
/// Listener address override for the server binary.
pub const BIND: &str = "BIND";
/// Opt-in for non-loopback binds and permissive CORS.
pub const ALLOW_PUBLIC_ACCESS: &str = "ALLOW_PUBLIC_ACCESS";

/// Every variable [`crate::Config::from_env`] reads.
pub const CONFIG_VARS: [&str; 8] = [
    DB_PATH,
    PORT,
    MAX_SNIPPET_SIZE,
    MAX_SNIPPETS_PER_OWNER,
    IDENTIFIER_LENGTH,
    IDENTIFIER_MAX_ATTEMPTS,
    INTERSTITIAL_PREFIX,
    OWNER_HEADER,
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: every writer holds the lock owned by `EnvScope`.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Exclusive, self-restoring view of the process environment.
///
/// Holds a process-wide lock for its lifetime so parallel tests never see
/// each other's overrides. Every variable touched through the scope is put
/// back to its original value on drop.
pub struct EnvScope {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvScope {
    /// Take the lock without touching any variable.
    pub fn new() -> Self {
        Self {
            saved: Vec::new(),
            _lock: env_lock().lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Take the lock and unset every configuration variable, so
    /// `Config::from_env` sees only what the caller sets afterwards.
    pub fn clean_config() -> Self {
        let mut scope = Self::new();
        scope.clear_config();
        scope
    }

    /// Unset every configuration variable within this scope.
    pub fn clear_config(&mut self) -> &mut Self {
        for key in CONFIG_VARS {
            self.remove(key);
        }
        self
    }

    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.remember(key);
        write_var(key, Some(value));
        self
    }

    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.remember(key);
        write_var(key, None);
        self
    }

    fn remember(&mut self, key: &str) {
        if self.saved.iter().all(|(saved, _)| saved != key) {
            self.saved.push((key.to_string(), std::env::var(key).ok()));
        }
    }
}

impl Default for EnvScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            write_var(&key, previous.as_deref());
        }
    }
}
