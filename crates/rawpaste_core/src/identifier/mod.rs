//! Short identifier generation with bounded collision handling.

use crate::constants::{
    DEFAULT_IDENTIFIER_LENGTH, DEFAULT_IDENTIFIER_MAX_ATTEMPTS, IDENTIFIER_ALPHABET,
    MAX_IDENTIFIER_LENGTH, MIN_IDENTIFIER_LENGTH,
};
use crate::error::AppError;
use rand::Rng;
use thiserror::Error;

/// Why an allocation produced no identifier.
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("identifier space exhausted after {attempts} attempts")]
    Exhausted { attempts: usize },

    #[error(transparent)]
    Lookup(#[from] AppError),
}

/// Clamp a requested identifier length into the supported range.
pub fn clamp_length(desired_length: usize) -> usize {
    desired_length.clamp(MIN_IDENTIFIER_LENGTH, MAX_IDENTIFIER_LENGTH)
}

/// Check whether `candidate` has the shape of an issued identifier.
///
/// # Returns
/// `true` for 2 to 20 characters drawn from `[a-z0-9]`.
pub fn is_valid_identifier(candidate: &str) -> bool {
    (MIN_IDENTIFIER_LENGTH..=MAX_IDENTIFIER_LENGTH).contains(&candidate.len())
        && candidate
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Issues short identifiers that are absent from a shared namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierAllocator {
    length: usize,
    max_attempts: usize,
}

impl Default for IdentifierAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTIFIER_LENGTH, DEFAULT_IDENTIFIER_MAX_ATTEMPTS)
    }
}

impl IdentifierAllocator {
    /// Build an allocator.
    ///
    /// # Arguments
    /// - `desired_length`: Identifier length, clamped to `[2, 20]`.
    /// - `max_attempts`: Consecutive collisions tolerated; `0` behaves as `1`.
    pub fn new(desired_length: usize, max_attempts: usize) -> Self {
        Self {
            length: clamp_length(desired_length),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Generate one candidate from `rng` without any namespace check.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.length)
            .map(|_| {
                let index = rng.gen_range(0..IDENTIFIER_ALPHABET.len());
                char::from(IDENTIFIER_ALPHABET[index])
            })
            .collect()
    }

    /// Allocate an identifier using the thread-local RNG.
    ///
    /// See [`IdentifierAllocator::allocate_with`].
    pub fn allocate<F>(&self, exists_check: F) -> Result<String, AllocationError>
    where
        F: FnMut(&str) -> Result<bool, AppError>,
    {
        self.allocate_with(&mut rand::thread_rng(), exists_check)
    }

    /// Allocate an identifier that `exists_check` reports as unused.
    ///
    /// # Arguments
    /// - `rng`: Random source for candidates.
    /// - `exists_check`: Equality lookup against the identifier namespace.
    ///
    /// # Returns
    /// The first candidate not already in use.
    ///
    /// # Errors
    /// [`AllocationError::Exhausted`] after `max_attempts` consecutive
    /// collisions, or [`AllocationError::Lookup`] when the lookup fails.
    pub fn allocate_with<R, F>(
        &self,
        rng: &mut R,
        mut exists_check: F,
    ) -> Result<String, AllocationError>
    where
        R: Rng + ?Sized,
        F: FnMut(&str) -> Result<bool, AppError>,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generate_with(rng);
            if !exists_check(&candidate)? {
                return Ok(candidate);
            }
            tracing::debug!(
                attempt,
                max_attempts = self.max_attempts,
                "identifier candidate collided"
            );
        }

        tracing::warn!(
            length = self.length,
            attempts = self.max_attempts,
            "identifier allocation exhausted"
        );
        Err(AllocationError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}
