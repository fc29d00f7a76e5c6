//! Snippet submission, retrieval and owner-scoped management.

use crate::config::Config;
pub use crate::error::GatewayError;
use crate::identifier::{is_valid_identifier, AllocationError, IdentifierAllocator};
use crate::models::snippet::{
    NewSnippet, OwnerId, QuotaStatus, RawContent, RequesterClass, Retrieval, SnippetSummary,
    Visibility,
};
use crate::store::{InsertOutcome, SnippetStore};
use std::sync::Arc;

/// Request-handling logic over a shared snippet store.
///
/// Holds no per-request state; one instance serves all requests concurrently.
#[derive(Clone)]
pub struct SnippetGateway {
    store: Arc<dyn SnippetStore>,
    allocator: IdentifierAllocator,
    max_per_owner: usize,
    interstitial_prefix: String,
}

fn require_owner(owner_id: Option<&OwnerId>) -> Result<&OwnerId, GatewayError> {
    owner_id.ok_or(GatewayError::Unauthenticated)
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

impl SnippetGateway {
    /// Build a gateway.
    ///
    /// # Arguments
    /// - `store`: Snippet store collaborator.
    /// - `allocator`: Identifier allocator (length and attempt bound).
    /// - `max_per_owner`: Live snippet quota per owner.
    /// - `interstitial_prefix`: Path browsers are redirected under.
    pub fn new(
        store: Arc<dyn SnippetStore>,
        allocator: IdentifierAllocator,
        max_per_owner: usize,
        interstitial_prefix: impl Into<String>,
    ) -> Self {
        let prefix = interstitial_prefix.into();
        Self {
            store,
            allocator,
            max_per_owner,
            interstitial_prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Build a gateway from runtime configuration.
    pub fn from_config(store: Arc<dyn SnippetStore>, config: &Config) -> Self {
        Self::new(
            store,
            IdentifierAllocator::new(config.identifier_length, config.identifier_max_attempts),
            config.max_snippets_per_owner,
            config.interstitial_prefix.clone(),
        )
    }

    /// Interstitial location for `identifier`.
    pub fn interstitial_location(&self, identifier: &str) -> String {
        format!(
            "{}/{}",
            self.interstitial_prefix,
            encode_path_segment(identifier)
        )
    }

    /// Publish a snippet and return its identifier.
    ///
    /// # Arguments
    /// - `owner_id`: Authenticated owner, if any.
    /// - `content`: Snippet body, stored as given.
    /// - `visibility`: Public or private.
    ///
    /// # Returns
    /// The newly issued identifier.
    ///
    /// # Errors
    /// - [`GatewayError::Unauthenticated`] without an owner.
    /// - [`GatewayError::EmptyContent`] when `content` is blank.
    /// - [`GatewayError::QuotaExceeded`] when the owner is at quota.
    /// - [`GatewayError::AllocationExhausted`] when no free identifier was found.
    /// - [`GatewayError::StoreFailure`] for any store error.
    pub fn submit(
        &self,
        owner_id: Option<&OwnerId>,
        content: String,
        visibility: Visibility,
    ) -> Result<String, GatewayError> {
        let owner_id = require_owner(owner_id)?;
        if content.trim().is_empty() {
            return Err(GatewayError::EmptyContent);
        }

        let used = self.store.count_by_owner(owner_id)?;
        if QuotaStatus::new(used, self.max_per_owner).is_full() {
            return Err(GatewayError::QuotaExceeded {
                limit: self.max_per_owner,
            });
        }

        let mut new_snippet = NewSnippet {
            identifier: String::new(),
            content,
            visibility,
            owner_id: owner_id.clone(),
        };

        // The lookup inside allocation can race another writer; the store's
        // insert is the authoritative check, so a lost race re-allocates.
        for _ in 0..self.allocator.max_attempts() {
            new_snippet.identifier = self.allocate_identifier()?;
            match self.store.insert(&new_snippet, self.max_per_owner)? {
                InsertOutcome::Inserted(snippet) => {
                    tracing::info!(
                        owner = %owner_id,
                        identifier = %snippet.identifier,
                        visibility = ?snippet.visibility,
                        "snippet submitted"
                    );
                    return Ok(snippet.identifier);
                }
                InsertOutcome::IdentifierTaken => {
                    tracing::debug!(
                        identifier = %new_snippet.identifier,
                        "identifier claimed concurrently; re-allocating"
                    );
                }
                InsertOutcome::QuotaExceeded { .. } => {
                    return Err(GatewayError::QuotaExceeded {
                        limit: self.max_per_owner,
                    });
                }
            }
        }

        Err(GatewayError::AllocationExhausted {
            attempts: self.allocator.max_attempts(),
        })
    }

    fn allocate_identifier(&self) -> Result<String, GatewayError> {
        self.allocator
            .allocate(|candidate| self.store.identifier_exists(candidate))
            .map_err(|err| match err {
                AllocationError::Exhausted { attempts } => {
                    GatewayError::AllocationExhausted { attempts }
                }
                AllocationError::Lookup(err) => GatewayError::StoreFailure(err),
            })
    }

    /// Resolve a retrieval request.
    ///
    /// Interactive callers are redirected to the interstitial location
    /// without touching the store. Programmatic callers receive raw content
    /// for public snippets only; `owner_authenticated` does not change the
    /// outcome because this path never authenticates.
    ///
    /// # Errors
    /// [`GatewayError::NotFound`], [`GatewayError::Forbidden`], or
    /// [`GatewayError::StoreFailure`].
    pub fn retrieve(
        &self,
        identifier: &str,
        requester: RequesterClass,
        owner_authenticated: bool,
    ) -> Result<Retrieval, GatewayError> {
        if requester == RequesterClass::Interactive {
            return Ok(Retrieval::Redirect {
                location: self.interstitial_location(identifier),
            });
        }

        if !is_valid_identifier(identifier) {
            return Err(GatewayError::NotFound);
        }
        let snippet = self
            .store
            .find_by_identifier(identifier)?
            .ok_or(GatewayError::NotFound)?;

        match snippet.visibility {
            Visibility::Private => {
                tracing::debug!(
                    identifier,
                    owner_authenticated,
                    "refused raw read of private snippet"
                );
                Err(GatewayError::Forbidden)
            }
            Visibility::Public => Ok(Retrieval::Raw(RawContent::plain_text(snippet.content))),
        }
    }

    /// List the owner's snippets, newest first.
    ///
    /// # Errors
    /// [`GatewayError::Unauthenticated`] or [`GatewayError::StoreFailure`].
    pub fn list(&self, owner_id: Option<&OwnerId>) -> Result<Vec<SnippetSummary>, GatewayError> {
        let owner_id = require_owner(owner_id)?;
        Ok(self
            .store
            .find_by_owner(owner_id)?
            .into_iter()
            .map(SnippetSummary::from)
            .collect())
    }

    /// Delete one of the owner's snippets by identifier.
    ///
    /// # Errors
    /// - [`GatewayError::Unauthenticated`] without an owner.
    /// - [`GatewayError::NotFound`] when no snippet has `identifier`
    ///   (including repeated deletes).
    /// - [`GatewayError::NotOwner`] when the snippet belongs to someone else.
    pub fn delete(&self, owner_id: Option<&OwnerId>, identifier: &str) -> Result<(), GatewayError> {
        let owner_id = require_owner(owner_id)?;
        let snippet = self
            .store
            .find_by_identifier(identifier)?
            .ok_or(GatewayError::NotFound)?;
        if snippet.owner_id != owner_id.as_str() {
            return Err(GatewayError::NotOwner);
        }

        match self.store.delete(&snippet.storage_key)? {
            Some(_) => {
                tracing::info!(owner = %owner_id, identifier, "snippet deleted");
                Ok(())
            }
            None => Err(GatewayError::NotFound),
        }
    }

    /// Report the owner's quota usage.
    ///
    /// # Errors
    /// [`GatewayError::Unauthenticated`] or [`GatewayError::StoreFailure`].
    pub fn quota(&self, owner_id: Option<&OwnerId>) -> Result<QuotaStatus, GatewayError> {
        let owner_id = require_owner(owner_id)?;
        let used = self.store.count_by_owner(owner_id)?;
        Ok(QuotaStatus::new(used, self.max_per_owner))
    }
}
