//! HTTP behavior with substituted store, identity and classifier collaborators.

mod support;

use axum::http::{HeaderMap, StatusCode};
use rawpaste_server::models::snippet::{NewSnippet, OwnerId, RequesterClass, Snippet, Visibility};
use rawpaste_server::{
    AppError, AppState, IdentityProvider, InsertOutcome, RequesterClassifier, SnippetStore,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use support::{test_config_for_db_path, test_server_for_state};

/// Store in which every identifier is already taken.
#[derive(Default)]
struct SaturatedStore {
    lookups: AtomicUsize,
}

impl SnippetStore for SaturatedStore {
    fn insert(
        &self,
        _snippet: &NewSnippet,
        _owner_quota: usize,
    ) -> Result<InsertOutcome, AppError> {
        Ok(InsertOutcome::IdentifierTaken)
    }

    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Snippet>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Snippet {
            storage_key: format!("key-{}", identifier),
            identifier: identifier.to_string(),
            content: "occupied".to_string(),
            visibility: Visibility::Public,
            owner_id: "someone".to_string(),
            created_at: chrono::Utc::now(),
        }))
    }

    fn find_by_owner(&self, _owner_id: &OwnerId) -> Result<Vec<Snippet>, AppError> {
        Ok(Vec::new())
    }

    fn count_by_owner(&self, _owner_id: &OwnerId) -> Result<usize, AppError> {
        Ok(0)
    }

    fn delete(&self, _storage_key: &str) -> Result<Option<Snippet>, AppError> {
        Ok(None)
    }
}

/// Store whose every call fails.
struct BrokenStore;

impl SnippetStore for BrokenStore {
    fn insert(
        &self,
        _snippet: &NewSnippet,
        _owner_quota: usize,
    ) -> Result<InsertOutcome, AppError> {
        Err(AppError::StorageMessage("disk unavailable".to_string()))
    }

    fn find_by_identifier(&self, _identifier: &str) -> Result<Option<Snippet>, AppError> {
        Err(AppError::StorageMessage("disk unavailable".to_string()))
    }

    fn find_by_owner(&self, _owner_id: &OwnerId) -> Result<Vec<Snippet>, AppError> {
        Err(AppError::StorageMessage("disk unavailable".to_string()))
    }

    fn count_by_owner(&self, _owner_id: &OwnerId) -> Result<usize, AppError> {
        Err(AppError::StorageMessage("disk unavailable".to_string()))
    }

    fn delete(&self, _storage_key: &str) -> Result<Option<Snippet>, AppError> {
        Err(AppError::StorageMessage("disk unavailable".to_string()))
    }
}

struct FixedOwner(&'static str);

impl IdentityProvider for FixedOwner {
    fn current_owner_id(&self, _headers: &HeaderMap) -> Option<OwnerId> {
        OwnerId::new(self.0)
    }
}

struct AlwaysInteractive;

impl RequesterClassifier for AlwaysInteractive {
    fn classify(&self, _headers: &HeaderMap) -> RequesterClass {
        RequesterClass::Interactive
    }
}

struct AlwaysProgrammatic;

impl RequesterClassifier for AlwaysProgrammatic {
    fn classify(&self, _headers: &HeaderMap) -> RequesterClass {
        RequesterClass::Programmatic
    }
}

fn state_with(
    store: Arc<dyn SnippetStore>,
    classifier: Arc<dyn RequesterClassifier>,
) -> (AppState, tempfile::TempDir) {
    let temp_dir = tempfile::TempDir::new().expect("temp dir");
    let config = test_config_for_db_path(&temp_dir.path().join("unused"));
    let state =
        AppState::with_collaborators(config, store, Arc::new(FixedOwner("alice")), classifier);
    (state, temp_dir)
}

#[tokio::test]
async fn test_exhausted_allocation_returns_service_unavailable() {
    let store = Arc::new(SaturatedStore::default());
    let (state, _temp) = state_with(store.clone(), Arc::new(AlwaysProgrammatic));
    let server = test_server_for_state(state);

    let response = server
        .post("/api/snippet")
        .json(&json!({ "content": "cannot land" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    response.assert_header("retry-after", "1");
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("5 attempts"));
    assert_eq!(store.lookups.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_store_failure_returns_internal_error_without_detail() {
    let (state, _temp) = state_with(Arc::new(BrokenStore), Arc::new(AlwaysProgrammatic));
    let server = test_server_for_state(state);

    let submit = server
        .post("/api/snippet")
        .json(&json!({ "content": "body" }))
        .await;
    assert_eq!(submit.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = submit.json();
    assert_eq!(body["error"], "Internal server error");

    let raw = server.get("/raw/abcdef").await;
    assert_eq!(raw.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_interactive_classifier_redirects_without_store_access() {
    let (state, _temp) = state_with(Arc::new(BrokenStore), Arc::new(AlwaysInteractive));
    let server = test_server_for_state(state);

    let response = server.get("/raw/abcdef").await;
    assert_eq!(response.status_code(), StatusCode::FOUND);
    response.assert_header("location", "/raw/check/abcdef");
}
