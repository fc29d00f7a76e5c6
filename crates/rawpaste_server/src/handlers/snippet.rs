//! Owner-scoped snippet HTTP handlers.

use crate::{error::HttpError, AppState};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use rawpaste_core::{
    models::snippet::{QuotaStatus, SnippetSummary, SubmitSnippetRequest, SubmitSnippetResponse},
    GatewayError,
};

/// Path under which a submitted identifier is served.
pub fn raw_path(identifier: &str) -> String {
    format!("/raw/{}", identifier)
}

/// Submit a new snippet for the requesting owner.
///
/// # Arguments
/// - `state`: Application state.
/// - `headers`: Request headers carrying the owner identity.
/// - `req`: Submission payload.
///
/// # Returns
/// The issued identifier and its raw path.
///
/// # Errors
/// Returns an error when the caller is anonymous, the content is blank or
/// oversized, the owner is at quota, or no identifier could be allocated.
pub async fn submit_snippet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitSnippetRequest>,
) -> Result<Json<SubmitSnippetResponse>, HttpError> {
    // Anonymous callers are rejected before the body is looked at.
    let Some(owner) = state.identity.current_owner_id(&headers) else {
        return Err(GatewayError::Unauthenticated.into());
    };

    if req.content.len() > state.config.max_snippet_size {
        return Err(HttpError::bad_request(format!(
            "Snippet size exceeds maximum of {} bytes",
            state.config.max_snippet_size
        )));
    }

    let identifier = state.gateway.submit(
        Some(&owner),
        req.content,
        req.visibility.unwrap_or_default(),
    )?;

    Ok(Json(SubmitSnippetResponse {
        raw_path: raw_path(&identifier),
        identifier,
    }))
}

/// List the requesting owner's snippets, newest first.
///
/// # Errors
/// Returns an error when the caller is anonymous or the store fails.
pub async fn list_snippets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<SnippetSummary>>, HttpError> {
    let owner = state.identity.current_owner_id(&headers);
    Ok(Json(state.gateway.list(owner.as_ref())?))
}

/// Delete one of the requesting owner's snippets.
///
/// # Arguments
/// - `state`: Application state.
/// - `identifier`: Snippet identifier from the path.
/// - `headers`: Request headers carrying the owner identity.
///
/// # Returns
/// `{"success": true}` when the snippet was removed.
///
/// # Errors
/// Returns an error when the caller is anonymous, does not own the
/// snippet, or the snippet does not exist.
pub async fn delete_snippet(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, HttpError> {
    let owner = state.identity.current_owner_id(&headers);
    state.gateway.delete(owner.as_ref(), &identifier)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Report quota usage for the requesting owner.
///
/// # Errors
/// Returns an error when the caller is anonymous or the store fails.
pub async fn get_quota(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QuotaStatus>, HttpError> {
    let owner = state.identity.current_owner_id(&headers);
    Ok(Json(state.gateway.quota(owner.as_ref())?))
}
