//! Raw delivery of snippet content.

use crate::{error::HttpError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use rawpaste_core::{
    models::snippet::{Retrieval, RAW_MIME_TYPE},
    GatewayError,
};

/// Plain-text body for an unknown identifier.
pub const RAW_NOT_FOUND_BODY: &str = "Not Found";
/// Plain-text body for a private snippet.
pub const RAW_FORBIDDEN_BODY: &str = "Forbidden: This code is private.";

fn plain_text(status: StatusCode, body: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, RAW_MIME_TYPE)],
        body,
    )
        .into_response()
}

/// `405` for anything but GET on the raw path, HEAD included.
fn raw_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET"), (header::CONTENT_TYPE, RAW_MIME_TYPE)],
        "Method Not Allowed",
    )
        .into_response()
}

/// Serve a snippet body, or redirect browsers to the interstitial page.
///
/// # Arguments
/// - `method`: Request method; only GET is served.
/// - `state`: Application state.
/// - `identifier`: Snippet identifier from the path.
/// - `headers`: Request headers used for classification and identity.
///
/// # Returns
/// `200` with the exact stored bytes as `text/plain`, or `302` with a
/// `Location` header for interactive callers.
///
/// # Errors
/// Denials are rendered as plain text (`403`, `404`); store failures use
/// the JSON error shape.
pub async fn get_raw(
    method: Method,
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    if method != Method::GET {
        return Ok(raw_method_not_allowed());
    }

    let requester = state.classifier.classify(&headers);
    let owner_authenticated = state.identity.current_owner_id(&headers).is_some();

    match state
        .gateway
        .retrieve(&identifier, requester, owner_authenticated)
    {
        Ok(Retrieval::Redirect { location }) => {
            Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
        }
        Ok(Retrieval::Raw(raw)) => {
            let mut response =
                (StatusCode::OK, [(header::CONTENT_TYPE, raw.mime_type)], raw.content)
                    .into_response();
            if raw.nosniff {
                response.headers_mut().insert(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                );
            }
            Ok(response)
        }
        Err(GatewayError::NotFound) => Ok(plain_text(StatusCode::NOT_FOUND, RAW_NOT_FOUND_BODY)),
        Err(GatewayError::Forbidden) => {
            Ok(plain_text(StatusCode::FORBIDDEN, RAW_FORBIDDEN_BODY))
        }
        Err(err) => Err(err.into()),
    }
}
