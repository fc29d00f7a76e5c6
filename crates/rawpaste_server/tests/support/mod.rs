//! Shared integration-test server bootstrap helpers.

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use rawpaste_server::{create_app, AppState, Config, Database};
use std::path::Path;
use tempfile::TempDir;

pub(crate) const OWNER_HEADER: &str = "x-rawpaste-owner";
pub(crate) const BROWSER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
pub(crate) const TOOL_AGENT: &str = "curl/8.4.0";

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    Config {
        port: 0,
        db_path: db_path.to_str().expect("db path").to_string(),
        max_snippet_size: 10_000,
        max_snippets_per_owner: 10,
        identifier_length: 12,
        identifier_max_attempts: 5,
        interstitial_prefix: "/raw/check".to_string(),
        owner_header: OWNER_HEADER.to_string(),
    }
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let db = Database::new(config.db_path.as_str()).expect("open db");
    let state = AppState::new(config, db);
    test_server_for_state(state)
}

pub(crate) fn test_server_for_state(state: AppState) -> TestServer {
    let app = create_app(state, false);
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_test_server_with(configure: impl FnOnce(&mut Config)) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let mut config = test_config_for_db_path(&db_path);
    configure(&mut config);
    let server = test_server_for_config(config);
    (server, temp_dir)
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    setup_test_server_with(|_| {})
}

pub(crate) fn as_owner(request: TestRequest, name: &str) -> TestRequest {
    request.add_header(
        HeaderName::from_static(OWNER_HEADER),
        HeaderValue::from_str(name).expect("owner header value"),
    )
}

pub(crate) fn with_agent(request: TestRequest, agent: &'static str) -> TestRequest {
    request.add_header(
        axum::http::header::USER_AGENT,
        HeaderValue::from_static(agent),
    )
}
