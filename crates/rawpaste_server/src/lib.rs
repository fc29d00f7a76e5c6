//! HTTP server wiring for RawPaste (API, raw delivery, and shared state).

/// Requester classification from transport headers.
pub mod classifier;
/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers for snippet and raw endpoints.
pub mod handlers;
/// Owner identity resolution from transport headers.
pub mod identity;

pub use classifier::{RequesterClassifier, UserAgentClassifier};
pub use identity::{IdentityProvider, TrustedHeaderIdentity};
pub use rawpaste_core::{
    config, db, models, AppError, Config, Database, GatewayError, InsertOutcome, SnippetGateway,
    SnippetStore, DEFAULT_PORT,
};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{any, delete, get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'; base-uri 'none'; form-action 'none'";

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<SnippetGateway>,
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityProvider>,
    pub classifier: Arc<dyn RequesterClassifier>,
}

impl AppState {
    /// Construct shared application state backed by `db`.
    ///
    /// Uses the trusted-header identity provider and the user-agent
    /// classifier configured from `config`.
    pub fn new(config: Config, db: Database) -> Self {
        let identity = Arc::new(TrustedHeaderIdentity::from_config(&config));
        Self::with_collaborators(
            config,
            Arc::new(db.snippets),
            identity,
            Arc::new(UserAgentClassifier::default()),
        )
    }

    /// Construct shared application state from explicit collaborators.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `store`: Snippet store.
    /// - `identity`: Owner identity provider.
    /// - `classifier`: Requester classifier for the raw path.
    pub fn with_collaborators(
        config: Config,
        store: Arc<dyn SnippetStore>,
        identity: Arc<dyn IdentityProvider>,
        classifier: Arc<dyn RequesterClassifier>,
    ) -> Self {
        let gateway = SnippetGateway::from_config(store, &config);
        Self {
            gateway: Arc::new(gateway),
            config: Arc::new(config),
            identity,
            classifier,
        }
    }
}

/// Create the application router with all routes and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let cors_port = state.config.port;
    create_app_with_cors_port(state, allow_public_access, cors_port)
}

/// Resolve the listener address from env var overrides and security policy.
///
/// # Returns
/// A validated socket address that enforces loopback when public access is disabled.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match std::env::var(rawpaste_core::env::BIND) {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

fn cors_layer(allow_public_access: bool, cors_port: u16) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE];
    if allow_public_access {
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any);
    }

    let local_origins: Vec<HeaderValue> = [
        format!("http://localhost:{}", cors_port),
        format!("http://127.0.0.1:{}", cors_port),
    ]
    .into_iter()
    .filter_map(|origin| HeaderValue::from_str(&origin).ok())
    .collect();

    CorsLayer::new()
        .allow_origin(local_origins)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

fn create_app_with_cors_port(state: AppState, allow_public_access: bool, cors_port: u16) -> Router {
    let body_limit = state.config.max_snippet_size;

    Router::new()
        .route("/api/snippet", post(handlers::snippet::submit_snippet))
        .route(
            "/api/snippet/:identifier",
            delete(handlers::snippet::delete_snippet),
        )
        .route("/api/snippets", get(handlers::snippet::list_snippets))
        .route("/api/quota", get(handlers::snippet::get_quota))
        .route("/raw/:identifier", any(handlers::raw::get_raw))
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                // JSON framing adds a little on top of the content itself.
                .layer(DefaultBodyLimit::max(body_limit.saturating_add(64 * 1024)))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(allow_public_access, cors_port))
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(CONTENT_SECURITY_POLICY),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                )),
        )
}

fn listener_cors_port(listener: &tokio::net::TcpListener, fallback_port: u16) -> u16 {
    listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(fallback_port)
}

/// Run the Axum server with graceful shutdown support.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let cors_port = listener_cors_port(&listener, state.config.port);
    let app = create_app_with_cors_port(state, allow_public_access, cors_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
