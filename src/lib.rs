use std::{any::Any, net::SocketAddr, time::Duration};

use axum::{
    Router,
    extract::{ConnectInfo, FromRef, Request},
    http::{HeaderName, HeaderValue, StatusCode, header},
    middleware,
    response::Response,
    routing::get,
};
use sha2::{Digest, Sha512};
use tower::ServiceBuilder;
use tower_http::{
    LatencyUnit,
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    cookie::{Key, SameSite},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod csrf;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod templates;

// Session-aware routing, split by access requirement.
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{MockRepository, PostgresRepository, SnippetState, UserState};

/// Idle lifetime of a session before it expires.
pub const SESSION_LIFETIME_HOURS: i64 = 12;

/// Upper bound on handling a single request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// AppState
///
/// The single, immutable container of everything handlers depend on, built once
/// at startup and cloned cheaply into each request.
#[derive(Clone)]
pub struct AppState {
    pub snippets: SnippetState,
    pub users: UserState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SnippetState {
    fn from_ref(app_state: &AppState) -> SnippetState {
        app_state.snippets.clone()
    }
}

impl FromRef<AppState> for UserState {
    fn from_ref(app_state: &AppState) -> UserState {
        app_state.users.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// Derives the 64-byte cookie signing key from the configured secret.
fn session_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(&digest[..])
}

/// create_router
///
/// Assembles the full request pipeline.
///
/// Outermost first: security headers, panic recovery, request id, request
/// logging and the request timeout wrap everything, so even a recovered panic
/// carries the headers. Page routes additionally
/// run through the session layer, CSRF protection and the authentication
/// context, and the authenticated routes through the login gate. `/ping` and
/// `/static` skip the session-dependent layers.
pub fn create_router<Store>(state: AppState, session_store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(true)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            SESSION_LIFETIME_HOURS,
        )))
        .with_signed(session_key(&state.config.secret));

    let dynamic_routes = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn(auth::require_authenticated_user)),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
        .layer(middleware::from_fn(csrf::csrf_protect))
        .layer(session_layer);

    let x_request_id = HeaderName::from_static("x-request-id");

    Router::new()
        .route("/ping", get(handlers::ping))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .merge(dynamic_routes)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_XSS_PROTECTION,
                    HeaderValue::from_static("1; mode=block"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("deny"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
}

/// handle_panic
///
/// Turns a panic inside the stack into the generic 500 page and asks the
/// server to close the connection. The process keeps serving.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "request handler panicked");

    let mut response = error::status_text_response(StatusCode::INTERNAL_SERVER_ERROR);
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

/// trace_span_logger
///
/// Span for every request: method, URI, client address and the `x-request-id`
/// so all log lines of one request can be correlated.
fn trace_span_logger(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        client = %client,
        req_id = %request_id,
    )
}
