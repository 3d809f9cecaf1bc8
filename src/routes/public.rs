use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Browsing and the account entry points. These still run behind the session,
/// CSRF and authentication-context middleware, so handlers can tell whether
/// the visitor is logged in.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // The ten most recent unexpired snippets.
        .route("/", get(handlers::home))
        // GET /snippet/{id}
        // A single snippet; 404 once expired. The static `/snippet/create`
        // route takes precedence over this one.
        .route("/snippet/{id}", get(handlers::show_snippet))
        .route(
            "/user/signup",
            get(handlers::signup_user_form).post(handlers::signup_user),
        )
        .route(
            "/user/login",
            get(handlers::login_user_form).post(handlers::login_user),
        )
}
