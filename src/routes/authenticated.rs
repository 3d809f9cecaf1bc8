use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every route here is wrapped in `require_authenticated_user` by
/// `create_router`; handlers can rely on `RequestContext::user` being set.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /snippet/create
        .route(
            "/snippet/create",
            get(handlers::create_snippet_form).post(handlers::create_snippet),
        )
        // POST /user/logout
        .route("/user/logout", post(handlers::logout_user))
}
