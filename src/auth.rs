use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Datelike, Utc};
use tower_sessions::Session;

use crate::{
    csrf::CsrfToken,
    error::{AppError, AppResult, ModelError},
    models::User,
    repository::UserState,
};

pub const AUTH_SESSION_KEY: &str = "authenticated_user_id";
pub const FLASH_SESSION_KEY: &str = "flash";
pub const LOGIN_PATH: &str = "/user/login";

/// AuthenticatedUser
///
/// Request extension inserted by `authenticate` when the session references an
/// existing user. Its absence means the request is anonymous.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// authenticate
///
/// Resolves the session's user id into a full `User` record. A session that
/// points at a user which no longer exists is treated as anonymous.
pub async fn authenticate(
    State(users): State<UserState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    if let Some(user_id) = session.get::<i64>(AUTH_SESSION_KEY).await? {
        match users.get(user_id).await {
            Ok(user) => {
                request.extensions_mut().insert(AuthenticatedUser(user));
            }
            Err(ModelError::NoRecord) => {
                tracing::debug!(user_id, "session references unknown user; treating as anonymous");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(next.run(request).await)
}

/// require_authenticated_user
///
/// Route-scoped gate. Anonymous requests are redirected to the login page
/// without running the handler; authenticated responses are marked non-cacheable.
pub async fn require_authenticated_user(request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthenticatedUser>().is_none() {
        return Redirect::to(LOGIN_PATH).into_response();
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// RequestContext
///
/// Everything the dynamic middleware resolved for this request, handed to the
/// handler as one explicit value instead of ambient lookups.
#[derive(Clone)]
pub struct RequestContext {
    pub session: Session,
    pub csrf_token: String,
    pub user: Option<User>,
}

/// Per-page data every rendered template receives.
#[derive(Debug, Clone, Default)]
pub struct PageData {
    pub user: Option<User>,
    pub csrf_token: String,
    pub flash: Option<String>,
    pub current_year: i32,
}

impl RequestContext {
    /// Queues a one-shot message for the next rendered page.
    pub async fn flash(&self, message: &str) -> AppResult<()> {
        self.session.insert(FLASH_SESSION_KEY, message).await?;
        Ok(())
    }

    /// Builds the template data, consuming any pending flash message.
    pub async fn page(&self) -> AppResult<PageData> {
        let flash = self.session.remove::<String>(FLASH_SESSION_KEY).await?;
        Ok(PageData {
            user: self.user.clone(),
            csrf_token: self.csrf_token.clone(),
            flash,
            current_year: Utc::now().year(),
        })
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::ServerError(format!("session unavailable: {msg}")))?;

        let csrf_token = parts
            .extensions
            .get::<CsrfToken>()
            .map(|CsrfToken(token)| token.clone())
            .ok_or_else(|| AppError::ServerError("csrf middleware not installed".to_string()))?;

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|AuthenticatedUser(user)| user.clone());

        Ok(Self {
            session,
            csrf_token,
            user,
        })
    }
}
