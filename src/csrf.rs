//! Session-bound CSRF tokens.

use std::collections::HashMap;

use axum::{
    Form,
    body::{Body, to_bytes},
    extract::{FromRequest, Request},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::Response,
};
use rand::Rng;
use tower_sessions::Session;

use crate::error::{AppError, AppResult};

pub const CSRF_SESSION_KEY: &str = "csrf_token";
pub const CSRF_FORM_FIELD: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

// Largest form body buffered while looking for the token.
const MAX_FORM_BYTES: usize = 1024 * 1024;

/// The token bound to the current session, made available to handlers.
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

pub fn generate_csrf_token() -> String {
    let token: [u8; 32] = rand::thread_rng().r#gen();
    hex::encode(token)
}

/// Compares in time independent of where the inputs first differ.
pub fn validate_csrf_token(token: &str, expected: &str) -> bool {
    let (a, b) = (token.as_bytes(), expected.as_bytes());
    if a.len() != b.len() || b.is_empty() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn is_state_changing(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

/// csrf_protect
///
/// Ensures the session holds a token, then rejects state-changing requests
/// whose submitted token (header or `csrf_token` form field) does not match
/// it. Rejections answer `400 Bad Request` and never reach the handler.
pub async fn csrf_protect(session: Session, request: Request, next: Next) -> AppResult<Response> {
    let expected = match session.get::<String>(CSRF_SESSION_KEY).await? {
        Some(token) => token,
        None => {
            let token = generate_csrf_token();
            session.insert(CSRF_SESSION_KEY, &token).await?;
            token
        }
    };

    let mut request = if is_state_changing(request.method()) {
        let (request, submitted) = extract_submitted_token(request).await?;
        let accepted = submitted
            .as_deref()
            .is_some_and(|token| validate_csrf_token(token, &expected));
        if !accepted {
            tracing::warn!(
                method = %request.method(),
                uri = %request.uri(),
                "rejected request with missing or invalid CSRF token"
            );
            return Err(AppError::ClientError(StatusCode::BAD_REQUEST));
        }
        request
    } else {
        request
    };

    request.extensions_mut().insert(CsrfToken(expected));
    Ok(next.run(request).await)
}

/// Pulls the submitted token out of the header or the urlencoded body. The
/// body is buffered and re-attached so the handler can still read it.
async fn extract_submitted_token(request: Request) -> AppResult<(Request, Option<String>)> {
    if let Some(token) = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        let token = token.to_string();
        return Ok((request, Some(token)));
    }

    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if !is_form {
        return Ok((request, None));
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|_| AppError::ClientError(StatusCode::PAYLOAD_TOO_LARGE))?;

    let probe = Request::builder()
        .method(Method::POST)
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        )
        .body(Body::from(bytes.clone()))
        .map_err(|e| AppError::ServerError(e.to_string()))?;
    let submitted = Form::<HashMap<String, String>>::from_request(probe, &())
        .await
        .ok()
        .and_then(|Form(mut fields)| fields.remove(CSRF_FORM_FIELD));

    Ok((Request::from_parts(parts, Body::from(bytes)), submitted))
}
