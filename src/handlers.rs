use crate::{
    AppState,
    auth::{AUTH_SESSION_KEY, LOGIN_PATH, RequestContext},
    error::{AppError, AppResult, ModelError},
    forms::{EMAIL_RX, Form, GENERIC_ERROR_KEY},
    models::PERMITTED_EXPIRY_DAYS,
    templates,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

/// Submitted `application/x-www-form-urlencoded` pairs, repeats preserved.
type FormPairs = axum::Form<Vec<(String, String)>>;

/// home
///
/// [Public Route] Lists the latest unexpired snippets.
pub async fn home(ctx: RequestContext, State(state): State<AppState>) -> AppResult<Response> {
    let snippets = state.snippets.latest().await?;
    let page = ctx.page().await?;
    Ok(templates::home(&page, &snippets).into_response())
}

/// show_snippet
///
/// [Public Route] Renders one snippet. Ids that are not positive integers,
/// unknown ids and expired snippets all end in 404.
pub async fn show_snippet(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = match id.parse::<i64>() {
        Ok(id) if id >= 1 => id,
        _ => return Err(AppError::NotFound),
    };

    let snippet = state.snippets.get(id).await?;
    let page = ctx.page().await?;
    Ok(templates::show(&page, &snippet).into_response())
}

/// create_snippet_form
///
/// [Authenticated Route] Empty snippet form.
pub async fn create_snippet_form(ctx: RequestContext) -> AppResult<Response> {
    let page = ctx.page().await?;
    Ok(templates::create(&page, &Form::default()).into_response())
}

/// create_snippet
///
/// [Authenticated Route] Validates and stores a new snippet. Invalid input is
/// echoed back with `422`; success redirects to the new snippet.
pub async fn create_snippet(
    ctx: RequestContext,
    State(state): State<AppState>,
    axum::Form(pairs): FormPairs,
) -> AppResult<Response> {
    let mut form = Form::new(pairs);
    form.required(&["title", "content", "expires"]);
    form.max_length("title", 100);
    form.permitted_values("expires", &PERMITTED_EXPIRY_DAYS);

    if !form.valid() {
        let page = ctx.page().await?;
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            templates::create(&page, &form),
        )
            .into_response());
    }

    // Guaranteed numeric by `permitted_values` above.
    let expires_in_days: i32 = form
        .get("expires")
        .parse()
        .map_err(|_| AppError::ClientError(StatusCode::BAD_REQUEST))?;

    let id = state
        .snippets
        .insert(form.get("title"), form.get("content"), expires_in_days)
        .await?;

    tracing::info!(snippet_id = id, "snippet created");
    ctx.flash("Snippet successfully created!").await?;
    Ok(Redirect::to(&format!("/snippet/{id}")).into_response())
}

/// signup_user_form
///
/// [Public Route] Empty signup form.
pub async fn signup_user_form(ctx: RequestContext) -> AppResult<Response> {
    let page = ctx.page().await?;
    Ok(templates::signup(&page, &Form::default()).into_response())
}

/// signup_user
///
/// [Public Route] Creates an account. A taken email address is reported on the
/// email field rather than as a server failure.
pub async fn signup_user(
    ctx: RequestContext,
    State(state): State<AppState>,
    axum::Form(pairs): FormPairs,
) -> AppResult<Response> {
    let mut form = Form::new(pairs);
    form.required(&["name", "email", "password"]);
    form.max_length("name", 255);
    form.max_length("email", 255);
    form.matches_pattern("email", &EMAIL_RX);
    form.min_length("password", 10);

    if form.valid() {
        match state
            .users
            .insert(form.get("name"), form.get("email"), form.get("password"))
            .await
        {
            Ok(()) => {
                ctx.flash("Your signup was successful. Please log in.").await?;
                return Ok(Redirect::to(LOGIN_PATH).into_response());
            }
            Err(ModelError::DuplicateEmail) => {
                form.errors.add("email", "Address is already in use");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let page = ctx.page().await?;
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        templates::signup(&page, &form),
    )
        .into_response())
}

/// login_user_form
///
/// [Public Route] Empty login form.
pub async fn login_user_form(ctx: RequestContext) -> AppResult<Response> {
    let page = ctx.page().await?;
    Ok(templates::login(&page, &Form::default()).into_response())
}

/// login_user
///
/// [Public Route] Checks credentials. Failure shows one generic message that
/// does not reveal which of the two fields was wrong.
pub async fn login_user(
    ctx: RequestContext,
    State(state): State<AppState>,
    axum::Form(pairs): FormPairs,
) -> AppResult<Response> {
    let mut form = Form::new(pairs);

    match state
        .users
        .authenticate(form.get("email"), form.get("password"))
        .await
    {
        Ok(user_id) => {
            ctx.session.cycle_id().await?;
            ctx.session.insert(AUTH_SESSION_KEY, user_id).await?;
            tracing::info!(user_id, "user logged in");
            ctx.flash("You've been logged in successfully!").await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(ModelError::InvalidCredentials) => {
            form.errors
                .add(GENERIC_ERROR_KEY, "Email or Password is incorrect");
            let page = ctx.page().await?;
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                templates::login(&page, &form),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// logout_user
///
/// [Authenticated Route] Drops the authenticated identity from the session.
pub async fn logout_user(ctx: RequestContext) -> AppResult<Response> {
    ctx.session.remove::<i64>(AUTH_SESSION_KEY).await?;
    ctx.session.cycle_id().await?;
    ctx.flash("You've been logged out successfully!").await?;
    Ok(Redirect::to("/").into_response())
}

/// ping
///
/// Liveness probe.
pub async fn ping() -> &'static str {
    "OK"
}

/// Fallback for paths no route matches.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
