use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use secrecy::ExposeSecret;

use crate::{
    auth::{generate_session_token, session_cookie, session_cookie_removal},
    error::AppError,
    models::{Credentials, CredentialsRequest, MessageResponse, RegisteredUser},
    state::AppState,
};

/// Same answer for unknown user and wrong password
const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Parse and validate a credentials body
///
/// Malformed JSON and missing fields are both client errors.
fn credentials(
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Credentials, AppError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(%rejection, "unreadable credentials body");
        AppError::validation("username and password are required")
    })?;

    request.validate().map_err(AppError::Validation)
}

/// Register a new user
///
/// # Returns
///
/// 201 with the new user's id and username
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredUser>), AppError> {
    let Credentials { username, password } = credentials(body)?;

    let password_hash = state
        .hasher
        .hash(&password)
        .await
        .map_err(|e| AppError::unexpected(e.to_string()))?;

    let record = state.users.insert_user(&username, &password_hash).await?;

    tracing::info!(user = %record.username, id = %record.id, "user registered");

    Ok((StatusCode::CREATED, Json(RegisteredUser::from(record))))
}

/// Check credentials and issue the session cookie
///
/// # Returns
///
/// 200 with the `token` cookie set, or 401 without one
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let Credentials { username, password } = credentials(body)?;

    let Some(user) = state.users.find_by_username(&username).await? else {
        // Burn the same hashing work as a real check
        state
            .hasher
            .verify_dummy(&password)
            .await
            .map_err(|e| AppError::unexpected(e.to_string()))?;
        tracing::debug!(user = %username, "login failed: unknown user");
        return Err(AppError::Authentication(INVALID_CREDENTIALS));
    };

    let valid = state
        .hasher
        .verify(&password, &user.password_hash)
        .await
        .map_err(|e| AppError::unexpected(e.to_string()))?;

    if !valid {
        tracing::debug!(user = %username, "login failed: wrong password");
        return Err(AppError::Authentication(INVALID_CREDENTIALS));
    }

    let token = generate_session_token(
        &user.id,
        &user.username,
        state.config.session_secret.expose_secret(),
    )
    .map_err(|e| AppError::unexpected(e.to_string()))?;

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));

    tracing::info!(user = %user.username, "user logged in");

    Ok((jar, Json(MessageResponse::new("Logged in"))))
}

/// Clear the session cookie
///
/// Always succeeds, with or without a session. Nothing is invalidated
/// server-side; a copied token stays valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(session_cookie_removal(state.config.cookie_secure));
    (jar, Json(MessageResponse::new("Logged out")))
}
