use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use secrecy::ExposeSecret;

use super::{cookie::SESSION_COOKIE, token::verify_session_token};
use crate::{error::AppError, state::AppState, store::UserId};

/// Identity of the caller, attached by [`require_session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub username: String,
    pub expires_at: u64,
}

/// Gate for protected routes
///
/// Verifies the `token` cookie and short-circuits with 401 before the
/// handler runs when it is missing, malformed, tampered or expired. On
/// success the decoded identity goes into the request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());

    let claims = verify_session_token(token, state.config.session_secret.expose_secret())
        .ok_or(AppError::Authentication("Invalid or expired session"))?;

    tracing::debug!(user = %claims.username, "session verified");

    req.extensions_mut().insert(AuthenticatedUser {
        id: claims.sub,
        username: claims.username,
        expires_at: claims.exp,
    });

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present behind `require_session`
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Authentication("Authentication required"))
    }
}
