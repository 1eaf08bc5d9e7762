use axum::{extract::State, Json};

use crate::{auth::AuthenticatedUser, error::AppError, state::AppState, store::UserSummary};

/// List every user, oldest first
///
/// Ids, usernames and creation timestamps only; password hashes never leave the store layer.
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = state.users.list_users().await?;
    tracing::debug!(requested_by = %auth.username, count = users.len(), "listed users");
    Ok(Json(users))
}
