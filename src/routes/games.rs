use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde_json::Value;

use crate::{error::AppError, models::GamesQuery, state::AppState};

/// Search the catalog by name
///
/// # Returns
///
/// The upstream `results` array, unchanged
pub async fn search_games(
    State(state): State<AppState>,
    query: Result<Query<GamesQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query.map_err(|e| AppError::validation(e.body_text()))?;
    let term = query
        .term()
        .ok_or_else(|| AppError::validation("query parameter \"search\" is required"))?;

    let results = state.catalog.search(term).await?;
    Ok(Json(results))
}

/// Fetch one game by id or slug
///
/// An upstream 404 is passed through; any other upstream failure is a 500.
pub async fn game_detail(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = path.map_err(|e| AppError::validation(e.body_text()))?;
    let id = validate_game_id(&id)?;
    let game = state.catalog.game(id).await?;
    Ok(Json(game))
}

/// `/game` and `/game/` without an id
pub async fn missing_game_id() -> AppError {
    AppError::validation("path parameter \"id\" is required")
}

/// Reject blank ids and dot segments
fn validate_game_id(id: &str) -> Result<&str, AppError> {
    let id = id.trim();
    match id {
        "" => Err(AppError::validation("path parameter \"id\" is required")),
        "." | ".." => Err(AppError::validation("invalid game id")),
        _ => Ok(id),
    }
}
