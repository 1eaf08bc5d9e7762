pub mod auth;
pub mod games;
pub mod health;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state, map_response},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    auth::require_session,
    error::AppError,
    middleware::{rate_limit_middleware, security_headers_middleware},
    state::AppState,
};

/// Upper bound on handling one inbound request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CORS for the configured origins, with credentials
///
/// Unparseable origins are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Bound request handling time, answering 408 with a JSON body
pub fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(map_response(timeout_as_json))
}

/// The timeout layer answers with an empty body
async fn timeout_as_json(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return AppError::Timeout.into_response();
    }
    response
}

/// Build the whole application
///
/// Protected routes sit behind [`require_session`]; the credential routes
/// behind the rate limiter.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users", get(users::list_users))
        .route("/games", get(games::search_games))
        .route("/game", get(games::missing_game_id))
        .route("/game/", get(games::missing_game_id))
        .route("/game/:id", get(games::game_detail))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    let cors = cors_layer(&state.config.cors_allowed_origins);

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .merge(protected)
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state);

    // Add middleware layers (first listed is outermost)
    with_request_timeout(app, REQUEST_TIMEOUT).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(from_fn(security_headers_middleware))
            .layer(cors),
    )
}
