use std::sync::Arc;

use crate::{
    auth::PasswordHasher, catalog::GameCatalog, config::Config, middleware::RateLimiter,
    store::UserStore,
};

/// Shared application state
///
/// Everything here is either immutable or internally synchronized; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserStore>,
    pub catalog: Arc<dyn GameCatalog>,
    pub hasher: Arc<PasswordHasher>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn GameCatalog>,
        hasher: PasswordHasher,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            config: Arc::new(config),
            users,
            catalog,
            hasher: Arc::new(hasher),
            rate_limiter,
        }
    }
}
