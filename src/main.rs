use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};

use gamevault::{
    auth::PasswordHasher,
    catalog::RawgCatalog,
    config::Config,
    middleware::RateLimiter,
    routes,
    state::AppState,
    store::SupabaseUserStore,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamevault=info,tower_http=warn".into()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let users =
        SupabaseUserStore::from_config(&config).context("Failed to build user store client")?;
    tracing::info!(table = %config.users_table, "user store configured");

    let catalog =
        RawgCatalog::from_config(&config).context("Failed to build game catalog client")?;
    tracing::info!(base_url = %config.rawg_base_url, "game catalog configured");

    let hasher = PasswordHasher::new(config.hash_cost).context("Invalid password hash cost")?;

    let addr = SocketAddr::new(config.bind_addr, config.port);

    let state = AppState::new(
        config,
        Arc::new(users),
        Arc::new(catalog),
        hasher,
        RateLimiter::new(),
    );

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
