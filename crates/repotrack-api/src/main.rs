//! repotrack API server

use std::sync::Arc;

use clap::Parser;
use repotrack_api::config::{LogFormat, StoreKind};
use repotrack_api::services::{GitHubClient, HooksClient, TokenClient, http_client};
use repotrack_api::{AppState, ServerConfig, routes};
use repotrack_db::{
    MemoryRepositoryStore, PgRepositoryStore, RepositoryStore, create_pool, run_migrations,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    init_tracing(config.log_format);

    let store: Arc<dyn RepositoryStore> = match config.store {
        StoreKind::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database_url, config.max_connections).await?;
            run_migrations(&pool).await?;
            info!("Database connected");
            Arc::new(PgRepositoryStore::new(pool))
        }
        StoreKind::Memory => {
            warn!("Using in-memory store; repositories are lost on restart");
            Arc::new(MemoryRepositoryStore::new())
        }
    };

    let client = http_client(config.http_timeout())?;
    let hooks = Arc::new(HooksClient::new(client.clone(), config.hooks_url.clone()));
    let tokens = Arc::new(TokenClient::new(client.clone(), config.tokens_url.clone()));
    let github = Arc::new(GitHubClient::new(
        client,
        config.github_api_url.clone(),
        tokens,
    ));

    let state = AppState::new(store, hooks, github);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    info!("Starting server on {}", config.listen);

    let listener = TcpListener::bind(config.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Plain => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}
