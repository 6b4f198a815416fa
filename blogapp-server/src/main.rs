use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;

use blogapp_server::build_state;
use blogapp_server::data::memory::{InMemoryPostRepository, InMemoryUserRepository};
use blogapp_server::data::post_repository::{PostRepository, PostgresPostRepository};
use blogapp_server::data::user_repository::{PostgresUserRepository, UserRepository};
use blogapp_server::infrastructure::{
    config::{Config, StorageBackend},
    database::{create_pool, run_migrations},
    logging::init_logging,
};
use blogapp_server::presentation::{self, AppState};

type Stores = (
    Arc<dyn UserRepository + Send + Sync>,
    Arc<dyn PostRepository + Send + Sync>,
);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;

    init_logging(config.log_format)?;

    tracing::info!("Starting blog server...");
    tracing::info!("HTTP server will listen on {}", config.http_addr());
    tracing::info!("Routes mounted at '{}/'", config.base_path);

    let (user_repo, post_repo) = open_stores(&config).await?;

    let state = build_state(
        user_repo,
        post_repo,
        &config.jwt_secret,
        config.base_path.clone(),
    )?;
    tracing::info!("Services initialized successfully");

    run_http_server(config, state).await?;

    tracing::info!("Shutting down...");
    Ok(())
}

async fn open_stores(config: &Config) -> anyhow::Result<Stores> {
    match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;

            tracing::info!("Connecting to database...");
            let pool = create_pool(database_url, config.database_max_connections).await?;

            tracing::info!("Running database migrations...");
            run_migrations(&pool).await?;

            let user_repo: Arc<dyn UserRepository + Send + Sync> =
                Arc::new(PostgresUserRepository::new(pool.clone()));
            let post_repo: Arc<dyn PostRepository + Send + Sync> =
                Arc::new(PostgresPostRepository::new(pool));
            Ok((user_repo, post_repo))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let user_repo: Arc<dyn UserRepository + Send + Sync> =
                Arc::new(InMemoryUserRepository::new());
            let post_repo: Arc<dyn PostRepository + Send + Sync> =
                Arc::new(InMemoryPostRepository::new());
            Ok((user_repo, post_repo))
        }
    }
}

/// Configure CORS for the HTTP server with allowed origins from .env
fn configure_cors(allowed_origins: &[String]) -> actix_cors::Cors {
    use actix_cors::Cors;
    use actix_web::http::header;

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .max_age(3600);

    for origin in allowed_origins {
        cors = cors.allowed_origin(origin);
        tracing::debug!("Added allowed CORS origin: {}", origin);
    }

    cors
}

async fn run_http_server(config: Config, state: AppState) -> anyhow::Result<()> {
    use actix_web::middleware::{Logger, NormalizePath, TrailingSlash};
    use actix_web::{App, HttpServer};

    let addr = config.http_addr();
    let cors_allowed_origins = config.cors_allowed_origins;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Always))
            .wrap(configure_cors(&cors_allowed_origins))
            .wrap(Logger::default())
            .configure(|cfg| presentation::configure(cfg, &state))
    })
    .bind(&addr)
    .with_context(|| format!("failed to bind {}", addr))?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    Ok(())
}
