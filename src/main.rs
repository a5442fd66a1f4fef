mod api;
mod config;
mod error;
mod handlers;
mod models;
mod policy;
mod repos;
mod services;
mod state;
mod stores;
#[cfg(test)]
mod test_utils;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, http};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Config,
    repos::{MemoryPostRepo, MemoryUserRepo, PgPostRepo, PgUserRepo, Repos},
    services::{EmailSenderImpl, FsArtifactStore, LoftyAudioProbe},
    state::AppState,
    stores::{InMemoryOtpStore, InMemoryRateLimiter, Stores},
};

#[derive(Parser)]
#[command(name = "twiller-api")]
#[command(about = "Twiller API server")]
struct Args {
    /// Run database migrations and exit
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider before any TLS operations
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = Args::parse();
    let config = envy::prefixed("TWILLER_").from_env::<Config>()?;

    // Initialize Sentry for error tracking (must be done early, guard must stay alive)
    let _sentry_guard = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(config.env.clone().into()),
                ..Default::default()
            },
        ))
    });

    // Set up tracing: JSON in production, human-readable otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    // Select the persistence backend once; handlers only ever see the traits.
    let (repos, backend) = match &config.database_url {
        Some(url) => {
            let database = PgPoolOptions::new()
                .max_connections(25)
                .connect(url)
                .await?;

            // Run migrations via init container only (--migrate flag)
            if args.migrate {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&database).await?;
                tracing::info!("Migrations complete");
                return Ok(());
            }

            let repos = Repos {
                users: Arc::new(PgUserRepo::new(database.clone())),
                posts: Arc::new(PgPostRepo::new(database)),
            };
            (repos, "postgres")
        }
        None => {
            anyhow::ensure!(!args.migrate, "--migrate requires TWILLER_DATABASE_URL");
            tracing::warn!("no database configured; using in-memory storage for users and posts");
            let repos = Repos {
                users: Arc::new(MemoryUserRepo::new()),
                posts: Arc::new(MemoryPostRepo::new()),
            };
            (repos, "memory")
        }
    };

    let stores = Stores {
        otp: Arc::new(InMemoryOtpStore::new()),
        rate_limiter: Arc::new(InMemoryRateLimiter::new()),
    };

    let email = EmailSenderImpl::new(config.resend_api_key.clone(), config.smtp_url.clone())?;
    let artifacts = FsArtifactStore::new(&config.upload_dir)?;

    let state = AppState {
        config: config.clone(),
        repos,
        stores,
        email: Arc::new(email),
        probe: Arc::new(LoftyAudioProbe),
        artifacts: Arc::new(artifacts),
        backend,
    };

    // Request ID header name
    let x_request_id = http::HeaderName::from_static("x-request-id");

    let app = Router::new()
        .nest("/health", handlers::health::router())
        .merge(handlers::auth::router())
        .merge(handlers::users::router())
        .merge(handlers::posts::router())
        .merge(handlers::uploads::router())
        .merge(handlers::password::router())
        .merge(handlers::billing::router())
        .with_state(state)
        // Request ID: generate UUID, include in logs, return in response
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(backend, "Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
