use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bookings_api::{app, render::TemplateCache, AppState};
use bookings_core::BookingRepository;
use bookings_store::app_config::{Config, DatabaseBackend};
use bookings_store::{DbClient, MemoryBookingRepository, PostgresBookingRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bookings_api=debug,bookings_store=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("Bookings failed: {:?}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;
    tracing::info!(
        in_production = config.app.in_production,
        "Starting Bookings on port {}",
        config.server.port
    );

    let repo: Arc<dyn BookingRepository> = match config.database.backend {
        DatabaseBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db = DbClient::new(&config.database)
                .await
                .context("Unable to connect to database")?;
            if config.database.run_migrations {
                db.migrate().await.context("Failed to run migrations")?;
            }
            Arc::new(PostgresBookingRepository::new(
                db.pool.clone(),
                Duration::from_secs(config.database.query_timeout_seconds),
            ))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory storage; reservations are lost on restart");
            Arc::new(MemoryBookingRepository::with_default_rooms())
        }
    };

    let templates = TemplateCache::new(&config.templates.dir, config.templates.use_cache)
        .context("Can't create template cache")?;

    let app_state = AppState {
        repo,
        templates: Arc::new(templates),
        session: config.session.clone(),
        static_dir: PathBuf::from(&config.assets.static_dir),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(app_state)).await?;
    Ok(())
}
