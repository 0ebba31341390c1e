//! Tally API Server
//!
//! Main entry point for the Tally backend service.

use std::sync::Arc;
use std::time::Duration;

use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_api::{AppState, create_router};
use tally_core::auth::{IdentityService, PasswordConfig, SessionManager, spawn_blacklist_sweeper};
use tally_core::clock::{Clock, SystemClock};
use tally_core::ledger::Ledger;
use tally_db::migration::Migrator;
use tally_db::{BlacklistRepository, SessionRepository, UserRepository, connect_with_pool};
use tally_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let users = Arc::new(UserRepository::new(db.clone()));

    let jwt_service = JwtService::new(JwtConfig {
        access_secret: config.jwt.access_secret.clone(),
        refresh_secret: config.jwt.refresh_secret.clone(),
        access_token_expires_secs: i64::try_from(config.jwt.access_token_expiry_secs)?,
        refresh_token_expires_secs: i64::try_from(config.jwt.refresh_token_expiry_secs)?,
    });

    let password = PasswordConfig {
        memory_kib: config.auth.password_memory_kib,
        iterations: config.auth.password_iterations,
        parallelism: config.auth.password_parallelism,
    };
    let identity = IdentityService::new(users.clone(), password, clock.clone());

    let blacklist_ttl = chrono::Duration::seconds(i64::try_from(config.auth.blacklist_ttl_secs)?);
    let sessions = Arc::new(
        SessionManager::new(
            users.clone(),
            Arc::new(SessionRepository::new(db.clone())),
            Arc::new(BlacklistRepository::new(db)),
            identity,
            Arc::new(jwt_service),
            clock.clone(),
        )
        .with_blacklist_ttl(blacklist_ttl),
    );

    let sweep_every = Duration::from_secs(config.auth.blacklist_sweep_interval_secs);
    spawn_blacklist_sweeper(sessions.clone(), sweep_every);
    info!(interval_secs = sweep_every.as_secs(), "Blacklist sweeper started");

    let state = AppState {
        sessions,
        ledger: Arc::new(Ledger::new(users, clock.clone())),
        clock,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
