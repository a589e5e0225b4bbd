//! Backend entry-point: loads settings, prepares storage and serves the API.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use foodgram_backend::inbound::http::health::HealthState;
use foodgram_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use foodgram_backend::outbound::media::FsImageStore;
use foodgram_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use foodgram_backend::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|error| io::Error::other(error.to_string()))?;
    let env = DefaultEnv::new();

    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    info!(fingerprint = %session.fingerprint(), "session key loaded");

    let media_root = settings.media_root();
    let media = FsImageStore::open(&media_root, settings.media_base_url()).map_err(|error| {
        io::Error::other(format!(
            "open media root '{}': {error}",
            media_root.display()
        ))
    })?;

    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        media,
    )
    .with_page_size(settings.page_size());

    if let Some(database_url) = settings.database_url(&env) {
        if settings.run_migrations {
            run_pending_migrations(&database_url)
                .await
                .map_err(io::Error::other)?;
        }
        let pool = DbPool::new(PoolConfig::new(&database_url))
            .await
            .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "foodgram backend listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
