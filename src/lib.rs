use std::path::Path;

use crate::model::{DatabaseError, DbConnection, ModelManager};
use crate::utils::signal::shutdown_signal;
use crate::{error::AppResult, web::AppState};
use axum::Router;
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod gateway;
pub mod model;
pub mod service;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "lectern";

pub async fn run_migrations(db: &DbConnection) -> AppResult<()> {
    let migrator = Migrator::new(Path::new("./migrations"))
        .await
        .map_err(DatabaseError::from)?;

    tracing::debug!("applying migrations...");
    migrator.run(db.pool()).await.map_err(DatabaseError::from)?;
    Ok(())
}

pub async fn build_server() -> AppResult<(AppState, Router)> {
    let use_local = cfg!(debug_assertions);
    let config = Config::get_or_init(use_local).await;

    let db = DbConnection::connect(config.app().database_uri())?;
    run_migrations(&db).await?;

    let state = AppState::from_config(ModelManager::new(db), config);
    let app = web::routes::build_app(state.clone(), config);
    Ok((state, app))
}

/// Same router as [`build_server`] around a prepared state, e.g. with fake collaborators.
pub async fn build_server_with_state(state: AppState) -> AppResult<Router> {
    let config = Config::get_or_init(true).await;
    Ok(web::routes::build_app(state, config))
}

pub async fn build_server_with_pool(db: DbConnection) -> AppResult<(AppState, Router)> {
    let config = Config::get_or_init(true).await;

    let state = AppState::from_config(ModelManager::new(db), config);
    let app = web::routes::build_app(state.clone(), config);
    Ok((state, app))
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (_, app) = build_server().await?;
    let config = Config::get_or_init(false).await;
    let listener = TcpListener::bind(config.host().bindto()).await?;

    tracing::info!("axum is starting at: {}", config.host().bindto());
    let axum_handle = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    axum_handle.await?;
    Ok(())
}

fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
