use std::sync::Arc;

use actix_web::{web::Data, HttpServer};
use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod auth;
mod config;
mod domain;
mod metrics;
mod models;
mod store;
mod web;

use auth::{CredentialCheck, HtpasswdFile};
use config::{Config, StoreBackend};
use store::{GuardedStore, InMemoryRegistrationStore, RegistrationStore, ScyllaRegistrationStore};
use web::{build_app, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging; RUST_LOG replaces the default filter.
    // actix-web's request Logger reaches this subscriber through the log bridge.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,registration_form=debug"))
        )
        .init();

    tracing::info!("🚀 Starting registration form server");

    let config = Config::from_env()?;
    if config.development {
        tracing::warn!("Development mode: error pages include internal detail");
    }

    // === 1. Record store ===
    let backend: Arc<dyn RegistrationStore> = match config.store_backend {
        StoreBackend::Scylla => Arc::new(
            ScyllaRegistrationStore::connect(&config.scylla_uri, &config.scylla_keyspace)
                .await
                .context("Failed to initialize ScyllaDB registration store")?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, registrations are lost on restart");
            Arc::new(InMemoryRegistrationStore::new())
        }
    };

    // === 2. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    let store: Arc<dyn RegistrationStore> = Arc::new(
        GuardedStore::new(backend, config.store_timeout).with_metrics(metrics.clone()),
    );

    // === 3. Operator credentials ===
    let credentials: Arc<dyn CredentialCheck> = Arc::new(HtpasswdFile::load(&config.htpasswd_path)?);

    // === 4. HTTP server ===
    let state = Data::new(AppState::new(store, credentials, metrics));
    let development = config.development;
    let address = config.address();

    tracing::info!("Binding to {address}");
    HttpServer::new(move || build_app(state.clone(), development))
        .bind(&address)
        .with_context(|| format!("Failed to bind {address}"))?
        .run()
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}
