use actix_web::web;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod application;
mod config;
mod domain;
mod events;
mod metrics;
mod seed;
mod store;
mod utils;

use api::AppState;
use application::{OrderService, ProductService};
use config::AppConfig;
use events::{ActivityLogSink, CustomerNotificationSink, EventDispatcher};
use store::{InMemoryStore, PgStore, Store};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_inventory=debug"))
        )
        .init();

    tracing::info!("🚀 Starting order / inventory service");

    // === 1. Configuration ===
    let config = AppConfig::from_env()?;
    tracing::info!(
        currency = %config.default_currency,
        enforce_status_transitions = config.enforce_status_transitions,
        retry_attempts = config.retry.max_attempts,
        "Configuration loaded"
    );

    // === 2. Storage ===
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to PostgreSQL...");
            Arc::new(PgStore::connect(url, config.database_max_connections).await?)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
            Arc::new(InMemoryStore::new())
        }
    };

    // === 3. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 4. Event delivery ===
    let dispatcher = EventDispatcher::new(metrics.clone())
        .with_sink(Arc::new(ActivityLogSink))
        .with_sink(Arc::new(CustomerNotificationSink));
    tracing::info!(sinks = dispatcher.sink_count(), "Event dispatcher ready");
    let dispatcher = Arc::new(dispatcher);

    // === 5. Services ===
    let settings = config.settings();
    let products = Arc::new(ProductService::new(
        store.clone(),
        dispatcher.clone(),
        metrics.clone(),
        settings.clone(),
    ));
    let orders = Arc::new(OrderService::new(
        store.clone(),
        dispatcher,
        metrics.clone(),
        settings,
    ));

    if config.seed_demo_data {
        seed::seed_demo_catalogue(&products).await?;
    }

    // === 6. HTTP API ===
    let state = web::Data::new(AppState {
        orders,
        products,
        store,
        metrics,
    });
    api::serve(state, &config.http_host, config.http_port).await?;

    tracing::info!("👋 Shutdown complete");
    Ok(())
}
