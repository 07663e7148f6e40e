//! Wiring for the seat reservation engine.
//!
//! Loads [`Config`], installs tracing, picks the storage backend and hands
//! back booking and query services sharing one store.

pub mod config;
pub mod error;
pub mod telemetry;

use std::sync::Arc;

use booking::{BookingService, SeatQueryService};
use seat_store::{InMemorySeatStore, PostgresSeatStore, SeatStore};
use sqlx::postgres::PgPoolOptions;

pub use config::{Config, LogFormat};
pub use error::{AppError, Result};
pub use telemetry::init_tracing;

/// Store handle shared by every service.
pub type SharedStore = Arc<dyn SeatStore>;

/// Services built over one backend.
pub struct Engine {
    pub store: SharedStore,
    pub bookings: BookingService<SharedStore>,
    pub queries: SeatQueryService<SharedStore>,
}

/// Connects the configured backend.
///
/// With `DATABASE_URL` set this opens a PostgreSQL pool and applies pending
/// migrations; otherwise the venue lives in memory for the life of the process.
pub async fn connect(config: &Config) -> Result<SharedStore> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await?;
            let store = PostgresSeatStore::new(pool);
            store.run_migrations().await?;
            tracing::info!(
                max_connections = config.database_max_connections,
                "connected to postgres"
            );
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("using in-memory seat store");
            Ok(Arc::new(InMemorySeatStore::new()))
        }
    }
}

/// Connects the backend, seeds the venue if it is empty and builds the services.
pub async fn bootstrap(config: &Config) -> Result<Engine> {
    let layout = config.layout()?;
    let store = connect(config).await?;

    let created = store.initialize_venue(&layout).await?;
    if created > 0 {
        tracing::info!(created, rows = layout.rows(), "venue initialized");
    } else {
        tracing::info!("venue already initialized");
    }

    Ok(Engine {
        bookings: BookingService::with_config(store.clone(), config.booking()),
        queries: SeatQueryService::new(store.clone()),
        store,
    })
}
