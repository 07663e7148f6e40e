//! Bootstrap error type.

use seat_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Database connection failed: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Tracing already initialized: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),
}

pub type Result<T> = std::result::Result<T, AppError>;
