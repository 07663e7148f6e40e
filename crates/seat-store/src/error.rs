use thiserror::Error;

use crate::SeatId;

/// Errors that can occur when interacting with the seat store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The seat already has a booking (unique constraint on the ledger).
    #[error("Seat {seat_id} is already booked")]
    SeatAlreadyBooked { seat_id: SeatId },

    /// The seat does not exist in the venue.
    #[error("Seat not found: {0}")]
    SeatNotFound(SeatId),

    /// The isolation layer aborted the transaction (serialization failure or deadlock).
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    /// The venue layout is not valid.
    #[error("Invalid venue layout: {0}")]
    InvalidLayout(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true if retrying the whole transaction may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::SeatAlreadyBooked { .. } | StoreError::Conflict(_)
        )
    }
}

/// Result type for seat store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
