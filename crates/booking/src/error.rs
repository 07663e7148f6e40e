//! Booking error taxonomy.

use seat_store::StoreError;
use thiserror::Error;

use crate::allocator::InsufficientCapacity;

/// Errors surfaced by the booking and cancellation paths.
///
/// None of these leave partial effects behind: every failing transaction is
/// rolled back before the error is returned.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Malformed seat count or seat id list.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Not enough free seats for the request.
    #[error("Not enough seats available: requested {requested}, available {available}")]
    InsufficientCapacity { requested: usize, available: usize },

    /// Some seats are not booked by the requester, or do not exist.
    #[error("Some seats are not booked by you or do not exist: requested {requested}, owned {owned}")]
    Forbidden { requested: usize, owned: usize },

    /// The isolation layer detected a race; the whole operation may be retried.
    #[error("Booking conflict, retry the request: {0}")]
    ConflictRetryable(String),

    /// The seat store failed.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl BookingError {
    /// Returns true if the caller may retry the whole operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::ConflictRetryable(_))
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            BookingError::InvalidRequest(_) => "invalid_request",
            BookingError::InsufficientCapacity { .. } => "insufficient_capacity",
            BookingError::Forbidden { .. } => "forbidden",
            BookingError::ConflictRetryable(_) => "conflict",
            BookingError::Store(_) => "store",
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(e: StoreError) -> Self {
        if e.is_conflict() {
            BookingError::ConflictRetryable(e.to_string())
        } else {
            BookingError::Store(e)
        }
    }
}

impl From<InsufficientCapacity> for BookingError {
    fn from(e: InsufficientCapacity) -> Self {
        BookingError::InsufficientCapacity {
            requested: e.requested,
            available: e.available,
        }
    }
}

/// Convenience type alias for booking results.
pub type Result<T> = std::result::Result<T, BookingError>;
