//! Booking engine settings.

use crate::request::DEFAULT_MAX_SEATS_PER_REQUEST;

/// Limits and retry policy applied by [`crate::BookingService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingConfig {
    /// Upper bound on seats per booking request.
    pub max_seats_per_request: usize,
    /// Extra attempts `book_with_retry` makes after a retryable conflict.
    pub conflict_retries: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_seats_per_request: DEFAULT_MAX_SEATS_PER_REQUEST,
            conflict_retries: 3,
        }
    }
}
