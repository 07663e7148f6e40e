//! Booking and cancellation transactions.

use std::time::Instant;

use chrono::Utc;
use seat_store::{AssignedSeat, SeatId, SeatStore, UserId};
use serde::Serialize;

use crate::allocator::{AllocationStrategy, allocate};
use crate::config::BookingConfig;
use crate::error::{BookingError, Result};
use crate::request::{SeatCount, SeatSelection};

/// Seats assigned by a committed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub assigned_seats: Vec<AssignedSeat>,
    #[serde(skip)]
    pub strategy: AllocationStrategy,
}

/// Seats released by a committed cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationConfirmation {
    pub released_seat_ids: Vec<SeatId>,
}

/// Coordinates booking and cancellation transactions against a seat store.
///
/// Booking holds exclusive access to the inventory from the snapshot read
/// until commit, so two bookings can never pick the same free seat.
/// Cancellation checks ownership and releases seats inside one transaction.
pub struct BookingService<S: SeatStore> {
    store: S,
    config: BookingConfig,
}

impl<S: SeatStore> BookingService<S> {
    /// Creates a new booking service with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, BookingConfig::default())
    }

    pub fn with_config(store: S, config: BookingConfig) -> Self {
        Self { store, config }
    }

    /// Returns a reference to the underlying seat store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    /// Books `count` seats for `user_id`.
    ///
    /// Either all seats are assigned and committed, or nothing changes.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn book(&self, user_id: UserId, count: i64) -> Result<BookingConfirmation> {
        self.record_booking(user_id, count, 0).await
    }

    /// Like [`BookingService::book`], retrying conflicts up to
    /// `conflict_retries` extra times.
    ///
    /// Request metrics are recorded once per call, not once per attempt.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn book_with_retry(
        &self,
        user_id: UserId,
        count: i64,
    ) -> Result<BookingConfirmation> {
        self.record_booking(user_id, count, self.config.conflict_retries).await
    }

    async fn record_booking(
        &self,
        user_id: UserId,
        count: i64,
        retries: u32,
    ) -> Result<BookingConfirmation> {
        metrics::counter!("bookings_total").increment(1);
        let start = Instant::now();

        let result = self.book_attempts(user_id, count, retries).await;

        metrics::histogram!("booking_duration_seconds").record(start.elapsed().as_secs_f64());
        match &result {
            Ok(confirmation) => {
                metrics::counter!("seats_booked_total")
                    .increment(confirmation.assigned_seats.len() as u64);
            }
            Err(e) => {
                metrics::counter!("booking_rejections_total", "reason" => e.reason())
                    .increment(1);
            }
        }
        result
    }

    async fn book_attempts(
        &self,
        user_id: UserId,
        count: i64,
        retries: u32,
    ) -> Result<BookingConfirmation> {
        let count = SeatCount::new(count, self.config.max_seats_per_request)?;

        let mut attempt = 0;
        loop {
            match self.run_booking(user_id, count).await {
                Err(e) if e.is_retryable() && attempt < retries => {
                    attempt += 1;
                    metrics::counter!("booking_conflict_retries_total").increment(1);
                    tracing::warn!(attempt, error = %e, "retrying booking after conflict");
                }
                result => return result,
            }
        }
    }

    async fn run_booking(&self, user_id: UserId, count: SeatCount) -> Result<BookingConfirmation> {
        let mut tx = self.store.begin_booking().await?;
        let snapshot = tx.snapshot().await?;

        let allocation = match allocate(&snapshot, count.get()) {
            Ok(allocation) => allocation,
            Err(e) => {
                tx.rollback().await?;
                tracing::info!(
                    requested = e.requested,
                    available = e.available,
                    "not enough seats"
                );
                return Err(e.into());
            }
        };
        tracing::debug!(strategy = ?allocation.strategy, "seats allocated");

        let booked_at = Utc::now();
        for seat in &allocation.seats {
            // A failure here drops `tx`, rolling back earlier assignments.
            tx.assign(user_id, seat.id, booked_at).await?;
        }
        tx.commit().await?;

        tracing::info!(
            seats = ?allocation.seats.iter().map(|s| s.seat_number).collect::<Vec<_>>(),
            "seats booked"
        );

        Ok(BookingConfirmation {
            assigned_seats: allocation.seats,
            strategy: allocation.strategy,
        })
    }

    /// Releases `seat_ids`, all of which must be booked by `user_id`.
    ///
    /// If any seat is not owned by the requester the whole request is refused
    /// and no seat changes.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn cancel(
        &self,
        user_id: UserId,
        seat_ids: &[SeatId],
    ) -> Result<CancellationConfirmation> {
        let result = match SeatSelection::new(seat_ids) {
            Ok(selection) => self.run_cancellation(user_id, selection).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(confirmation) => {
                metrics::counter!("seats_released_total")
                    .increment(confirmation.released_seat_ids.len() as u64);
            }
            Err(e) => {
                metrics::counter!("booking_rejections_total", "reason" => e.reason())
                    .increment(1);
            }
        }
        result
    }

    async fn run_cancellation(
        &self,
        user_id: UserId,
        selection: SeatSelection,
    ) -> Result<CancellationConfirmation> {
        let mut tx = self.store.begin_cancellation().await?;

        let owned = tx.owned_seats(user_id, selection.as_slice()).await?;
        if owned.len() < selection.len() {
            tx.rollback().await?;
            tracing::warn!(
                requested = selection.len(),
                owned = owned.len(),
                "cancellation refused"
            );
            return Err(BookingError::Forbidden {
                requested: selection.len(),
                owned: owned.len(),
            });
        }

        let released = tx.release(user_id, selection.as_slice()).await?;
        if released != selection.len() as u64 {
            return Err(BookingError::ConflictRetryable(format!(
                "expected to release {} bookings, released {released}",
                selection.len()
            )));
        }
        tx.commit().await?;

        tracing::info!(seats = selection.len(), "bookings cancelled");
        Ok(CancellationConfirmation {
            released_seat_ids: selection.into_vec(),
        })
    }
}
