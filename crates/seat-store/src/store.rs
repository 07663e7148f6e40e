use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    BookingId, BookingView, InventorySummary, Result, Seat, SeatId, SeatView, UserId, VenueLayout,
};

/// A scoped, atomic unit of work against the inventory and the ledger.
///
/// Nothing written through the handle is visible to other transactions until
/// [`InventoryTx::commit`] succeeds. Dropping the handle without committing
/// rolls every change back, so early returns and `?` never leave partial
/// bookings behind.
#[async_trait]
pub trait InventoryTx: Send {
    /// Reads every seat, ordered by row number then seat number.
    async fn snapshot(&mut self) -> Result<Vec<Seat>>;

    /// Marks the seat unavailable and records a booking owned by `user_id`.
    ///
    /// Fails with `SeatAlreadyBooked` if the seat already has a ledger row.
    async fn assign(
        &mut self,
        user_id: UserId,
        seat_id: SeatId,
        booked_at: DateTime<Utc>,
    ) -> Result<BookingId>;

    /// Returns the seats among `seat_ids` currently booked by `user_id`.
    ///
    /// The matching ledger rows stay locked until the transaction ends, so
    /// ownership cannot change between this check and [`InventoryTx::release`].
    async fn owned_seats(&mut self, user_id: UserId, seat_ids: &[SeatId]) -> Result<Vec<SeatId>>;

    /// Makes the seats available again and deletes the owner's ledger rows.
    ///
    /// Returns the number of bookings removed.
    async fn release(&mut self, user_id: UserId, seat_ids: &[SeatId]) -> Result<u64>;

    /// Commits all changes made through this handle.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discards all changes made through this handle.
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Core trait for seat inventory and booking ledger storage.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait SeatStore: Send + Sync {
    /// Creates the venue's seats if the venue is empty.
    ///
    /// Returns the number of seats created, which is 0 when the venue already
    /// exists. An existing venue is never regenerated.
    async fn initialize_venue(&self, layout: &VenueLayout) -> Result<u64>;

    /// Opens a booking transaction holding exclusive access to the inventory.
    ///
    /// Only one booking transaction runs at a time; the next one sees the
    /// committed effects of the previous one.
    ///
    /// Whether the booking user must exist is up to the backend:
    /// [`crate::PostgresSeatStore`] enforces a foreign key to `users`, so
    /// [`InventoryTx::assign`] fails with `Database` for an unknown user, while
    /// [`crate::InMemorySeatStore`] accepts any id.
    async fn begin_booking(&self) -> Result<Box<dyn InventoryTx>>;

    /// Opens a cancellation transaction.
    async fn begin_cancellation(&self) -> Result<Box<dyn InventoryTx>>;

    /// Lists every seat with a flag telling whether `requester` booked it.
    ///
    /// Seats are returned ordered by row number then seat number.
    async fn list_seats(&self, requester: UserId) -> Result<Vec<SeatView>>;

    /// Lists the bookings owned by `user_id`, most recent first.
    async fn list_bookings(&self, user_id: UserId) -> Result<Vec<BookingView>>;

    /// Counts seats and ledger rows.
    async fn summary(&self) -> Result<InventorySummary>;
}

/// Extension trait providing convenience methods for seat stores.
#[async_trait]
pub trait SeatStoreExt: SeatStore {
    /// Checks whether the venue has been initialized.
    async fn is_initialized(&self) -> Result<bool> {
        Ok(self.summary().await?.total > 0)
    }

    /// Returns the number of seats currently free.
    async fn available_count(&self) -> Result<u64> {
        Ok(self.summary().await?.available)
    }
}

// Blanket implementation for all SeatStore implementations
impl<T: SeatStore + ?Sized> SeatStoreExt for T {}

#[async_trait]
impl<T: SeatStore + ?Sized> SeatStore for std::sync::Arc<T> {
    async fn initialize_venue(&self, layout: &VenueLayout) -> Result<u64> {
        (**self).initialize_venue(layout).await
    }

    async fn begin_booking(&self) -> Result<Box<dyn InventoryTx>> {
        (**self).begin_booking().await
    }

    async fn begin_cancellation(&self) -> Result<Box<dyn InventoryTx>> {
        (**self).begin_cancellation().await
    }

    async fn list_seats(&self, requester: UserId) -> Result<Vec<SeatView>> {
        (**self).list_seats(requester).await
    }

    async fn list_bookings(&self, user_id: UserId) -> Result<Vec<BookingView>> {
        (**self).list_bookings(user_id).await
    }

    async fn summary(&self) -> Result<InventorySummary> {
        (**self).summary().await
    }
}
