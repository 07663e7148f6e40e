//! Read-only views of the seat inventory.

use seat_store::{BookingView, InventorySummary, SeatStore, SeatView, UserId};

use crate::error::Result;

/// Serves seat and booking listings.
///
/// Queries never take the booking lock; they see the last committed state.
pub struct SeatQueryService<S: SeatStore> {
    store: S,
}

impl<S: SeatStore> SeatQueryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Every seat ordered by (row, seat number), flagged with whether
    /// `requester` holds it.
    #[tracing::instrument(skip(self))]
    pub async fn list_seats(&self, requester: UserId) -> Result<Vec<SeatView>> {
        Ok(self.store.list_seats(requester).await?)
    }

    /// The user's bookings, most recent first.
    #[tracing::instrument(skip(self))]
    pub async fn list_bookings(&self, user_id: UserId) -> Result<Vec<BookingView>> {
        Ok(self.store.list_bookings(user_id).await?)
    }

    pub async fn summary(&self) -> Result<InventorySummary> {
        Ok(self.store.summary().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BookingService;
    use seat_store::{InMemorySeatStore, VenueLayout};

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    async fn setup() -> (
        BookingService<InMemorySeatStore>,
        SeatQueryService<InMemorySeatStore>,
    ) {
        let store = InMemorySeatStore::with_layout(&VenueLayout::coach())
            .await
            .unwrap();
        (BookingService::new(store.clone()), SeatQueryService::new(store))
    }

    #[tokio::test]
    async fn list_seats_flags_requester_bookings() {
        let (booking, query) = setup().await;
        booking.book(ALICE, 2).await.unwrap();
        booking.book(BOB, 1).await.unwrap();

        let seats = query.list_seats(ALICE).await.unwrap();
        assert_eq!(seats.len(), 80);

        let mine: Vec<_> = seats
            .iter()
            .filter(|s| s.is_booked_by_requester)
            .map(|s| s.seat_number)
            .collect();
        assert_eq!(mine, vec![1, 2]);
        assert!(seats[2].is_available);
        // Bob lands in the emptier second row.
        assert!(!seats[7].is_available);
        assert!(!seats[7].is_booked_by_requester);
    }

    #[tokio::test]
    async fn list_bookings_only_returns_own() {
        let (booking, query) = setup().await;
        booking.book(ALICE, 3).await.unwrap();
        booking.book(BOB, 2).await.unwrap();

        let bookings = query.list_bookings(BOB).await.unwrap();
        assert_eq!(bookings.len(), 2);
        assert!(bookings.iter().all(|b| b.row_number == 2));

        assert!(query.list_bookings(UserId::new(99)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_tracks_bookings_and_cancellations() {
        let (booking, query) = setup().await;
        let confirmation = booking.book(ALICE, 4).await.unwrap();
        assert_eq!(query.summary().await.unwrap().booked, 4);

        let ids: Vec<_> = confirmation.assigned_seats.iter().map(|s| s.id).collect();
        booking.cancel(ALICE, &ids).await.unwrap();

        let summary = query.summary().await.unwrap();
        assert_eq!(summary.available, 80);
        assert_eq!(summary.booked, 0);
        assert!(summary.is_consistent());
    }
}
