use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::{
    BookingId, BookingView, InventorySummary, Result, Seat, SeatId, SeatView, StoreError, UserId,
    VenueLayout,
    seat::Booking,
    store::{InventoryTx, SeatStore},
};

#[derive(Debug, Clone, Default)]
struct VenueState {
    seats: BTreeMap<SeatId, Seat>,
    bookings: BTreeMap<BookingId, Booking>,
    next_booking_id: i64,
}

impl VenueState {
    fn booking_for_seat(&self, seat_id: SeatId) -> Option<&Booking> {
        self.bookings.values().find(|b| b.seat_id == seat_id)
    }

    fn ordered_seats(&self) -> Vec<&Seat> {
        let mut seats: Vec<_> = self.seats.values().collect();
        seats.sort_by_key(|s| (s.row_number, s.seat_number));
        seats
    }
}

/// In-memory seat store.
///
/// Committed state sits behind an `RwLock` that is only write-locked for the
/// instant a transaction publishes its changes, so readers are never held up
/// by a running transaction. Writers are serialized by a separate mutex that
/// each transaction holds from `begin_*` until it is committed or dropped.
///
/// Cancellations take the same mutex as bookings, so cancellations of
/// unrelated seats run one after another and wait for any open booking.
/// PostgreSQL only locks the ledger rows a cancellation touches.
///
/// Any `UserId` is accepted; there is no user table to check it against.
#[derive(Clone, Default)]
pub struct InMemorySeatStore {
    committed: Arc<RwLock<VenueState>>,
    writer: Arc<Mutex<()>>,
    fail_next_assign: Arc<AtomicBool>,
}

impl InMemorySeatStore {
    /// Creates a new empty in-memory seat store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the venue already initialized.
    pub async fn with_layout(layout: &VenueLayout) -> Result<Self> {
        let store = Self::new();
        store.initialize_venue(layout).await?;
        Ok(store)
    }

    /// Makes the next `assign` report a seat-uniqueness violation, as if a
    /// concurrent transaction had slipped past the isolation layer.
    pub fn fail_next_assign(&self) {
        self.fail_next_assign.store(true, Ordering::SeqCst);
    }

    /// Returns the committed seats, ordered by row then seat number.
    pub async fn seats(&self) -> Vec<Seat> {
        let state = self.committed.read().await;
        state.ordered_seats().into_iter().cloned().collect()
    }

    /// Returns every committed booking.
    pub async fn bookings(&self) -> Vec<Booking> {
        self.committed.read().await.bookings.values().cloned().collect()
    }

    async fn begin(&self) -> InMemoryTx {
        let writer = self.writer.clone().lock_owned().await;
        let staged = self.committed.read().await.clone();
        InMemoryTx {
            _writer: writer,
            committed: self.committed.clone(),
            staged,
            fail_next_assign: self.fail_next_assign.clone(),
        }
    }
}

struct InMemoryTx {
    _writer: OwnedMutexGuard<()>,
    committed: Arc<RwLock<VenueState>>,
    staged: VenueState,
    fail_next_assign: Arc<AtomicBool>,
}

#[async_trait]
impl InventoryTx for InMemoryTx {
    async fn snapshot(&mut self) -> Result<Vec<Seat>> {
        Ok(self.staged.ordered_seats().into_iter().cloned().collect())
    }

    async fn assign(
        &mut self,
        user_id: UserId,
        seat_id: SeatId,
        booked_at: DateTime<Utc>,
    ) -> Result<BookingId> {
        if !self.staged.seats.contains_key(&seat_id) {
            return Err(StoreError::SeatNotFound(seat_id));
        }

        // Unique constraint simulation
        if self.fail_next_assign.swap(false, Ordering::SeqCst)
            || self.staged.booking_for_seat(seat_id).is_some()
        {
            return Err(StoreError::SeatAlreadyBooked { seat_id });
        }

        if let Some(seat) = self.staged.seats.get_mut(&seat_id) {
            seat.is_available = false;
        }

        self.staged.next_booking_id += 1;
        let booking_id = BookingId::new(self.staged.next_booking_id);
        self.staged.bookings.insert(
            booking_id,
            Booking {
                id: booking_id,
                user_id,
                seat_id,
                booked_at,
            },
        );

        Ok(booking_id)
    }

    async fn owned_seats(&mut self, user_id: UserId, seat_ids: &[SeatId]) -> Result<Vec<SeatId>> {
        let mut owned: Vec<SeatId> = Vec::new();
        for &seat_id in seat_ids {
            let is_owner = self
                .staged
                .booking_for_seat(seat_id)
                .is_some_and(|b| b.user_id == user_id);
            if is_owner && !owned.contains(&seat_id) {
                owned.push(seat_id);
            }
        }
        Ok(owned)
    }

    async fn release(&mut self, user_id: UserId, seat_ids: &[SeatId]) -> Result<u64> {
        let released: Vec<(BookingId, SeatId)> = self
            .staged
            .bookings
            .values()
            .filter(|b| b.user_id == user_id && seat_ids.contains(&b.seat_id))
            .map(|b| (b.id, b.seat_id))
            .collect();

        for (booking_id, seat_id) in &released {
            self.staged.bookings.remove(booking_id);
            if let Some(seat) = self.staged.seats.get_mut(seat_id) {
                seat.is_available = true;
            }
        }

        Ok(released.len() as u64)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTx {
            _writer,
            committed,
            staged,
            ..
        } = *self;
        *committed.write().await = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl SeatStore for InMemorySeatStore {
    async fn initialize_venue(&self, layout: &VenueLayout) -> Result<u64> {
        let _writer = self.writer.lock().await;
        let mut state = self.committed.write().await;

        if !state.seats.is_empty() {
            return Ok(0);
        }

        for (index, placement) in layout.seats().enumerate() {
            let id = SeatId::new(index as i64 + 1);
            state.seats.insert(
                id,
                Seat {
                    id,
                    seat_number: placement.seat_number,
                    row_number: placement.row_number,
                    is_available: true,
                },
            );
        }

        Ok(state.seats.len() as u64)
    }

    async fn begin_booking(&self) -> Result<Box<dyn InventoryTx>> {
        Ok(Box::new(self.begin().await))
    }

    async fn begin_cancellation(&self) -> Result<Box<dyn InventoryTx>> {
        Ok(Box::new(self.begin().await))
    }

    async fn list_seats(&self, requester: UserId) -> Result<Vec<SeatView>> {
        let state = self.committed.read().await;
        let owners: HashMap<SeatId, UserId> = state
            .bookings
            .values()
            .map(|b| (b.seat_id, b.user_id))
            .collect();

        Ok(state
            .ordered_seats()
            .into_iter()
            .map(|seat| SeatView {
                id: seat.id,
                seat_number: seat.seat_number,
                row_number: seat.row_number,
                is_available: seat.is_available,
                is_booked_by_requester: owners.get(&seat.id) == Some(&requester),
            })
            .collect())
    }

    async fn list_bookings(&self, user_id: UserId) -> Result<Vec<BookingView>> {
        let state = self.committed.read().await;
        let mut bookings: Vec<BookingView> = state
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .filter_map(|b| {
                state.seats.get(&b.seat_id).map(|seat| BookingView {
                    booking_id: b.id,
                    seat_id: seat.id,
                    seat_number: seat.seat_number,
                    row_number: seat.row_number,
                    booked_at: b.booked_at,
                })
            })
            .collect();

        bookings.sort_by(|a, b| {
            b.booked_at
                .cmp(&a.booked_at)
                .then(b.booking_id.cmp(&a.booking_id))
        });
        Ok(bookings)
    }

    async fn summary(&self) -> Result<InventorySummary> {
        let state = self.committed.read().await;
        Ok(InventorySummary {
            total: state.seats.len() as u64,
            available: state.seats.values().filter(|s| s.is_available).count() as u64,
            booked: state.bookings.len() as u64,
        })
    }
}
