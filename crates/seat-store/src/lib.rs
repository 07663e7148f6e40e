//! Seat inventory and booking ledger storage.
//!
//! The [`SeatStore`] trait is the data-access contract used by the booking
//! engine. Every mutation goes through an [`InventoryTx`] handle so that the
//! seat availability flags and the booking ledger always change together.
//! Two implementations are provided:
//! - [`InMemorySeatStore`] for tests and single-process use
//! - [`PostgresSeatStore`] backed by `sqlx`

pub mod error;
pub mod layout;
pub mod memory;
pub mod postgres;
pub mod seat;
pub mod store;

pub use common::{BookingId, SeatId, UserId};
pub use error::{Result, StoreError};
pub use layout::{SEATS_PER_ROW, SeatPlacement, VenueLayout};
pub use memory::InMemorySeatStore;
pub use postgres::PostgresSeatStore;
pub use seat::{AssignedSeat, Booking, BookingView, InventorySummary, Seat, SeatView};
pub use store::{InventoryTx, SeatStore, SeatStoreExt};
