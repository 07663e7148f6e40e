use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BookingId, SeatId, UserId};

/// A physical seat in the venue.
///
/// Seats are created once when the venue is initialized. The availability
/// flag is the only field that ever changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: SeatId,
    /// Unique across the venue, assigned row-major.
    pub seat_number: i32,
    pub row_number: i32,
    pub is_available: bool,
}

impl Seat {
    /// Returns the identifying part of the seat, as handed back to a booker.
    pub fn assigned(&self) -> AssignedSeat {
        AssignedSeat {
            id: self.id,
            seat_number: self.seat_number,
            row_number: self.row_number,
        }
    }
}

/// A seat assigned to a user by a booking transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedSeat {
    pub id: SeatId,
    pub seat_number: i32,
    pub row_number: i32,
}

/// A row in the booking ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub seat_id: SeatId,
    pub booked_at: DateTime<Utc>,
}

/// A seat as seen by a particular user on the seat map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub id: SeatId,
    pub seat_number: i32,
    pub row_number: i32,
    pub is_available: bool,
    pub is_booked_by_requester: bool,
}

/// A booking joined with its seat, as listed for its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub booking_id: BookingId,
    pub seat_id: SeatId,
    pub seat_number: i32,
    pub row_number: i32,
    pub booked_at: DateTime<Utc>,
}

/// Seat counts across the whole venue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total: u64,
    pub available: u64,
    /// Number of rows in the booking ledger.
    pub booked: u64,
}

impl InventorySummary {
    /// Returns true when availability flags and the ledger agree.
    pub fn is_consistent(&self) -> bool {
        self.available + self.booked == self.total
    }
}
