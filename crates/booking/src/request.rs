//! Validated request inputs.

use seat_store::SeatId;

use crate::error::{BookingError, Result};

/// Seats a single booking request may ask for, one coach row.
pub const DEFAULT_MAX_SEATS_PER_REQUEST: usize = 7;

/// A seat count within `1..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatCount(usize);

impl SeatCount {
    /// Validates a requested seat count against the per-request maximum.
    pub fn new(count: i64, max: usize) -> Result<Self> {
        match usize::try_from(count) {
            Ok(n) if (1..=max).contains(&n) => Ok(Self(n)),
            _ => Err(BookingError::InvalidRequest(format!(
                "You can book between 1 and {max} seats per request, got {count}"
            ))),
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

/// A non-empty list of seat ids, in the order they were requested.
///
/// Repeated ids are kept: each occurrence must be matched by a booking the
/// requester owns, so a repeat can never pass the ownership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatSelection(Vec<SeatId>);

impl SeatSelection {
    pub fn new(seat_ids: &[SeatId]) -> Result<Self> {
        if seat_ids.is_empty() {
            return Err(BookingError::InvalidRequest(
                "Seat IDs must be provided as a non-empty list".to_string(),
            ));
        }

        Ok(Self(seat_ids.to_vec()))
    }

    pub fn as_slice(&self) -> &[SeatId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<SeatId> {
        self.0
    }
}
