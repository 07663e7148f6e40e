//! Fixed seat layout of the coach.

use serde::{Deserialize, Serialize};

use crate::{Result, StoreError};

/// Number of seats in every full row.
pub const SEATS_PER_ROW: u32 = 7;

/// Position of a seat produced by a [`VenueLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatPlacement {
    pub seat_number: i32,
    pub row_number: i32,
}

/// Rows of [`SEATS_PER_ROW`] seats, except the final row which may hold fewer.
///
/// Seat numbers are assigned row-major, so seat `k` of row `r` is numbered
/// `(r - 1) * SEATS_PER_ROW + k` even when the last row is short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueLayout {
    rows: u32,
    last_row_seats: u32,
}

impl VenueLayout {
    /// Creates a layout with `rows` rows and `last_row_seats` seats in the final row.
    pub fn new(rows: u32, last_row_seats: u32) -> Result<Self> {
        if rows == 0 {
            return Err(StoreError::InvalidLayout(
                "venue must have at least one row".to_string(),
            ));
        }
        if last_row_seats == 0 || last_row_seats > SEATS_PER_ROW {
            return Err(StoreError::InvalidLayout(format!(
                "last row must hold between 1 and {SEATS_PER_ROW} seats, got {last_row_seats}"
            )));
        }
        // Seat numbers are stored as INTEGER.
        if rows.checked_mul(SEATS_PER_ROW).is_none_or(|n| n > i32::MAX as u32) {
            return Err(StoreError::InvalidLayout(format!(
                "{rows} rows exceed the seat number range"
            )));
        }
        Ok(Self {
            rows,
            last_row_seats,
        })
    }

    /// The standard coach: 11 full rows and a final row of 3, 80 seats in total.
    pub fn coach() -> Self {
        Self {
            rows: 12,
            last_row_seats: 3,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn last_row_seats(&self) -> u32 {
        self.last_row_seats
    }

    /// Total number of seats in the venue.
    pub fn total_seats(&self) -> u32 {
        (self.rows - 1) * SEATS_PER_ROW + self.last_row_seats
    }

    /// Returns every seat position, ordered by row then seat number.
    pub fn seats(&self) -> impl Iterator<Item = SeatPlacement> + '_ {
        (1..=self.rows).flat_map(move |row| {
            let in_row = if row == self.rows {
                self.last_row_seats
            } else {
                SEATS_PER_ROW
            };
            (1..=in_row).map(move |k| SeatPlacement {
                seat_number: ((row - 1) * SEATS_PER_ROW + k) as i32,
                row_number: row as i32,
            })
        })
    }
}

impl Default for VenueLayout {
    fn default() -> Self {
        Self::coach()
    }
}
