//! Shared identifier types used across the seat reservation crates.

pub mod types;

pub use types::{BookingId, SeatId, UserId};
