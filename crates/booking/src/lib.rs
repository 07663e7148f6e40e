//! Seat allocation and booking/cancellation transaction engine.
//!
//! This crate provides:
//! - [`allocate`], the pure seat selection policy (same row first, then
//!   lowest seats venue-wide)
//! - [`BookingService`], which runs allocation and the ledger/inventory
//!   mutation as one atomic unit, and the matching cancellation path
//! - [`SeatQueryService`] for the read-only seat map and booking list

pub mod allocator;
pub mod config;
pub mod error;
pub mod query;
pub mod request;
pub mod service;

pub use allocator::{Allocation, AllocationStrategy, InsufficientCapacity, allocate};
pub use config::BookingConfig;
pub use error::{BookingError, Result};
pub use query::SeatQueryService;
pub use request::{DEFAULT_MAX_SEATS_PER_REQUEST, SeatCount, SeatSelection};
pub use service::{BookingConfirmation, BookingService, CancellationConfirmation};
