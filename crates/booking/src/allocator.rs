//! Seat selection policy.
//!
//! Prefer seating the whole party in one row; otherwise take the lowest free
//! seats across the venue. The policy is a pure function of the snapshot.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use seat_store::{AssignedSeat, Seat};
use thiserror::Error;

/// How an allocation was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationStrategy {
    /// Every seat comes from this row.
    SameRow { row_number: i32 },
    /// No row had enough free seats; seats span rows.
    CrossRow,
}

/// Seats chosen for a booking request, in assignment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub seats: Vec<AssignedSeat>,
    pub strategy: AllocationStrategy,
}

/// The venue does not have enough free seats for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("requested {requested} seats but only {available} are available")]
pub struct InsufficientCapacity {
    pub requested: usize,
    pub available: usize,
}

/// Picks `count` seats from `snapshot`.
///
/// 1. Among rows with at least `count` free seats, the row with the most free
///    seats wins (lowest row number on ties); its `count` lowest-numbered free
///    seats are taken.
/// 2. Otherwise the `count` lowest free seats by (row, seat number) are taken.
/// 3. Fewer than `count` free seats in total is an error; nothing is picked.
pub fn allocate(snapshot: &[Seat], count: usize) -> Result<Allocation, InsufficientCapacity> {
    let mut free: Vec<&Seat> = snapshot.iter().filter(|s| s.is_available).collect();
    if free.len() < count {
        return Err(InsufficientCapacity {
            requested: count,
            available: free.len(),
        });
    }
    free.sort_by_key(|s| (s.row_number, s.seat_number));

    let mut free_per_row: BTreeMap<i32, usize> = BTreeMap::new();
    for seat in &free {
        *free_per_row.entry(seat.row_number).or_default() += 1;
    }

    let best_row = free_per_row
        .iter()
        .filter(|&(_, &available)| available >= count)
        .max_by_key(|&(&row, &available)| (available, Reverse(row)))
        .map(|(&row, _)| row);

    let allocation = match best_row {
        Some(row_number) => Allocation {
            seats: free
                .iter()
                .filter(|s| s.row_number == row_number)
                .take(count)
                .map(|s| s.assigned())
                .collect(),
            strategy: AllocationStrategy::SameRow { row_number },
        },
        None => Allocation {
            seats: free.iter().take(count).map(|s| s.assigned()).collect(),
            strategy: AllocationStrategy::CrossRow,
        },
    };

    Ok(allocation)
}
