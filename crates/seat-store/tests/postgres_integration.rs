//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p seat-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::Utc;
use seat_store::{
    PostgresSeatStore, SeatId, SeatStore, SeatStoreExt, StoreError, UserId, VenueLayout,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!("../../../migrations/001_create_seat_tables.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with an empty venue of the given layout and two users.
async fn get_test_store(layout: VenueLayout) -> PostgresSeatStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE bookings, seats, users RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query(
        r#"
        INSERT INTO users (username, email, password) VALUES
            ('alice', 'alice@example.com', 'x'),
            ('bob', 'bob@example.com', 'x')
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let store = PostgresSeatStore::new(pool);
    store.initialize_venue(&layout).await.unwrap();
    store
}

const ALICE: UserId = UserId::new(1);
const BOB: UserId = UserId::new(2);

#[tokio::test]
#[serial]
async fn initialize_venue_is_idempotent() {
    let store = get_test_store(VenueLayout::coach()).await;

    let summary = store.summary().await.unwrap();
    assert_eq!(summary.total, 80);
    assert_eq!(summary.available, 80);

    let created = store.initialize_venue(&VenueLayout::coach()).await.unwrap();
    assert_eq!(created, 0);
    assert!(store.is_initialized().await.unwrap());
}

#[tokio::test]
#[serial]
async fn snapshot_is_ordered_and_complete() {
    let store = get_test_store(VenueLayout::new(2, 3).unwrap()).await;

    let mut tx = store.begin_booking().await.unwrap();
    let seats = tx.snapshot().await.unwrap();
    tx.rollback().await.unwrap();

    let positions: Vec<_> = seats
        .iter()
        .map(|s| (s.row_number, s.seat_number))
        .collect();
    assert_eq!(positions.len(), 10);
    assert_eq!(positions[0], (1, 1));
    assert_eq!(positions[7], (2, 8));
    assert!(seats.iter().all(|s| s.is_available));
}

#[tokio::test]
#[serial]
async fn assign_and_commit_updates_both_tables() {
    let store = get_test_store(VenueLayout::new(2, 3).unwrap()).await;

    let mut tx = store.begin_booking().await.unwrap();
    tx.assign(ALICE, SeatId::new(2), Utc::now()).await.unwrap();
    tx.assign(ALICE, SeatId::new(3), Utc::now()).await.unwrap();
    tx.commit().await.unwrap();

    let summary = store.summary().await.unwrap();
    assert_eq!(summary.available, 8);
    assert_eq!(summary.booked, 2);
    assert!(summary.is_consistent());

    let seats = store.list_seats(ALICE).await.unwrap();
    assert!(seats[1].is_booked_by_requester);
    let seats = store.list_seats(BOB).await.unwrap();
    assert!(!seats[1].is_booked_by_requester);
    assert!(!seats[1].is_available);
}

#[tokio::test]
#[serial]
async fn dropped_transaction_leaves_no_trace() {
    let store = get_test_store(VenueLayout::new(2, 3).unwrap()).await;

    {
        let mut tx = store.begin_booking().await.unwrap();
        tx.assign(ALICE, SeatId::new(1), Utc::now()).await.unwrap();
    }

    let summary = store.summary().await.unwrap();
    assert_eq!(summary.available, 10);
    assert_eq!(summary.booked, 0);
}

#[tokio::test]
#[serial]
async fn double_assignment_is_rejected() {
    let store = get_test_store(VenueLayout::new(2, 3).unwrap()).await;

    let mut tx = store.begin_booking().await.unwrap();
    tx.assign(ALICE, SeatId::new(5), Utc::now()).await.unwrap();
    let result = tx.assign(BOB, SeatId::new(5), Utc::now()).await;

    assert!(matches!(
        result,
        Err(StoreError::SeatAlreadyBooked { seat_id }) if seat_id == SeatId::new(5)
    ));
}

#[tokio::test]
#[serial]
async fn assigning_missing_seat_is_not_found() {
    let store = get_test_store(VenueLayout::new(2, 3).unwrap()).await;

    let mut tx = store.begin_booking().await.unwrap();
    let result = tx.assign(ALICE, SeatId::new(500), Utc::now()).await;
    assert!(matches!(result, Err(StoreError::SeatNotFound(_))));
}

#[tokio::test]
#[serial]
async fn assigning_to_unknown_user_violates_foreign_key() {
    let store = get_test_store(VenueLayout::new(2, 3).unwrap()).await;

    let mut tx = store.begin_booking().await.unwrap();
    let result = tx.assign(UserId::new(4242), SeatId::new(1), Utc::now()).await;
    assert!(matches!(result, Err(StoreError::Database(_))));
    drop(tx);

    assert_eq!(store.summary().await.unwrap().available, 10);
}

#[tokio::test]
#[serial]
async fn deleting_user_with_bookings_is_refused() {
    let store = get_test_store(VenueLayout::new(2, 3).unwrap()).await;

    let mut tx = store.begin_booking().await.unwrap();
    tx.assign(ALICE, SeatId::new(1), Utc::now()).await.unwrap();
    tx.commit().await.unwrap();

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(ALICE.as_i64())
        .execute(store.pool())
        .await;
    assert!(result.is_err());

    let summary = store.summary().await.unwrap();
    assert_eq!(summary.booked, 1);
    assert!(summary.is_consistent());
}

#[tokio::test]
#[serial]
async fn cancellation_checks_ownership_and_releases() {
    let store = get_test_store(VenueLayout::new(2, 3).unwrap()).await;

    let mut tx = store.begin_booking().await.unwrap();
    tx.assign(ALICE, SeatId::new(1), Utc::now()).await.unwrap();
    tx.assign(BOB, SeatId::new(2), Utc::now()).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin_cancellation().await.unwrap();
    let owned = tx
        .owned_seats(ALICE, &[SeatId::new(1), SeatId::new(2)])
        .await
        .unwrap();
    assert_eq!(owned, vec![SeatId::new(1)]);

    let removed = tx.release(ALICE, &[SeatId::new(1)]).await.unwrap();
    tx.commit().await.unwrap();
    assert_eq!(removed, 1);

    let summary = store.summary().await.unwrap();
    assert_eq!(summary.available, 9);
    assert_eq!(summary.booked, 1);
    assert!(store.list_bookings(ALICE).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn list_bookings_most_recent_first() {
    let store = get_test_store(VenueLayout::new(2, 3).unwrap()).await;
    let earlier = Utc::now() - chrono::Duration::minutes(10);

    let mut tx = store.begin_booking().await.unwrap();
    tx.assign(ALICE, SeatId::new(4), earlier).await.unwrap();
    tx.assign(ALICE, SeatId::new(9), Utc::now()).await.unwrap();
    tx.commit().await.unwrap();

    let bookings = store.list_bookings(ALICE).await.unwrap();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0].seat_number, 9);
    assert_eq!(bookings[0].row_number, 2);
    assert_eq!(bookings[1].seat_number, 4);
}

#[tokio::test]
#[serial]
async fn booking_transactions_serialize() {
    let store = get_test_store(VenueLayout::new(1, 1).unwrap()).await;

    let mut first = store.begin_booking().await.unwrap();
    let seats = first.snapshot().await.unwrap();
    assert!(seats[0].is_available);

    let contender = {
        let store = store.clone();
        tokio::spawn(async move {
            let mut tx = store.begin_booking().await.unwrap();
            let seats = tx.snapshot().await.unwrap();
            seats[0].is_available
        })
    };

    // Give the contender time to queue on the table lock.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    first.assign(ALICE, seats[0].id, Utc::now()).await.unwrap();
    first.commit().await.unwrap();

    let contender_saw_available = contender.await.unwrap();
    assert!(!contender_saw_available);
}
