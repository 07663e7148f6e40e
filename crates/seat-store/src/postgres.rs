use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    BookingId, BookingView, InventorySummary, Result, Seat, SeatId, SeatView, StoreError, UserId,
    VenueLayout,
    store::{InventoryTx, SeatStore},
};

const UNIQUE_BOOKING_SEAT: &str = "unique_booking_seat";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// PostgreSQL-backed seat store.
#[derive(Clone)]
pub struct PostgresSeatStore {
    pool: PgPool,
}

impl PostgresSeatStore {
    /// Creates a new PostgreSQL seat store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_seat(row: PgRow) -> Result<Seat> {
        Ok(Seat {
            id: SeatId::new(row.try_get("id")?),
            seat_number: row.try_get("seat_number")?,
            row_number: row.try_get("row_number")?,
            is_available: row.try_get("is_available")?,
        })
    }

    fn row_to_seat_view(row: PgRow) -> Result<SeatView> {
        Ok(SeatView {
            id: SeatId::new(row.try_get("id")?),
            seat_number: row.try_get("seat_number")?,
            row_number: row.try_get("row_number")?,
            is_available: row.try_get("is_available")?,
            is_booked_by_requester: row.try_get("booked_by_me")?,
        })
    }

    fn row_to_booking_view(row: PgRow) -> Result<BookingView> {
        Ok(BookingView {
            booking_id: BookingId::new(row.try_get("booking_id")?),
            seat_id: SeatId::new(row.try_get("seat_id")?),
            seat_number: row.try_get("seat_number")?,
            row_number: row.try_get("row_number")?,
            booked_at: row.try_get("booked_at")?,
        })
    }
}

/// Maps isolation-layer aborts to `Conflict`; everything else stays a database error.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && let Some(code) = db_err.code()
        && (code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED)
    {
        return StoreError::Conflict(db_err.message().to_string());
    }
    StoreError::Database(err)
}

fn seat_ids_param(seat_ids: &[SeatId]) -> Vec<i64> {
    seat_ids.iter().map(SeatId::as_i64).collect()
}

fn count_param(row: &PgRow, column: &str) -> Result<u64> {
    let value: i64 = row.try_get(column)?;
    Ok(u64::try_from(value).unwrap_or_default())
}

struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl InventoryTx for PostgresTx {
    async fn snapshot(&mut self) -> Result<Vec<Seat>> {
        let rows = sqlx::query(
            r#"
            SELECT id, seat_number, row_number, is_available
            FROM seats
            ORDER BY row_number ASC, seat_number ASC
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(classify)?;

        rows.into_iter().map(PostgresSeatStore::row_to_seat).collect()
    }

    async fn assign(
        &mut self,
        user_id: UserId,
        seat_id: SeatId,
        booked_at: DateTime<Utc>,
    ) -> Result<BookingId> {
        let updated = sqlx::query(
            "UPDATE seats SET is_available = FALSE WHERE id = $1 AND is_available = TRUE",
        )
        .bind(seat_id.as_i64())
        .execute(&mut *self.tx)
        .await
        .map_err(classify)?;

        if updated.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM seats WHERE id = $1)")
                    .bind(seat_id.as_i64())
                    .fetch_one(&mut *self.tx)
                    .await
                    .map_err(classify)?;
            return Err(if exists {
                StoreError::SeatAlreadyBooked { seat_id }
            } else {
                StoreError::SeatNotFound(seat_id)
            });
        }

        let booking_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (user_id, seat_id, booked_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id.as_i64())
        .bind(seat_id.as_i64())
        .bind(booked_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some(UNIQUE_BOOKING_SEAT)
            {
                return StoreError::SeatAlreadyBooked { seat_id };
            }
            classify(e)
        })?;

        Ok(BookingId::new(booking_id))
    }

    async fn owned_seats(&mut self, user_id: UserId, seat_ids: &[SeatId]) -> Result<Vec<SeatId>> {
        let owned: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT seat_id FROM bookings
            WHERE seat_id = ANY($1) AND user_id = $2
            ORDER BY seat_id
            FOR UPDATE
            "#,
        )
        .bind(seat_ids_param(seat_ids))
        .bind(user_id.as_i64())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(classify)?;

        Ok(owned.into_iter().map(SeatId::new).collect())
    }

    async fn release(&mut self, user_id: UserId, seat_ids: &[SeatId]) -> Result<u64> {
        let ids = seat_ids_param(seat_ids);

        sqlx::query(
            r#"
            UPDATE seats SET is_available = TRUE
            WHERE id IN (
                SELECT seat_id FROM bookings
                WHERE seat_id = ANY($1) AND user_id = $2
            )
            "#,
        )
        .bind(&ids)
        .bind(user_id.as_i64())
        .execute(&mut *self.tx)
        .await
        .map_err(classify)?;

        let deleted = sqlx::query("DELETE FROM bookings WHERE seat_id = ANY($1) AND user_id = $2")
            .bind(&ids)
            .bind(user_id.as_i64())
            .execute(&mut *self.tx)
            .await
            .map_err(classify)?;

        Ok(deleted.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(classify)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(classify)
    }
}

#[async_trait]
impl SeatStore for PostgresSeatStore {
    async fn initialize_venue(&self, layout: &VenueLayout) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("LOCK TABLE seats IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seats")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            tracing::debug!(existing, "venue already initialized");
            return Ok(0);
        }

        let (numbers, rows): (Vec<i32>, Vec<i32>) = layout
            .seats()
            .map(|s| (s.seat_number, s.row_number))
            .unzip();

        let inserted = sqlx::query(
            r#"
            INSERT INTO seats (seat_number, row_number, is_available)
            SELECT n, r, TRUE FROM UNNEST($1::INTEGER[], $2::INTEGER[]) AS t(n, r)
            "#,
        )
        .bind(&numbers)
        .bind(&rows)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(inserted.rows_affected())
    }

    async fn begin_booking(&self) -> Result<Box<dyn InventoryTx>> {
        let mut tx = self.pool.begin().await?;

        // Blocks other booking transactions until commit; plain SELECTs still proceed.
        sqlx::query("LOCK TABLE seats IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(classify)?;

        Ok(Box::new(PostgresTx { tx }))
    }

    async fn begin_cancellation(&self) -> Result<Box<dyn InventoryTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTx { tx }))
    }

    async fn list_seats(&self, requester: UserId) -> Result<Vec<SeatView>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.seat_number, s.row_number, s.is_available,
                   COALESCE(b.user_id = $1, FALSE) AS booked_by_me
            FROM seats s
            LEFT JOIN bookings b ON s.id = b.seat_id
            ORDER BY s.row_number, s.seat_number
            "#,
        )
        .bind(requester.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_seat_view).collect()
    }

    async fn list_bookings(&self, user_id: UserId) -> Result<Vec<BookingView>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id AS booking_id, s.id AS seat_id, s.seat_number, s.row_number, b.booked_at
            FROM bookings b
            JOIN seats s ON b.seat_id = s.id
            WHERE b.user_id = $1
            ORDER BY b.booked_at DESC, b.id DESC
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_booking_view).collect()
    }

    async fn summary(&self) -> Result<InventorySummary> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM seats) AS total,
                (SELECT COUNT(*) FROM seats WHERE is_available) AS available,
                (SELECT COUNT(*) FROM bookings) AS booked
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(InventorySummary {
            total: count_param(&row, "total")?,
            available: count_param(&row, "available")?,
            booked: count_param(&row, "booked")?,
        })
    }
}
