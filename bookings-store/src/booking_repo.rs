use async_trait::async_trait;
use bookings_core::repository::{BookingRepository, RepositoryError, RepositoryResult};
use bookings_shared::models::{NewReservation, NewRoomRestriction, Room, RESTRICTION_RESERVATION};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

// SQLSTATE raised by the room_restrictions exclusion constraint
const EXCLUSION_VIOLATION: &str = "23P01";
const SERIALIZATION_FAILURE: &str = "40001";

pub struct PostgresBookingRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self { pool, query_timeout }
    }

    async fn timed<T, F>(&self, fut: F) -> RepositoryResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(|e| RepositoryError::Backend(Box::new(e))),
            Err(_) => Err(RepositoryError::Timeout(self.query_timeout)),
        }
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: i32,
    room_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            room_name: row.room_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

async fn count_overlapping<'e, E: PgExecutor<'e>>(
    executor: E,
    start: NaiveDate,
    end: NaiveDate,
    room_id: i32,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(id)
        FROM room_restrictions
        WHERE room_id = $1 AND $2 < end_date AND $3 > start_date
        "#,
    )
    .bind(room_id)
    .bind(start)
    .bind(end)
    .fetch_one(executor)
    .await
}

async fn insert_reservation_with<'e, E: PgExecutor<'e>>(
    executor: E,
    res: &NewReservation,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO reservations (first_name, last_name, email, phone, start_date, end_date, room_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
        RETURNING id
        "#,
    )
    .bind(&res.first_name)
    .bind(&res.last_name)
    .bind(res.email.expose())
    .bind(&res.phone)
    .bind(res.start_date)
    .bind(res.end_date)
    .bind(res.room_id)
    .fetch_one(executor)
    .await
}

async fn insert_restriction_with<'e, E: PgExecutor<'e>>(
    executor: E,
    restriction: &NewRoomRestriction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO room_restrictions (start_date, end_date, room_id, reservation_id, restriction_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
        "#,
    )
    .bind(restriction.start_date)
    .bind(restriction.end_date)
    .bind(restriction.room_id)
    .bind(restriction.reservation_id)
    .bind(restriction.restriction_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Serializable check-then-insert. `None` means the room is already taken.
async fn book_in_transaction(
    pool: &PgPool,
    reservation: &NewReservation,
) -> Result<Option<i32>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await?;

    let overlapping = count_overlapping(
        &mut *tx,
        reservation.start_date,
        reservation.end_date,
        reservation.room_id,
    )
    .await?;
    if overlapping > 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    let reservation_id = insert_reservation_with(&mut *tx, reservation).await?;
    insert_restriction_with(
        &mut *tx,
        &NewRoomRestriction {
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            room_id: reservation.room_id,
            reservation_id: Some(reservation_id),
            restriction_id: RESTRICTION_RESERVATION,
        },
    )
    .await?;

    tx.commit().await?;
    Ok(Some(reservation_id))
}

fn is_booking_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some(EXCLUSION_VIOLATION) | Some(SERIALIZATION_FAILURE)
        ),
        _ => false,
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn search_availability_by_dates_by_room_id(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        room_id: i32,
    ) -> RepositoryResult<bool> {
        let count = self
            .timed(count_overlapping(&self.pool, start, end, room_id))
            .await?;
        Ok(count == 0)
    }

    async fn search_availability_for_all_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Room>> {
        let rows: Vec<RoomRow> = self
            .timed(
                sqlx::query_as(
                    r#"
                    SELECT r.id, r.room_name, r.created_at, r.updated_at
                    FROM rooms r
                    WHERE r.id NOT IN (
                        SELECT rr.room_id
                        FROM room_restrictions rr
                        WHERE $1 < rr.end_date AND $2 > rr.start_date
                    )
                    ORDER BY r.id
                    "#,
                )
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn insert_reservation(&self, reservation: &NewReservation) -> RepositoryResult<i32> {
        self.timed(insert_reservation_with(&self.pool, reservation)).await
    }

    async fn insert_room_restriction(
        &self,
        restriction: &NewRoomRestriction,
    ) -> RepositoryResult<()> {
        match tokio::time::timeout(
            self.query_timeout,
            insert_restriction_with(&self.pool, restriction),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if is_booking_conflict(&e) => Err(RepositoryError::Conflict {
                room_id: restriction.room_id,
                start: restriction.start_date,
                end: restriction.end_date,
            }),
            Ok(Err(e)) => Err(RepositoryError::Backend(Box::new(e))),
            Err(_) => Err(RepositoryError::Timeout(self.query_timeout)),
        }
    }

    async fn get_room_by_id(&self, room_id: i32) -> RepositoryResult<Room> {
        let row: Option<RoomRow> = self
            .timed(
                sqlx::query_as(
                    "SELECT id, room_name, created_at, updated_at FROM rooms WHERE id = $1",
                )
                .bind(room_id)
                .fetch_optional(&self.pool),
            )
            .await?;

        row.map(Room::from).ok_or(RepositoryError::NotFound {
            entity: "room",
            id: room_id,
        })
    }

    async fn book_room(&self, reservation: &NewReservation) -> RepositoryResult<i32> {
        let conflict = || RepositoryError::Conflict {
            room_id: reservation.room_id,
            start: reservation.start_date,
            end: reservation.end_date,
        };

        let work = book_in_transaction(&self.pool, reservation);

        match tokio::time::timeout(self.query_timeout, work).await {
            Ok(Ok(Some(id))) => {
                debug!(reservation_id = id, room_id = reservation.room_id, "Reservation booked");
                Ok(id)
            }
            Ok(Ok(None)) => Err(conflict()),
            Ok(Err(e)) if is_booking_conflict(&e) => {
                warn!(room_id = reservation.room_id, "Concurrent booking rejected: {}", e);
                Err(conflict())
            }
            Ok(Err(e)) => Err(RepositoryError::Backend(Box::new(e))),
            Err(_) => Err(RepositoryError::Timeout(self.query_timeout)),
        }
    }
}
