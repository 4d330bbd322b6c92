use async_trait::async_trait;
use bookings_shared::models::{NewReservation, NewRoomRestriction, Room};
use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error("Room {room_id} is already booked between {start} and {end}")]
    Conflict {
        room_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("Database call timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("Database error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Data access for rooms, reservations and room restrictions.
///
/// Every date range is half-open: a range overlaps an existing restriction
/// when `start < restriction.end && end > restriction.start`.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// True when no restriction on `room_id` overlaps the range.
    async fn search_availability_by_dates_by_room_id(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        room_id: i32,
    ) -> RepositoryResult<bool>;

    /// Rooms with no overlapping restriction, ordered by id.
    async fn search_availability_for_all_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Room>>;

    /// Inserts without any overlap check and returns the new id.
    async fn insert_reservation(&self, reservation: &NewReservation) -> RepositoryResult<i32>;

    async fn insert_room_restriction(
        &self,
        restriction: &NewRoomRestriction,
    ) -> RepositoryResult<()>;

    async fn get_room_by_id(&self, room_id: i32) -> RepositoryResult<Room>;

    /// Checks availability and writes the reservation plus its restriction as
    /// one atomic unit. Fails with [`RepositoryError::Conflict`] when the room
    /// was taken in the meantime.
    async fn book_room(&self, reservation: &NewReservation) -> RepositoryResult<i32>;
}
