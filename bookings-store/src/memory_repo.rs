use async_trait::async_trait;
use bookings_core::repository::{BookingRepository, RepositoryError, RepositoryResult};
use bookings_shared::models::{
    NewReservation, NewRoomRestriction, Reservation, Restriction, Room, RoomRestriction,
    RESTRICTION_OWNER_BLOCK, RESTRICTION_RESERVATION,
};
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    rooms: Vec<Room>,
    restriction_types: Vec<Restriction>,
    reservations: Vec<Reservation>,
    restrictions: Vec<RoomRestriction>,
}

impl Tables {
    fn room(&self, room_id: i32) -> RepositoryResult<&Room> {
        self.rooms
            .iter()
            .find(|r| r.id == room_id)
            .ok_or(RepositoryError::NotFound { entity: "room", id: room_id })
    }

    fn restriction_type(&self, restriction_id: i32) -> RepositoryResult<&Restriction> {
        self.restriction_types
            .iter()
            .find(|r| r.id == restriction_id)
            .ok_or(RepositoryError::NotFound { entity: "restriction", id: restriction_id })
    }

    fn is_free(&self, start: NaiveDate, end: NaiveDate, room_id: i32) -> bool {
        !self
            .restrictions
            .iter()
            .any(|r| r.room_id == room_id && r.overlaps(start, end))
    }

    fn insert_reservation(&mut self, res: &NewReservation) -> RepositoryResult<i32> {
        let room = self.room(res.room_id)?.clone();
        let id = self.reservations.len() as i32 + 1;
        let now = Utc::now();
        self.reservations.push(Reservation {
            id,
            first_name: res.first_name.clone(),
            last_name: res.last_name.clone(),
            email: res.email.clone(),
            phone: res.phone.clone(),
            start_date: res.start_date,
            end_date: res.end_date,
            room_id: res.room_id,
            room,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    /// Mirrors the exclusion constraint on `room_restrictions`.
    fn insert_restriction(&mut self, restriction: &NewRoomRestriction) -> RepositoryResult<()> {
        self.room(restriction.room_id)?;
        self.restriction_type(restriction.restriction_id)?;
        if !self.is_free(restriction.start_date, restriction.end_date, restriction.room_id) {
            return Err(RepositoryError::Conflict {
                room_id: restriction.room_id,
                start: restriction.start_date,
                end: restriction.end_date,
            });
        }
        let now = Utc::now();
        self.restrictions.push(RoomRestriction {
            id: self.restrictions.len() as i32 + 1,
            start_date: restriction.start_date,
            end_date: restriction.end_date,
            room_id: restriction.room_id,
            reservation_id: restriction.reservation_id,
            restriction_id: restriction.restriction_id,
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }
}

/// In-process stand-in for the Postgres tables, for tests and local runs
/// without a database. State is lost on restart.
#[derive(Default)]
pub struct MemoryBookingRepository {
    tables: RwLock<Tables>,
}

impl MemoryBookingRepository {
    pub fn new(rooms: Vec<Room>) -> Self {
        let now = Utc::now();
        let restriction_types = [
            (RESTRICTION_RESERVATION, "Reservation"),
            (RESTRICTION_OWNER_BLOCK, "Owner Block"),
        ]
        .into_iter()
        .map(|(id, name)| Restriction {
            id,
            restriction_name: name.to_string(),
            created_at: now,
            updated_at: now,
        })
        .collect();

        Self {
            tables: RwLock::new(Tables {
                rooms,
                restriction_types,
                ..Tables::default()
            }),
        }
    }

    /// The two rooms the site advertises, matching the seed migration.
    pub fn with_default_rooms() -> Self {
        let now = Utc::now();
        Self::new(
            [(1, "General's Quarters"), (2, "Major's Suite")]
                .into_iter()
                .map(|(id, name)| Room {
                    id,
                    room_name: name.to_string(),
                    created_at: now,
                    updated_at: now,
                })
                .collect(),
        )
    }

    pub async fn reservations(&self) -> Vec<Reservation> {
        self.tables.read().await.reservations.clone()
    }

    pub async fn restrictions(&self) -> Vec<RoomRestriction> {
        self.tables.read().await.restrictions.clone()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn search_availability_by_dates_by_room_id(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        room_id: i32,
    ) -> RepositoryResult<bool> {
        Ok(self.tables.read().await.is_free(start, end, room_id))
    }

    async fn search_availability_for_all_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Room>> {
        let tables = self.tables.read().await;
        let mut rooms: Vec<Room> = tables
            .rooms
            .iter()
            .filter(|room| tables.is_free(start, end, room.id))
            .cloned()
            .collect();
        rooms.sort_by_key(|r| r.id);
        Ok(rooms)
    }

    async fn insert_reservation(&self, reservation: &NewReservation) -> RepositoryResult<i32> {
        self.tables.write().await.insert_reservation(reservation)
    }

    async fn insert_room_restriction(
        &self,
        restriction: &NewRoomRestriction,
    ) -> RepositoryResult<()> {
        self.tables.write().await.insert_restriction(restriction)
    }

    async fn get_room_by_id(&self, room_id: i32) -> RepositoryResult<Room> {
        self.tables.read().await.room(room_id).cloned()
    }

    async fn book_room(&self, reservation: &NewReservation) -> RepositoryResult<i32> {
        // one write guard covers the check and both inserts
        let mut tables = self.tables.write().await;
        tables.room(reservation.room_id)?;
        if !tables.is_free(reservation.start_date, reservation.end_date, reservation.room_id) {
            return Err(RepositoryError::Conflict {
                room_id: reservation.room_id,
                start: reservation.start_date,
                end: reservation.end_date,
            });
        }

        let reservation_id = tables.insert_reservation(reservation)?;
        tables.insert_restriction(&NewRoomRestriction {
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            room_id: reservation.room_id,
            reservation_id: Some(reservation_id),
            restriction_id: RESTRICTION_RESERVATION,
        })?;
        Ok(reservation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookings_shared::Masked;
    use std::sync::Arc;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn new_reservation(room_id: i32, start: &str, end: &str) -> NewReservation {
        NewReservation {
            first_name: "John".into(),
            last_name: "Smith".into(),
            email: Masked("john@smith.com".into()),
            phone: "555-1234".into(),
            start_date: d(start),
            end_date: d(end),
            room_id,
        }
    }

    fn block(room_id: i32, start: &str, end: &str) -> NewRoomRestriction {
        NewRoomRestriction {
            start_date: d(start),
            end_date: d(end),
            room_id,
            reservation_id: None,
            restriction_id: RESTRICTION_OWNER_BLOCK,
        }
    }

    #[tokio::test]
    async fn test_free_table_returns_every_room() {
        let repo = MemoryBookingRepository::with_default_rooms();
        let rooms = repo
            .search_availability_for_all_rooms(d("2040-01-01"), d("2040-01-02"))
            .await
            .unwrap();
        assert_eq!(rooms.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_fully_blocked_window_returns_no_rooms() {
        let repo = MemoryBookingRepository::with_default_rooms();
        repo.insert_room_restriction(&block(1, "2049-12-20", "2050-01-05")).await.unwrap();
        repo.insert_room_restriction(&block(2, "2050-01-01", "2050-01-02")).await.unwrap();

        let rooms = repo
            .search_availability_for_all_rooms(d("2050-01-01"), d("2050-01-02"))
            .await
            .unwrap();
        assert!(rooms.is_empty());
    }

    #[tokio::test]
    async fn test_excludes_exactly_overlapping_rooms() {
        let repo = MemoryBookingRepository::with_default_rooms();
        repo.insert_room_restriction(&block(1, "2040-03-10", "2040-03-15")).await.unwrap();

        let rooms = repo
            .search_availability_for_all_rooms(d("2040-03-14"), d("2040-03-16"))
            .await
            .unwrap();
        assert_eq!(rooms.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);

        // touching on either side is free
        let rooms = repo
            .search_availability_for_all_rooms(d("2040-03-15"), d("2040-03-20"))
            .await
            .unwrap();
        assert_eq!(rooms.len(), 2);
        assert!(repo
            .search_availability_by_dates_by_room_id(d("2040-03-01"), d("2040-03-10"), 1)
            .await
            .unwrap());
        assert!(!repo
            .search_availability_by_dates_by_room_id(d("2040-03-01"), d("2040-03-11"), 1)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_adjacent_bookings_do_not_block_each_other() {
        let repo = MemoryBookingRepository::with_default_rooms();
        repo.book_room(&new_reservation(1, "2040-05-01", "2040-05-04")).await.unwrap();
        repo.book_room(&new_reservation(1, "2040-05-04", "2040-05-06")).await.unwrap();

        let restrictions = repo.restrictions().await;
        assert_eq!(restrictions.len(), 2);
        assert_eq!(restrictions[0].reservation_id, Some(1));
        assert_eq!(restrictions[1].reservation_id, Some(2));
        assert_eq!(restrictions[1].restriction_id, RESTRICTION_RESERVATION);
    }

    #[tokio::test]
    async fn test_restriction_needs_known_type_and_room() {
        let repo = MemoryBookingRepository::with_default_rooms();

        let mut unknown_type = block(1, "2040-04-01", "2040-04-02");
        unknown_type.restriction_id = 99;
        let err = repo.insert_room_restriction(&unknown_type).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { entity: "restriction", id: 99 }));

        let err = repo
            .insert_room_restriction(&block(7, "2040-04-01", "2040-04-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { entity: "room", id: 7 }));
        assert!(repo.restrictions().await.is_empty());
    }

    #[tokio::test]
    async fn test_book_room_rejects_overlap() {
        let repo = MemoryBookingRepository::with_default_rooms();
        repo.book_room(&new_reservation(2, "2040-06-01", "2040-06-05")).await.unwrap();

        let err = repo
            .book_room(&new_reservation(2, "2040-06-04", "2040-06-08"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { room_id: 2, .. }));
        assert_eq!(repo.reservations().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_bookings_for_same_range_admit_one() {
        let repo = Arc::new(MemoryBookingRepository::with_default_rooms());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.book_room(&new_reservation(1, "2040-07-01", "2040-07-03")).await
                })
            })
            .collect();

        let mut booked = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                booked += 1;
            }
        }
        assert_eq!(booked, 1);
        assert_eq!(repo.restrictions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_room() {
        let repo = MemoryBookingRepository::with_default_rooms();
        let err = repo.get_room_by_id(3).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { entity: "room", id: 3 }));

        let err = repo
            .insert_reservation(&new_reservation(3, "2040-01-01", "2040-01-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
