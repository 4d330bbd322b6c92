use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::room::Room;
use crate::pii::Masked;

/// A persisted booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    pub phone: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i32,
    pub room: Room,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for the `reservations` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    pub phone: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i32,
}

/// A date range during which a room cannot be booked.
///
/// `reservation_id` is set when the block was caused by a booking and empty
/// for owner blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRestriction {
    pub id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i32,
    pub reservation_id: Option<i32>,
    pub restriction_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoomRestriction {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i32,
    pub reservation_id: Option<i32>,
    pub restriction_id: i32,
}

impl RoomRestriction {
    /// Half-open overlap: ranges that only touch do not collide.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start < self.end_date && end > self.start_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restriction(start: &str, end: &str) -> RoomRestriction {
        let now = Utc::now();
        RoomRestriction {
            id: 1,
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            room_id: 1,
            reservation_id: Some(1),
            restriction_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_overlap_is_half_open() {
        let r = restriction("2040-01-10", "2040-01-15");

        assert!(r.overlaps(d("2040-01-12"), d("2040-01-13")));
        assert!(r.overlaps(d("2040-01-05"), d("2040-01-11")));
        assert!(r.overlaps(d("2040-01-14"), d("2040-01-20")));
        assert!(r.overlaps(d("2040-01-01"), d("2040-01-31")));

        // checkout on the block's first night, check-in on its checkout day
        assert!(!r.overlaps(d("2040-01-05"), d("2040-01-10")));
        assert!(!r.overlaps(d("2040-01-15"), d("2040-01-18")));
    }
}
