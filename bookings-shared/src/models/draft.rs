use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::reservation::NewReservation;
use crate::pii::Masked;

/// Where a visitor is in the search -> choose room -> contact form flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStage {
    DatesOnly,
    RoomSelected,
    ContactPending,
    Persisted,
}

/// The reservation being assembled across requests and carried in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDraft {
    pub stage: DraftStage,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: Option<i32>,
    pub room_name: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Masked<String>,
    #[serde(default)]
    pub phone: String,
    pub reservation_id: Option<i32>,
}

impl ReservationDraft {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            stage: DraftStage::DatesOnly,
            start_date,
            end_date,
            room_id: None,
            room_name: None,
            first_name: String::new(),
            last_name: String::new(),
            email: Masked::default(),
            phone: String::new(),
            reservation_id: None,
        }
    }

    pub fn select_room(&mut self, room_id: i32, room_name: Option<String>) {
        // a different room invalidates the cached name
        if self.room_id != Some(room_id) {
            self.room_name = None;
        }
        self.room_id = Some(room_id);
        if room_name.is_some() {
            self.room_name = room_name;
        }
        self.stage = DraftStage::RoomSelected;
    }

    pub fn fill_contact(&mut self, first_name: &str, last_name: &str, email: &str, phone: &str) {
        self.first_name = first_name.trim().to_string();
        self.last_name = last_name.trim().to_string();
        self.email = Masked(email.trim().to_string());
        self.phone = phone.trim().to_string();
    }

    pub fn mark_pending(&mut self) {
        self.stage = DraftStage::ContactPending;
    }

    pub fn mark_persisted(&mut self, reservation_id: i32) {
        self.reservation_id = Some(reservation_id);
        self.stage = DraftStage::Persisted;
    }

    pub fn has_room(&self) -> bool {
        self.room_id.is_some()
    }

    pub fn is_persisted(&self) -> bool {
        self.stage == DraftStage::Persisted
    }

    /// Insert payload for this draft, or `None` while no room has been chosen.
    pub fn to_new_reservation(&self) -> Option<NewReservation> {
        let room_id = self.room_id?;
        Some(NewReservation {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            room_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ReservationDraft {
        ReservationDraft::new(
            NaiveDate::from_ymd_opt(2040, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2040, 1, 3).unwrap(),
        )
    }

    #[test]
    fn test_draft_walks_through_stages() {
        let mut d = draft();
        assert_eq!(d.stage, DraftStage::DatesOnly);
        assert!(d.to_new_reservation().is_none());

        d.select_room(1, None);
        assert_eq!(d.stage, DraftStage::RoomSelected);
        assert!(d.has_room());

        d.fill_contact("  John ", "Smith", "john@smith.com", "555-1234");
        d.mark_pending();
        assert_eq!(d.stage, DraftStage::ContactPending);

        let new_res = d.to_new_reservation().unwrap();
        assert_eq!(new_res.first_name, "John");
        assert_eq!(new_res.room_id, 1);
        assert_eq!(new_res.email.0, "john@smith.com");

        d.mark_persisted(42);
        assert!(d.is_persisted());
        assert_eq!(d.reservation_id, Some(42));
    }

    #[test]
    fn test_switching_room_drops_stale_name() {
        let mut d = draft();
        d.select_room(1, Some("General's Quarters".to_string()));
        d.select_room(1, None);
        assert_eq!(d.room_name.as_deref(), Some("General's Quarters"));

        d.select_room(2, None);
        assert_eq!(d.room_name, None);
    }

    #[test]
    fn test_draft_session_roundtrip_keeps_email() {
        let mut d = draft();
        d.select_room(2, Some("Major's Suite".to_string()));
        d.fill_contact("Jane", "Doe", "jane@doe.com", "");

        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["stage"], "room_selected");
        assert_eq!(value["email"], "jane@doe.com");

        let back: ReservationDraft = serde_json::from_value(value).unwrap();
        assert_eq!(back, d);
    }
}
