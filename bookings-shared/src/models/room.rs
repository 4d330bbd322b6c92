use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Restriction type written for every booking made through the site.
pub const RESTRICTION_RESERVATION: i32 = 1;
/// Restriction type for blocks placed by the owner.
pub const RESTRICTION_OWNER_BLOCK: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i32,
    pub room_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restriction {
    pub id: i32,
    pub restriction_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
