pub mod draft;
pub mod reservation;
pub mod room;

pub use draft::{DraftStage, ReservationDraft};
pub use reservation::{NewReservation, NewRoomRestriction, Reservation, RoomRestriction};
pub use room::{Restriction, Room, RESTRICTION_OWNER_BLOCK, RESTRICTION_RESERVATION};
