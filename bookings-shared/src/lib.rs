pub mod models;
pub mod pii;

pub use pii::Masked;

/// Date format used on every form, query string and JSON payload.
pub const DATE_LAYOUT: &str = "%Y-%m-%d";
