pub mod forms;
pub mod repository;

pub use forms::{Form, FormErrors};
pub use repository::{BookingRepository, RepositoryError, RepositoryResult};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("Invalid date range: {start} must be before {end}")]
    InvalidRange { start: String, end: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Parses a `YYYY-MM-DD` form value.
pub fn parse_date(value: &str) -> CoreResult<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value.trim(), bookings_shared::DATE_LAYOUT)
        .map_err(|_| CoreError::InvalidDate { value: value.to_string() })
}

/// Parses a stay, rejecting ranges where checkout is not after check-in.
pub fn parse_stay(start: &str, end: &str) -> CoreResult<(chrono::NaiveDate, chrono::NaiveDate)> {
    let start_date = parse_date(start)?;
    let end_date = parse_date(end)?;
    if end_date <= start_date {
        return Err(CoreError::InvalidRange {
            start: start.trim().to_string(),
            end: end.trim().to_string(),
        });
    }
    Ok((start_date, end_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_stay() {
        let (s, e) = parse_stay("2040-01-01", " 2040-01-02").unwrap();
        assert_eq!(s, NaiveDate::from_ymd_opt(2040, 1, 1).unwrap());
        assert_eq!(e, NaiveDate::from_ymd_opt(2040, 1, 2).unwrap());

        assert!(matches!(
            parse_stay("01/02/2040", "2040-01-03"),
            Err(CoreError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_stay("2040-01-02", "2040-01-02"),
            Err(CoreError::InvalidRange { .. })
        ));
        assert!(matches!(
            parse_stay("2040-01-03", "2040-01-02"),
            Err(CoreError::InvalidRange { .. })
        ));
    }
}
