//! Common validation utilities.

use chrono::{DateTime, NaiveDate, Utc};
use std::str::FromStr;
use validator::ValidationError;

/// Validates that a due-date window is not inverted.
pub fn validate_date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => {
            let mut err = ValidationError::new("date_range");
            err.message = Some("due_from must not be after due_to".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Validates that a timestamp window is not inverted.
pub fn validate_timestamp_range(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => {
            let mut err = ValidationError::new("timestamp_range");
            err.message = Some("from must not be after to".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Validates that a string is not empty or whitespace only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Parses a filter value as `T`.
///
/// `field` names the query parameter in the error message.
pub fn parse_filter_value<T: FromStr>(value: &str, field: &str) -> Result<T, ValidationError> {
    match value.parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(_) => {
            let mut err = ValidationError::new("unknown_value");
            err.message = Some(format!("Unknown {}: {}", field, value).into());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_date_range() {
        let a = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert!(validate_date_range(Some(a), Some(b)).is_ok());
        assert!(validate_date_range(Some(a), Some(a)).is_ok());
        assert!(validate_date_range(None, Some(b)).is_ok());
        assert!(validate_date_range(Some(a), None).is_ok());
        assert!(validate_date_range(None, None).is_ok());
    }

    #[test]
    fn test_validate_date_range_inverted() {
        let a = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let err = validate_date_range(Some(b), Some(a)).unwrap_err();
        assert_eq!(err.code, "date_range");
        assert!(err.message.unwrap().contains("due_from"));
    }

    #[test]
    fn test_validate_timestamp_range() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert!(validate_timestamp_range(Some(a), Some(b)).is_ok());
        assert!(validate_timestamp_range(Some(b), Some(a)).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("GST").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_parse_filter_value() {
        assert_eq!(parse_filter_value::<i32>("42", "count").unwrap(), 42);
        let err = parse_filter_value::<i32>("forty-two", "count").unwrap_err();
        assert_eq!(err.code, "unknown_value");
        assert_eq!(err.message.unwrap(), "Unknown count: forty-two");
    }
}
