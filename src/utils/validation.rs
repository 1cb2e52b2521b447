//! Validation helpers
//!
//! Custom validators used by the request DTOs, plus conversions from
//! query-string values into typed dates.

use chrono::NaiveDate;
use validator::ValidationError;

/// Parse a `YYYY-MM-DD` calendar day
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.message = Some("YYYY-MM-DD required".into());
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// `validate(custom = ...)` adapter for [`validate_date`]
pub fn validate_date_format(value: &str) -> Result<(), ValidationError> {
    validate_date(value).map(|_| ())
}

/// Reject blank or whitespace-only strings
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}
