use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::AppError;

/// Stored and serialised form of every instant: RFC 3339, UTC, milliseconds.
/// Fixed width, so string order matches time order in SQL.
pub fn format(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now() -> String {
    format(Utc::now())
}

/// Accepts an RFC 3339 instant or a bare `YYYY-MM-DD` day (midnight UTC).
pub fn parse(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(format(dt.with_timezone(&Utc)));
    }
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(format(midnight.and_utc()));
        }
    }
    Err(AppError::BadRequest(format!("Invalid {field}: {value}")))
}
