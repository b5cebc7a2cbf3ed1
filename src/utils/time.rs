use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Timestamp layout of the `published_at` column, e.g. `2022-07-17T18:23:06+0300`.
pub const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

pub fn from_published(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(s, PUBLISHED_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Reorders the leading `YYYY-MM-DD` of `s` into `DD.MM.YYYY`.
pub fn to_display_date(s: &str) -> Result<String> {
    let date = s.get(..10).ok_or_else(|| Error::InvalidDate(s.to_string()))?;
    let parts: Vec<&str> = date.split('-').collect();
    match parts.as_slice() {
        [year, month, day] => Ok(format!("{}.{}.{}", day, month, year)),
        _ => Err(Error::InvalidDate(s.to_string())),
    }
}

pub fn year_of(s: &str) -> Result<i32> {
    s.get(..4)
        .and_then(|year| year.parse().ok())
        .ok_or_else(|| Error::InvalidDate(s.to_string()))
}
