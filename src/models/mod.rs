pub mod currency;
pub mod stats;
pub mod vacancy;

use crate::error::{Error, Result};
use std::collections::HashMap;

/// One source row: column name → raw cell text.
pub type RawRow = HashMap<String, String>;

pub fn field<'a>(row: &'a RawRow, name: &str) -> Result<&'a str> {
    row.get(name)
        .map(String::as_str)
        .ok_or_else(|| Error::MissingField(name.to_string()))
}
