use crate::error::{Error, Result};
use tracing::debug;
use validator::Validate;

/// Validates prompt answers, reporting any failure as the given console message.
pub fn validate_prompt<T: Validate>(val: &T, message: &str) -> Result<()> {
    val.validate().map_err(|errors| {
        debug!(%errors, "Prompt rejected");
        Error::Input(message.to_string())
    })
}
