use serde::Serialize;

use crate::error::PharmographError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, PharmographError> {
    Ok(serde_json::to_string_pretty(value)?)
}
