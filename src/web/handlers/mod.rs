//! Request handlers.

pub mod bulk;
pub mod health;
pub mod index;
pub mod listings;
pub mod results;

use crate::error::{AppError, Result};

/// A query parameter that must be present and non-blank.
pub(crate) fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("missing required parameter '{name}'")))
}

/// A query parameter where blank means absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
