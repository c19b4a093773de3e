//! Core restaurant services.
//!
//! Each module exposes plain async functions over a SeaORM connection. Reads
//! accept any [`sea_orm::ConnectionTrait`] so they compose inside a caller's
//! transaction; multi-step writes open their own transaction.

pub mod catalog;
pub mod dashboard;
pub mod guests;
pub mod orders;
pub mod reservations;
pub mod seating;

/// Trimmed copy of `value`, or a validation error naming `field` when blank.
pub(crate) fn required(value: &str, field: &str) -> crate::error::AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(crate::error::AppError::validation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(value.to_string())
}
