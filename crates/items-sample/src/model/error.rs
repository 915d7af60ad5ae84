//! Validation errors raised when catalog records are created or updated.

use thiserror::Error;

/// Errors that can occur while building or changing a catalog record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// A required text field was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Prices must be finite and not negative.
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    /// Ratings run from 1 to 5.
    #[error("Invalid rating: {0}")]
    InvalidRating(u8),

    /// Orders need at least one item.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::EmptyField(field));
    }
    Ok(())
}

pub(crate) fn check_price(price: f64) -> Result<(), ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ModelError::InvalidPrice(price));
    }
    Ok(())
}
