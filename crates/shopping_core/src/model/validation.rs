//! Field validation errors shared by all models.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection of a single field value before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty {
        field: &'static str,
    },
    TooLong {
        field: &'static str,
        max_chars: usize,
    },
    InvalidUsername,
    InvalidEmail,
    NegativeAmount {
        field: &'static str,
    },
    TooManyDecimalPlaces {
        field: &'static str,
    },
    AmountTooLarge {
        field: &'static str,
    },
    InvalidDateRange {
        start: String,
        end: String,
    },
    InvalidQuantity(i64),
    TotalTooLarge,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "Field '{field}' must not be empty."),
            Self::TooLong { field, max_chars } => {
                write!(f, "Field '{field}' must be at most {max_chars} characters.")
            }
            Self::InvalidUsername => write!(f, "Username is invalid."),
            Self::InvalidEmail => write!(f, "Email is invalid."),
            Self::NegativeAmount { field } => write!(f, "Field '{field}' must not be negative."),
            Self::TooManyDecimalPlaces { field } => {
                write!(f, "Field '{field}' must have at most 2 decimal places.")
            }
            Self::AmountTooLarge { field } => {
                write!(f, "Field '{field}' must have at most 10 digits.")
            }
            Self::InvalidDateRange { start, end } => {
                write!(f, "End date '{end}' must not be before start date '{start}'.")
            }
            Self::InvalidQuantity(quantity) => {
                write!(f, "Quantity must be between 1 and {}, got {quantity}.", i32::MAX)
            }
            Self::TotalTooLarge => write!(f, "Shopping list total is too large."),
        }
    }
}

impl Error for ValidationError {}

/// Checks a required, length-bounded text field.
pub fn require_text(field: &'static str, value: &str, max_chars: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_text, ValidationError};

    #[test]
    fn require_text_rejects_blank_and_long_values() {
        assert_eq!(
            require_text("name", "   ", 10),
            Err(ValidationError::Empty { field: "name" })
        );
        assert_eq!(
            require_text("name", "abcdefghijk", 10),
            Err(ValidationError::TooLong {
                field: "name",
                max_chars: 10
            })
        );
        assert!(require_text("name", "ok", 10).is_ok());
    }
}
