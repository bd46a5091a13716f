//! Conversions between `Decimal` prices and stored integer cents.
//!
//! # Invariants
//! - At most 2 decimal places and 10 significant digits (8 before the point).
//! - Negative amounts are never stored.

use super::validation::ValidationError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Exclusive upper bound in cents for a `DECIMAL(10, 2)` value.
pub const MAX_CENTS_EXCLUSIVE: i64 = 10_000_000_000;

/// Range check for amounts that arrive already in cents.
pub fn validate_cents(field: &'static str, cents: i64) -> Result<(), ValidationError> {
    if cents < 0 {
        return Err(ValidationError::NegativeAmount { field });
    }
    if cents >= MAX_CENTS_EXCLUSIVE {
        return Err(ValidationError::AmountTooLarge { field });
    }
    Ok(())
}

/// Validates `value` and converts it into integer cents.
pub fn decimal_to_cents(field: &'static str, value: Decimal) -> Result<i64, ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::NegativeAmount { field });
    }
    if value.normalize().scale() > 2 {
        return Err(ValidationError::TooManyDecimalPlaces { field });
    }

    let cents = value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.trunc().to_i64())
        .ok_or(ValidationError::AmountTooLarge { field })?;
    validate_cents(field, cents)?;
    Ok(cents)
}

pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Lossy float view used by aggregation schemas.
pub fn cents_to_f64(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Rounds to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{cents_to_decimal, decimal_to_cents, round2, validate_cents};
    use crate::model::validation::ValidationError;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn converts_two_place_prices() {
        assert_eq!(decimal_to_cents("price", Decimal::from_str("12.5").unwrap()), Ok(1250));
        assert_eq!(decimal_to_cents("price", Decimal::from_str("0.00").unwrap()), Ok(0));
        assert_eq!(cents_to_decimal(1250).to_string(), "12.50");
    }

    #[test]
    fn rejects_invalid_prices() {
        assert_eq!(
            decimal_to_cents("price", Decimal::from_str("-1").unwrap()),
            Err(ValidationError::NegativeAmount { field: "price" })
        );
        assert_eq!(
            decimal_to_cents("price", Decimal::from_str("1.999").unwrap()),
            Err(ValidationError::TooManyDecimalPlaces { field: "price" })
        );
        assert_eq!(
            decimal_to_cents("price", Decimal::from_str("100000000").unwrap()),
            Err(ValidationError::AmountTooLarge { field: "price" })
        );
    }

    #[test]
    fn raw_cents_share_the_decimal_bounds() {
        assert_eq!(validate_cents("price", 0), Ok(()));
        assert_eq!(validate_cents("price", 9_999_999_999), Ok(()));
        assert_eq!(
            validate_cents("price", 10_000_000_000),
            Err(ValidationError::AmountTooLarge { field: "price" })
        );
        assert_eq!(
            validate_cents("amount", -1),
            Err(ValidationError::NegativeAmount { field: "amount" })
        );
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(3.333_333), 3.33);
        assert_eq!(round2(2.675_1), 2.68);
    }
}
