// Validation utilities module
// Custom validation functions for domain-specific rules

use regex::Regex;
use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

/// Validates an Indian mobile number: 10 digits, leading 6-9.
pub fn validate_mobile_number(mobile: &str) -> Result<(), ValidationError> {
    let pattern = Regex::new(r"^[6-9]\d{9}$").expect("valid mobile regex");
    if pattern.is_match(mobile) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_mobile_number"))
    }
}

/// Validates that a monetary amount is strictly positive.
pub fn validate_positive_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        Err(ValidationError::new("amount_must_be_positive"))
    } else {
        Ok(())
    }
}

/// Validates that a monetary amount is not negative (shipping fees, discounts).
pub fn validate_non_negative_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        Err(ValidationError::new("amount_must_not_be_negative"))
    } else {
        Ok(())
    }
}

/// Builds a single-field ValidationErrors value for checks that run in
/// handler code rather than through the derive.
pub fn field_error(field: &'static str, code: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_mobile_numbers() {
        assert!(validate_mobile_number("9876543210").is_ok());
        assert!(validate_mobile_number("6000000001").is_ok());
    }

    #[test]
    fn test_invalid_mobile_numbers() {
        assert!(validate_mobile_number("1234567890").is_err()); // bad leading digit
        assert!(validate_mobile_number("98765").is_err()); // too short
        assert!(validate_mobile_number("98765432100").is_err()); // too long
        assert!(validate_mobile_number("98765abc10").is_err()); // non-digits
        assert!(validate_mobile_number("").is_err());
    }

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount(dec!(0.01)).is_ok());
        assert!(validate_positive_amount(Decimal::ZERO).is_err());
        assert!(validate_positive_amount(dec!(-5)).is_err());
    }

    #[test]
    fn test_non_negative_amount() {
        assert!(validate_non_negative_amount(Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(dec!(40)).is_ok());
        assert!(validate_non_negative_amount(dec!(-0.01)).is_err());
    }

    #[test]
    fn test_field_error_carries_field_and_code() {
        let errors = field_error("price", "amount_must_be_positive");
        let map = errors.field_errors();
        assert!(map.contains_key("price"));
        assert_eq!(map["price"][0].code, "amount_must_be_positive");
    }
}
