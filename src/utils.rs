//! Safe casting utilities to prevent overflow on 32-bit systems

use crate::{Error, Result};

/// Safely convert usize to i32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds `i32::MAX`
pub fn usize_to_i32(value: usize) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in i32")))
}

/// Safely convert f64 to i64 with bounds checking
///
/// # Errors
///
/// Returns an error if the value is not finite or outside i64 range
#[allow(clippy::cast_precision_loss)] // MIN/MAX bounds checking is approximate
#[allow(clippy::cast_possible_truncation)] // Truncation after bounds check is safe
pub fn f64_to_i64(value: f64) -> Result<i64> {
    if value.is_finite() && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} cannot be safely converted to i64"
        )))
    }
}

/// Safely convert a non-negative f64 to u64 with bounds checking
///
/// # Errors
///
/// Returns an error if the value is not finite, negative, or outside u64 range
#[allow(clippy::cast_precision_loss)] // MIN/MAX bounds checking is approximate
#[allow(clippy::cast_possible_truncation)] // Truncation after bounds check is safe
#[allow(clippy::cast_sign_loss)] // Sign checked before conversion
pub fn f64_to_u64(value: f64) -> Result<u64> {
    if value.is_finite() && value >= 0.0 && value <= u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} cannot be safely converted to u64"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_usize_to_i32() {
        assert_eq!(usize_to_i32(42).unwrap(), 42);
        assert_eq!(usize_to_i32(0).unwrap(), 0);
        assert_eq!(usize_to_i32(i32::MAX as usize).unwrap(), i32::MAX);

        // On 64-bit systems, this should fail
        if std::mem::size_of::<usize>() > 4 {
            assert!(usize_to_i32(i32::MAX as usize + 1).is_err());
        }
    }

    #[test]
    fn test_f64_to_i64() {
        assert_eq!(f64_to_i64(42.0).unwrap(), 42);
        assert_eq!(f64_to_i64(-42.0).unwrap(), -42);
        assert_eq!(f64_to_i64(0.0).unwrap(), 0);

        assert!(f64_to_i64(f64::INFINITY).is_err());
        assert!(f64_to_i64(f64::NEG_INFINITY).is_err());
        assert!(f64_to_i64(f64::NAN).is_err());
    }

    #[test]
    fn test_f64_to_u64() {
        assert_eq!(f64_to_u64(42.0).unwrap(), 42);
        assert_eq!(f64_to_u64(0.0).unwrap(), 0);
        assert_eq!(f64_to_u64(0.9).unwrap(), 0);

        assert!(f64_to_u64(-1.0).is_err());
        assert!(f64_to_u64(f64::INFINITY).is_err());
        assert!(f64_to_u64(f64::NAN).is_err());
    }

    // Property-based tests
    proptest! {
        #[test]
        fn prop_usize_to_i32_within_bounds(value in 0..=i32::MAX as usize) {
            let result = usize_to_i32(value);
            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap() as usize, value);
        }

        #[test]
        fn prop_f64_to_i64_within_bounds(value in i32::MIN..=i32::MAX) {
            let f_value = f64::from(value);
            let result = f64_to_i64(f_value);
            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap(), i64::from(value));
        }

        #[test]
        fn prop_f64_to_u64_within_bounds(value in 0..=u32::MAX) {
            let f_value = f64::from(value);
            let result = f64_to_u64(f_value);
            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap(), u64::from(value));
        }
    }
}
