//! Write-time validation for bounded numeric fields
//!
//! Target confidence, indicator score and association weight all live in
//! [0, 1] inclusive. The check runs on create and on any update that sets
//! the field, independent of the storage layer's own constraints.

use crate::{Error, Result};

/// Reject values outside [0.0, 1.0] inclusive; boundary values pass.
pub fn unit_interval(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidInput(format!(
            "{} must be between 0 and 1",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_values_pass() {
        assert!(unit_interval("confidence", 0.5).is_ok());
    }

    #[test]
    fn test_boundaries_pass() {
        assert!(unit_interval("weight", 0.0).is_ok());
        assert!(unit_interval("weight", 1.0).is_ok());
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        assert!(unit_interval("score", 1.5).is_err());
        assert!(unit_interval("score", -0.1).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(unit_interval("score", f64::NAN).is_err());
    }

    #[test]
    fn test_error_names_field() {
        let err = unit_interval("confidence", 2.0).unwrap_err();
        assert!(err.to_string().contains("confidence"));
    }
}
