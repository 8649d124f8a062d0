//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::error::EngineError;

/// Validates that a score delta is a single point up or down.
///
/// # Examples
///
/// ```ignore
/// validate_delta(1)  // Ok
/// validate_delta(-1) // Ok
/// validate_delta(0)  // Err
/// validate_delta(2)  // Err
/// ```
pub fn validate_delta(delta: i64) -> Result<(), ValidationError> {
    if delta == 1 || delta == -1 {
        return Ok(());
    }

    let mut err = ValidationError::new("delta_range");
    err.message = Some(EngineError::InvalidDelta(delta).to_string().into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_delta_valid() {
        assert!(validate_delta(1).is_ok());
        assert!(validate_delta(-1).is_ok());
    }

    #[test]
    fn test_validate_delta_invalid() {
        assert!(validate_delta(0).is_err());
        assert!(validate_delta(2).is_err());
        assert!(validate_delta(-5).is_err());
    }

    #[test]
    fn test_validate_delta_message() {
        let err = validate_delta(3).unwrap_err();
        assert_eq!(
            err.message.as_deref(),
            Some("Invalid score delta 3: must be +1 or -1")
        );
    }
}
