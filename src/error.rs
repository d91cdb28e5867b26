//! Error taxonomy shared by every simulator

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a simulation cannot produce a usable result.
///
/// None of these are fatal: product simulators fold them into the result
/// record (`is_valid: false`) so the caller can ask for corrected inputs.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationError {
    /// Non-positive amount or term, negative rate, or a value outside the
    /// product's allowed set
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Math that would produce NaN or infinity (zero/negative base in a
    /// fractional power, non-positive annualization term)
    #[error("{operation} is undefined: {reason}")]
    DegenerateMath { operation: String, reason: String },

    /// Amount above the product ceiling
    #[error("maximum amount is {limit:.2} for {product}")]
    OverLimit { product: String, limit: f64 },
}

impl SimulationError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn degenerate(operation: &str, reason: impl Into<String>) -> Self {
        SimulationError::DegenerateMath {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub fn over_limit(product: &str, limit: f64) -> Self {
        SimulationError::OverLimit {
            product: product.to_string(),
            limit,
        }
    }

    /// Over-limit errors get their own user-facing message
    pub fn is_over_limit(&self) -> bool {
        matches!(self, SimulationError::OverLimit { .. })
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Reject non-positive (or non-finite) amounts
pub fn require_positive(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::invalid(field, format!("must be greater than zero, got {}", value)))
    }
}

/// Reject negative (or non-finite) rates; zero is allowed
pub fn require_non_negative(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::invalid(field, format!("must not be negative, got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_limit_message() {
        let err = SimulationError::over_limit("express", 1_000_000.0);
        assert_eq!(err.to_string(), "maximum amount is 1000000.00 for express");
        assert!(err.is_over_limit());
    }

    #[test]
    fn test_guards() {
        assert!(require_positive("principal", 10.0).is_ok());
        assert!(require_positive("principal", 0.0).is_err());
        assert!(require_positive("principal", f64::NAN).is_err());
        assert!(require_non_negative("rate", 0.0).is_ok());
        assert!(require_non_negative("rate", -0.01).is_err());
    }
}
