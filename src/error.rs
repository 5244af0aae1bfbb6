use thiserror::Error;

/// Top-level error type for the contour kernel.
#[derive(Debug, Error)]
pub enum MarkgeomError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("{parameter} must be finite, got {value}")]
    NonFinite { parameter: &'static str, value: f64 },
}

/// Errors related to contour operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid option {option}: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: &'static str,
    },
}

/// Convenience type alias for results using [`MarkgeomError`].
pub type Result<T> = std::result::Result<T, MarkgeomError>;

/// Rejects NaN and infinite values for a named input.
///
/// # Errors
///
/// Returns `GeometryError::NonFinite` if `value` is not finite.
pub fn ensure_finite(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GeometryError::NonFinite { parameter, value }.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn finite_values_pass_through() {
        assert!(ensure_finite("offset", 1.5).is_ok());
    }

    #[test]
    fn nan_is_rejected_with_parameter_name() {
        let err = ensure_finite("offset", f64::NAN).unwrap_err();
        assert!(err.to_string().contains("offset"));
    }
}
