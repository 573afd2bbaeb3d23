//! Error types for opendrive_spline

use std::fmt;

/// Minimum number of control points a Catmull-Rom chain needs.
pub const MIN_CONTROL_POINTS: usize = 4;

/// Main error type for spline fitting
#[derive(Debug)]
pub enum SplineError {
    /// Fewer control points than a Catmull-Rom segment needs
    InsufficientPoints { required: usize, found: usize },
    /// Invalid parameter (alpha, sample count, ...)
    InvalidParameter(String),
    /// A control point carries NaN or infinity
    NonFiniteInput { index: usize },
    /// I/O error
    IoError(std::io::Error),
    /// Visualization error
    VisualizationError(String),
}

impl SplineError {
    pub fn insufficient_points(found: usize) -> Self {
        SplineError::InsufficientPoints {
            required: MIN_CONTROL_POINTS,
            found,
        }
    }
}

impl fmt::Display for SplineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplineError::InsufficientPoints { required, found } => write!(
                f,
                "Insufficient points: at least {} are required, got {}",
                required, found
            ),
            SplineError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            SplineError::NonFiniteInput { index } => {
                write!(f, "Non-finite control point at index {}", index)
            }
            SplineError::IoError(e) => write!(f, "I/O error: {}", e),
            SplineError::VisualizationError(msg) => write!(f, "Visualization error: {}", msg),
        }
    }
}

impl std::error::Error for SplineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SplineError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SplineError {
    fn from(e: std::io::Error) -> Self {
        SplineError::IoError(e)
    }
}

/// Result type alias for spline operations
pub type SplineResult<T> = Result<T, SplineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SplineError::insufficient_points(3);
        assert_eq!(
            format!("{}", err),
            "Insufficient points: at least 4 are required, got 3"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SplineError = io_err.into();
        assert!(matches!(err, SplineError::IoError(_)));
    }
}
