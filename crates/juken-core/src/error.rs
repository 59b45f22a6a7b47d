//! Configuration error types.
//!
//! Judging itself never fails; these errors cover settings that would make
//! judging or grading meaningless, so callers can reject them up front.

use thiserror::Error;

/// Errors raised when validating judge or grading settings.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Tolerance must be a finite, non-negative number.
    #[error("invalid tolerance {0}: must be finite and non-negative")]
    InvalidTolerance(f64),

    /// Partial credit for a close answer must lie in [0, 1].
    #[error("invalid close_credit {0}: must be between 0.0 and 1.0")]
    InvalidCloseCredit(f64),

    /// At least one sheet must be loadable at a time.
    #[error("parallelism must be at least 1")]
    InvalidParallelism,

    /// Unrecognized parse mode name.
    #[error("unknown parse mode: {0}")]
    UnknownParseMode(String),
}

impl ConfigError {
    /// Name of the offending setting.
    pub fn setting(&self) -> &'static str {
        match self {
            ConfigError::InvalidTolerance(_) => "tolerance",
            ConfigError::InvalidCloseCredit(_) => "close_credit",
            ConfigError::InvalidParallelism => "parallelism",
            ConfigError::UnknownParseMode(_) => "parse_mode",
        }
    }
}

/// Check that a tolerance value is usable.
pub fn check_tolerance(tolerance: f64) -> Result<f64, ConfigError> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(tolerance)
    } else {
        Err(ConfigError::InvalidTolerance(tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_checks() {
        assert_eq!(check_tolerance(0.0001), Ok(0.0001));
        assert_eq!(check_tolerance(0.0), Ok(0.0));
        assert!(check_tolerance(-1.0).is_err());
        assert!(check_tolerance(f64::NAN).is_err());
        assert!(check_tolerance(f64::INFINITY).is_err());
    }

    #[test]
    fn error_messages_name_the_setting() {
        let err = ConfigError::InvalidCloseCredit(1.5);
        assert_eq!(err.setting(), "close_credit");
        assert!(err.to_string().contains("1.5"));
    }
}
