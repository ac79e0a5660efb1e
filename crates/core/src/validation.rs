//! Configuration and input validation
//!
//! # Example
//!
//! ```rust
//! use musala_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("collection_name", "mosques")
//!     .positive("default_radius_km", 10.0)
//!     .range("max_retries", 3, 1, 10)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Convert to Result type; warnings are logged and otherwise ignored.
    pub fn to_result(self) -> Result<()> {
        for warning in &self.warnings {
            warn!(field = %warning.field, "{}", warning.message);
        }

        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
            Err(Error::new(
                ErrorCode::ValidationError,
                format!("Validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not blank
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate a finite, strictly positive number
    pub fn positive(mut self, field: &str, value: f64) -> Self {
        if !(value.is_finite() && value > 0.0) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Must be a positive number".to_string(),
                code: "POSITIVE".to_string(),
                expected: Some("> 0".to_string()),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate a numeric range (inclusive)
    pub fn range<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be between {min} and {max}"),
                code: "RANGE".to_string(),
                expected: Some(format!("{min} - {max}")),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Add a custom validation
    pub fn custom<F>(mut self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(message) = f() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message,
                code: "CUSTOM".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_validation() {
        let result = Validator::new().required("name", "   ").validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "REQUIRED");
    }

    #[test]
    fn test_positive_rejects_zero_negative_and_nan() {
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = Validator::new().positive("radius", value).validate();
            assert!(!result.is_valid(), "{value} accepted");
            assert_eq!(result.errors()[0].code, "POSITIVE");
        }
        assert!(Validator::new().positive("radius", 0.001).validate().is_valid());
    }

    #[test]
    fn test_range_validation() {
        let result = Validator::new().range("count", 150, 1, 100).validate();
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].code, "RANGE");
        assert!(Validator::new().range("count", 100, 1, 100).validate().is_valid());
    }

    #[test]
    fn test_custom_validation() {
        let result = Validator::new()
            .custom("radius", || Some("too large".to_string()))
            .custom("name", || None)
            .validate();
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].field, "radius");
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let result = Validator::new().warn_if("project", true, "missing").validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
        assert!(result.to_result().is_ok());
    }

    #[test]
    fn test_to_result_joins_messages() {
        let err = Validator::new()
            .required("a", "")
            .positive("b", -2.0)
            .validate()
            .to_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("a: Field is required"));
        assert!(err.message.contains("b: Must be a positive number"));
    }
}
