//! Error types for spec validation and processing.

use thiserror::Error;

/// Error codes for brush spec validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// E001: `name` is missing or empty
    MissingName,
    /// E002: `shape.type` is not one of the supported shape families
    UnknownShapeType,
    /// E003: A raster dimension is zero or too large
    InvalidDimension,
    /// E004: A numeric parameter is out of range or not finite
    InvalidParameter,
    /// E005: The output path is unusable
    InvalidOutputPath,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MissingName => "E001",
            ErrorCode::UnknownShapeType => "E002",
            ErrorCode::InvalidDimension => "E003",
            ErrorCode::InvalidParameter => "E004",
            ErrorCode::InvalidOutputPath => "E005",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes for brush spec validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: `minimum_size` is larger than `maximum_size`
    MinimumExceedsMaximum,
    /// W002: Output path does not end in `.brush`
    OutputExtension,
    /// W003: Parameter is accepted but has no slot in the brush archive
    UnstoredParameter,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::MinimumExceedsMaximum => "W001",
            WarningCode::OutputExtension => "W002",
            WarningCode::UnstoredParameter => "W003",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// JSON path to the problematic field (e.g., "shape.type").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a JSON path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path {
            Some(ref path) => write!(f, "{}: {} (at {})", self.code, self.message, path),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validation warning with code, message, and optional JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
    /// JSON path to the field the warning is about.
    pub path: Option<String>,
}

impl ValidationWarning {
    /// Creates a new validation warning with a JSON path.
    pub fn with_path(
        code: WarningCode,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path {
            Some(ref path) => write!(f, "{}: {} (at {})", self.code, self.message, path),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Top-level error type for spec operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The spec is not usable as written. Fatal before any synthesis starts.
    #[error("configuration error: {}", join_errors(.0))]
    Configuration(Vec<ValidationError>),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpecError {
    /// Returns the validation errors carried by a configuration error.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            SpecError::Configuration(errors) => errors,
            _ => &[],
        }
    }
}

/// Result of spec validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of validation warnings.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if an error with the given code was recorded.
    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Returns true if a warning with the given code was recorded.
    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Converts to a Result, returning Err if there are errors.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, SpecError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(SpecError::Configuration(self.errors))
        }
    }
}

/// Common trait for backend errors.
///
/// Each backend error type implements this so the CLI can report a stable
/// code and category regardless of which backend failed.
pub trait BackendError: std::error::Error {
    /// Stable code like "TEXTURE_001" or "ARCHIVE_003".
    fn code(&self) -> &'static str;

    /// Human-readable message.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Category for grouping related errors ("texture", "archive").
    fn category(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::MissingName.code(), "E001");
        assert_eq!(ErrorCode::UnknownShapeType.code(), "E002");
        assert_eq!(ErrorCode::InvalidOutputPath.to_string(), "E005");
        assert_eq!(WarningCode::UnstoredParameter.code(), "W003");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::with_path(ErrorCode::InvalidDimension, "size is 0", "shape.size");
        assert_eq!(err.to_string(), "E003: size is 0 (at shape.size)");

        let err = ValidationError::new(ErrorCode::MissingName, "name is required");
        assert_eq!(err.to_string(), "E001: name is required");
    }

    #[test]
    fn test_into_result() {
        let mut result = ValidationResult::default();
        assert!(result.is_ok());
        result.add_error(ValidationError::new(ErrorCode::MissingName, "name is required"));
        assert!(!result.is_ok());
        assert!(result.has_error(ErrorCode::MissingName));

        let err = result.into_result().unwrap_err();
        assert_eq!(err.validation_errors().len(), 1);
        assert!(err.to_string().starts_with("configuration error: E001"));
    }
}
