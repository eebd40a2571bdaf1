//! JSON output types for `--json`.
//!
//! Errors carry stable codes: `E0xx` from validation, `CLI_0xx` from input
//! handling, and backend codes such as `TEXTURE_001` or `ARCHIVE_003`.

use serde::Serialize;

use brushcade_spec::{ValidationError, ValidationWarning};

use crate::package::PackageSummary;

/// Error codes for CLI-level failures.
pub mod error_codes {
    /// Output container could not be written.
    pub const PACKAGE_WRITE: &str = "CLI_003";
    /// Spec could not be resolved.
    pub const INVALID_SPEC: &str = "CLI_004";
}

/// A structured error.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    pub code: String,
    pub message: String,
    /// JSON path to the offending field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl JsonError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path: None,
        }
    }
}

impl From<&ValidationError> for JsonError {
    fn from(err: &ValidationError) -> Self {
        Self {
            code: err.code.to_string(),
            message: err.message.clone(),
            path: err.path.clone(),
        }
    }
}

/// A structured warning.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonWarning {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<&ValidationWarning> for JsonWarning {
    fn from(warn: &ValidationWarning) -> Self {
        Self {
            code: warn.code.to_string(),
            message: warn.message.clone(),
            path: warn.path.clone(),
        }
    }
}

/// Output of `validate --json`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Canonical spec hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_hash: Option<String>,
    /// BLAKE3 hash of the input text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
}

/// Output of `generate --json`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutput {
    pub success: bool,
    pub errors: Vec<JsonError>,
    pub warnings: Vec<JsonWarning>,
    /// The written package (on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brushcade_spec::{ErrorCode, WarningCode};

    #[test]
    fn test_validation_error_conversion() {
        let err = ValidationError::with_path(ErrorCode::InvalidParameter, "too small", "thumbnail.n_stamps");
        let json = JsonError::from(&err);
        assert_eq!(json.code, "E004");
        assert_eq!(json.path.as_deref(), Some("thumbnail.n_stamps"));
    }

    #[test]
    fn test_warning_conversion_and_serialization() {
        let warn = ValidationWarning::with_path(WarningCode::OutputExtension, "no .brush", "output");
        let json = JsonWarning::from(&warn);
        let text = serde_json::to_string(&json).unwrap();
        assert_eq!(text, r#"{"code":"W002","message":"no .brush","path":"output"}"#);
    }

    #[test]
    fn test_optional_fields_skipped() {
        let output = ValidateOutput {
            success: false,
            errors: vec![JsonError::new("CLI_001", "missing")],
            warnings: vec![],
            name: None,
            spec_hash: None,
            source_hash: None,
        };
        let value = serde_json::to_value(&output).unwrap();
        assert!(value.get("spec_hash").is_none());
        assert_eq!(value["errors"][0]["code"], "CLI_001");
    }
}
