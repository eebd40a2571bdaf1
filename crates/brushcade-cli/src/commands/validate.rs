//! Validate command implementation
//!
//! Checks a spec without generating anything.

use anyhow::{Context, Result};
use colored::Colorize;
use brushcade_spec::{canonical_spec_hash, validate_spec, ValidationResult};
use std::process::ExitCode;

use super::json_output::{print_json, JsonError, JsonWarning, ValidateOutput};
use crate::input::{load_spec, LoadResult};

/// Run the validate command
///
/// # Returns
/// Exit code: 0 if valid, 1 if invalid
pub fn run(spec_source: &str, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(spec_source)
    } else {
        run_human(spec_source)
    }
}

fn run_human(spec_source: &str) -> Result<ExitCode> {
    let LoadResult {
        spec, source, source_hash, ..
    } = load_spec(spec_source)
        .with_context(|| format!("Failed to load spec: {}", spec_source))?;

    println!("{} {}", "Validating:".cyan().bold(), source.display_name());
    println!("{} {}", "Source:".dimmed(), &source_hash[..16]);

    let result = validate_spec(&spec);
    print_validation_results(&result);

    if result.is_ok() {
        let spec_hash = canonical_spec_hash(&spec).unwrap_or_else(|_| "unknown".to_string());
        println!("{} {}", "Spec hash:".dimmed(), spec_hash);
        println!(
            "\n{} '{}' is valid, output {}",
            "SUCCESS".green().bold(),
            spec.name,
            spec.output_path()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "\n{} Spec has {} error(s)",
            "FAILED".red().bold(),
            result.errors.len()
        );
        Ok(ExitCode::from(1))
    }
}

fn run_json(spec_source: &str) -> Result<ExitCode> {
    let LoadResult {
        spec, source_hash, ..
    } = match load_spec(spec_source) {
        Ok(loaded) => loaded,
        Err(e) => {
            let output = ValidateOutput {
                success: false,
                errors: vec![JsonError::new(e.code(), e.to_string())],
                warnings: vec![],
                name: None,
                spec_hash: None,
                source_hash: None,
            };
            print_json(&output)?;
            return Ok(ExitCode::from(1));
        }
    };

    let result = validate_spec(&spec);
    let output = ValidateOutput {
        success: result.is_ok(),
        errors: result.errors.iter().map(JsonError::from).collect(),
        warnings: result.warnings.iter().map(JsonWarning::from).collect(),
        name: Some(spec.name.clone()),
        spec_hash: canonical_spec_hash(&spec).ok(),
        source_hash: Some(source_hash),
    };
    print_json(&output)?;

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Print coded errors and warnings, one per line.
pub(crate) fn print_validation_results(result: &ValidationResult) {
    for warning in &result.warnings {
        log::warn!("{}", warning);
        println!("  {} {}", "!".yellow(), warning);
    }
    for error in &result.errors {
        println!("  {} {}", "x".red(), error);
    }
}
