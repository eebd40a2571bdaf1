//! Generate command implementation
//!
//! Loads a spec, synthesizes the rasters, encodes the archive and writes
//! the `.brush` package.

use anyhow::{Context, Result};
use colored::Colorize;
use brushcade_spec::{canonical_spec_hash, validate_spec, BrushSpec, SpecError};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use super::json_output::{error_codes, print_json, GenerateOutput, JsonError, JsonWarning};
use super::validate::print_validation_results;
use crate::input::{load_spec, LoadResult};
use crate::package::{write_brush_package, PackageError, PackageSummary};
use crate::pipeline::{build_package, PipelineError};

/// Why generation stopped.
#[derive(Debug, thiserror::Error)]
pub enum GenerateFailure {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Backend(#[from] PipelineError),

    #[error(transparent)]
    Package(#[from] PackageError),
}

/// Run the generate command
///
/// # Arguments
/// * `spec_source` - Path to the spec file, or `-` for stdin
/// * `output` - Output path overriding the spec's `output`
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 spec error, 2 generation error
pub fn run(spec_source: &str, output: Option<&str>, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(spec_source, output)
    } else {
        run_human(spec_source, output)
    }
}

/// Output path: the override when given, else the spec's own.
pub fn resolve_output(spec: &BrushSpec, output: Option<&str>) -> PathBuf {
    PathBuf::from(output.map(str::to_string).unwrap_or_else(|| spec.output_path()))
}

/// Run the pipeline for a spec that already passed validation.
pub fn generate_brush(
    spec: &BrushSpec,
    output: Option<&str>,
) -> Result<PackageSummary, GenerateFailure> {
    let brush = spec.resolve()?;
    let package = build_package(&brush)?;
    Ok(write_brush_package(&package, &resolve_output(spec, output))?)
}

fn run_human(spec_source: &str, output: Option<&str>) -> Result<ExitCode> {
    let start = Instant::now();

    let LoadResult {
        spec, source, source_hash, ..
    } = load_spec(spec_source)
        .with_context(|| format!("Failed to load spec: {}", spec_source))?;

    println!("{} {}", "Generating:".cyan().bold(), source.display_name());
    println!("{} {}", "Source:".dimmed(), &source_hash[..16]);

    let validation = validate_spec(&spec);
    print_validation_results(&validation);
    if !validation.is_ok() {
        println!(
            "\n{} Spec has {} error(s)",
            "FAILED".red().bold(),
            validation.errors.len()
        );
        return Ok(ExitCode::from(1));
    }

    let summary = match generate_brush(&spec, output) {
        Ok(summary) => summary,
        Err(GenerateFailure::Spec(e)) => {
            println!("\n{} {}", "FAILED".red().bold(), e);
            return Ok(ExitCode::from(1));
        }
        Err(GenerateFailure::Backend(e)) => {
            println!("\n{} [{}] {}", "FAILED".red().bold(), e.code(), e);
            return Ok(ExitCode::from(2));
        }
        Err(GenerateFailure::Package(e)) => {
            return Err(e).with_context(|| {
                format!("Failed to write {}", resolve_output(&spec, output).display())
            });
        }
    };

    for entry in &summary.entries {
        println!(
            "  {} {:<24} {:>9} bytes  {}",
            "+".green(),
            entry.name,
            entry.size,
            entry.hash[..16].dimmed()
        );
    }
    println!(
        "\n{} '{}' -> {} ({} bytes, {}ms)",
        "SUCCESS".green().bold(),
        spec.name,
        summary.path.display(),
        summary.size,
        start.elapsed().as_millis()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_json(spec_source: &str, output: Option<&str>) -> Result<ExitCode> {
    let mut result = GenerateOutput {
        success: false,
        errors: vec![],
        warnings: vec![],
        package: None,
        spec_hash: None,
        source_hash: None,
    };

    let LoadResult {
        spec, source_hash, ..
    } = match load_spec(spec_source) {
        Ok(loaded) => loaded,
        Err(e) => {
            result.errors.push(JsonError::new(e.code(), e.to_string()));
            print_json(&result)?;
            return Ok(ExitCode::from(1));
        }
    };
    result.source_hash = Some(source_hash);
    result.spec_hash = canonical_spec_hash(&spec).ok();

    let validation = validate_spec(&spec);
    result.warnings = validation.warnings.iter().map(JsonWarning::from).collect();
    if !validation.is_ok() {
        result.errors = validation.errors.iter().map(JsonError::from).collect();
        print_json(&result)?;
        return Ok(ExitCode::from(1));
    }

    let code = match generate_brush(&spec, output) {
        Ok(summary) => {
            result.success = true;
            result.package = Some(summary);
            ExitCode::SUCCESS
        }
        Err(GenerateFailure::Spec(e)) => {
            result.errors = e.validation_errors().iter().map(JsonError::from).collect();
            if result.errors.is_empty() {
                result
                    .errors
                    .push(JsonError::new(error_codes::INVALID_SPEC, e.to_string()));
            }
            ExitCode::from(1)
        }
        Err(GenerateFailure::Backend(e)) => {
            result.errors.push(JsonError::new(e.code(), e.to_string()));
            ExitCode::from(2)
        }
        Err(GenerateFailure::Package(e)) => {
            result
                .errors
                .push(JsonError::new(error_codes::PACKAGE_WRITE, e.to_string()));
            ExitCode::from(2)
        }
    };
    print_json(&result)?;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output() {
        let spec = BrushSpec::new("Soft Round");
        assert_eq!(resolve_output(&spec, None), PathBuf::from("soft round.brush"));
        assert_eq!(
            resolve_output(&spec, Some("out/custom.brush")),
            PathBuf::from("out/custom.brush")
        );
    }

    #[test]
    fn test_generate_brush_writes_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.brush");
        let spec = BrushSpec::from_json(
            r#"{"name":"Tiny","shape":{"type":"blob","size":32,"base_radius":10},"grain":{"size":16}}"#,
        )
        .unwrap();

        let summary = generate_brush(&spec, path.to_str()).unwrap();
        assert_eq!(summary.path, path);
        assert!(summary.size > 0);
        assert_eq!(summary.entries[0].name, "Brush.archive");
    }
}
