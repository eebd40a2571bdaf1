//! Spec validation logic.
//!
//! Every check runs before synthesis starts; errors make the spec unusable,
//! warnings flag values that will be silently adjusted or dropped.

use std::path::{Component, Path};

use crate::error::{ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode};
use crate::params::{BrushBehavior, Shape};
use crate::spec::{BrushSpec, BRUSH_EXTENSION};

/// Largest accepted edge length for any generated raster.
pub const MAX_RASTER_SIZE: u32 = 4096;

/// Largest accepted stamp count for the thumbnail stroke.
pub const MAX_STAMPS: u32 = 1024;

/// Validates a spec and returns every error and warning found.
///
/// # Example
/// ```
/// use brushcade_spec::{BrushSpec, validate_spec};
///
/// let spec = BrushSpec::new("Soft Round");
/// let result = validate_spec(&spec);
/// assert!(result.is_ok());
/// ```
pub fn validate_spec(spec: &BrushSpec) -> ValidationResult {
    let mut result = ValidationResult::default();

    validate_name(spec, &mut result);
    validate_output(spec, &mut result);
    validate_shape(spec, &mut result);
    validate_grain(spec, &mut result);
    validate_thumbnail(spec, &mut result);
    validate_behavior(&spec.behavior, &mut result);

    result
}

fn validate_name(spec: &BrushSpec, result: &mut ValidationResult) {
    if spec.name.trim().is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::MissingName,
            "name is required and must not be empty",
            "name",
        ));
    }
}

fn validate_output(spec: &BrushSpec, result: &mut ValidationResult) {
    let Some(ref output) = spec.output else {
        return;
    };

    if output.is_empty() {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidOutputPath,
            "output path cannot be empty",
            "output",
        ));
        return;
    }

    let path = Path::new(output);
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidOutputPath,
            format!("output path must not contain '..': '{}'", output),
            "output",
        ));
    }

    let has_brush_ext = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(BRUSH_EXTENSION))
        .unwrap_or(false);
    if !has_brush_ext {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::OutputExtension,
            format!("output '{}' does not end in .{}", output, BRUSH_EXTENSION),
            "output",
        ));
    }
}

fn validate_shape(spec: &BrushSpec, result: &mut ValidationResult) {
    let shape = match spec.shape.resolve() {
        Ok(shape) => shape,
        Err(e) => {
            result.add_error(e);
            return;
        }
    };

    check_dimension(shape.size(), "shape.size", result);
    check_blur_radius(shape.blur_radius(), "shape.blur_radius", result);

    if let Shape::Blob(ref blob) = shape {
        check_finite(blob.base_radius, "shape.base_radius", result);
        check_non_negative(blob.roughness, "shape.roughness", result);
        for (i, h) in blob.harmonics.iter().enumerate() {
            if !(h.freq.is_finite() && h.amp.is_finite() && h.phase.is_finite()) {
                result.add_error(ValidationError::with_path(
                    ErrorCode::InvalidParameter,
                    "harmonic freq, amp and phase must be finite",
                    format!("shape.harmonics[{}]", i),
                ));
            }
        }
    }
}

fn validate_grain(spec: &BrushSpec, result: &mut ValidationResult) {
    check_dimension(spec.grain.size, "grain.size", result);
    check_finite(spec.grain.mean, "grain.mean", result);
    check_non_negative(spec.grain.std, "grain.std", result);
    check_blur_radius(spec.grain.blur, "grain.blur", result);
}

fn validate_thumbnail(spec: &BrushSpec, result: &mut ValidationResult) {
    let thumb = &spec.thumbnail;
    if thumb.n_stamps < 2 || thumb.n_stamps > MAX_STAMPS {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidParameter,
            format!("n_stamps must be in 2..={}, got {}", MAX_STAMPS, thumb.n_stamps),
            "thumbnail.n_stamps",
        ));
    }
    if thumb.stamp_alpha > 255 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidParameter,
            format!("stamp_alpha must be in 0..=255, got {}", thumb.stamp_alpha),
            "thumbnail.stamp_alpha",
        ));
    }
}

fn validate_behavior(behavior: &BrushBehavior, result: &mut ValidationResult) {
    let reals = [
        (behavior.spacing, "spacing"),
        (behavior.stream_line, "stream_line"),
        (behavior.jitter, "jitter"),
        (behavior.grain_depth, "grain_depth"),
        (behavior.opacity, "opacity"),
        (behavior.flow, "flow"),
        (behavior.pressure_size, "pressure_size"),
        (behavior.pressure_opacity, "pressure_opacity"),
        (behavior.maximum_size, "maximum_size"),
        (behavior.minimum_size, "minimum_size"),
    ];
    for (value, path) in reals {
        check_finite(value, path, result);
    }

    if behavior.minimum_size > behavior.maximum_size {
        result.add_warning(ValidationWarning::with_path(
            WarningCode::MinimumExceedsMaximum,
            format!(
                "minimum_size {} exceeds maximum_size {}; the stored ratio is clamped to 1",
                behavior.minimum_size, behavior.maximum_size
            ),
            "minimum_size",
        ));
    }

    let defaults = BrushBehavior::default();
    let unstored = [
        ("tip_type", behavior.tip_type != defaults.tip_type),
        ("flow", behavior.flow != defaults.flow),
        ("wet_edges", behavior.wet_edges != defaults.wet_edges),
        ("uuid", behavior.uuid != defaults.uuid),
    ];
    for (path, changed) in unstored {
        if changed {
            result.add_warning(ValidationWarning::with_path(
                WarningCode::UnstoredParameter,
                format!("{} is accepted but not stored in the brush archive", path),
                path,
            ));
        }
    }
}

fn check_dimension(size: u32, path: &str, result: &mut ValidationResult) {
    if size == 0 || size > MAX_RASTER_SIZE {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidDimension,
            format!("{} must be in 1..={}, got {}", path, MAX_RASTER_SIZE, size),
            path,
        ));
    }
}

fn check_finite(value: f64, path: &str, result: &mut ValidationResult) {
    if !value.is_finite() {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidParameter,
            format!("{} must be a finite number", path),
            path,
        ));
    }
}

fn check_blur_radius(value: f64, path: &str, result: &mut ValidationResult) {
    if !value.is_finite() || !(0.0..=MAX_RASTER_SIZE as f64).contains(&value) {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidParameter,
            format!("{} must be in 0..={}, got {}", path, MAX_RASTER_SIZE, value),
            path,
        ));
    }
}

fn check_non_negative(value: f64, path: &str, result: &mut ValidationResult) {
    if !value.is_finite() || value < 0.0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidParameter,
            format!("{} must be a non-negative finite number, got {}", path, value),
            path,
        ));
    }
}
