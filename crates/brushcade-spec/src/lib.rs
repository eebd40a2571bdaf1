//! Brushcade Spec Library
//!
//! Types, default tables, validation, and hashing for brush specs. A brush
//! spec is a JSON document naming a brush and describing its shape stamp,
//! paper grain, preview thumbnail, and stroke behavior.
//!
//! # Example
//!
//! ```
//! use brushcade_spec::{BrushSpec, Shape};
//!
//! let spec = BrushSpec::from_json(
//!     r#"{"name": "Wet Blob", "shape": {"type": "blob", "roughness": 2.0}}"#,
//! ).unwrap();
//!
//! let brush = spec.resolve().unwrap();
//! assert_eq!(brush.output, "wet blob.brush");
//! assert!(matches!(brush.shape, Shape::Blob(_)));
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error and warning types for validation
//! - [`params`]: Parameter groups and their defaults
//! - [`spec`]: The spec document and its resolved form
//! - [`validation`]: Spec validation
//! - [`hash`]: Canonical hashing

pub mod error;
pub mod hash;
pub mod params;
pub mod spec;
pub mod validation;

pub use error::{
    BackendError, ErrorCode, SpecError, ValidationError, ValidationResult, ValidationWarning,
    WarningCode,
};
pub use hash::{canonical_spec_hash, canonicalize_json};
pub use params::{
    default_harmonics, BlobShape, BrushBehavior, EllipseShape, GrainParams, Harmonic, Shape,
    ShapeSpec, ThumbnailParams, SHAPE_TYPES,
};
pub use spec::{BrushSpec, ResolvedBrush, BRUSH_EXTENSION};
pub use validation::{validate_spec, MAX_RASTER_SIZE, MAX_STAMPS};
