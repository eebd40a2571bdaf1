//! Parameter groups of a brush spec and their default tables.
//!
//! Every optional field has its default supplied here, so the backends only
//! ever see fully populated values.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ValidationError};

/// Shape families accepted in `shape.type`.
pub const SHAPE_TYPES: &[&str] = &["ellipse", "blob"];

/// Raw `shape` group as written in the spec.
///
/// Which fields apply depends on `type`; use [`ShapeSpec::resolve`] to get
/// a [`Shape`] with the per-family defaults filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    /// Shape family ("ellipse" or "blob").
    #[serde(rename = "type", default = "default_shape_type")]
    pub shape_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_y: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harmonics: Option<Vec<Harmonic>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wet_edge: Option<bool>,
}

fn default_shape_type() -> String {
    "ellipse".to_string()
}

impl Default for ShapeSpec {
    fn default() -> Self {
        Self {
            shape_type: default_shape_type(),
            size: None,
            padding: None,
            padding_x: None,
            padding_y: None,
            blur_radius: None,
            base_radius: None,
            harmonics: None,
            roughness: None,
            wet_edge: None,
        }
    }
}

impl ShapeSpec {
    /// Resolves the raw group into a concrete shape with defaults applied.
    ///
    /// An unknown `type` is reported with the offending value and the
    /// accepted set.
    pub fn resolve(&self) -> Result<Shape, ValidationError> {
        match self.shape_type.as_str() {
            "ellipse" => {
                let defaults = EllipseShape::default();
                let padding = self.padding.unwrap_or(defaults.padding_x);
                Ok(Shape::Ellipse(EllipseShape {
                    size: self.size.unwrap_or(defaults.size),
                    padding_x: self.padding_x.unwrap_or(padding),
                    padding_y: self.padding_y.unwrap_or(padding),
                    blur_radius: self.blur_radius.unwrap_or(defaults.blur_radius),
                }))
            }
            "blob" => {
                let defaults = BlobShape::default();
                Ok(Shape::Blob(BlobShape {
                    size: self.size.unwrap_or(defaults.size),
                    base_radius: self.base_radius.unwrap_or(defaults.base_radius),
                    harmonics: self.harmonics.clone().unwrap_or(defaults.harmonics),
                    roughness: self.roughness.unwrap_or(defaults.roughness),
                    wet_edge: self.wet_edge.unwrap_or(defaults.wet_edge),
                    blur_radius: self.blur_radius.unwrap_or(defaults.blur_radius),
                }))
            }
            other => Err(ValidationError::with_path(
                ErrorCode::UnknownShapeType,
                format!(
                    "unknown shape type '{}' (expected one of: {})",
                    other,
                    SHAPE_TYPES.join(", ")
                ),
                "shape.type",
            )),
        }
    }
}

/// A fully resolved shape stamp description.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Ellipse(EllipseShape),
    Blob(BlobShape),
}

impl Shape {
    /// Edge length of the square shape raster.
    pub fn size(&self) -> u32 {
        match self {
            Shape::Ellipse(e) => e.size,
            Shape::Blob(b) => b.size,
        }
    }

    /// The `shape.type` string for this shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Ellipse(_) => "ellipse",
            Shape::Blob(_) => "blob",
        }
    }

    pub fn blur_radius(&self) -> f64 {
        match self {
            Shape::Ellipse(e) => e.blur_radius,
            Shape::Blob(b) => b.blur_radius,
        }
    }
}

/// Soft ellipse inset from the canvas edges.
///
/// Unequal paddings give an asymmetric (chisel) tip.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseShape {
    pub size: u32,
    pub padding_x: u32,
    pub padding_y: u32,
    pub blur_radius: f64,
}

impl Default for EllipseShape {
    fn default() -> Self {
        Self {
            size: 256,
            padding_x: 16,
            padding_y: 16,
            blur_radius: 10.0,
        }
    }
}

/// Organic blob: a circle perturbed by harmonics and per-pixel roughness.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobShape {
    pub size: u32,
    /// Base boundary radius in pixels.
    pub base_radius: f64,
    /// Sinusoidal boundary perturbations.
    pub harmonics: Vec<Harmonic>,
    /// Standard deviation of the per-pixel radius noise.
    pub roughness: f64,
    /// Boost alpha in the ring near the boundary (wet-media pooling).
    pub wet_edge: bool,
    pub blur_radius: f64,
}

impl Default for BlobShape {
    fn default() -> Self {
        Self {
            size: 256,
            base_radius: 88.0,
            harmonics: default_harmonics(),
            roughness: 4.0,
            wet_edge: true,
            blur_radius: 5.0,
        }
    }
}

/// One term of the boundary perturbation: `amp * sin(freq * angle + phase)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    pub freq: f64,
    pub amp: f64,
    #[serde(default)]
    pub phase: f64,
}

impl Harmonic {
    pub const fn new(freq: f64, amp: f64, phase: f64) -> Self {
        Self { freq, amp, phase }
    }
}

/// Default blob perturbation.
pub fn default_harmonics() -> Vec<Harmonic> {
    vec![
        Harmonic::new(3.0, 9.0, 0.0),
        Harmonic::new(7.0, 6.0, 1.2),
        Harmonic::new(11.0, 4.0, 0.7),
        Harmonic::new(17.0, 3.0, 2.1),
    ]
}

/// Paper grain texture parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrainParams {
    #[serde(default = "default_grain_size")]
    pub size: u32,
    /// Mean intensity (0-255 scale).
    #[serde(default = "default_grain_mean")]
    pub mean: f64,
    /// Intensity standard deviation (0-255 scale).
    #[serde(default = "default_grain_std")]
    pub std: f64,
    /// Blur radius applied after clamping.
    #[serde(default = "default_grain_blur")]
    pub blur: f64,
}

fn default_grain_size() -> u32 {
    512
}

fn default_grain_mean() -> f64 {
    220.0
}

fn default_grain_std() -> f64 {
    25.0
}

fn default_grain_blur() -> f64 {
    0.7
}

impl Default for GrainParams {
    fn default() -> Self {
        Self {
            size: default_grain_size(),
            mean: default_grain_mean(),
            std: default_grain_std(),
            blur: default_grain_blur(),
        }
    }
}

/// Preview thumbnail parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailParams {
    /// RGB color of the simulated stroke.
    #[serde(default = "default_stroke_color")]
    pub stroke_color: [u8; 3],
    /// Alpha of each stamp before masking (0-255).
    #[serde(default = "default_stamp_alpha")]
    pub stamp_alpha: u32,
    /// Number of stamps along the path (2..=1024).
    #[serde(default = "default_n_stamps")]
    pub n_stamps: u32,
}

fn default_stroke_color() -> [u8; 3] {
    [58, 58, 58]
}

fn default_stamp_alpha() -> u32 {
    200
}

fn default_n_stamps() -> u32 {
    12
}

impl Default for ThumbnailParams {
    fn default() -> Self {
        Self {
            stroke_color: default_stroke_color(),
            stamp_alpha: default_stamp_alpha(),
            n_stamps: default_n_stamps(),
        }
    }
}

/// Brush behavior parameters, stored in the parameter archive.
///
/// These sit at the top level of the spec document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushBehavior {
    /// Stamp spacing along the stroke.
    pub spacing: f64,
    /// Stroke smoothing (StreamLine).
    pub stream_line: f64,
    pub jitter: f64,
    pub tip_type: i64,
    pub head_taper: bool,
    pub tail_taper: bool,
    /// Grain scale.
    pub grain_depth: f64,
    /// 0 = moving grain, anything else = static grain.
    pub grain_mode: i64,
    pub blend_mode: i64,
    pub opacity: f64,
    pub flow: f64,
    pub wet_edges: bool,
    pub pressure_size: f64,
    pub pressure_opacity: f64,
    pub maximum_size: f64,
    pub minimum_size: f64,
    pub uuid: String,
}

impl Default for BrushBehavior {
    fn default() -> Self {
        Self {
            spacing: 0.08,
            stream_line: 0.30,
            jitter: 0.015,
            tip_type: 1,
            head_taper: true,
            tail_taper: true,
            grain_depth: 0.60,
            grain_mode: 0,
            blend_mode: 0,
            opacity: 0.85,
            flow: 0.50,
            wet_edges: false,
            pressure_size: 0.65,
            pressure_opacity: 0.45,
            maximum_size: 0.15,
            minimum_size: 0.02,
            uuid: "brush-001".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_shape_is_ellipse() {
        let shape = ShapeSpec::default().resolve().unwrap();
        assert_eq!(shape, Shape::Ellipse(EllipseShape::default()));
        assert_eq!(shape.kind(), "ellipse");
        assert_eq!(shape.size(), 256);
    }

    #[test]
    fn test_padding_overrides() {
        let spec = ShapeSpec {
            padding: Some(8),
            padding_y: Some(40),
            ..ShapeSpec::default()
        };
        match spec.resolve().unwrap() {
            Shape::Ellipse(e) => {
                assert_eq!(e.padding_x, 8);
                assert_eq!(e.padding_y, 40);
            }
            other => panic!("expected ellipse, got {:?}", other),
        }
    }

    #[test]
    fn test_blob_defaults() {
        let spec = ShapeSpec {
            shape_type: "blob".to_string(),
            ..ShapeSpec::default()
        };
        let shape = spec.resolve().unwrap();
        assert_eq!(shape.blur_radius(), 5.0);
        match shape {
            Shape::Blob(b) => {
                assert_eq!(b.harmonics.len(), 4);
                assert!(b.wet_edge);
                assert_eq!(b.base_radius, 88.0);
            }
            other => panic!("expected blob, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_shape_names_value_and_accepted_set() {
        let spec = ShapeSpec {
            shape_type: "triangle".to_string(),
            ..ShapeSpec::default()
        };
        let err = spec.resolve().unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownShapeType);
        assert!(err.message.contains("triangle"));
        assert!(err.message.contains("ellipse"));
        assert!(err.message.contains("blob"));
    }

    #[test]
    fn test_harmonic_phase_defaults_to_zero() {
        let h: Harmonic = serde_json::from_str(r#"{"freq": 5, "amp": 2.5}"#).unwrap();
        assert_eq!(h, Harmonic::new(5.0, 2.5, 0.0));
    }
}
