//! The brush spec document and its resolved form.

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::params::{BrushBehavior, GrainParams, Shape, ShapeSpec, ThumbnailParams};
use crate::validation::validate_spec;

/// Extension of the packaged brush artifact.
pub const BRUSH_EXTENSION: &str = "brush";

/// A brush spec as read from JSON.
///
/// Only `name` is required; every other group falls back to its default
/// table. Unknown top-level keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushSpec {
    /// Display name of the brush.
    #[serde(default)]
    pub name: String,
    /// Output path of the packaged brush. Defaults to `<lowercased name>.brush`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default)]
    pub shape: ShapeSpec,
    #[serde(default)]
    pub grain: GrainParams,
    #[serde(default)]
    pub thumbnail: ThumbnailParams,
    #[serde(flatten)]
    pub behavior: BrushBehavior,
}

impl BrushSpec {
    /// Creates a spec with the given name and every default applied.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: None,
            shape: ShapeSpec::default(),
            grain: GrainParams::default(),
            thumbnail: ThumbnailParams::default(),
            behavior: BrushBehavior::default(),
        }
    }

    /// Parses a spec from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the spec to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the spec to a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, SpecError> {
        Ok(serde_json::to_value(self)?)
    }

    /// The output path, falling back to `<lowercased name>.brush`.
    pub fn output_path(&self) -> String {
        match self.output {
            Some(ref output) => output.clone(),
            None => format!("{}.{}", self.name.to_lowercase(), BRUSH_EXTENSION),
        }
    }

    /// Validates the spec and resolves every group into its final form.
    ///
    /// Warnings are dropped here; call [`validate_spec`] directly to see them.
    pub fn resolve(&self) -> Result<ResolvedBrush, SpecError> {
        validate_spec(self).into_result()?;

        let shape = self
            .shape
            .resolve()
            .map_err(|e| SpecError::Configuration(vec![e]))?;

        Ok(ResolvedBrush {
            name: self.name.clone(),
            output: self.output_path(),
            shape,
            grain: self.grain.clone(),
            thumbnail: self.thumbnail.clone(),
            behavior: self.behavior.clone(),
        })
    }
}

/// A validated spec with every default applied.
///
/// This is the only form the synthesizers and the archive encoder consume.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBrush {
    pub name: String,
    pub output: String,
    pub shape: Shape,
    pub grain: GrainParams,
    pub thumbnail: ThumbnailParams,
    pub behavior: BrushBehavior,
}
