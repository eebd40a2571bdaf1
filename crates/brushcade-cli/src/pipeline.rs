//! Spec-to-package pipeline.
//!
//! Rasters and the archive are independent; the thumbnail waits on the
//! shape raster. Everything runs in a single sequential pass.

use brushcade_backend_archive::{encode_brush_archive, ArchiveError};
use brushcade_backend_texture::{generate_textures, GenerateError};
use brushcade_spec::{BackendError, ResolvedBrush};
use thiserror::Error;

use crate::package::BrushPackage;

/// A backend failure while building the package payloads.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("texture generation failed: {0}")]
    Texture(#[from] GenerateError),

    #[error("archive encoding failed: {0}")]
    Archive(#[from] ArchiveError),
}

impl PipelineError {
    /// Code of the underlying backend error.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Texture(e) => e.code(),
            PipelineError::Archive(e) => e.code(),
        }
    }
}

/// Encode every payload of a resolved brush.
pub fn build_package(brush: &ResolvedBrush) -> Result<BrushPackage, PipelineError> {
    let textures = generate_textures(brush)?;
    let archive = encode_brush_archive(&brush.name, &brush.behavior)?;
    log::debug!(
        "built '{}': shape {}, grain {}, thumbnail {}",
        brush.name,
        &textures.shape.hash[..16],
        &textures.grain.hash[..16],
        &textures.thumbnail.hash[..16]
    );

    Ok(BrushPackage {
        archive,
        shape: textures.shape.data,
        grain: textures.grain.data,
        thumbnail: textures.thumbnail.data,
    })
}
