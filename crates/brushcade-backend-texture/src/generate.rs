//! Entry point for raster generation from a resolved brush.

use brushcade_spec::{BackendError, ResolvedBrush};
use thiserror::Error;

use crate::grain::generate_grain;
use crate::png::{self, PngConfig, PngError};
use crate::shape::generate_shape;
use crate::thumbnail::compose_thumbnail;

/// Errors from texture generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("PNG error: {0}")]
    Png(#[from] PngError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl BackendError for GenerateError {
    fn code(&self) -> &'static str {
        match self {
            GenerateError::Png(_) => "TEXTURE_001",
            GenerateError::InvalidParameter(_) => "TEXTURE_002",
        }
    }

    fn category(&self) -> &'static str {
        "texture"
    }
}

/// One encoded raster.
#[derive(Debug, Clone)]
pub struct RasterResult {
    /// PNG file bytes.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// BLAKE3 hash of the PNG bytes.
    pub hash: String,
    /// RGBA when true, single-channel otherwise.
    pub is_color: bool,
}

/// The three rasters of a brush package.
#[derive(Debug, Clone)]
pub struct TextureResult {
    pub shape: RasterResult,
    pub grain: RasterResult,
    pub thumbnail: RasterResult,
}

fn validate_size(what: &str, size: u32) -> Result<(), GenerateError> {
    if size == 0 {
        return Err(GenerateError::InvalidParameter(format!(
            "{} size must be at least 1",
            what
        )));
    }
    (size as usize)
        .checked_mul(size as usize)
        .ok_or_else(|| GenerateError::InvalidParameter(format!("{} size is too large", what)))?;
    Ok(())
}

/// Synthesize and encode shape, grain and thumbnail.
///
/// The thumbnail is composed from the finished shape raster.
pub fn generate_textures(brush: &ResolvedBrush) -> Result<TextureResult, GenerateError> {
    validate_size("shape", brush.shape.size())?;
    validate_size("grain", brush.grain.size)?;

    let config = PngConfig::default();

    let shape = generate_shape(&brush.shape);
    let (shape_png, shape_hash) = png::write_grayscale_to_vec_with_hash(&shape, &config)?;
    log::debug!("{} shape encoded ({} bytes)", brush.shape.kind(), shape_png.len());

    let grain = generate_grain(&brush.grain);
    let (grain_png, grain_hash) = png::write_grayscale_to_vec_with_hash(&grain, &config)?;
    log::debug!("grain encoded ({} bytes)", grain_png.len());

    let thumbnail = compose_thumbnail(&shape, &brush.thumbnail)?;
    let (thumb_png, thumb_hash) = png::write_rgba_to_vec_with_hash(&thumbnail, &config)?;
    log::debug!("thumbnail encoded ({} bytes)", thumb_png.len());

    Ok(TextureResult {
        shape: RasterResult {
            data: shape_png,
            width: shape.width,
            height: shape.height,
            hash: shape_hash,
            is_color: false,
        },
        grain: RasterResult {
            data: grain_png,
            width: grain.width,
            height: grain.height,
            hash: grain_hash,
            is_color: false,
        },
        thumbnail: RasterResult {
            data: thumb_png,
            width: thumbnail.width,
            height: thumbnail.height,
            hash: thumb_hash,
            is_color: true,
        },
    })
}
