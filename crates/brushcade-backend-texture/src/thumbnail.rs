//! Preview thumbnail: a simulated diagonal stroke built from shape stamps.
//!
//! Stamps run from the lower-left toward the upper-right corner, swelling
//! toward the middle of the path. Nothing here is random.

use std::f64::consts::PI;

use brushcade_spec::{ThumbnailParams, MAX_STAMPS};
use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::color::Color;
use crate::generate::GenerateError;
use crate::maps::{GrayscaleBuffer, TextureBuffer};

/// Edge length of the square thumbnail.
pub const THUMBNAIL_SIZE: u32 = 267;

/// Placement of one stamp on the thumbnail canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampPlacement {
    /// Stamp center.
    pub cx: i64,
    pub cy: i64,
    /// Edge length of the scaled stamp.
    pub size: u32,
}

impl StampPlacement {
    /// Placement of stamp `index` out of `count` along the path.
    pub fn along_path(index: u32, count: u32) -> Self {
        let t = index as f64 / (count.max(2) - 1) as f64;
        let size = (18.0 + 10.0 * (PI * t).sin()) as i64;
        Self {
            cx: (20.0 + t * 227.0) as i64,
            cy: (247.0 - t * 207.0) as i64,
            size: size.max(1) as u32,
        }
    }

    /// Top-left corner of the stamp.
    pub fn origin(&self) -> (i64, i64) {
        let half = (self.size / 2) as i64;
        (self.cx - half, self.cy - half)
    }
}

/// Render the thumbnail for a finished shape raster.
///
/// Each stamp is the stroke color with alpha `stamp_alpha * mask`, where the
/// mask is the shape resized (Lanczos3) to the stamp size. Stamps are
/// composited source-over in path order onto opaque white.
///
/// The stamp keeps the full stroke color at every coverage level; only its
/// alpha follows the mask, so soft edges do not darken toward black.
/// `n_stamps` is clamped to `2..=MAX_STAMPS`.
pub fn compose_thumbnail(
    shape: &GrayscaleBuffer,
    params: &ThumbnailParams,
) -> Result<TextureBuffer, GenerateError> {
    let shape_img = GrayImage::from_raw(shape.width, shape.height, shape.to_bytes())
        .ok_or_else(|| {
            GenerateError::InvalidParameter(format!(
                "shape buffer does not match {}x{}",
                shape.width, shape.height
            ))
        })?;

    let fill = Color::from_rgb8(params.stroke_color, params.stamp_alpha.min(255) as u8);
    let mut canvas = TextureBuffer::new(THUMBNAIL_SIZE, THUMBNAIL_SIZE, Color::white());
    let count = params.n_stamps.clamp(2, MAX_STAMPS);

    for i in 0..count {
        let stamp = StampPlacement::along_path(i, count);
        let mask = imageops::resize(&shape_img, stamp.size, stamp.size, FilterType::Lanczos3);
        let (ox, oy) = stamp.origin();

        for (mx, my, pixel) in mask.enumerate_pixels() {
            let px = ox + mx as i64;
            let py = oy + my as i64;
            if px < 0 || py < 0 || px >= THUMBNAIL_SIZE as i64 || py >= THUMBNAIL_SIZE as i64 {
                continue;
            }

            let coverage = pixel.0[0] as f64 / 255.0;
            if coverage <= 0.0 {
                continue;
            }
            let (px, py) = (px as u32, py as u32);
            let src = fill.with_alpha_scaled(coverage);
            canvas.set(px, py, src.over(&canvas.get(px, py)));
        }
    }

    log::debug!(
        "thumbnail: {} stamps, color {:?}, alpha {}",
        count,
        params.stroke_color,
        params.stamp_alpha
    );
    Ok(canvas)
}
