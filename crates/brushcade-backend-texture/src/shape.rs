//! Shape stamp synthesis: soft ellipses and organic blobs.
//!
//! Output samples encode opacity: 0 is transparent, 1 is fully opaque.

use brushcade_spec::{BlobShape, EllipseShape, Shape};

use crate::filter::gaussian_blur;
use crate::maps::GrayscaleBuffer;
use crate::rng::{DeterministicRng, BLOB_SEED};

/// Normalized distance where the wet-edge ring starts to build up.
pub const WET_RING_START: f64 = 0.65;

/// Inner falloff slope and ring strength of the wet-edge profile.
const WET_FALLOFF: f64 = 0.55;

/// Generate the stamp for any supported shape.
pub fn generate_shape(shape: &Shape) -> GrayscaleBuffer {
    match shape {
        Shape::Ellipse(ellipse) => generate_ellipse(ellipse),
        Shape::Blob(blob) => generate_blob(blob),
    }
}

/// Filled ellipse inset by `padding_x`/`padding_y`, then blurred.
///
/// The ellipse is inscribed in the box `[padding_x, padding_y, size - padding_x,
/// size - padding_y]`; a pixel is filled when its center lies inside. Padding
/// of half the size or more leaves the canvas empty.
pub fn generate_ellipse(params: &EllipseShape) -> GrayscaleBuffer {
    let size = params.size as f64;
    let center = size / 2.0;
    let rx = (size - 2.0 * params.padding_x as f64) / 2.0;
    let ry = (size - 2.0 * params.padding_y as f64) / 2.0;

    let mask = if rx <= 0.0 || ry <= 0.0 {
        GrayscaleBuffer::new(params.size, params.size, 0.0)
    } else {
        GrayscaleBuffer::from_fn(params.size, params.size, |x, y| {
            let dx = (x as f64 + 0.5 - center) / rx;
            let dy = (y as f64 + 0.5 - center) / ry;
            if dx * dx + dy * dy <= 1.0 {
                1.0
            } else {
                0.0
            }
        })
    };

    log::debug!(
        "ellipse stamp {}px, padding {}x{}, blur {}",
        params.size,
        params.padding_x,
        params.padding_y,
        params.blur_radius
    );
    gaussian_blur(&mask, params.blur_radius)
}

/// Organic blob with the fixed roughness seed.
pub fn generate_blob(params: &BlobShape) -> GrayscaleBuffer {
    generate_blob_with_seed(params, BLOB_SEED)
}

/// Organic blob: harmonic boundary plus per-pixel Gaussian roughness.
///
/// Roughness samples are drawn in row-major pixel order, so a given seed
/// always yields the same raster.
pub fn generate_blob_with_seed(params: &BlobShape, seed: u32) -> GrayscaleBuffer {
    let mut rng = DeterministicRng::new(seed);
    let center = (params.size / 2) as f64;

    let mut alpha = GrayscaleBuffer::from_fn(params.size, params.size, |x, y| {
        let dx = x as f64 - center;
        let dy = y as f64 - center;
        let angle = dy.atan2(dx);
        let dist = (dx * dx + dy * dy).sqrt();

        let radius = boundary_radius(params, angle) + rng.gen_normal(0.0, params.roughness);
        let nd = dist / radius.max(1.0);
        blob_alpha(nd, params.wet_edge)
    });

    log::debug!(
        "blob stamp {}px, base radius {}, {} harmonics, wet edge {}",
        params.size,
        params.base_radius,
        params.harmonics.len(),
        params.wet_edge
    );
    // blur runs on the 8-bit alpha, not the raw profile
    alpha.truncate_to_u8_levels();
    gaussian_blur(&alpha, params.blur_radius)
}

/// Noise-free boundary radius at `angle`.
pub fn boundary_radius(params: &BlobShape, angle: f64) -> f64 {
    params.base_radius
        + params
            .harmonics
            .iter()
            .map(|h| h.amp * (h.freq * angle + h.phase).sin())
            .sum::<f64>()
}

/// Opacity at normalized distance `nd` from the center (1.0 = on the boundary).
///
/// With `wet_edge` the inner falloff is shallower and a ring over
/// `nd` in (0.65, 1.0] adds opacity back toward the boundary. Anything
/// beyond the boundary is transparent.
pub fn blob_alpha(nd: f64, wet_edge: bool) -> f64 {
    if nd > 1.0 {
        return 0.0;
    }

    if wet_edge {
        let inner = (1.0 - nd * WET_FALLOFF).clamp(0.0, 1.0);
        let ring = ((nd - WET_RING_START) / (1.0 - WET_RING_START)).clamp(0.0, 1.0) * WET_FALLOFF;
        (inner + ring).clamp(0.0, 1.0)
    } else {
        (1.0 - nd).clamp(0.0, 1.0)
    }
}
