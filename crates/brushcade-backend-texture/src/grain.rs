//! Paper grain texture synthesis.

use brushcade_spec::GrainParams;

use crate::filter::gaussian_blur;
use crate::maps::GrayscaleBuffer;
use crate::rng::{DeterministicRng, GRAIN_SEED};

/// Generate the grain texture with the fixed grain seed.
pub fn generate_grain(params: &GrainParams) -> GrayscaleBuffer {
    generate_grain_with_seed(params, GRAIN_SEED)
}

/// Per-pixel Gaussian noise on the 0-255 scale, clamped, then lightly blurred.
pub fn generate_grain_with_seed(params: &GrainParams, seed: u32) -> GrayscaleBuffer {
    let mut rng = DeterministicRng::new(seed);
    let noise = GrayscaleBuffer::from_fn(params.size, params.size, |_, _| {
        rng.gen_normal(params.mean, params.std).clamp(0.0, 255.0) / 255.0
    });

    log::debug!(
        "grain {}px, mean {}, std {}, blur {}",
        params.size,
        params.mean,
        params.std,
        params.blur
    );
    gaussian_blur(&noise, params.blur)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(size: u32) -> GrainParams {
        GrainParams {
            size,
            ..GrainParams::default()
        }
    }

    #[test]
    fn test_grain_dimensions() {
        let buf = generate_grain(&params(32));
        assert_eq!((buf.width, buf.height), (32, 32));
        assert_eq!(buf.data.len(), 32 * 32);
    }

    #[test]
    fn test_grain_is_deterministic() {
        let a = generate_grain(&params(48));
        let b = generate_grain(&params(48));
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn test_grain_mean_is_close_to_requested() {
        let buf = generate_grain(&params(128));
        let bytes = buf.to_bytes();
        let mean = bytes.iter().map(|&b| b as f64).sum::<f64>() / bytes.len() as f64;
        assert!((mean - 220.0).abs() < 3.0, "mean = {}", mean);
    }

    #[test]
    fn test_grain_clamps_to_byte_range() {
        let p = GrainParams {
            size: 16,
            mean: 250.0,
            std: 80.0,
            blur: 0.0,
        };
        let buf = generate_grain(&p);
        assert!(buf.data.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(buf.data.iter().any(|&v| v == 1.0));
    }

    #[test]
    fn test_zero_std_is_flat() {
        let p = GrainParams {
            size: 8,
            mean: 102.0,
            std: 0.0,
            blur: 0.7,
        };
        let bytes = generate_grain(&p).to_bytes();
        assert!(bytes.iter().all(|&b| b == 102));
    }
}
