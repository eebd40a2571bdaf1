//! Separable Gaussian blur.
//!
//! The blur radius is the half-width of the kernel: a radius of 10 touches
//! pixels at most 10 away, with sigma = radius / 2. Samples past the raster
//! edge repeat the nearest edge pixel.

use brushcade_spec::MAX_RASTER_SIZE;

use crate::maps::GrayscaleBuffer;

/// Largest kernel half-width; larger radii are capped to it.
pub const MAX_HALF_WIDTH: usize = MAX_RASTER_SIZE as usize;

/// Normalized 1D Gaussian kernel.
#[derive(Debug, Clone)]
pub struct GaussianKernel {
    weights: Vec<f64>,
    half_width: usize,
}

impl GaussianKernel {
    /// Build the kernel for a blur radius. Returns `None` when the radius
    /// produces no blur.
    pub fn new(radius: f64) -> Option<Self> {
        if radius <= 0.0 || !radius.is_finite() {
            return None;
        }

        let radius = radius.min(MAX_HALF_WIDTH as f64);
        let half_width = radius.ceil() as usize;
        let sigma = radius / 2.0;
        let mut weights: Vec<f64> = (0..=2 * half_width)
            .map(|i| {
                let x = i as f64 - half_width as f64;
                (-x * x / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        let sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }

        Some(Self {
            weights,
            half_width,
        })
    }

    pub fn half_width(&self) -> usize {
        self.half_width
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

/// Blur a grayscale buffer. A radius of zero (or less) returns a copy.
pub fn gaussian_blur(input: &GrayscaleBuffer, radius: f64) -> GrayscaleBuffer {
    let Some(kernel) = GaussianKernel::new(radius) else {
        return input.clone();
    };
    if input.data.is_empty() {
        return input.clone();
    }

    let half = kernel.half_width as i64;
    let weights = kernel.weights();

    // Horizontal pass
    let horizontal = GrayscaleBuffer::from_fn(input.width, input.height, |x, y| {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| w * input.get_clamped(x as i64 + i as i64 - half, y as i64))
            .sum()
    });

    // Vertical pass
    GrayscaleBuffer::from_fn(input.width, input.height, |x, y| {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| w * horizontal.get_clamped(x as i64, y as i64 + i as i64 - half))
            .sum()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        let kernel = GaussianKernel::new(3.5).unwrap();
        assert_eq!(kernel.half_width(), 4);
        assert_eq!(kernel.weights().len(), 9);

        let sum: f64 = kernel.weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);

        let w = kernel.weights();
        for i in 0..w.len() {
            assert!((w[i] - w[w.len() - 1 - i]).abs() < 1e-15);
        }
        assert!(w[4] > w[3]);
    }

    #[test]
    fn test_zero_radius_is_identity() {
        assert!(GaussianKernel::new(0.0).is_none());
        assert!(GaussianKernel::new(-1.0).is_none());

        let buf = GrayscaleBuffer::from_fn(4, 4, |x, y| ((x + y) % 2) as f64);
        assert_eq!(gaussian_blur(&buf, 0.0), buf);
    }

    #[test]
    fn test_constant_buffer_unchanged() {
        let buf = GrayscaleBuffer::new(8, 8, 0.25);
        let blurred = gaussian_blur(&buf, 2.0);
        for v in blurred.data {
            assert!((v - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_blur_does_not_reach_past_radius() {
        let mut buf = GrayscaleBuffer::new(21, 21, 0.0);
        buf.set(10, 10, 1.0);
        let blurred = gaussian_blur(&buf, 3.0);

        assert!(blurred.get(10, 10) < 1.0);
        assert!(blurred.get(13, 10) > 0.0);
        assert!(blurred.get(13, 13) > 0.0);
        assert_eq!(blurred.get(14, 10), 0.0);
        assert_eq!(blurred.get(10, 6), 0.0);

        let total: f64 = blurred.data.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_huge_radius_is_clamped() {
        let kernel = GaussianKernel::new(1e300).unwrap();
        assert_eq!(kernel.half_width(), MAX_HALF_WIDTH);
        assert_eq!(kernel.weights().len(), 2 * MAX_HALF_WIDTH + 1);

        let buf = GrayscaleBuffer::new(4, 4, 0.5);
        let blurred = gaussian_blur(&buf, 1e10);
        for v in blurred.data {
            assert!((v - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fractional_radius_blurs_lightly() {
        let mut buf = GrayscaleBuffer::new(5, 5, 0.0);
        buf.set(2, 2, 1.0);
        let blurred = gaussian_blur(&buf, 0.7);
        assert!(blurred.get(2, 2) > 0.9);
        assert!(blurred.get(3, 2) > 0.0);
        assert_eq!(blurred.get(4, 2), 0.0);
    }
}
