//! Raster buffers produced by the synthesizers.

use crate::color::Color;

/// Single-channel raster with samples in [0, 1].
///
/// For shape stamps the value is opacity (0 = transparent, 1 = opaque).
#[derive(Debug, Clone, PartialEq)]
pub struct GrayscaleBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data (row-major).
    pub data: Vec<f64>,
}

impl GrayscaleBuffer {
    /// Create a new buffer filled with a value.
    pub fn new(width: u32, height: u32, fill: f64) -> Self {
        Self {
            width,
            height,
            data: vec![fill; (width as usize) * (height as usize)],
        }
    }

    /// Create a buffer by evaluating `f(x, y)` for every pixel in row-major order.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f64) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Create from 8-bit samples.
    pub fn from_bytes(width: u32, height: u32, bytes: &[u8]) -> Self {
        Self {
            width,
            height,
            data: bytes.iter().map(|&b| b as f64 / 255.0).collect(),
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.data[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f64) {
        let idx = (y * self.width + x) as usize;
        self.data[idx] = value;
    }

    /// Get a pixel, clamping out-of-range coordinates to the nearest edge.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> f64 {
        let cx = x.clamp(0, self.width as i64 - 1) as u32;
        let cy = y.clamp(0, self.height as i64 - 1) as u32;
        self.get(cx, cy)
    }

    /// Largest sample value (0 for an empty buffer).
    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    /// Snap every sample down to the nearest 8-bit level.
    pub fn truncate_to_u8_levels(&mut self) {
        for v in &mut self.data {
            *v = (v.clamp(0.0, 1.0) * 255.0).floor() / 255.0;
        }
    }

    /// Convert to 8-bit samples (clamped, rounded).
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }
}

/// RGBA raster.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data (row-major).
    pub data: Vec<Color>,
}

impl TextureBuffer {
    /// Create a new texture buffer filled with a color.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            data: vec![fill; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.data[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let idx = (y * self.width + x) as usize;
        self.data[idx] = color;
    }

    /// Convert to 8-bit RGBA bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 4);
        for color in &self.data {
            bytes.extend_from_slice(&color.to_rgba8());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_is_row_major() {
        let buf = GrayscaleBuffer::from_fn(3, 2, |x, y| (y * 3 + x) as f64);
        assert_eq!(buf.data, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(buf.get(2, 1), 5.0);
    }

    #[test]
    fn test_get_clamped() {
        let buf = GrayscaleBuffer::from_fn(2, 2, |x, y| (y * 2 + x) as f64);
        assert_eq!(buf.get_clamped(-5, -5), 0.0);
        assert_eq!(buf.get_clamped(10, 0), 1.0);
        assert_eq!(buf.get_clamped(10, 10), 3.0);
    }

    #[test]
    fn test_to_bytes_clamps_and_rounds() {
        let buf = GrayscaleBuffer {
            width: 4,
            height: 1,
            data: vec![-0.5, 0.5, 1.0, 2.0],
        };
        assert_eq!(buf.to_bytes(), vec![0, 128, 255, 255]);
        assert_eq!(GrayscaleBuffer::from_bytes(4, 1, &buf.to_bytes()).get(3, 0), 1.0);
    }

    #[test]
    fn test_truncate_to_u8_levels() {
        let mut buf = GrayscaleBuffer {
            width: 4,
            height: 1,
            data: vec![0.5, 0.999, -0.2, 1.0],
        };
        buf.truncate_to_u8_levels();
        assert_eq!(buf.to_bytes(), vec![127, 254, 0, 255]);
    }

    #[test]
    fn test_texture_to_rgba8() {
        let mut tex = TextureBuffer::new(2, 1, Color::white());
        tex.set(1, 0, Color::rgba(0.0, 0.0, 0.0, 0.0));
        assert_eq!(tex.to_rgba8(), vec![255, 255, 255, 255, 0, 0, 0, 0]);
    }
}
