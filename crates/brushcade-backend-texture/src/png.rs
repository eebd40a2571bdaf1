//! Deterministic PNG encoding.
//!
//! Fixed compression and filter settings keep the bytes identical for
//! identical rasters, so package hashes are reproducible.

use std::io::{Read, Write};

use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use thiserror::Error;

use crate::maps::{GrayscaleBuffer, TextureBuffer};

/// Errors from PNG operations.
#[derive(Debug, Error)]
pub enum PngError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    Decoding(#[from] png::DecodingError),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// PNG export configuration.
#[derive(Debug, Clone)]
pub struct PngConfig {
    pub compression: Compression,
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), PngError> {
    if width == 0 || height == 0 {
        return Err(PngError::InvalidDimensions(format!(
            "image must be at least 1x1, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

fn encode<W: Write>(
    writer: W,
    width: u32,
    height: u32,
    color_type: ColorType,
    data: &[u8],
    config: &PngConfig,
) -> Result<(), PngError> {
    check_dimensions(width, height)?;

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(data)?;
    Ok(())
}

/// Write an RGBA texture buffer as 8-bit RGBA.
pub fn write_rgba_to_writer<W: Write>(
    buffer: &TextureBuffer,
    writer: W,
    config: &PngConfig,
) -> Result<(), PngError> {
    encode(
        writer,
        buffer.width,
        buffer.height,
        ColorType::Rgba,
        &buffer.to_rgba8(),
        config,
    )
}

/// Write a grayscale buffer as 8-bit single channel.
pub fn write_grayscale_to_writer<W: Write>(
    buffer: &GrayscaleBuffer,
    writer: W,
    config: &PngConfig,
) -> Result<(), PngError> {
    encode(
        writer,
        buffer.width,
        buffer.height,
        ColorType::Grayscale,
        &buffer.to_bytes(),
        config,
    )
}

/// Compute the BLAKE3 hash of PNG data.
pub fn hash_png(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Encode to memory and return the bytes with their hash.
pub fn write_rgba_to_vec_with_hash(
    buffer: &TextureBuffer,
    config: &PngConfig,
) -> Result<(Vec<u8>, String), PngError> {
    let mut data = Vec::new();
    write_rgba_to_writer(buffer, &mut data, config)?;
    let hash = hash_png(&data);
    Ok((data, hash))
}

/// Encode to memory and return the bytes with their hash.
pub fn write_grayscale_to_vec_with_hash(
    buffer: &GrayscaleBuffer,
    config: &PngConfig,
) -> Result<(Vec<u8>, String), PngError> {
    let mut data = Vec::new();
    write_grayscale_to_writer(buffer, &mut data, config)?;
    let hash = hash_png(&data);
    Ok((data, hash))
}

/// A decoded 8-bit PNG image.
#[derive(Debug, Clone)]
pub struct DecodedPng {
    pub width: u32,
    pub height: u32,
    pub color_type: ColorType,
    /// Raw pixel bytes, row-major.
    pub data: Vec<u8>,
}

impl DecodedPng {
    /// Bytes per pixel for the decoded color type.
    pub fn channels(&self) -> usize {
        self.color_type.samples()
    }

    /// Channel values of the pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        &self.data[start..start + channels]
    }
}

/// Decode a PNG stream.
pub fn decode_png<R: Read>(reader: R) -> Result<DecodedPng, PngError> {
    let decoder = png::Decoder::new(reader);
    let mut reader = decoder.read_info()?;
    let mut data = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut data)?;
    data.truncate(info.buffer_size());

    if info.bit_depth != BitDepth::Eight {
        return Err(PngError::InvalidDimensions(format!(
            "expected 8-bit samples, got {:?}",
            info.bit_depth
        )));
    }

    Ok(DecodedPng {
        width: info.width,
        height: info.height,
        color_type: info.color_type,
        data,
    })
}
