//! Brushcade texture backend.
//!
//! Deterministic rasters for a brush package: the shape stamp (ellipse or
//! harmonic blob), the paper grain, and a preview thumbnail that strokes the
//! shape along a diagonal path. Identical inputs produce byte-identical PNGs.
//!
//! # Example
//!
//! ```no_run
//! use brushcade_backend_texture::generate_textures;
//! use brushcade_spec::BrushSpec;
//!
//! let spec = BrushSpec::from_json(r#"{"name":"Soft","shape":{"type":"ellipse","size":64}}"#).unwrap();
//! let result = generate_textures(&spec.resolve().unwrap()).unwrap();
//! assert_eq!(result.shape.width, 64);
//! ```
//!
//! # Determinism
//!
//! - PCG32 with fixed seeds (123 for blob roughness, 42 for grain)
//! - PNG encoding uses fixed compression and filter settings
//! - Thumbnail composition has no randomness

pub mod color;
pub mod filter;
pub mod generate;
pub mod grain;
pub mod maps;
pub mod png;
pub mod rng;
pub mod shape;
pub mod thumbnail;

pub use color::Color;
pub use filter::{gaussian_blur, GaussianKernel};
pub use generate::{generate_textures, GenerateError, RasterResult, TextureResult};
pub use grain::generate_grain;
pub use maps::{GrayscaleBuffer, TextureBuffer};
pub use png::{decode_png, DecodedPng, PngConfig, PngError};
pub use rng::DeterministicRng;
pub use shape::{blob_alpha, generate_blob, generate_ellipse, generate_shape};
pub use thumbnail::{compose_thumbnail, THUMBNAIL_SIZE};
