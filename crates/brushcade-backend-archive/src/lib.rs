//! Brushcade archive backend.
//!
//! Brush parameters are stored as a keyed object-graph archive: a flat table
//! of typed objects that refer to each other by index, wrapped in an
//! `NSKeyedArchiver` envelope and serialized as a binary property list.
//!
//! - [`object`]: the object table, its builder, and invariant checks
//! - [`bplist`]: `bplist00` writer and reader
//! - [`keyed`]: envelope encoding and [`decode_archive`]
//! - [`brush`]: the fixed brush key schema
//!
//! # Example
//!
//! ```
//! use brushcade_backend_archive::{decode_archive, encode_brush_archive};
//! use brushcade_spec::BrushBehavior;
//!
//! let bytes = encode_brush_archive("Soft Round", &BrushBehavior::default()).unwrap();
//! let archive = decode_archive(&bytes).unwrap();
//! assert_eq!(archive.class_name(archive.root), Some("SilicaBrush"));
//! ```

pub mod bplist;
pub mod brush;
pub mod error;
pub mod keyed;
pub mod object;

pub use bplist::{read_bplist, write_bplist, PlistValue};
pub use brush::{
    build_brush_archive, check_brush_schema, encode_brush_archive, min_size_ratio, BRUSH_CLASS,
    MIN_SIZE_EPSILON,
};
pub use error::ArchiveError;
pub use keyed::decode_archive;
pub use object::{ArchiveBuilder, ArchiveObject, ArchiveValue, KeyedArchive, Uid};
