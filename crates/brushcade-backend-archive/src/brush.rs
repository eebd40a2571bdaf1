//! The brush parameter archive.
//!
//! Object table layout:
//!
//! | Index | Object |
//! |-------|--------|
//! | 0 | `$null` |
//! | 1 | brush parameters (root map) |
//! | 2 | color, four little-endian `f32` (RGBA) |
//! | 3 | brush name |
//! | 4 | `SilicaBrush` class descriptor |
//!
//! The consuming application loads the root map by key name and type with
//! no negotiation, so the key set below is fixed.

use std::collections::BTreeSet;

use brushcade_spec::BrushBehavior;
use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::ArchiveError;
use crate::object::{ArchiveBuilder, ArchiveObject, ArchiveValue, KeyedArchive, Uid, BASE_CLASS, CLASS_KEY};

/// Concrete class of the root object.
pub const BRUSH_CLASS: &str = "SilicaBrush";

/// Floor applied to `maximum_size` when computing `minSize`.
pub const MIN_SIZE_EPSILON: f64 = 0.001;

/// Paint color stored in the archive (opaque black).
pub const BRUSH_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Taper length used when a taper is enabled.
pub const TAPER_LENGTH: f64 = 0.3;

/// Root keys holding references. The bundled paths point at the null
/// sentinel, meaning "use the embedded Shape.png / Grain.png".
pub const REF_KEYS: [&str; 5] = ["$class", "name", "color", "bundledShapePath", "bundledGrainPath"];

pub const BOOL_KEYS: [&str; 5] = ["stamp", "oriented", "shapeRandomise", "textureFilter", "dynamicsGlaze"];

pub const INTEGER_KEYS: [&str; 1] = ["blendMode"];

pub const REAL_KEYS: [&str; 29] = [
    "plotSpacing",
    "plotJitter",
    "plotSmoothing",
    "shapeRotation",
    "shapeScatter",
    "textureScale",
    "textureMovement",
    "textureRotation",
    "textureZoom",
    "paintOpacity",
    "paintSize",
    "dynamicsPressureSize",
    "dynamicsPressureOpacity",
    "dynamicsSpeedSize",
    "dynamicsSpeedOpacity",
    "dynamicsFalloff",
    "dynamicsMix",
    "maxSize",
    "minSize",
    "maxOpacity",
    "minOpacity",
    "taperStartLength",
    "taperEndLength",
    "taperSize",
    "taperOpacity",
    "eraseOpacity",
    "eraseSize",
    "smudgeOpacity",
    "smudgeSize",
];

/// `minSize` as a fraction of `maxSize`, always within [0, 1].
pub fn min_size_ratio(minimum_size: f64, maximum_size: f64) -> f64 {
    (minimum_size / maximum_size.max(MIN_SIZE_EPSILON)).clamp(0.0, 1.0)
}

/// Little-endian `f32` channels.
pub fn color_bytes(rgba: [f32; 4]) -> Result<Vec<u8>, ArchiveError> {
    let mut bytes = Vec::with_capacity(16);
    for channel in rgba {
        bytes.write_f32::<LittleEndian>(channel)?;
    }
    Ok(bytes)
}

fn real(key: &str, value: f64) -> (String, ArchiveValue) {
    (key.to_string(), ArchiveValue::Real(value))
}

fn flag(key: &str, value: bool) -> (String, ArchiveValue) {
    (key.to_string(), ArchiveValue::Bool(value))
}

/// Scalar entries of the root map, grouped the way the consumer's settings
/// panels group them.
pub fn brush_values(behavior: &BrushBehavior) -> Vec<(String, ArchiveValue)> {
    let taper = |enabled: bool| if enabled { TAPER_LENGTH } else { 0.0 };

    vec![
        // stroke path
        real("plotSpacing", behavior.spacing),
        real("plotJitter", behavior.jitter),
        real("plotSmoothing", behavior.stream_line),
        flag("stamp", false),
        flag("oriented", false),
        // shape
        flag("shapeRandomise", false),
        real("shapeRotation", 0.0),
        real("shapeScatter", 0.0),
        // grain
        real("textureScale", behavior.grain_depth),
        real("textureMovement", if behavior.grain_mode == 0 { 1.0 } else { 0.0 }),
        flag("textureFilter", true),
        real("textureRotation", 0.0),
        real("textureZoom", 1.0),
        // rendering
        ("blendMode".to_string(), ArchiveValue::Integer(behavior.blend_mode)),
        real("paintOpacity", behavior.opacity),
        real("paintSize", behavior.maximum_size),
        // dynamics
        real("dynamicsPressureSize", behavior.pressure_size),
        real("dynamicsPressureOpacity", behavior.pressure_opacity),
        real("dynamicsSpeedSize", 0.0),
        real("dynamicsSpeedOpacity", 0.0),
        real("dynamicsFalloff", 0.0),
        flag("dynamicsGlaze", false),
        real("dynamicsMix", 0.0),
        // size and opacity range
        real("maxSize", 1.0),
        real("minSize", min_size_ratio(behavior.minimum_size, behavior.maximum_size)),
        real("maxOpacity", 1.0),
        real("minOpacity", 0.0),
        // taper
        real("taperStartLength", taper(behavior.head_taper)),
        real("taperEndLength", taper(behavior.tail_taper)),
        real("taperSize", 1.0),
        real("taperOpacity", 1.0),
        // erase and smudge
        real("eraseOpacity", 0.5),
        real("eraseSize", 0.3),
        real("smudgeOpacity", 0.5),
        real("smudgeSize", 0.3),
    ]
}

/// Build the object table for a brush.
pub fn build_brush_archive(name: &str, behavior: &BrushBehavior) -> Result<KeyedArchive, ArchiveError> {
    let mut builder = ArchiveBuilder::new();
    let root = builder.reserve();
    let color = builder.push(ArchiveObject::Data(color_bytes(BRUSH_COLOR)?));
    let name_uid = builder.push(ArchiveObject::String(name.to_string()));
    let class = builder.push(ArchiveObject::class(BRUSH_CLASS, &[BASE_CLASS]));

    let mut entries = vec![
        (CLASS_KEY.to_string(), ArchiveValue::Ref(class)),
        ("name".to_string(), ArchiveValue::Ref(name_uid)),
        ("color".to_string(), ArchiveValue::Ref(color)),
        ("bundledShapePath".to_string(), ArchiveValue::Ref(Uid::NULL)),
        ("bundledGrainPath".to_string(), ArchiveValue::Ref(Uid::NULL)),
    ];
    entries.extend(brush_values(behavior));
    builder.fill(root, ArchiveObject::Map(entries))?;

    builder.finish(root)
}

/// Build and serialize the brush archive.
pub fn encode_brush_archive(name: &str, behavior: &BrushBehavior) -> Result<Vec<u8>, ArchiveError> {
    let archive = build_brush_archive(name, behavior)?;
    let bytes = archive.encode()?;
    log::debug!(
        "brush archive '{}': {} objects, {} bytes",
        name,
        archive.objects.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Check that `archive` carries exactly the brush key set with the right
/// value types, and that its references land on objects of the right kind.
pub fn check_brush_schema(archive: &KeyedArchive) -> Result<(), ArchiveError> {
    let mismatch = |msg: String| ArchiveError::SchemaMismatch(msg);

    let entries = match archive.root_object() {
        Some(ArchiveObject::Map(entries)) => entries,
        _ => return Err(mismatch("root is not a keyed map".into())),
    };
    if archive.class_name(archive.root) != Some(BRUSH_CLASS) {
        return Err(mismatch(format!("root class is not {}", BRUSH_CLASS)));
    }

    let expected: BTreeSet<&str> = REF_KEYS
        .iter()
        .chain(&BOOL_KEYS)
        .chain(&INTEGER_KEYS)
        .chain(&REAL_KEYS)
        .copied()
        .collect();
    let actual: BTreeSet<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
    if let Some(extra) = actual.difference(&expected).next() {
        return Err(mismatch(format!("unexpected key '{}'", extra)));
    }
    if let Some(missing) = expected.difference(&actual).next() {
        return Err(mismatch(format!("missing key '{}'", missing)));
    }

    for (key, value) in entries {
        let key = key.as_str();
        let typed = if REF_KEYS.contains(&key) {
            value.as_uid().is_some()
        } else if BOOL_KEYS.contains(&key) {
            value.as_bool().is_some()
        } else if INTEGER_KEYS.contains(&key) {
            value.as_integer().is_some()
        } else {
            value.as_real().is_some()
        };
        if !typed {
            return Err(mismatch(format!("key '{}' has the wrong type", key)));
        }
    }

    match archive.resolve_root_ref("name") {
        Some(ArchiveObject::String(_)) => {}
        _ => return Err(mismatch("name does not reference a string".into())),
    }
    match archive.resolve_root_ref("color") {
        Some(ArchiveObject::Data(bytes)) if bytes.len() == 16 => {}
        _ => return Err(mismatch("color does not reference 16 bytes of data".into())),
    }
    for key in ["bundledShapePath", "bundledGrainPath"] {
        if archive.resolve_root_ref(key) != Some(&ArchiveObject::Null) {
            return Err(mismatch(format!("{} must reference $null", key)));
        }
    }
    Ok(())
}
