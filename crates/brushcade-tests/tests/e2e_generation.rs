//! End-to-End Generation Tests for Brushcade
//!
//! Each test runs spec -> `.brush` container and inspects the entries.
//!
//! ```bash
//! cargo test -p brushcade-tests --test e2e_generation
//! ```

use brushcade_backend_archive::{check_brush_schema, ArchiveObject, ArchiveValue};
use brushcade_cli::package::{ENTRY_GRAIN, ENTRY_SHAPE, ENTRY_THUMBNAIL, PACKAGE_ENTRIES};
use brushcade_spec::BrushSpec;
use brushcade_tests::{compute_hash, PackageContents, TestHarness};
use pretty_assertions::assert_eq;

const ELLIPSE_SCENARIO: &str = r#"{"name":"Test","shape":{"type":"ellipse","size":64,"padding":8}}"#;

fn root_real(contents: &PackageContents, key: &str) -> f64 {
    contents
        .archive()
        .root_object()
        .and_then(|root| root.get(key))
        .and_then(ArchiveValue::as_real)
        .unwrap_or_else(|| panic!("archive has no real '{}'", key))
}

#[test]
fn test_ellipse_scenario() {
    let harness = TestHarness::new();
    let (path, summary) = harness.generate(ELLIPSE_SCENARIO, "test.brush");
    let contents = PackageContents::open(&path);

    assert_eq!(contents.names, PACKAGE_ENTRIES.to_vec());
    assert_eq!(summary.entries.len(), 4);

    let shape = contents.png(ENTRY_SHAPE);
    assert_eq!((shape.width, shape.height), (64, 64));
    assert_eq!(shape.channels(), 1);
    assert!(shape.pixel(32, 32)[0] > 0, "center must be opaque");
    for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63)] {
        assert_eq!(shape.pixel(x, y)[0], 0, "corner ({}, {}) must be transparent", x, y);
    }

    let grain = contents.png(ENTRY_GRAIN);
    assert_eq!((grain.width, grain.height), (512, 512));
    assert_eq!(grain.channels(), 1);

    let thumb = contents.png(ENTRY_THUMBNAIL);
    assert_eq!((thumb.width, thumb.height), (267, 267));
    assert_eq!(thumb.channels(), 4);
    assert_eq!(thumb.pixel(0, 0), &[255, 255, 255, 255]);
    assert!(thumb.pixel(20, 247)[0] < 255, "first stamp must darken the canvas");
}

#[test]
fn test_summary_hashes_match_entries() {
    let harness = TestHarness::new();
    let (path, summary) = harness.generate(ELLIPSE_SCENARIO, "hashed.brush");
    let contents = PackageContents::open(&path);

    for entry in &summary.entries {
        assert_eq!(entry.hash, compute_hash(contents.entry(&entry.name)), "{}", entry.name);
        assert_eq!(entry.size as usize, contents.entry(&entry.name).len());
    }
    assert_eq!(summary.size, std::fs::metadata(&path).unwrap().len());
}

#[test]
fn test_ellipse_max_intensity_positive_for_small_padding() {
    let harness = TestHarness::new();
    for (size, padding) in [(32, 0), (48, 10), (100, 49)] {
        let json = format!(
            r#"{{"name":"P","shape":{{"type":"ellipse","size":{},"padding":{},"blur_radius":2}},"grain":{{"size":8}}}}"#,
            size, padding
        );
        let (path, _) = harness.generate(&json, &format!("p{}.brush", size));
        let shape = PackageContents::open(&path).png(ENTRY_SHAPE);
        assert_eq!((shape.width, shape.height), (size, size));
        assert!(shape.data.iter().any(|&v| v > 0), "size {} padding {}", size, padding);
    }
}

#[test]
fn test_blob_package() {
    let harness = TestHarness::new();
    let json = r#"{
        "name": "Watercolor",
        "shape": {"type": "blob", "size": 128, "base_radius": 44, "wet_edge": true},
        "grain": {"size": 64, "mean": 200, "std": 30},
        "thumbnail": {"stroke_color": [30, 60, 160], "stamp_alpha": 180, "n_stamps": 16}
    }"#;
    let (path, _) = harness.generate(json, "watercolor.brush");
    let contents = PackageContents::open(&path);

    let shape = contents.png(ENTRY_SHAPE);
    assert_eq!((shape.width, shape.height), (128, 128));
    assert!(shape.pixel(64, 64)[0] > 0);
    assert_eq!(shape.pixel(0, 0)[0], 0);

    let thumb = contents.png(ENTRY_THUMBNAIL);
    let start = thumb.pixel(20, 247);
    assert!(start[2] > start[0], "stroke color should tint the thumbnail blue");
}

#[test]
fn test_archive_recovers_spec_values() {
    let harness = TestHarness::new();
    let json = r#"{
        "name": "Dry Ink",
        "shape": {"type": "ellipse", "size": 32, "padding": 4},
        "grain": {"size": 16},
        "spacing": 0.11,
        "stream_line": 0.42,
        "jitter": 0.05,
        "grain_depth": 0.8,
        "grain_mode": 1,
        "blend_mode": 2,
        "opacity": 0.7,
        "pressure_size": 0.9,
        "pressure_opacity": 0.2,
        "maximum_size": 0.3,
        "minimum_size": 0.06,
        "head_taper": false
    }"#;
    let (path, _) = harness.generate(json, "dry.brush");
    let contents = PackageContents::open(&path);
    let archive = contents.archive();

    archive.validate().unwrap();
    check_brush_schema(&archive).unwrap();
    assert_eq!(archive.class_name(archive.root), Some("SilicaBrush"));
    assert_eq!(
        archive.resolve_root_ref("name"),
        Some(&ArchiveObject::String("Dry Ink".into()))
    );

    let spec = BrushSpec::from_json(json).unwrap();
    let b = &spec.behavior;
    let expected = [
        ("plotSpacing", b.spacing),
        ("plotSmoothing", b.stream_line),
        ("plotJitter", b.jitter),
        ("textureScale", b.grain_depth),
        ("textureMovement", 0.0),
        ("paintOpacity", b.opacity),
        ("paintSize", b.maximum_size),
        ("dynamicsPressureSize", b.pressure_size),
        ("dynamicsPressureOpacity", b.pressure_opacity),
        ("minSize", 0.2),
        ("taperStartLength", 0.0),
        ("taperEndLength", 0.3),
    ];
    for (key, value) in expected {
        assert!((root_real(&contents, key) - value).abs() < 1e-9, "{}", key);
    }

    let root = archive.root_object().unwrap();
    assert_eq!(root.get("blendMode"), Some(&ArchiveValue::Integer(2)));

    for object in &archive.objects {
        for uid in object.references() {
            assert!(uid.index() < archive.objects.len());
        }
    }
}

#[test]
fn test_min_size_stays_in_unit_range() {
    let harness = TestHarness::new();
    for (min, max) in [(0.5, 0.1), (0.02, 0.0), (0.0, 0.4)] {
        let json = serde_json::json!({
            "name": "M",
            "shape": {"size": 16, "padding": 2},
            "grain": {"size": 8},
            "minimum_size": min,
            "maximum_size": max,
        });
        let (path, _) = harness.generate(&json.to_string(), "m.brush");
        let value = root_real(&PackageContents::open(&path), "minSize");
        assert!((0.0..=1.0).contains(&value), "minSize {} for {}/{}", value, min, max);
    }
}
