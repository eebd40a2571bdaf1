//! Canonical spec hashing.
//!
//! The hash identifies what was asked for, independent of key order or
//! whitespace in the source document:
//!
//! ```text
//! spec_hash = hex(BLAKE3(canonical_json(spec)))
//! ```

use serde_json::Value;

use crate::error::SpecError;
use crate::spec::BrushSpec;

/// Computes the canonical BLAKE3 hash of a spec.
///
/// # Example
/// ```
/// use brushcade_spec::{BrushSpec, canonical_spec_hash};
///
/// let hash = canonical_spec_hash(&BrushSpec::new("Soft Round")).unwrap();
/// assert_eq!(hash.len(), 64);
/// ```
pub fn canonical_spec_hash(spec: &BrushSpec) -> Result<String, SpecError> {
    let value = spec.to_value()?;
    Ok(blake3::hash(canonicalize_json(&value).as_bytes())
        .to_hex()
        .to_string())
}

/// Serializes a JSON value with sorted object keys and no whitespace.
pub fn canonicalize_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // serde_json already prints scalars compactly and deterministically
        scalar => out.push_str(&scalar.to_string()),
    }
}
