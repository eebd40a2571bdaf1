//! Keyed-archive envelope around the object table.
//!
//! ```text
//! { "$version": 100000, "$archiver": "NSKeyedArchiver",
//!   "$top": { "root": UID }, "$objects": [ "$null", ... ] }
//! ```

use crate::bplist::{read_bplist, write_bplist, PlistValue};
use crate::error::ArchiveError;
use crate::object::{
    ArchiveObject, ArchiveValue, KeyedArchive, Uid, ARCHIVER, ARCHIVE_VERSION, NULL_SENTINEL,
};

const KEY_VERSION: &str = "$version";
const KEY_ARCHIVER: &str = "$archiver";
const KEY_TOP: &str = "$top";
const KEY_OBJECTS: &str = "$objects";
const KEY_ROOT: &str = "root";
const KEY_CLASSNAME: &str = "$classname";
const KEY_CLASSES: &str = "$classes";

fn object_to_plist(object: &ArchiveObject) -> PlistValue {
    match object {
        ArchiveObject::Null => PlistValue::String(NULL_SENTINEL.to_string()),
        ArchiveObject::Map(entries) => PlistValue::Dictionary(
            entries
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        ArchiveValue::Ref(uid) => PlistValue::Uid(uid.0),
                        ArchiveValue::Bool(b) => PlistValue::Boolean(*b),
                        ArchiveValue::Integer(i) => PlistValue::Integer(*i),
                        ArchiveValue::Real(r) => PlistValue::Real(*r),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        ArchiveObject::Data(bytes) => PlistValue::Data(bytes.clone()),
        ArchiveObject::String(s) => PlistValue::String(s.clone()),
        ArchiveObject::Class { name, classes } => PlistValue::Dictionary(vec![
            (KEY_CLASSNAME.to_string(), PlistValue::String(name.clone())),
            (
                KEY_CLASSES.to_string(),
                PlistValue::Array(classes.iter().cloned().map(PlistValue::String).collect()),
            ),
        ]),
    }
}

fn object_from_plist(index: usize, value: PlistValue) -> Result<ArchiveObject, ArchiveError> {
    let invalid = |what: &str| ArchiveError::InvalidEnvelope(format!("object {}: {}", index, what));

    Ok(match value {
        PlistValue::String(s) if index == 0 && s == NULL_SENTINEL => ArchiveObject::Null,
        PlistValue::String(s) => ArchiveObject::String(s),
        PlistValue::Data(bytes) => ArchiveObject::Data(bytes),
        PlistValue::Dictionary(entries) if entries.iter().any(|(k, _)| k == KEY_CLASSNAME) => {
            let mut name = None;
            let mut classes = Vec::new();
            for (key, value) in entries {
                match (key.as_str(), value) {
                    (KEY_CLASSNAME, PlistValue::String(s)) => name = Some(s),
                    (KEY_CLASSES, PlistValue::Array(items)) => {
                        for item in items {
                            match item {
                                PlistValue::String(s) => classes.push(s),
                                _ => return Err(invalid("non-string entry in $classes")),
                            }
                        }
                    }
                    _ => {}
                }
            }
            let name = name.ok_or_else(|| invalid("$classname is not a string"))?;
            ArchiveObject::Class { name, classes }
        }
        PlistValue::Dictionary(entries) => {
            let mut map = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let value = match value {
                    PlistValue::Uid(uid) => ArchiveValue::Ref(Uid(uid)),
                    PlistValue::Boolean(b) => ArchiveValue::Bool(b),
                    PlistValue::Integer(i) => ArchiveValue::Integer(i),
                    PlistValue::Real(r) => ArchiveValue::Real(r),
                    _ => return Err(invalid(&format!("unsupported value under '{}'", key))),
                };
                map.push((key, value));
            }
            ArchiveObject::Map(map)
        }
        _ => return Err(invalid("unsupported object type")),
    })
}

impl KeyedArchive {
    /// The envelope as a property-list value.
    pub fn to_plist(&self) -> PlistValue {
        PlistValue::Dictionary(vec![
            (KEY_VERSION.to_string(), PlistValue::Integer(ARCHIVE_VERSION)),
            (KEY_ARCHIVER.to_string(), PlistValue::String(ARCHIVER.to_string())),
            (
                KEY_TOP.to_string(),
                PlistValue::Dictionary(vec![(KEY_ROOT.to_string(), PlistValue::Uid(self.root.0))]),
            ),
            (
                KEY_OBJECTS.to_string(),
                PlistValue::Array(self.objects.iter().map(object_to_plist).collect()),
            ),
        ])
    }

    /// Serialize as a binary property list.
    pub fn encode(&self) -> Result<Vec<u8>, ArchiveError> {
        self.validate()?;
        write_bplist(&self.to_plist())
    }

    /// Rebuild an archive from its envelope and check its invariants.
    pub fn from_plist(value: PlistValue) -> Result<Self, ArchiveError> {
        let entries = match value {
            PlistValue::Dictionary(entries) => entries,
            _ => return Err(ArchiveError::InvalidEnvelope("top level is not a dictionary".into())),
        };

        let mut version = None;
        let mut archiver = None;
        let mut root = None;
        let mut objects = None;
        for (key, value) in entries {
            match key.as_str() {
                KEY_VERSION => version = Some(value),
                KEY_ARCHIVER => archiver = Some(value),
                KEY_TOP => root = value.get(KEY_ROOT).cloned(),
                KEY_OBJECTS => objects = Some(value),
                _ => {}
            }
        }

        if version != Some(PlistValue::Integer(ARCHIVE_VERSION)) {
            return Err(ArchiveError::InvalidEnvelope(format!(
                "$version must be {}",
                ARCHIVE_VERSION
            )));
        }
        if archiver != Some(PlistValue::String(ARCHIVER.to_string())) {
            return Err(ArchiveError::InvalidEnvelope(format!(
                "$archiver must be {}",
                ARCHIVER
            )));
        }
        let root = match root {
            Some(PlistValue::Uid(uid)) => Uid(uid),
            _ => return Err(ArchiveError::InvalidEnvelope("$top has no root UID".into())),
        };
        let objects = match objects {
            Some(PlistValue::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| object_from_plist(i, item))
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(ArchiveError::InvalidEnvelope("$objects is not an array".into())),
        };

        let archive = KeyedArchive { objects, root };
        archive.validate()?;
        Ok(archive)
    }
}

/// Decode and validate a binary keyed archive.
pub fn decode_archive(data: &[u8]) -> Result<KeyedArchive, ArchiveError> {
    KeyedArchive::from_plist(read_bplist(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ArchiveBuilder;
    use pretty_assertions::assert_eq;

    fn sample() -> KeyedArchive {
        let mut builder = ArchiveBuilder::new();
        let root = builder.reserve();
        let label = builder.push(ArchiveObject::String("Ink".into()));
        let blob = builder.push(ArchiveObject::Data(vec![1, 2, 3, 4]));
        let class = builder.push(ArchiveObject::class("Widget", &["NSObject"]));
        builder
            .fill(
                root,
                ArchiveObject::Map(vec![
                    ("$class".into(), ArchiveValue::Ref(class)),
                    ("label".into(), ArchiveValue::Ref(label)),
                    ("blob".into(), ArchiveValue::Ref(blob)),
                    ("none".into(), ArchiveValue::Ref(Uid::NULL)),
                    ("on".into(), ArchiveValue::Bool(true)),
                    ("mode".into(), ArchiveValue::Integer(2)),
                    ("level".into(), ArchiveValue::Real(0.25)),
                ]),
            )
            .unwrap();
        builder.finish(root).unwrap()
    }

    #[test]
    fn test_envelope_fields() {
        let plist = sample().to_plist();
        assert_eq!(plist.get("$version"), Some(&PlistValue::Integer(100_000)));
        assert_eq!(
            plist.get("$archiver"),
            Some(&PlistValue::String("NSKeyedArchiver".into()))
        );
        assert_eq!(
            plist.get("$top").and_then(|t| t.get("root")),
            Some(&PlistValue::Uid(1))
        );
        match plist.get("$objects") {
            Some(PlistValue::Array(items)) => {
                assert_eq!(items[0], PlistValue::String("$null".into()));
                assert_eq!(items.len(), 5);
            }
            other => panic!("unexpected $objects: {:?}", other),
        }
    }

    #[test]
    fn test_decode_recovers_table() {
        let archive = sample();
        let decoded = decode_archive(&archive.encode().unwrap()).unwrap();

        assert_eq!(decoded.root, archive.root);
        assert_eq!(decoded.objects.len(), archive.objects.len());
        assert_eq!(decoded.class_name(decoded.root), Some("Widget"));

        let root = decoded.root_object().unwrap();
        assert_eq!(root.get("on"), Some(&ArchiveValue::Bool(true)));
        assert_eq!(root.get("mode"), Some(&ArchiveValue::Integer(2)));
        assert_eq!(root.get("level"), Some(&ArchiveValue::Real(0.25)));
        assert_eq!(root.get("none"), Some(&ArchiveValue::Ref(Uid::NULL)));
        assert_eq!(
            decoded.resolve_root_ref("blob"),
            Some(&ArchiveObject::Data(vec![1, 2, 3, 4]))
        );
    }

    #[test]
    fn test_wrong_archiver_rejected() {
        let mut plist = sample().to_plist();
        if let PlistValue::Dictionary(entries) = &mut plist {
            entries[1].1 = PlistValue::String("NSArchiver".into());
        }
        let data = write_bplist(&plist).unwrap();
        assert!(matches!(decode_archive(&data), Err(ArchiveError::InvalidEnvelope(_))));
    }

    #[test]
    fn test_dangling_uid_rejected_on_decode() {
        let plist = PlistValue::Dictionary(vec![
            ("$version".into(), PlistValue::Integer(100_000)),
            ("$archiver".into(), PlistValue::String("NSKeyedArchiver".into())),
            ("$top".into(), PlistValue::Dictionary(vec![("root".into(), PlistValue::Uid(1))])),
            (
                "$objects".into(),
                PlistValue::Array(vec![
                    PlistValue::String("$null".into()),
                    PlistValue::Dictionary(vec![("ghost".into(), PlistValue::Uid(42))]),
                ]),
            ),
        ]);
        let data = write_bplist(&plist).unwrap();
        assert!(matches!(
            decode_archive(&data),
            Err(ArchiveError::DanglingReference { to: 42, .. })
        ));
    }

    #[test]
    fn test_missing_null_rejected_on_decode() {
        let plist = PlistValue::Dictionary(vec![
            ("$version".into(), PlistValue::Integer(100_000)),
            ("$archiver".into(), PlistValue::String("NSKeyedArchiver".into())),
            ("$top".into(), PlistValue::Dictionary(vec![("root".into(), PlistValue::Uid(0))])),
            ("$objects".into(), PlistValue::Array(vec![PlistValue::String("first".into())])),
        ]);
        let data = write_bplist(&plist).unwrap();
        assert!(matches!(decode_archive(&data), Err(ArchiveError::MissingNullSentinel)));
    }
}
