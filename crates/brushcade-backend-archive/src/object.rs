//! The archive object table.
//!
//! Objects live in an append-only arena and refer to each other by table
//! index ([`Uid`]). Index 0 is always the null sentinel, which keys point at
//! to mean "no value".

use crate::error::ArchiveError;

/// Archiver identifier stored in the envelope.
pub const ARCHIVER: &str = "NSKeyedArchiver";

/// Format version stored in the envelope.
pub const ARCHIVE_VERSION: i64 = 100_000;

/// Encoded form of the null sentinel.
pub const NULL_SENTINEL: &str = "$null";

/// Every class chain ends here.
pub const BASE_CLASS: &str = "NSObject";

/// Reserved key holding a map's class reference.
pub const CLASS_KEY: &str = "$class";

/// Index into the object table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(pub u64);

impl Uid {
    /// Reference to the null sentinel.
    pub const NULL: Uid = Uid(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A typed value stored under a key of a map object.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveValue {
    Ref(Uid),
    Bool(bool),
    Integer(i64),
    Real(f64),
}

impl ArchiveValue {
    pub fn as_uid(&self) -> Option<Uid> {
        match self {
            ArchiveValue::Ref(uid) => Some(*uid),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArchiveValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ArchiveValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            ArchiveValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// One node of the object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveObject {
    /// The sentinel at index 0.
    Null,
    /// Keyed map of typed values, in insertion order.
    Map(Vec<(String, ArchiveValue)>),
    /// Raw byte blob.
    Data(Vec<u8>),
    String(String),
    /// Class descriptor: concrete class name and its chain, most derived first.
    Class { name: String, classes: Vec<String> },
}

impl ArchiveObject {
    /// Descriptor for `name` whose chain continues through `ancestors`.
    pub fn class(name: &str, ancestors: &[&str]) -> Self {
        let classes = std::iter::once(name)
            .chain(ancestors.iter().copied())
            .map(str::to_string)
            .collect();
        ArchiveObject::Class {
            name: name.to_string(),
            classes,
        }
    }

    /// Value stored under `key` when this is a map.
    pub fn get(&self, key: &str) -> Option<&ArchiveValue> {
        match self {
            ArchiveObject::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Every reference held by this object.
    pub fn references(&self) -> Vec<Uid> {
        match self {
            ArchiveObject::Map(entries) => entries.iter().filter_map(|(_, v)| v.as_uid()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Append-only arena that hands out indices as objects are added.
#[derive(Debug)]
pub struct ArchiveBuilder {
    slots: Vec<Option<ArchiveObject>>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    /// A table holding only the null sentinel.
    pub fn new() -> Self {
        Self {
            slots: vec![Some(ArchiveObject::Null)],
        }
    }

    /// Append an object.
    pub fn push(&mut self, object: ArchiveObject) -> Uid {
        self.slots.push(Some(object));
        Uid(self.slots.len() as u64 - 1)
    }

    /// Claim the next index now and fill it later.
    pub fn reserve(&mut self) -> Uid {
        self.slots.push(None);
        Uid(self.slots.len() as u64 - 1)
    }

    /// Fill a slot obtained from [`reserve`](Self::reserve).
    pub fn fill(&mut self, uid: Uid, object: ArchiveObject) -> Result<(), ArchiveError> {
        match self.slots.get_mut(uid.index()) {
            Some(slot @ None) => {
                *slot = Some(object);
                Ok(())
            }
            _ => Err(ArchiveError::NotReserved(uid.index())),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Close the table under `root` and check every invariant.
    pub fn finish(self, root: Uid) -> Result<KeyedArchive, ArchiveError> {
        let objects = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| slot.ok_or(ArchiveError::UnfilledSlot(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let archive = KeyedArchive { objects, root };
        archive.validate()?;
        Ok(archive)
    }
}

/// A complete object table with its root.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedArchive {
    pub objects: Vec<ArchiveObject>,
    pub root: Uid,
}

impl KeyedArchive {
    /// Check the table invariants.
    ///
    /// Index 0 is the only null, the root and every reference resolve, each
    /// `$class` points at a class descriptor, and each class chain starts at
    /// its own name and ends at `NSObject`.
    pub fn validate(&self) -> Result<(), ArchiveError> {
        let len = self.objects.len();
        if !matches!(self.objects.first(), Some(ArchiveObject::Null)) {
            return Err(ArchiveError::MissingNullSentinel);
        }
        if self.root.index() >= len {
            return Err(ArchiveError::InvalidRoot {
                root: self.root.0,
                len,
            });
        }

        for (i, object) in self.objects.iter().enumerate() {
            match object {
                ArchiveObject::Null if i != 0 => return Err(ArchiveError::MisplacedNull(i)),
                ArchiveObject::Class { name, classes } => {
                    let chained = classes.first() == Some(name)
                        && classes.last().map(String::as_str) == Some(BASE_CLASS);
                    if !chained {
                        return Err(ArchiveError::InvalidClassChain(name.clone()));
                    }
                }
                _ => {}
            }

            for uid in object.references() {
                if uid.index() >= len {
                    return Err(ArchiveError::DanglingReference {
                        from: i,
                        to: uid.0,
                        len,
                    });
                }
            }

            if let Some(value) = object.get(CLASS_KEY) {
                let target = value.as_uid().map(|uid| (uid, &self.objects[uid.index()]));
                match target {
                    Some((_, ArchiveObject::Class { .. })) => {}
                    Some((uid, _)) => {
                        return Err(ArchiveError::InvalidClassReference { from: i, to: uid.0 })
                    }
                    None => {
                        return Err(ArchiveError::InvalidClassReference { from: i, to: u64::MAX })
                    }
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, uid: Uid) -> Option<&ArchiveObject> {
        self.objects.get(uid.index())
    }

    pub fn root_object(&self) -> Option<&ArchiveObject> {
        self.get(self.root)
    }

    /// Class name of the map at `uid`, following its `$class` reference.
    pub fn class_name(&self, uid: Uid) -> Option<&str> {
        let class_uid = self.get(uid)?.get(CLASS_KEY)?.as_uid()?;
        match self.get(class_uid)? {
            ArchiveObject::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The object a key of the root map points at.
    pub fn resolve_root_ref(&self, key: &str) -> Option<&ArchiveObject> {
        let uid = self.root_object()?.get(key)?.as_uid()?;
        self.get(uid)
    }
}
