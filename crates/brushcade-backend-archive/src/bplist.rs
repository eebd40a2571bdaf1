//! Binary property list (`bplist00`) codec.
//!
//! Layout: magic, object records, offset table, 32-byte trailer. Containers
//! hold object references whose width depends on the object count; offsets
//! use the smallest width that fits the offset table position. Equal scalars
//! are written once and shared. Dictionary keys are written in sorted order.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use crate::error::ArchiveError;

/// File magic and format version.
pub const BPLIST_MAGIC: &[u8; 8] = b"bplist00";

/// Size of the trailer at the end of the file.
pub const TRAILER_SIZE: usize = 32;

const MARKER_FALSE: u8 = 0x08;
const MARKER_TRUE: u8 = 0x09;
const MARKER_INT: u8 = 0x10;
const MARKER_REAL: u8 = 0x20;
const MARKER_DATA: u8 = 0x40;
const MARKER_ASCII: u8 = 0x50;
const MARKER_UTF16: u8 = 0x60;
const MARKER_UID: u8 = 0x80;
const MARKER_ARRAY: u8 = 0xA0;
const MARKER_DICT: u8 = 0xD0;

/// A property-list value.
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Data(Vec<u8>),
    Uid(u64),
    Array(Vec<PlistValue>),
    Dictionary(Vec<(String, PlistValue)>),
}

impl PlistValue {
    /// Value under `key` when this is a dictionary.
    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        match self {
            PlistValue::Dictionary(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }
}

/// Identity of a shareable scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScalarKey {
    Boolean(bool),
    Integer(i64),
    Real(u64),
    String(String),
    Data(Vec<u8>),
    Uid(u64),
}

impl ScalarKey {
    fn of(value: &PlistValue) -> Option<Self> {
        Some(match value {
            PlistValue::Boolean(b) => ScalarKey::Boolean(*b),
            PlistValue::Integer(i) => ScalarKey::Integer(*i),
            PlistValue::Real(r) => ScalarKey::Real(r.to_bits()),
            PlistValue::String(s) => ScalarKey::String(s.clone()),
            PlistValue::Data(d) => ScalarKey::Data(d.clone()),
            PlistValue::Uid(u) => ScalarKey::Uid(*u),
            PlistValue::Array(_) | PlistValue::Dictionary(_) => return None,
        })
    }
}

/// An object record with its children replaced by table indices.
enum FlatObject {
    Scalar(PlistValue),
    Array(Vec<usize>),
    Dictionary { keys: Vec<usize>, values: Vec<usize> },
}

/// Flattens a value tree into the object table, depth-first, parents first.
#[derive(Default)]
struct Flattener {
    objects: Vec<FlatObject>,
    scalars: HashMap<ScalarKey, usize>,
}

impl Flattener {
    fn flatten(&mut self, value: &PlistValue) -> usize {
        match value {
            PlistValue::Array(items) => {
                let index = self.placeholder();
                let refs = items.iter().map(|item| self.flatten(item)).collect();
                self.objects[index] = FlatObject::Array(refs);
                index
            }
            PlistValue::Dictionary(entries) => {
                let index = self.placeholder();
                let mut sorted: Vec<&(String, PlistValue)> = entries.iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(&b.0));

                let keys = sorted
                    .iter()
                    .map(|(k, _)| self.scalar(PlistValue::String(k.clone())))
                    .collect();
                let values = sorted.iter().map(|(_, v)| self.flatten(v)).collect();
                self.objects[index] = FlatObject::Dictionary { keys, values };
                index
            }
            scalar => self.scalar(scalar.clone()),
        }
    }

    fn placeholder(&mut self) -> usize {
        self.objects.push(FlatObject::Array(Vec::new()));
        self.objects.len() - 1
    }

    fn scalar(&mut self, value: PlistValue) -> usize {
        let key = ScalarKey::of(&value);
        if let Some(index) = key.as_ref().and_then(|k| self.scalars.get(k)) {
            return *index;
        }
        self.objects.push(FlatObject::Scalar(value));
        let index = self.objects.len() - 1;
        if let Some(key) = key {
            self.scalars.insert(key, index);
        }
        index
    }
}

/// Smallest width in bytes (1, 2, 4 or 8) that holds `value`.
fn width_for(value: u64) -> u8 {
    if value < 1 << 8 {
        1
    } else if value < 1 << 16 {
        2
    } else if value < 1 << 32 {
        4
    } else {
        8
    }
}

fn write_sized<W: Write>(w: &mut W, value: u64, width: u8) -> std::io::Result<()> {
    match width {
        1 => w.write_u8(value as u8),
        2 => w.write_u16::<BigEndian>(value as u16),
        4 => w.write_u32::<BigEndian>(value as u32),
        _ => w.write_u64::<BigEndian>(value),
    }
}

/// Marker byte plus length; lengths of 15 and above follow as an integer record.
fn write_marker_len<W: Write>(w: &mut W, marker: u8, len: usize) -> std::io::Result<()> {
    if len < 15 {
        w.write_u8(marker | len as u8)
    } else {
        w.write_u8(marker | 0x0F)?;
        write_integer(w, len as i64)
    }
}

fn write_integer<W: Write>(w: &mut W, value: i64) -> std::io::Result<()> {
    if value < 0 {
        w.write_u8(MARKER_INT | 3)?;
        return w.write_i64::<BigEndian>(value);
    }
    let width = width_for(value as u64);
    w.write_u8(MARKER_INT | width.trailing_zeros() as u8)?;
    write_sized(w, value as u64, width)
}

fn write_scalar<W: Write>(w: &mut W, value: &PlistValue) -> std::io::Result<()> {
    match value {
        PlistValue::Boolean(false) => w.write_u8(MARKER_FALSE),
        PlistValue::Boolean(true) => w.write_u8(MARKER_TRUE),
        PlistValue::Integer(i) => write_integer(w, *i),
        PlistValue::Real(r) => {
            w.write_u8(MARKER_REAL | 3)?;
            w.write_f64::<BigEndian>(*r)
        }
        PlistValue::Data(bytes) => {
            write_marker_len(w, MARKER_DATA, bytes.len())?;
            w.write_all(bytes)
        }
        PlistValue::String(s) if s.is_ascii() => {
            write_marker_len(w, MARKER_ASCII, s.len())?;
            w.write_all(s.as_bytes())
        }
        PlistValue::String(s) => {
            let units: Vec<u16> = s.encode_utf16().collect();
            write_marker_len(w, MARKER_UTF16, units.len())?;
            for unit in units {
                w.write_u16::<BigEndian>(unit)?;
            }
            Ok(())
        }
        PlistValue::Uid(uid) => {
            let width = width_for(*uid);
            w.write_u8(MARKER_UID | (width - 1))?;
            write_sized(w, *uid, width)
        }
        PlistValue::Array(_) | PlistValue::Dictionary(_) => Ok(()),
    }
}

/// Encode `root` as a binary property list.
pub fn write_bplist(root: &PlistValue) -> Result<Vec<u8>, ArchiveError> {
    let mut flat = Flattener::default();
    flat.flatten(root);
    let objects = flat.objects;

    let num_objects = objects.len();
    let ref_size = width_for(num_objects as u64).min(4);

    let mut out = Vec::new();
    out.write_all(BPLIST_MAGIC)?;

    let mut offsets = Vec::with_capacity(num_objects);
    for object in &objects {
        offsets.push(out.len() as u64);
        match object {
            FlatObject::Scalar(value) => write_scalar(&mut out, value)?,
            FlatObject::Array(refs) => {
                write_marker_len(&mut out, MARKER_ARRAY, refs.len())?;
                for &r in refs {
                    write_sized(&mut out, r as u64, ref_size)?;
                }
            }
            FlatObject::Dictionary { keys, values } => {
                write_marker_len(&mut out, MARKER_DICT, keys.len())?;
                for &r in keys.iter().chain(values) {
                    write_sized(&mut out, r as u64, ref_size)?;
                }
            }
        }
    }

    let offset_table_offset = out.len() as u64;
    let offset_size = width_for(offset_table_offset);
    for offset in offsets {
        write_sized(&mut out, offset, offset_size)?;
    }

    out.write_all(&[0; 6])?;
    out.write_u8(offset_size)?;
    out.write_u8(ref_size)?;
    out.write_u64::<BigEndian>(num_objects as u64)?;
    out.write_u64::<BigEndian>(0)?;
    out.write_u64::<BigEndian>(offset_table_offset)?;

    log::trace!("bplist: {} objects, {} bytes", num_objects, out.len());
    Ok(out)
}

/// Trailer fields needed to walk the object table.
#[derive(Debug, Clone, Copy)]
struct Trailer {
    offset_size: usize,
    ref_size: usize,
    num_objects: usize,
    top_object: usize,
    offset_table_offset: usize,
}

struct Reader<'a> {
    data: &'a [u8],
    trailer: Trailer,
    offsets: Vec<usize>,
    visiting: HashSet<usize>,
}

impl<'a> Reader<'a> {
    fn bytes(&self, start: usize, len: usize, what: &str) -> Result<&'a [u8], ArchiveError> {
        let data = self.data;
        start
            .checked_add(len)
            .filter(|&end| end <= self.trailer.offset_table_offset)
            .map(|end| &data[start..end])
            .ok_or_else(|| ArchiveError::Truncated(format!("{} at byte {}", what, start)))
    }

    fn sized(&self, start: usize, width: usize, what: &str) -> Result<u64, ArchiveError> {
        Ok(BigEndian::read_uint(self.bytes(start, width, what)?, width))
    }

    /// Length nibble, or the integer record that follows it. Returns (len, header size).
    fn length(&self, pos: usize, marker: u8) -> Result<(usize, usize), ArchiveError> {
        let nibble = (marker & 0x0F) as usize;
        if nibble != 0x0F {
            return Ok((nibble, 1));
        }
        let int_marker = self.bytes(pos + 1, 1, "length")?[0];
        if int_marker & 0xF0 != MARKER_INT || int_marker & 0x0F > 3 {
            return Err(ArchiveError::UnsupportedMarker(int_marker));
        }
        let width = 1usize << (int_marker & 0x0F);
        let len = self.sized(pos + 2, width, "length")?;
        if len > self.data.len() as u64 {
            return Err(ArchiveError::Truncated(format!("length {} at byte {}", len, pos)));
        }
        Ok((len as usize, 2 + width))
    }

    fn refs(&self, start: usize, count: usize) -> Result<Vec<usize>, ArchiveError> {
        let size = self.trailer.ref_size;
        (0..count)
            .map(|i| self.sized(start + i * size, size, "object reference").map(|r| r as usize))
            .collect()
    }

    fn read_object(&mut self, index: usize) -> Result<PlistValue, ArchiveError> {
        let pos = *self
            .offsets
            .get(index)
            .ok_or(ArchiveError::OffsetOutOfRange { index, offset: u64::MAX })?;
        let marker = self.bytes(pos, 1, "marker")?[0];
        let nibble = marker & 0x0F;

        let value = match marker & 0xF0 {
            0x00 => match marker {
                MARKER_FALSE => PlistValue::Boolean(false),
                MARKER_TRUE => PlistValue::Boolean(true),
                _ => return Err(ArchiveError::UnsupportedMarker(marker)),
            },
            MARKER_INT => {
                if nibble > 3 {
                    return Err(ArchiveError::UnsupportedMarker(marker));
                }
                let width = 1usize << nibble;
                let raw = self.bytes(pos + 1, width, "integer")?;
                if width == 8 {
                    PlistValue::Integer(BigEndian::read_i64(raw))
                } else {
                    PlistValue::Integer(BigEndian::read_uint(raw, width) as i64)
                }
            }
            MARKER_REAL => match nibble {
                2 => PlistValue::Real(BigEndian::read_f32(self.bytes(pos + 1, 4, "real")?) as f64),
                3 => PlistValue::Real(BigEndian::read_f64(self.bytes(pos + 1, 8, "real")?)),
                _ => return Err(ArchiveError::UnsupportedMarker(marker)),
            },
            MARKER_DATA => {
                let (len, header) = self.length(pos, marker)?;
                PlistValue::Data(self.bytes(pos + header, len, "data")?.to_vec())
            }
            MARKER_ASCII => {
                let (len, header) = self.length(pos, marker)?;
                let raw = self.bytes(pos + header, len, "string")?;
                let s = std::str::from_utf8(raw).map_err(|_| ArchiveError::InvalidString(index))?;
                PlistValue::String(s.to_string())
            }
            MARKER_UTF16 => {
                let (len, header) = self.length(pos, marker)?;
                let byte_len = len.checked_mul(2).ok_or(ArchiveError::InvalidString(index))?;
                let raw = self.bytes(pos + header, byte_len, "string")?;
                let units: Vec<u16> = raw.chunks_exact(2).map(BigEndian::read_u16).collect();
                let s = String::from_utf16(&units).map_err(|_| ArchiveError::InvalidString(index))?;
                PlistValue::String(s)
            }
            MARKER_UID => {
                let width = nibble as usize + 1;
                if width > 8 {
                    return Err(ArchiveError::UnsupportedMarker(marker));
                }
                PlistValue::Uid(self.sized(pos + 1, width, "uid")?)
            }
            MARKER_ARRAY => {
                let (len, header) = self.length(pos, marker)?;
                let refs = self.refs(pos + header, len)?;
                PlistValue::Array(self.children(index, &refs)?)
            }
            MARKER_DICT => {
                let (len, header) = self.length(pos, marker)?;
                let key_refs = self.refs(pos + header, len)?;
                let value_refs = self.refs(pos + header + len * self.trailer.ref_size, len)?;
                let keys = self.children(index, &key_refs)?;
                let values = self.children(index, &value_refs)?;

                let mut entries = Vec::with_capacity(len);
                for (key, value) in keys.into_iter().zip(values) {
                    match key {
                        PlistValue::String(k) => entries.push((k, value)),
                        _ => return Err(ArchiveError::InvalidString(index)),
                    }
                }
                PlistValue::Dictionary(entries)
            }
            _ => return Err(ArchiveError::UnsupportedMarker(marker)),
        };
        Ok(value)
    }

    fn children(&mut self, parent: usize, refs: &[usize]) -> Result<Vec<PlistValue>, ArchiveError> {
        if !self.visiting.insert(parent) {
            return Err(ArchiveError::ReferenceCycle(parent));
        }
        let values = refs
            .iter()
            .map(|&r| {
                if self.visiting.contains(&r) {
                    Err(ArchiveError::ReferenceCycle(r))
                } else {
                    self.read_object(r)
                }
            })
            .collect();
        self.visiting.remove(&parent);
        values
    }
}

/// Decode a binary property list.
pub fn read_bplist(data: &[u8]) -> Result<PlistValue, ArchiveError> {
    if data.len() < BPLIST_MAGIC.len() + TRAILER_SIZE {
        return Err(ArchiveError::Truncated(format!("{} bytes", data.len())));
    }
    if &data[..BPLIST_MAGIC.len()] != BPLIST_MAGIC {
        return Err(ArchiveError::BadMagic);
    }

    let tail = &data[data.len() - TRAILER_SIZE..];
    let trailer = Trailer {
        offset_size: tail[6] as usize,
        ref_size: tail[7] as usize,
        num_objects: BigEndian::read_u64(&tail[8..16]) as usize,
        top_object: BigEndian::read_u64(&tail[16..24]) as usize,
        offset_table_offset: BigEndian::read_u64(&tail[24..32]) as usize,
    };

    let valid_width = |w: usize| matches!(w, 1 | 2 | 4 | 8);
    if !valid_width(trailer.offset_size) || !valid_width(trailer.ref_size) {
        return Err(ArchiveError::Truncated("invalid trailer widths".into()));
    }
    let table_end = trailer
        .num_objects
        .checked_mul(trailer.offset_size)
        .and_then(|len| len.checked_add(trailer.offset_table_offset));
    if table_end.map_or(true, |end| end > data.len() - TRAILER_SIZE) {
        return Err(ArchiveError::Truncated("offset table".into()));
    }
    if trailer.top_object >= trailer.num_objects {
        return Err(ArchiveError::OffsetOutOfRange {
            index: trailer.top_object,
            offset: trailer.top_object as u64,
        });
    }

    let mut offsets = Vec::with_capacity(trailer.num_objects);
    for index in 0..trailer.num_objects {
        let at = trailer.offset_table_offset + index * trailer.offset_size;
        let offset = BigEndian::read_uint(&data[at..at + trailer.offset_size], trailer.offset_size);
        if offset < BPLIST_MAGIC.len() as u64 || offset >= trailer.offset_table_offset as u64 {
            return Err(ArchiveError::OffsetOutOfRange { index, offset });
        }
        offsets.push(offset as usize);
    }

    let mut reader = Reader {
        data,
        trailer,
        offsets,
        visiting: HashSet::new(),
    };
    reader.read_object(trailer.top_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn trailer_of(data: &[u8]) -> &[u8] {
        &data[data.len() - TRAILER_SIZE..]
    }

    #[test]
    fn test_magic_and_trailer() {
        let data = write_bplist(&PlistValue::Boolean(true)).unwrap();
        assert_eq!(&data[..8], b"bplist00");
        assert_eq!(data[8], MARKER_TRUE);

        let trailer = trailer_of(&data);
        assert_eq!(&trailer[..6], &[0; 6]);
        assert_eq!(trailer[6], 1, "offset size");
        assert_eq!(trailer[7], 1, "ref size");
        assert_eq!(BigEndian::read_u64(&trailer[8..16]), 1);
        assert_eq!(BigEndian::read_u64(&trailer[16..24]), 0);
        assert_eq!(BigEndian::read_u64(&trailer[24..32]), 9);
        assert_eq!(data.len(), 8 + 1 + 1 + TRAILER_SIZE);
    }

    #[test]
    fn test_integer_widths() {
        let cases: [(i64, &[u8]); 5] = [
            (5, &[0x10, 5]),
            (300, &[0x11, 0x01, 0x2C]),
            (100_000, &[0x12, 0x00, 0x01, 0x86, 0xA0]),
            (1 << 40, &[0x13, 0, 0, 1, 0, 0, 0, 0, 0]),
            (-1, &[0x13, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]),
        ];
        for (value, expected) in cases {
            let data = write_bplist(&PlistValue::Integer(value)).unwrap();
            assert_eq!(&data[8..8 + expected.len()], expected, "value {}", value);
            assert_eq!(read_bplist(&data).unwrap(), PlistValue::Integer(value));
        }
    }

    #[test]
    fn test_uid_and_real_markers() {
        let data = write_bplist(&PlistValue::Uid(4)).unwrap();
        assert_eq!(&data[8..10], &[0x80, 4]);

        let data = write_bplist(&PlistValue::Uid(0x1234)).unwrap();
        assert_eq!(&data[8..11], &[0x81, 0x12, 0x34]);

        let data = write_bplist(&PlistValue::Real(0.5)).unwrap();
        assert_eq!(data[8], 0x23);
        assert_eq!(BigEndian::read_f64(&data[9..17]), 0.5);
    }

    #[test]
    fn test_long_string_uses_length_record() {
        let text = "a".repeat(20);
        let data = write_bplist(&PlistValue::String(text.clone())).unwrap();
        assert_eq!(&data[8..11], &[0x5F, 0x10, 20]);
        assert_eq!(read_bplist(&data).unwrap(), PlistValue::String(text));
    }

    #[test]
    fn test_non_ascii_string_is_utf16() {
        let data = write_bplist(&PlistValue::String("Pinceau é".into())).unwrap();
        assert_eq!(data[8], 0x69);
        assert_eq!(
            read_bplist(&data).unwrap(),
            PlistValue::String("Pinceau é".into())
        );
    }

    #[test]
    fn test_dictionary_keys_sorted_and_scalars_shared() {
        let value = PlistValue::Dictionary(vec![
            ("b".into(), PlistValue::Real(1.0)),
            ("a".into(), PlistValue::Real(1.0)),
            ("c".into(), PlistValue::String("a".into())),
        ]);
        let data = write_bplist(&value).unwrap();

        // dict, keys a b c, one shared 1.0 (the string "a" is shared with key "a")
        let trailer = trailer_of(&data);
        assert_eq!(BigEndian::read_u64(&trailer[8..16]), 5);

        let decoded = read_bplist(&data).unwrap();
        assert_eq!(
            decoded,
            PlistValue::Dictionary(vec![
                ("a".into(), PlistValue::Real(1.0)),
                ("b".into(), PlistValue::Real(1.0)),
                ("c".into(), PlistValue::String("a".into())),
            ])
        );
    }

    #[test]
    fn test_nested_containers() {
        let value = PlistValue::Dictionary(vec![
            ("list".into(), PlistValue::Array(vec![
                PlistValue::Integer(1),
                PlistValue::Data(vec![0xDE, 0xAD]),
                PlistValue::Boolean(false),
            ])),
            ("inner".into(), PlistValue::Dictionary(vec![("root".into(), PlistValue::Uid(1))])),
        ]);
        let decoded = read_bplist(&write_bplist(&value).unwrap()).unwrap();
        assert_eq!(decoded.get("inner").and_then(|d| d.get("root")), Some(&PlistValue::Uid(1)));
        assert_eq!(
            decoded.get("list"),
            Some(&PlistValue::Array(vec![
                PlistValue::Integer(1),
                PlistValue::Data(vec![0xDE, 0xAD]),
                PlistValue::Boolean(false),
            ]))
        );
    }

    #[test]
    fn test_many_objects_widen_references() {
        let items: Vec<PlistValue> = (0..300).map(PlistValue::Integer).collect();
        let data = write_bplist(&PlistValue::Array(items.clone())).unwrap();
        assert_eq!(trailer_of(&data)[7], 2);
        assert_eq!(read_bplist(&data).unwrap(), PlistValue::Array(items));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(read_bplist(b"short"), Err(ArchiveError::Truncated(_))));

        let mut data = write_bplist(&PlistValue::Integer(1)).unwrap();
        data[0] = b'x';
        assert!(matches!(read_bplist(&data), Err(ArchiveError::BadMagic)));

        let mut data = write_bplist(&PlistValue::Integer(1)).unwrap();
        let len = data.len();
        data[len - 1] = 0xFF;
        assert!(read_bplist(&data).is_err());
    }

    #[test]
    fn test_unsupported_marker() {
        let mut data = write_bplist(&PlistValue::Integer(1)).unwrap();
        data[8] = 0x33; // date
        assert!(matches!(read_bplist(&data), Err(ArchiveError::UnsupportedMarker(0x33))));
    }
}
