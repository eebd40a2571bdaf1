//! Brush package assembly.
//!
//! A `.brush` file is a zip container with four fixed entries. The consuming
//! application looks them up by exact path.

use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Entry holding the keyed parameter archive.
pub const ENTRY_ARCHIVE: &str = "Brush.archive";
/// Entry holding the shape stamp.
pub const ENTRY_SHAPE: &str = "Shape.png";
/// Entry holding the grain texture.
pub const ENTRY_GRAIN: &str = "Grain.png";
/// Entry holding the library preview.
pub const ENTRY_THUMBNAIL: &str = "QuickLook/Thumbnail.png";

/// Entry names in container order.
pub const PACKAGE_ENTRIES: [&str; 4] = [ENTRY_ARCHIVE, ENTRY_SHAPE, ENTRY_GRAIN, ENTRY_THUMBNAIL];

/// Errors from writing a package.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to move package into place at '{path}': {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The four encoded payloads of a brush.
#[derive(Debug, Clone)]
pub struct BrushPackage {
    pub archive: Vec<u8>,
    pub shape: Vec<u8>,
    pub grain: Vec<u8>,
    pub thumbnail: Vec<u8>,
}

impl BrushPackage {
    /// Payloads paired with their entry names, in container order.
    pub fn entries(&self) -> [(&'static str, &[u8]); 4] {
        [
            (ENTRY_ARCHIVE, self.archive.as_slice()),
            (ENTRY_SHAPE, self.shape.as_slice()),
            (ENTRY_GRAIN, self.grain.as_slice()),
            (ENTRY_THUMBNAIL, self.thumbnail.as_slice()),
        ]
    }
}

/// Size and hash of one container entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntrySummary {
    pub name: String,
    pub size: u64,
    /// BLAKE3 hash of the uncompressed payload.
    pub hash: String,
}

/// What was written and where.
#[derive(Debug, Clone, Serialize)]
pub struct PackageSummary {
    pub path: PathBuf,
    /// Size of the container file.
    pub size: u64,
    pub entries: Vec<EntrySummary>,
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

/// Write the container to any seekable writer.
pub fn write_package_to_writer<W: Write + Seek>(
    package: &BrushPackage,
    writer: W,
) -> Result<W, PackageError> {
    let mut zip = ZipWriter::new(writer);
    for (name, data) in package.entries() {
        zip.start_file(name, entry_options())?;
        zip.write_all(data)?;
    }
    Ok(zip.finish()?)
}

/// Write the container to `path` atomically.
///
/// The bytes go to a temporary file in the destination directory, which is
/// renamed over `path` only once fully written. On any failure the temporary
/// file is removed and `path` is left untouched.
pub fn write_brush_package(package: &BrushPackage, path: &Path) -> Result<PackageSummary, PackageError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    write_package_to_writer(package, temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    let file = temp.persist(path).map_err(|e| PackageError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    let size = file.metadata()?.len();

    let entries = package
        .entries()
        .iter()
        .map(|(name, data)| EntrySummary {
            name: name.to_string(),
            size: data.len() as u64,
            hash: blake3::hash(data).to_hex().to_string(),
        })
        .collect();

    log::info!("wrote {} ({} bytes)", path.display(), size);
    Ok(PackageSummary {
        path: path.to_path_buf(),
        size,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn package() -> BrushPackage {
        BrushPackage {
            archive: b"bplist00 archive".to_vec(),
            shape: vec![1; 64],
            grain: vec![2; 128],
            thumbnail: vec![3; 32],
        }
    }

    #[test]
    fn test_entries_in_order() {
        let cursor = write_package_to_writer(&package(), Cursor::new(Vec::new())).unwrap();
        let mut zip = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();

        assert_eq!(zip.len(), 4);
        for (i, expected) in PACKAGE_ENTRIES.iter().enumerate() {
            let entry = zip.by_index(i).unwrap();
            assert_eq!(entry.name(), *expected);
            assert_eq!(entry.compression(), CompressionMethod::Deflated);
        }

        let mut grain = Vec::new();
        zip.by_name(ENTRY_GRAIN).unwrap().read_to_end(&mut grain).unwrap();
        assert_eq!(grain, vec![2; 128]);
    }

    #[test]
    fn test_container_is_deterministic() {
        let a = write_package_to_writer(&package(), Cursor::new(Vec::new())).unwrap();
        let b = write_package_to_writer(&package(), Cursor::new(Vec::new())).unwrap();
        assert_eq!(a.into_inner(), b.into_inner());
    }

    #[test]
    fn test_write_creates_directories_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ink.brush");

        let summary = write_brush_package(&package(), &path).unwrap();
        assert!(path.exists());
        assert_eq!(summary.size, fs::metadata(&path).unwrap().len());
        assert_eq!(summary.entries.len(), 4);
        assert_eq!(summary.entries[3].name, ENTRY_THUMBNAIL);
        assert_eq!(summary.entries[1].size, 64);

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path() != path)
            .collect();
        assert!(leftovers.is_empty(), "temporary files left behind");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ink.brush");
        fs::write(&path, b"old").unwrap();

        write_brush_package(&package(), &path).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_failed_write_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        // a directory already occupies the target path, so the rename fails
        let path = dir.path().join("taken.brush");
        fs::create_dir(&path).unwrap();

        let err = write_brush_package(&package(), &path).unwrap_err();
        assert!(matches!(err, PackageError::Persist { .. }));

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("taken.brush")]);
    }
}
