//! Test harness: generate packages into a scratch directory and read them back.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use brushcade_backend_archive::{decode_archive, KeyedArchive};
use brushcade_backend_texture::{decode_png, DecodedPng};
use brushcade_cli::commands::generate::generate_brush;
use brushcade_cli::input::{parse_spec, SpecSource};
use brushcade_cli::package::{PackageSummary, ENTRY_ARCHIVE};
use tempfile::TempDir;

/// Scratch directory for one test.
pub struct TestHarness {
    pub work_dir: TempDir,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Write a spec file and return its path.
    pub fn write_spec(&self, file_name: &str, json: &str) -> PathBuf {
        let path = self.path().join(file_name);
        fs::write(&path, json).expect("Failed to write spec");
        path
    }

    /// Run the full pipeline for `json`, writing `<file_name>` in the work dir.
    pub fn generate(&self, json: &str, file_name: &str) -> (PathBuf, PackageSummary) {
        let loaded = parse_spec(json, SpecSource::Stdin).expect("spec should parse");
        let path = self.path().join(file_name);
        let summary = generate_brush(&loaded.spec, path.to_str())
            .unwrap_or_else(|e| panic!("generation failed: {}", e));
        (path, summary)
    }
}

/// Entries of a `.brush` container, in stored order.
#[derive(Debug)]
pub struct PackageContents {
    pub names: Vec<String>,
    pub entries: BTreeMap<String, Vec<u8>>,
}

impl PackageContents {
    /// Open and fully read a package.
    pub fn open(path: &Path) -> Self {
        let file = File::open(path).expect("Failed to open package");
        let mut zip = zip::ZipArchive::new(file).expect("package should be a zip");

        let mut names = Vec::new();
        let mut entries = BTreeMap::new();
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i).expect("Failed to read entry");
            let mut data = Vec::new();
            entry.read_to_end(&mut data).expect("Failed to inflate entry");
            names.push(entry.name().to_string());
            entries.insert(entry.name().to_string(), data);
        }
        Self { names, entries }
    }

    pub fn entry(&self, name: &str) -> &[u8] {
        self.entries
            .get(name)
            .unwrap_or_else(|| panic!("package has no entry {}", name))
    }

    pub fn png(&self, name: &str) -> DecodedPng {
        decode_png(self.entry(name)).expect("entry should be a PNG")
    }

    pub fn archive(&self) -> KeyedArchive {
        decode_archive(self.entry(ENTRY_ARCHIVE)).expect("archive should decode")
    }
}
