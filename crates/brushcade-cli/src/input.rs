//! Spec loading from a file or standard input.

use std::io::Read;
use std::path::{Path, PathBuf};

use brushcade_spec::BrushSpec;

/// Source name that selects standard input.
pub const STDIN_SOURCE: &str = "-";

/// Where a spec was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    File(PathBuf),
    Stdin,
}

impl SpecSource {
    /// `-` selects stdin; anything else is a path.
    pub fn parse(source: &str) -> Self {
        if source == STDIN_SOURCE {
            SpecSource::Stdin
        } else {
            SpecSource::File(PathBuf::from(source))
        }
    }

    /// Name for messages and reports.
    pub fn display_name(&self) -> String {
        match self {
            SpecSource::File(path) => path.display().to_string(),
            SpecSource::Stdin => "<stdin>".to_string(),
        }
    }
}

/// A parsed spec with its provenance.
#[derive(Debug)]
pub struct LoadResult {
    pub spec: BrushSpec,
    pub source: SpecSource,
    /// BLAKE3 hash of the raw input text (hex string).
    pub source_hash: String,
}

/// Errors that can occur during spec loading.
#[derive(Debug)]
pub enum InputError {
    /// File could not be read.
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Standard input could not be read.
    StdinRead { source: std::io::Error },

    /// JSON parsing failed.
    JsonParse { message: String },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::FileRead { path, source } => {
                write!(f, "failed to read file '{}': {}", path.display(), source)
            }
            InputError::StdinRead { source } => write!(f, "failed to read stdin: {}", source),
            InputError::JsonParse { message } => write!(f, "JSON parse error: {}", message),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::FileRead { source, .. } | InputError::StdinRead { source } => Some(source),
            InputError::JsonParse { .. } => None,
        }
    }
}

impl InputError {
    /// Stable code for JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            InputError::FileRead { .. } | InputError::StdinRead { .. } => "CLI_001",
            InputError::JsonParse { .. } => "CLI_002",
        }
    }
}

/// Load a spec from a path, or from stdin when `source` is `-`.
///
/// # Example
/// ```no_run
/// use brushcade_cli::input::load_spec;
///
/// let result = load_spec("soft_round.json").unwrap();
/// println!("loaded '{}'", result.spec.name);
/// ```
pub fn load_spec(source: &str) -> Result<LoadResult, InputError> {
    match SpecSource::parse(source) {
        SpecSource::File(path) => load_spec_file(&path),
        SpecSource::Stdin => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .map_err(|source| InputError::StdinRead { source })?;
            parse_spec(&content, SpecSource::Stdin)
        }
    }
}

/// Load a spec from a JSON file.
pub fn load_spec_file(path: &Path) -> Result<LoadResult, InputError> {
    let content = std::fs::read_to_string(path).map_err(|e| InputError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_spec(&content, SpecSource::File(path.to_path_buf()))
}

/// Parse spec text that came from `source`.
pub fn parse_spec(content: &str, source: SpecSource) -> Result<LoadResult, InputError> {
    let source_hash = blake3::hash(content.as_bytes()).to_hex().to_string();
    let spec = BrushSpec::from_json(content).map_err(|e| InputError::JsonParse {
        message: e.to_string(),
    })?;
    log::debug!("loaded spec '{}' from {}", spec.name, source.display_name());

    Ok(LoadResult {
        spec,
        source,
        source_hash,
    })
}
