//! Brushcade End-to-End Test Infrastructure
//!
//! Integration tests for the full flow: spec -> rasters + archive -> `.brush`
//! container, then back out again for inspection.
//!
//! ```bash
//! cargo test -p brushcade-tests
//! ```

pub mod determinism;
pub mod harness;

pub use determinism::{compute_hash, verify_determinism, DeterminismResult, DiffInfo};
pub use harness::{PackageContents, TestHarness};
