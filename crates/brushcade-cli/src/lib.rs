//! Brushcade CLI library.
//!
//! Input loading, the spec-to-package pipeline, zip packaging, and the
//! `generate` and `validate` commands behind the `brushcade` binary.

pub mod commands;
pub mod input;
pub mod package;
pub mod pipeline;
