//! CLI command implementations

pub mod generate;
pub mod json_output;
pub mod validate;
