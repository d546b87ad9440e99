//! Utilities for the analyzer
//!
//! - SWC/deno_ast TypeScript parsing
//! - Source path to module key mapping

pub mod paths;
pub mod swc;

pub use paths::output_path;
pub use swc::{parse_typescript_file, parse_typescript_source, ParsedModule, SourceInfo};
