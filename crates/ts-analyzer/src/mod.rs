//! ts-analyzer: API documentation model for TypeScript packages
//!
//! This crate turns a TypeScript package into one cross-linked JSON
//! document describing its public surface by:
//! - Parsing every source file under the package with deno_ast/SWC
//! - Binding and type checking enough of the program to resolve exported
//!   symbols to types
//! - Classifying exports as components, types, classes, functions or
//!   variables and serializing their types into [`TypeBound`] trees
//! - Linking re-exports and named type references back to the
//!   declarations they point at
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐
//! │ package.json    │    │ src/**/*.ts(x)   │
//! │ tsconfig.json   │    │ (SWC parse)      │
//! └────────┬────────┘    └────────┬─────────┘
//!          │                      ▼
//!          │              ┌──────────────┐
//!          │              │   Checker    │
//!          │              └──────┬───────┘
//!          │                     ▼
//!          │              ┌──────────────┐
//!          │              │  Extractor   │──── TypeSerializer
//!          │              └──────┬───────┘
//!          │                     ▼
//!          │              ┌──────────────┐
//!          │              │   Resolver   │
//!          │              └──────┬───────┘
//!          └──────────┬──────────┘
//!                     ▼
//!              ┌──────────────┐
//!              │   Package    │
//!              └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use ts_analyzer::AnalyzeOptions;
//!
//! let package = AnalyzeOptions::new()
//!     .source_root("src")
//!     .analyze("path/to/package")
//!     .expect("Failed to analyze package");
//! println!("{}", serde_json::to_string_pretty(&package).unwrap());
//! ```

// Core types
pub mod js_doc;
pub mod node;
pub mod types;

// Type checking
pub mod checker;
pub mod embed;

// Analysis passes
pub mod extractor;
pub mod package;
pub mod resolver;
pub mod serializer;

// Parsing and utilities
pub mod diagnostics;
pub mod test;
pub mod utils;

// Re-exports for convenience
pub use diagnostics::{AnalyzeError, AnalyzeResult};
pub use js_doc::{DocComment, DocTag};
pub use node::{
    BaseDeclaration, ClassDeclaration, ComponentDeclaration, ConstructorEntry, Declaration,
    DeclarationKind, ExportedIn, FunctionDeclaration, Module, Package, Reexport, TypeDeclaration,
    VariableDeclaration,
};
pub use types::{DocEntry, FunctionDocEntry, IndexBound, TypeBound, TypeProperty};

// Analysis API
pub use extractor::{Extractor, StarExport};
pub use package::{analyze, analyze_modules, analyze_package, AnalyzeOptions};
pub use serializer::TypeSerializer;

// Parsing
pub use utils::{output_path, parse_typescript_file, parse_typescript_source, ParsedModule};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
