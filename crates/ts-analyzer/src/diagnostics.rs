//! Error types for the analyzer
//!
//! Only failures that abort a whole run are modelled here. Declarations,
//! properties or types that cannot be resolved are skipped where they are
//! encountered and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for analyzer operations
pub type AnalyzeResult<T> = Result<T, AnalyzeError>;

/// Main error type for the analyzer
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TypeScript parse error
    #[error("TypeScript parse error in {file}: {message}")]
    TypeScriptParse { file: PathBuf, message: String },

    /// Package configuration error
    #[error("{0}")]
    Config(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyzeError {
    /// Create a parse error
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AnalyzeError::TypeScriptParse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        AnalyzeError::Config(message.into())
    }

    /// True for errors caused by the package descriptors rather than IO or parsing
    pub fn is_config(&self) -> bool {
        matches!(self, AnalyzeError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_mentions_file() {
        let err = AnalyzeError::parse("src/index.ts", "unexpected token");
        assert!(err.to_string().contains("src/index.ts"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_config_error_message_is_verbatim() {
        let err = AnalyzeError::config("The tsconfig.json must specify an outDir");
        assert!(err.is_config());
        assert_eq!(err.to_string(), "The tsconfig.json must specify an outDir");
    }
}
