//! SWC/deno_ast TypeScript parsing utilities
//!
//! Wraps `deno_ast` so the rest of the crate can ask for the module AST,
//! the exact source text behind a span, and the JSDoc comment leading a
//! node.

use crate::diagnostics::{AnalyzeError, AnalyzeResult};
use crate::js_doc::DocComment;
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::comments::{Comment, CommentKind};
use deno_ast::swc::common::{BytePos, Span};
use deno_ast::{MediaType, ParseParams, ParsedSource, SourcePos, SourceTextInfo, StartSourcePos};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Information about the source file
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// The file path
    pub path: PathBuf,
    /// The source text
    pub text: Arc<str>,
    /// Source text info for location lookups
    pub text_info: SourceTextInfo,
}

impl SourceInfo {
    /// Create source info from a file path and content
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let text_info = SourceTextInfo::new(text.clone());
        Self {
            path: path.into(),
            text,
            text_info,
        }
    }

    /// 1-indexed line and 0-indexed column of a position
    pub fn line_col(&self, pos: BytePos) -> (usize, usize) {
        let source_pos = SourcePos::unsafely_from_byte_pos(pos);
        let line_and_col = self.text_info.line_and_column_index(source_pos);
        (line_and_col.line_index + 1, line_and_col.column_index)
    }

    /// Extract source text for a span
    pub fn text_for_span(&self, span: Span) -> &str {
        let start = byte_index(span.lo);
        let end = byte_index(span.hi).min(self.text.len());
        self.text.get(start..end).unwrap_or("")
    }
}

/// SWC positions are offset by deno_ast's start position
fn byte_index(pos: BytePos) -> usize {
    SourcePos::unsafely_from_byte_pos(pos).as_byte_index(StartSourcePos::START_SOURCE_POS)
}

/// A parsed TypeScript module with source information
#[derive(Debug)]
pub struct ParsedModule {
    /// The parsed source from deno_ast
    pub source: ParsedSource,
    /// Source information for text lookups
    pub source_info: SourceInfo,
}

impl ParsedModule {
    /// Get the module AST
    pub fn module(&self) -> Option<&swc_ast::Module> {
        match self.source.program_ref() {
            deno_ast::ProgramRef::Module(m) => Some(m),
            deno_ast::ProgramRef::Script(_) => None,
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.source_info.path
    }

    /// Extract source text for a span
    pub fn text_for_span(&self, span: Span) -> &str {
        self.source_info.text_for_span(span)
    }

    /// True if the file has any import or export, i.e. it is an ES module
    /// rather than a global script
    pub fn is_es_module(&self) -> bool {
        self.module()
            .map(|m| {
                m.body
                    .iter()
                    .any(|item| matches!(item, swc_ast::ModuleItem::ModuleDecl(_)))
            })
            .unwrap_or(false)
    }

    /// True for `.d.ts` style declaration files
    pub fn is_declaration_file(&self) -> bool {
        is_declaration_file(self.path())
    }

    /// Get leading comments for a position
    pub fn leading_comments(&self, pos: BytePos) -> Vec<Comment> {
        let source_pos = SourcePos::unsafely_from_byte_pos(pos);
        self.source
            .comments()
            .get_leading(source_pos)
            .map(|v| v.to_vec())
            .unwrap_or_default()
    }

    /// Get JSDoc comment text for a span (the last leading `/** */` block)
    pub fn jsdoc_for_span(&self, span: Span) -> Option<String> {
        self.jsdoc_at(span.lo)
    }

    /// JSDoc comment text leading a position
    pub fn jsdoc_at(&self, pos: BytePos) -> Option<String> {
        self.leading_comments(pos)
            .iter()
            .rev()
            .find(|c| c.kind == CommentKind::Block && c.text.starts_with('*'))
            .map(|c| c.text.to_string())
    }

    /// Parsed doc comment for a span, empty when there is none
    pub fn doc_for_span(&self, span: Span) -> DocComment {
        self.doc_at(span.lo)
    }

    /// Parsed doc comment leading a position
    pub fn doc_at(&self, pos: BytePos) -> DocComment {
        self.jsdoc_at(pos)
            .map(|text| DocComment::parse(&text))
            .unwrap_or_default()
    }
}

/// Parse a TypeScript file from disk
pub fn parse_typescript_file(path: impl AsRef<Path>) -> AnalyzeResult<ParsedModule> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AnalyzeError::FileNotFound(path.to_path_buf()),
        _ => AnalyzeError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        )),
    })?;

    parse_typescript_source(path, text)
}

/// Parse TypeScript source code from a string
pub fn parse_typescript_source(
    path: impl AsRef<Path>,
    source: impl Into<Arc<str>>,
) -> AnalyzeResult<ParsedModule> {
    let path = path.as_ref();
    let source: Arc<str> = source.into();

    let media_type = MediaType::from_path(path);
    let specifier = deno_ast::ModuleSpecifier::from_file_path(path)
        .map_err(|_| AnalyzeError::InvalidPath(path.display().to_string()))?;

    let parsed = deno_ast::parse_module(ParseParams {
        specifier,
        text: source.clone(),
        media_type,
        capture_tokens: true,
        scope_analysis: false,
        maybe_syntax: None,
    })
    .map_err(|e| AnalyzeError::parse(path, e.to_string()))?;

    Ok(ParsedModule {
        source: parsed,
        source_info: SourceInfo::new(path, source),
    })
}

/// Convert an SWC string literal to a `String`
pub fn str_value(s: &swc_ast::Str) -> String {
    String::from_utf8_lossy(s.value.as_bytes()).into_owned()
}

/// Name of an import/export binding
pub fn module_export_name(name: &swc_ast::ModuleExportName) -> String {
    match name {
        swc_ast::ModuleExportName::Ident(i) => i.sym.to_string(),
        swc_ast::ModuleExportName::Str(s) => str_value(s),
    }
}

/// Get the name of a class or object property key
pub fn prop_name_str(name: &swc_ast::PropName) -> Option<String> {
    match name {
        swc_ast::PropName::Ident(i) => Some(i.sym.to_string()),
        swc_ast::PropName::Str(s) => Some(str_value(s)),
        swc_ast::PropName::Num(n) => Some(format_number(n.value)),
        swc_ast::PropName::BigInt(b) => Some(b.value.to_string()),
        swc_ast::PropName::Computed(_) => None,
    }
}

/// Get the name of a type member key (`foo`, `"foo"`, `1`)
pub fn expr_key_name(expr: &swc_ast::Expr) -> Option<String> {
    match expr {
        swc_ast::Expr::Ident(i) => Some(i.sym.to_string()),
        swc_ast::Expr::Lit(swc_ast::Lit::Str(s)) => Some(str_value(s)),
        swc_ast::Expr::Lit(swc_ast::Lit::Num(n)) => Some(format_number(n.value)),
        _ => None,
    }
}

/// Render a number the way JavaScript's `String(n)` does
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value.abs() >= 1e21 || value.abs() < 1e-6 {
        let text = format!("{:e}", value);
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        }
    } else {
        format!("{}", value)
    }
}

/// Check if a file is a TypeScript declaration file (.d.ts)
pub fn is_declaration_file(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(".d.ts"))
        .unwrap_or(false)
}

/// Check if a file is a TypeScript file (.ts or .tsx)
pub fn is_typescript_file(path: impl AsRef<Path>) -> bool {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    matches!(ext, "ts" | "tsx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typescript_source() {
        let source = r#"
            export async function readTextFile(path: string): Promise<string> {
                return "";
            }
        "#;

        // deno_ast requires absolute paths for file specifiers
        let parsed = parse_typescript_source("/tmp/test.ts", source).unwrap();
        assert!(!parsed.module().unwrap().body.is_empty());
        assert!(parsed.is_es_module());
    }

    #[test]
    fn test_global_script_is_not_es_module() {
        let parsed =
            parse_typescript_source("/tmp/globals.d.ts", "declare const VERSION: string;").unwrap();
        assert!(!parsed.is_es_module());
        assert!(parsed.is_declaration_file());
    }

    #[test]
    fn test_text_for_span_is_exact() {
        let source = "export const PI = 3.14159;\n";
        let parsed = parse_typescript_source("/tmp/pi.ts", source).unwrap();
        let module = parsed.module().unwrap();
        let swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::ExportDecl(export)) =
            &module.body[0]
        else {
            panic!("expected export declaration");
        };
        let swc_ast::Decl::Var(var) = &export.decl else {
            panic!("expected variable statement");
        };
        let init = var.decls[0].init.as_ref().unwrap();
        use deno_ast::swc::common::Spanned;
        assert_eq!(parsed.text_for_span(init.span()), "3.14159");
    }

    #[test]
    fn test_jsdoc_extraction() {
        let source = r#"
/**
 * This is a JSDoc comment
 * @param x - The input
 */
export function test(x: number): void {}
"#;

        let parsed = parse_typescript_source("/tmp/test.ts", source).unwrap();
        let module = parsed.module().unwrap();

        if let Some(swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::ExportDecl(export))) =
            module.body.first()
        {
            let doc = parsed.doc_for_span(export.span);
            assert_eq!(doc.text(), "This is a JSDoc comment");
            assert_eq!(doc.param("x"), Some("The input"));
        } else {
            panic!("expected export declaration");
        }
    }

    #[test]
    fn test_missing_file_is_reported_by_path() {
        let err = parse_typescript_file("/virtual/does/not/exist.ts").unwrap_err();
        assert!(matches!(err, AnalyzeError::FileNotFound(ref path) if path.ends_with("exist.ts")));
        assert_eq!(err.to_string(), "File not found: /virtual/does/not/exist.ts");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(3.14159), "3.14159");
        assert_eq!(format_number(-1.0), "-1");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e300), "1.5e+300");
        assert_eq!(format_number(0.0000001), "1e-7");
        assert_eq!(format_number(-2.5e-8), "-2.5e-8");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_file_kinds() {
        assert!(is_declaration_file("foo.d.ts"));
        assert!(!is_declaration_file("foo.ts"));
        assert!(is_typescript_file("foo.tsx"));
        assert!(!is_typescript_file("foo.js"));
    }
}
