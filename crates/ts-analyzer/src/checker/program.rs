//! The closed set of files one analysis runs over
//!
//! A [`Program`] owns the parsed root files, the embedded ambient typings,
//! and every file reachable from the roots through relative imports. Module
//! specifiers are resolved once, up front.

use crate::embed;
use crate::utils::paths::{dirname, join, normalize};
use crate::utils::swc::{parse_typescript_file, parse_typescript_source, str_value};
use crate::utils::ParsedModule;
use deno_ast::swc::ast as swc_ast;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Index of a file in a [`Program`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) u32);

/// A file of the program
#[derive(Debug)]
pub struct SourceFile {
    pub parsed: ParsedModule,
    /// Normalized slash path
    pub path: String,
    /// Whether the file was handed in for analysis
    pub root: bool,
}

/// Result of resolving a module specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleTarget {
    File(FileId),
    /// Bare specifier with no typings available
    External,
}

const PROBE_SUFFIXES: [&str; 6] = [
    ".ts",
    ".tsx",
    ".d.ts",
    "/index.ts",
    "/index.tsx",
    "/index.d.ts",
];

/// Parsed files plus module resolution
#[derive(Debug, Default)]
pub struct Program {
    files: Vec<SourceFile>,
    by_path: HashMap<String, FileId>,
    resolutions: HashMap<(FileId, String), ModuleTarget>,
}

impl Program {
    /// Build a program from parsed root files
    ///
    /// Relative imports that leave the root set are loaded from disk. Those
    /// files only feed type resolution; failing to read or parse one is
    /// not an error.
    pub fn new(roots: Vec<ParsedModule>) -> Self {
        let mut program = Program::default();

        for typings in embed::all_typings() {
            match parse_typescript_source(typings.path, typings.source) {
                Ok(parsed) => {
                    program.add(parsed, false);
                }
                Err(e) => warn!("embedded typings {} failed to parse: {}", typings.path, e),
            }
        }
        for parsed in roots {
            program.add(parsed, true);
        }

        let mut queue: Vec<FileId> = (0..program.files.len() as u32).map(FileId).collect();
        while let Some(file) = queue.pop() {
            for specifier in module_specifiers(&program.files[file.0 as usize].parsed) {
                if program.resolutions.contains_key(&(file, specifier.clone())) {
                    continue;
                }
                if let Some(target) = program.locate(file, &specifier, &mut queue) {
                    trace!("resolved {} from {:?} to {:?}", specifier, file, target);
                    program.resolutions.insert((file, specifier), target);
                }
            }
        }

        debug!(
            "program loaded {} files ({} roots)",
            program.files.len(),
            program.root_files().count()
        );
        program
    }

    fn add(&mut self, parsed: ParsedModule, root: bool) -> FileId {
        let path = normalize(parsed.path());
        if let Some(existing) = self.by_path.get(&path) {
            if root {
                self.files[existing.0 as usize].root = true;
            }
            return *existing;
        }
        let id = FileId(self.files.len() as u32);
        self.by_path.insert(path.clone(), id);
        self.files.push(SourceFile { parsed, path, root });
        id
    }

    fn locate(
        &mut self,
        from: FileId,
        specifier: &str,
        queue: &mut Vec<FileId>,
    ) -> Option<ModuleTarget> {
        if !is_relative(specifier) {
            return Some(
                embed::typings_for_module(specifier)
                    .and_then(|t| self.by_path.get(t.path).copied())
                    .map(ModuleTarget::File)
                    .unwrap_or(ModuleTarget::External),
            );
        }

        for candidate in candidates(&self.files[from.0 as usize].path, specifier) {
            if let Some(id) = self.by_path.get(&candidate) {
                return Some(ModuleTarget::File(*id));
            }
            if !Path::new(&candidate).is_file() {
                continue;
            }
            match parse_typescript_file(&candidate) {
                Ok(parsed) => {
                    let id = self.add(parsed, false);
                    queue.push(id);
                    return Some(ModuleTarget::File(id));
                }
                Err(e) => debug!("skipping {}: {}", candidate, e),
            }
        }
        None
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0 as usize]
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, f)| (FileId(i as u32), f))
    }

    /// Files handed in for analysis, in the order given
    pub fn root_files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files().filter(|(_, f)| f.root)
    }

    pub fn file_by_path(&self, path: &str) -> Option<FileId> {
        self.by_path.get(&normalize(path)).copied()
    }

    /// Where `specifier`, written in `from`, points
    pub fn resolve_module(&self, from: FileId, specifier: &str) -> Option<ModuleTarget> {
        self.resolutions.get(&(from, specifier.to_string())).copied()
    }
}

/// True for `./x` and `../x`
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".."
}

/// Paths a relative specifier may refer to, in probe order
fn candidates(from_path: &str, specifier: &str) -> Vec<String> {
    let base = join(&dirname(from_path), specifier);
    let stem = base
        .strip_suffix(".js")
        .or_else(|| base.strip_suffix(".jsx"))
        .unwrap_or(&base)
        .to_string();

    let mut out = Vec::new();
    if base.ends_with(".ts") || base.ends_with(".tsx") {
        out.push(base.clone());
    }
    out.extend(PROBE_SUFFIXES.iter().map(|suffix| format!("{}{}", stem, suffix)));
    out
}

/// Module specifiers of imports and re-exports, in source order
fn module_specifiers(parsed: &ParsedModule) -> Vec<String> {
    let Some(module) = parsed.module() else {
        return Vec::new();
    };

    module
        .body
        .iter()
        .filter_map(|item| match item {
            swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::Import(import)) => {
                Some(str_value(&import.src))
            }
            swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::ExportNamed(export)) => {
                export.src.as_deref().map(str_value)
            }
            swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::ExportAll(export)) => {
                Some(str_value(&export.src))
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(path: &str, source: &str) -> ParsedModule {
        parse_typescript_source(path, source).unwrap()
    }

    #[test]
    fn test_candidates() {
        let probes = candidates("/pkg/src/a.ts", "./b.js");
        assert_eq!(probes[0], "/pkg/src/b.ts");
        assert!(probes.contains(&"/pkg/src/b/index.tsx".to_string()));

        let probes = candidates("/pkg/src/a.ts", "../lib/c.tsx");
        assert_eq!(probes[0], "/pkg/lib/c.tsx");
    }

    #[test]
    fn test_resolves_in_memory_files() {
        let program = Program::new(vec![
            parse("/virtual/src/a.ts", "export * from './b'"),
            parse("/virtual/src/b.tsx", "export const B = 1"),
        ]);
        let a = program.file_by_path("/virtual/src/a.ts").unwrap();
        let b = program.file_by_path("/virtual/src/b.tsx").unwrap();
        assert_eq!(program.resolve_module(a, "./b"), Some(ModuleTarget::File(b)));
        assert_eq!(program.root_files().count(), 2);
    }

    #[test]
    fn test_bare_specifiers() {
        let program = Program::new(vec![parse(
            "/virtual/src/a.ts",
            "import * as React from 'react'\nimport {x} from 'left-pad'",
        )]);
        let a = program.file_by_path("/virtual/src/a.ts").unwrap();
        let Some(ModuleTarget::File(react)) = program.resolve_module(a, "react") else {
            panic!("react typings should resolve");
        };
        assert!(program.file(react).path.ends_with("@types/react/index.d.ts"));
        assert_eq!(
            program.resolve_module(a, "left-pad"),
            Some(ModuleTarget::External)
        );
    }

    #[test]
    fn test_missing_relative_module_is_unresolved() {
        let program = Program::new(vec![parse("/virtual/src/a.ts", "export {X} from './gone'")]);
        let a = program.file_by_path("/virtual/src/a.ts").unwrap();
        assert_eq!(program.resolve_module(a, "./gone"), None);
    }
}
