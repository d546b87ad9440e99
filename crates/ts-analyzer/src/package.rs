//! Package assembly
//!
//! Reads the package descriptors, discovers the source files and READMEs
//! of a package directory, and runs extraction and resolution over them to
//! produce one [`Package`] document.

use crate::checker::{Checker, Program};
use crate::diagnostics::{AnalyzeError, AnalyzeResult};
use crate::extractor::Extractor;
use crate::node::Package;
use crate::resolver;
use crate::utils::paths::{dirname, join, normalize, relative};
use crate::utils::swc::{is_typescript_file, parse_typescript_file};
use crate::utils::ParsedModule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Error raised when either descriptor file is missing
pub const MISSING_DESCRIPTORS: &str =
    "The package folder does not contain package.json and tsconfig.json files";

/// Error raised when `tsconfig.json` has no `compilerOptions.outDir`
pub const MISSING_OUT_DIR: &str = "The tsconfig.json must specify an outDir";

/// The fields of `package.json` the analyzer reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageJson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub main: Option<String>,
}

/// The fields of `tsconfig.json` the analyzer reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub compiler_options: CompilerOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default)]
    pub out_dir: Option<String>,
}

/// Where sources and READMEs are looked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Directory under the package root holding the sources
    pub source_root: String,
    /// File name of per-directory READMEs
    pub readme_name: String,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            source_root: "src".to_string(),
            readme_name: "README.md".to_string(),
        }
    }
}

impl AnalyzeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source directory
    pub fn source_root(mut self, dir: impl Into<String>) -> Self {
        self.source_root = dir.into();
        self
    }

    /// Set the README file name
    pub fn readme_name(mut self, name: impl Into<String>) -> Self {
        self.readme_name = name.into();
        self
    }

    /// Analyze the package at `package_path`
    pub fn analyze(&self, package_path: impl AsRef<Path>) -> AnalyzeResult<Package> {
        let package_path = package_path.as_ref();
        let package_json_path = package_path.join("package.json");
        let tsconfig_path = package_path.join("tsconfig.json");
        if !package_json_path.is_file() || !tsconfig_path.is_file() {
            return Err(AnalyzeError::config(MISSING_DESCRIPTORS));
        }
        let package_path = fs::canonicalize(package_path)?;

        let package_json: PackageJson = serde_json::from_str(&fs::read_to_string(&package_json_path)?)?;
        let tsconfig: TsConfig = serde_json::from_str(&fs::read_to_string(&tsconfig_path)?)?;
        let Some(out_dir) = tsconfig.compiler_options.out_dir else {
            return Err(AnalyzeError::config(MISSING_OUT_DIR));
        };

        let mut package = Package::new(package_json.name, out_dir);
        package.main_module = package_json.main.map(normalize);

        let source_root = package_path.join(&self.source_root);
        let file_names = self.source_files(&source_root);
        debug!("found {} source files under {}", file_names.len(), source_root.display());
        analyze(&file_names, &mut package, &package_path)?;

        self.collect_readmes(&package_path, &source_root, &mut package)?;

        info!(
            "analyzed {}: {} modules, {} declarations",
            package.name,
            package.modules.len(),
            package.declaration_count()
        );
        Ok(package)
    }

    /// TypeScript files under the source root, sorted
    fn source_files(&self, source_root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(source_root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_typescript_file(e.path()))
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }

    /// README text keyed by the output directory it documents
    ///
    /// The output directory of the source root falls back to the package
    /// root README.
    fn collect_readmes(
        &self,
        package_path: &Path,
        source_root: &Path,
        package: &mut Package,
    ) -> AnalyzeResult<()> {
        let mut readmes: Vec<PathBuf> = WalkDir::new(source_root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == self.readme_name.as_str())
            .map(|e| e.into_path())
            .collect();
        readmes.sort();

        for readme in readmes {
            let relative_path = relative(package_path, &readme);
            let out_path = dirname(&join(&package.out_dir, &relative_path));
            debug!("readme {} documents {}", readme.display(), out_path);
            package.readmes.insert(out_path, fs::read_to_string(&readme)?);
        }

        let root = join(&package.out_dir, &self.source_root);
        if !package.readmes.contains_key(&root) {
            let fallback = package_path.join(&self.readme_name);
            if fallback.is_file() {
                package.readmes.insert(root, fs::read_to_string(&fallback)?);
            }
        }
        Ok(())
    }
}

/// Analyze a package directory with default options
pub fn analyze_package(package_path: impl AsRef<Path>) -> AnalyzeResult<Package> {
    AnalyzeOptions::default().analyze(package_path)
}

/// Parse `file_names` and extract them into `package`
///
/// Module keys are computed relative to `package_path`. A file that fails
/// to parse aborts the run.
pub fn analyze(
    file_names: &[PathBuf],
    package: &mut Package,
    package_path: &Path,
) -> AnalyzeResult<()> {
    let parsed = file_names
        .iter()
        .map(parse_typescript_file)
        .collect::<AnalyzeResult<Vec<_>>>()?;
    analyze_modules(parsed, package, package_path);
    Ok(())
}

/// Extract already parsed modules into `package`
pub fn analyze_modules(parsed: Vec<ParsedModule>, package: &mut Package, package_path: &Path) {
    let program = Program::new(parsed);
    let mut checker = Checker::new(&program);

    let mut extractor = Extractor::new(&mut checker, package, package_path);
    extractor.extract_all();
    let star_exports = extractor.finish();

    resolver::resolve(package, &star_exports);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DeclarationKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &Path, path: &str, contents: &str) {
        let path = dir.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"name": "@acme/widgets", "main": "./lib/src/index.js"}"#,
        );
        write(
            dir.path(),
            "tsconfig.json",
            r#"{"compilerOptions": {"outDir": "lib", "jsx": "preserve"}}"#,
        );
        write(
            dir.path(),
            "src/button.tsx",
            "/** Props of a button */\nexport type ButtonProps = { label: string; primary?: boolean }\nexport const Button = (props: ButtonProps) => <button>{props.label}</button>",
        );
        write(
            dir.path(),
            "src/index.ts",
            "export {Button as Btn} from './button'\nexport * from './util'",
        );
        write(dir.path(), "src/util/index.ts", "export const VERSION = '1.0'");
        write(dir.path(), "src/util/README.md", "# Utilities");
        write(dir.path(), "README.md", "# Widgets");
        dir
    }

    #[test]
    fn test_analyze_package() {
        let dir = fixture();
        let package = analyze_package(dir.path()).unwrap();

        assert_eq!(package.name, "@acme/widgets");
        assert_eq!(package.out_dir, "lib");
        assert_eq!(package.main_module.as_deref(), Some("lib/src/index.js"));
        let keys: Vec<&str> = package.modules.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["lib/src/button.js", "lib/src/index.js", "lib/src/util/index.js"]
        );

        let button = &package.modules["lib/src/button.js"];
        assert_eq!(
            button.declaration_named("Button").unwrap().kind(),
            DeclarationKind::Component
        );

        let index = &package.modules["lib/src/index.js"];
        assert_eq!(index.reexports.len(), 2);
        assert!(index.reexports.iter().all(|e| e.is_resolved()));
        let version = package.modules["lib/src/util/index.js"]
            .declaration_named("VERSION")
            .unwrap();
        assert_eq!(version.exported_in()[0].path, "lib/src/index.js");

        assert_eq!(package.readmes["lib/src/util"], "# Utilities");
        assert_eq!(package.readmes["lib/src"], "# Widgets");
    }

    #[test]
    fn test_source_readme_wins_over_root_readme() {
        let dir = fixture();
        write(dir.path(), "src/README.md", "# Sources");
        let package = analyze_package(dir.path()).unwrap();
        assert_eq!(package.readmes["lib/src"], "# Sources");
    }

    #[test]
    fn test_missing_descriptors() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", r#"{"name": "x"}"#);
        let err = analyze_package(dir.path()).unwrap_err();
        assert!(err.is_config());
        assert_eq!(err.to_string(), MISSING_DESCRIPTORS);
    }

    #[test]
    fn test_missing_out_dir() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", r#"{"name": "x"}"#);
        write(dir.path(), "tsconfig.json", r#"{"compilerOptions": {}}"#);
        let err = analyze_package(dir.path()).unwrap_err();
        assert_eq!(err.to_string(), MISSING_OUT_DIR);
    }

    #[test]
    fn test_parse_error_is_fatal() {
        let dir = fixture();
        write(dir.path(), "src/broken.ts", "export function broken(");
        let err = analyze_package(dir.path()).unwrap_err();
        assert!(matches!(err, AnalyzeError::TypeScriptParse { .. }));
    }

    #[test]
    fn test_custom_source_root() {
        let dir = fixture();
        write(dir.path(), "lib-src/only.ts", "export const ONLY = true");
        let package = AnalyzeOptions::new()
            .source_root("lib-src")
            .analyze(dir.path())
            .unwrap();
        let keys: Vec<&str> = package.modules.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["lib/lib-src/only.js"]);
        assert_eq!(package.readmes["lib/lib-src"], "# Widgets");
    }
}
