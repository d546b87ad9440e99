//! documittu-analyze: dump the API model of a TypeScript package as JSON
//!
//! ```text
//! documittu-analyze <package-dir> [--output <file>] [--compact]
//! ```
//!
//! Log verbosity is read from `DOCUMITTU_LOG` and defaults to `warn`.

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use ts_analyzer::{AnalyzeOptions, Package};

/// Command line configuration
#[derive(Debug, PartialEq)]
struct AnalyzeCommand {
    /// Package directory holding package.json and tsconfig.json
    package_dir: PathBuf,
    /// Write JSON here instead of stdout
    output: Option<PathBuf>,
    /// Directory under the package holding the sources
    source_root: String,
    /// Single line JSON
    compact: bool,
}

impl AnalyzeCommand {
    fn parse(args: &[String]) -> Result<Self> {
        let mut package_dir = None;
        let mut output = None;
        let mut source_root = "src".to_string();
        let mut compact = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    if i + 1 < args.len() {
                        output = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--output requires a value");
                    }
                }
                "--source-root" => {
                    if i + 1 < args.len() {
                        source_root = args[i + 1].clone();
                        i += 2;
                    } else {
                        bail!("--source-root requires a value");
                    }
                }
                "--compact" => {
                    compact = true;
                    i += 1;
                }
                arg if !arg.starts_with('-') && package_dir.is_none() => {
                    package_dir = Some(PathBuf::from(arg));
                    i += 1;
                }
                arg => bail!("Unknown argument: {}", arg),
            }
        }

        let package_dir = package_dir.ok_or_else(|| anyhow!(usage()))?;
        Ok(Self {
            package_dir,
            output,
            source_root,
            compact,
        })
    }
}

fn usage() -> &'static str {
    "Usage: documittu-analyze <package-dir> [--output <file>] [--source-root <dir>] [--compact]"
}

/// Render the package document, pretty printed with four space indents
fn render(package: &Package, compact: bool) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if compact {
        serde_json::to_writer(&mut out, package)?;
    } else {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        package.serialize(&mut serializer)?;
    }
    out.push(b'\n');
    Ok(out)
}

fn run(cmd: &AnalyzeCommand) -> Result<()> {
    let package = AnalyzeOptions::new()
        .source_root(&cmd.source_root)
        .analyze(&cmd.package_dir)
        .with_context(|| format!("Failed to analyze {}", cmd.package_dir.display()))?;
    let json = render(&package, cmd.compact)?;

    match &cmd.output {
        Some(path) => {
            fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("wrote {} ({} bytes)", path.display(), json.len());
        }
        None => io::stdout().lock().write_all(&json)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_env("DOCUMITTU_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", usage());
        return Ok(());
    }

    let cmd = AnalyzeCommand::parse(&args)?;
    run(&cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let cmd = AnalyzeCommand::parse(&args(&["pkg"])).unwrap();
        assert_eq!(
            cmd,
            AnalyzeCommand {
                package_dir: PathBuf::from("pkg"),
                output: None,
                source_root: "src".to_string(),
                compact: false,
            }
        );
    }

    #[test]
    fn test_parse_flags() {
        let cmd = AnalyzeCommand::parse(&args(&[
            "--compact",
            "pkg",
            "-o",
            "out.json",
            "--source-root",
            "lib-src",
        ]))
        .unwrap();
        assert!(cmd.compact);
        assert_eq!(cmd.output, Some(PathBuf::from("out.json")));
        assert_eq!(cmd.source_root, "lib-src");
    }

    #[test]
    fn test_parse_errors() {
        assert!(AnalyzeCommand::parse(&[]).is_err());
        assert!(AnalyzeCommand::parse(&args(&["pkg", "--output"])).is_err());
        assert!(AnalyzeCommand::parse(&args(&["pkg", "--bogus"])).is_err());
        assert!(AnalyzeCommand::parse(&args(&["a", "b"])).is_err());
    }

    #[test]
    fn test_render_indents_four_spaces() {
        let package = Package::new("pkg", "lib");
        let pretty = String::from_utf8(render(&package, false).unwrap()).unwrap();
        assert!(pretty.starts_with("{\n    \"name\": \"pkg\""));
        let compact = String::from_utf8(render(&package, true).unwrap()).unwrap();
        assert!(compact.starts_with("{\"name\":\"pkg\""));
        assert_eq!(compact.lines().count(), 1);
    }
}
