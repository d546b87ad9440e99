//! Output path mapping
//!
//! Every component that keys a module goes through [`output_path`], so a
//! source file maps to the same module key wherever it is looked up.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Component, Path};

lazy_static! {
    static ref SOURCE_EXT_REGEX: Regex = Regex::new(r"\.[jt]sx?$").unwrap();
}

/// Extension every compiled module ends up with
pub const OUTPUT_EXTENSION: &str = ".js";

/// Slash-join a path and resolve `.` and `..` segments
pub fn normalize(path: impl AsRef<Path>) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut absolute = false;

    for component in path.as_ref().components() {
        match component {
            Component::RootDir => absolute = true,
            Component::Prefix(p) => parts.push(p.as_os_str().to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(parts.last(), Some(last) if last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..".to_string());
                }
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Path of `path` relative to `base`, slash-joined
pub fn relative(base: impl AsRef<Path>, path: impl AsRef<Path>) -> String {
    let base = normalize(base);
    let path = normalize(path);

    let base_parts: Vec<&str> = base.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty() && *s != ".").collect();

    let common = base_parts
        .iter()
        .zip(path_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..")
        .take(base_parts.len() - common)
        .collect();
    parts.extend(&path_parts[common..]);
    parts.join("/")
}

/// Join two slash paths and normalize the result
pub fn join(base: &str, rest: &str) -> String {
    normalize(Path::new(base).join(rest))
}

/// Map a source file to its module key under `out_dir`
///
/// `src/button.tsx` under package root `/pkg` with `out_dir = "lib"` maps
/// to `lib/src/button.js`.
pub fn output_path(package_path: &Path, out_dir: &str, src_path: &Path) -> String {
    let relative_src = relative(package_path, src_path);
    let joined = join(out_dir, &relative_src);
    SOURCE_EXT_REGEX
        .replace(&joined, OUTPUT_EXTENSION)
        .into_owned()
}

/// Module display name: the file name without the output extension
pub fn module_name(out_path: &str) -> String {
    let file_name = out_path.rsplit('/').next().unwrap_or(out_path);
    file_name
        .strip_suffix(OUTPUT_EXTENSION)
        .unwrap_or(file_name)
        .to_string()
}

/// Parent directory of a slash path
pub fn dirname(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
        None => ".".to_string(),
    }
}
