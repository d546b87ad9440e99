//! Ambient typings embedded into every program
//!
//! The analyzer has no TypeScript installation to read `lib.*.d.ts` or
//! `@types/*` from, so a minimal standard library and a minimal React
//! typing ship inside the binary. They are mounted at the paths the
//! compiler would load them from, which is what `importedFrom` labels are
//! derived from.

/// Standard library typings (`Array`, `Promise`, `Readonly`, ...)
pub const LIB_ES5_D_TS: &str = include_str!("lib/lib.es5.d.ts");

/// React typings, including the global `JSX` namespace
pub const REACT_D_TS: &str = include_str!("lib/react.d.ts");

/// An ambient declaration file mounted into the program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedTypings {
    /// Virtual absolute path of the file
    pub path: &'static str,
    /// Bare module specifier resolving to this file, if any
    pub module: Option<&'static str>,
    /// File contents
    pub source: &'static str,
}

const TYPINGS: &[EmbeddedTypings] = &[
    EmbeddedTypings {
        path: "/node_modules/typescript/lib/lib.es5.d.ts",
        module: None,
        source: LIB_ES5_D_TS,
    },
    EmbeddedTypings {
        path: "/node_modules/@types/react/index.d.ts",
        module: Some("react"),
        source: REACT_D_TS,
    },
];

/// All embedded typings, in load order
pub fn all_typings() -> &'static [EmbeddedTypings] {
    TYPINGS
}

/// Embedded typings a bare specifier resolves to
pub fn typings_for_module(specifier: &str) -> Option<&'static EmbeddedTypings> {
    TYPINGS.iter().find(|t| t.module == Some(specifier))
}

/// Virtual path of the file an unknown external package is attributed to
pub fn external_module_path(specifier: &str) -> String {
    format!("/node_modules/{}/index.d.ts", package_name(specifier))
}

/// Package part of a bare specifier (`@scope/pkg/sub` -> `@scope/pkg`)
fn package_name(specifier: &str) -> &str {
    let mut parts = specifier.splitn(3, '/');
    let first = parts.next().unwrap_or(specifier);
    match (first.starts_with('@'), parts.next()) {
        (true, Some(second)) => &specifier[..first.len() + 1 + second.len()],
        _ => first,
    }
}
