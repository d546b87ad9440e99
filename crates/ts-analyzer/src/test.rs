//! Test utilities and fixtures for ts-analyzer.
//!
//! This module runs the analyzer over in-memory sources, so tests can
//! describe a package as a list of `(path, source)` pairs instead of
//! writing files to disk.
//!
//! # Example
//!
//! ```
//! use ts_analyzer::test::{analyze_sources, find_declaration};
//!
//! let package = analyze_sources(&[("src/index.ts", "export const PI = 3.14159")]).unwrap();
//! let pi = find_declaration(&package, "PI").unwrap();
//! assert_eq!(pi.id(), "0");
//! ```

use crate::diagnostics::AnalyzeResult;
use crate::node::{Declaration, Module, Package};
use crate::package::analyze_modules;
use crate::types::{TypeBound, TypeProperty};
use crate::utils::paths::join;
use crate::utils::swc::parse_typescript_source;
use std::path::Path;

/// Package root the fixture sources are mounted under
pub const FIXTURE_ROOT: &str = "/virtual";

/// Output directory of fixture packages
pub const FIXTURE_OUT_DIR: &str = "lib";

/// Name of fixture packages
pub const FIXTURE_NAME: &str = "fixture";

/// Analyze in-memory sources given relative to [`FIXTURE_ROOT`].
///
/// Files are analyzed in the order given. Module keys follow the usual
/// mapping, so `src/a.ts` becomes `lib/src/a.js`.
pub fn analyze_sources(files: &[(&str, &str)]) -> AnalyzeResult<Package> {
    let parsed = files
        .iter()
        .map(|(path, source)| parse_typescript_source(join(FIXTURE_ROOT, path), *source))
        .collect::<AnalyzeResult<Vec<_>>>()?;

    let mut package = Package::new(FIXTURE_NAME, FIXTURE_OUT_DIR);
    analyze_modules(parsed, &mut package, Path::new(FIXTURE_ROOT));
    Ok(package)
}

/// Module key of a fixture source path (`src/a.ts` -> `lib/src/a.js`).
pub fn fixture_out_path(src_path: &str) -> String {
    crate::utils::output_path(
        Path::new(FIXTURE_ROOT),
        FIXTURE_OUT_DIR,
        Path::new(&join(FIXTURE_ROOT, src_path)),
    )
}

/// The module analyzed from a fixture source path.
pub fn fixture_module<'a>(package: &'a Package, src_path: &str) -> Option<&'a Module> {
    package.modules.get(&fixture_out_path(src_path))
}

/// First declaration with `name` in any module.
pub fn find_declaration<'a>(package: &'a Package, name: &str) -> Option<&'a Declaration> {
    package
        .modules
        .values()
        .find_map(|module| module.declaration_named(name))
}

/// Declaration with `name` in the module analyzed from `src_path`.
pub fn module_declaration<'a>(
    package: &'a Package,
    src_path: &str,
    name: &str,
) -> Option<&'a Declaration> {
    fixture_module(package, src_path)?.declaration_named(name)
}

/// Names of a property list, in order.
pub fn property_names(properties: &[TypeProperty]) -> Vec<&str> {
    properties.iter().map(|p| p.name.as_str()).collect()
}

/// Every declaration id the package refers to, paired with where it is
/// referenced from. Used to check that no id dangles.
pub fn referenced_ids(package: &Package) -> Vec<(&'static str, String)> {
    let mut ids = Vec::new();
    for id in package.type_declaration.values() {
        ids.push(("typeDeclaration", id.clone()));
    }
    for id in package.declaration_module.keys() {
        ids.push(("declarationModule", id.clone()));
    }
    for module in package.modules.values() {
        for edge in module.reexports.iter().filter(|e| e.is_resolved()) {
            ids.push(("reexports", edge.id.clone()));
        }
    }
    ids
}

/// `Named` bound ids inside a type, depth first.
pub fn named_ids(bound: &TypeBound) -> Vec<&str> {
    let mut ids = Vec::new();
    collect_named_ids(bound, &mut ids);
    ids
}

fn collect_named_ids<'a>(bound: &'a TypeBound, ids: &mut Vec<&'a str>) {
    match bound {
        TypeBound::Named { id, parameters, .. } => {
            if let Some(id) = id {
                ids.push(id);
            }
            for parameter in parameters.iter().flatten() {
                collect_named_ids(parameter, ids);
            }
        }
        TypeBound::Object { properties, index } => {
            for property in properties {
                collect_named_ids(&property.ty, ids);
            }
            if let Some(index) = index {
                collect_named_ids(&index.ty, ids);
            }
        }
        TypeBound::Function {
            type_parameters,
            parameters,
            return_type,
        } => {
            for parameter in type_parameters.iter().flatten() {
                collect_named_ids(parameter, ids);
            }
            for parameter in parameters {
                collect_named_ids(&parameter.ty, ids);
            }
            collect_named_ids(return_type, ids);
        }
        TypeBound::Tuple { properties: types }
        | TypeBound::Intersection { types }
        | TypeBound::Union { types } => {
            for ty in types {
                collect_named_ids(ty, ids);
            }
        }
        TypeBound::BooleanLiteral { .. }
        | TypeBound::NumberLiteral { .. }
        | TypeBound::StringLiteral { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{DeclarationKind, ExportedIn};
    use pretty_assertions::assert_eq;

    const APP: &[(&str, &str)] = &[
        (
            "src/types.ts",
            "/** Size of a control */\nexport type Size = 'small' | 'large'\nexport interface Theme { size: Size; dense: boolean | Size }",
        ),
        (
            "src/button.tsx",
            "import {Size, Theme} from './types'\nexport type ButtonProps = { size?: Size; theme: Theme; onClick(): void }\n/** Clickable */\nexport function Button(props: ButtonProps) { return <button /> }",
        ),
        (
            "src/index.ts",
            "export {Button as PrimaryButton} from './button'\nexport * from './types'\nexport {Missing} from './nowhere'",
        ),
    ];

    #[test]
    fn test_fixture_paths() {
        assert_eq!(fixture_out_path("src/a.tsx"), "lib/src/a.js");
        let package = analyze_sources(&[("src/a.ts", "export const A = 1")]).unwrap();
        assert!(fixture_module(&package, "src/a.ts").is_some());
        assert!(module_declaration(&package, "src/a.ts", "A").is_some());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let first = analyze_sources(APP).unwrap();
        let second = analyze_sources(APP).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_no_dangling_ids() {
        let package = analyze_sources(APP).unwrap();
        for (place, id) in referenced_ids(&package) {
            assert!(
                package.declaration(&id).is_some(),
                "{} refers to missing declaration {}",
                place,
                id
            );
        }
        for module in package.modules.values() {
            for declaration in module.declarations.values() {
                for link in declaration.exported_in() {
                    assert!(package.modules.contains_key(&link.path));
                }
            }
        }
    }

    #[test]
    fn test_colliding_sources_leave_no_dangling_ids() {
        let package = analyze_sources(&[
            ("src/a.ts", "export const X = 1"),
            ("src/a.tsx", "export const Y = 2"),
        ])
        .unwrap();
        assert_eq!(package.modules.len(), 1);
        for (place, id) in referenced_ids(&package) {
            assert!(package.declaration(&id).is_some(), "{} refers to missing {}", place, id);
        }
    }

    #[test]
    fn test_recursive_mapped_aliases() {
        let package = analyze_sources(&[(
            "src/deep.ts",
            "type DeepPartial<T> = { [K in keyof T]?: DeepPartial<T[K]> }\n\
             interface Tree { value: string; child: Tree }\n\
             export type Nested = DeepPartial<{a: {b: number}}>\n\
             export type PartialTree = DeepPartial<Tree>",
        )])
        .unwrap();

        let Declaration::Type(nested) = find_declaration(&package, "Nested").unwrap() else {
            panic!("expected type");
        };
        let TypeBound::Object { properties, .. } = &nested.ty else {
            panic!("expected object");
        };
        let TypeBound::Named { name, parameters, .. } = &properties[0].ty else {
            panic!("expected named");
        };
        assert_eq!(name, "DeepPartial");
        let Some(TypeBound::Object { properties: inner, .. }) =
            parameters.as_ref().and_then(|p| p.first())
        else {
            panic!("expected object argument");
        };
        assert_eq!(property_names(inner), vec!["b"]);

        let Declaration::Type(partial) = find_declaration(&package, "PartialTree").unwrap() else {
            panic!("expected type");
        };
        let TypeBound::Object { properties, .. } = &partial.ty else {
            panic!("expected object");
        };
        assert_eq!(property_names(properties), vec!["value", "child"]);
    }

    #[test]
    fn test_named_types_link_to_declarations() {
        let package = analyze_sources(APP).unwrap();
        let Declaration::Type(props) = find_declaration(&package, "ButtonProps").unwrap() else {
            panic!("expected type");
        };
        let ids = named_ids(&props.ty);
        let linked: Vec<&str> = ids
            .iter()
            .filter_map(|id| package.declaration_for_type(id))
            .map(Declaration::name)
            .collect();
        assert_eq!(linked, vec!["Size", "Theme"]);
    }

    #[test]
    fn test_component_and_reexports() {
        let package = analyze_sources(APP).unwrap();
        let Declaration::Component(button) = find_declaration(&package, "Button").unwrap() else {
            panic!("expected component");
        };
        assert_eq!(button.base.documentation, "Clickable");
        assert_eq!(property_names(&button.properties), vec!["size", "theme", "onClick"]);
        assert_eq!(
            button.base.exported_in,
            vec![ExportedIn {
                path: "lib/src/index.js".to_string(),
                name: "PrimaryButton".to_string(),
            }]
        );

        let index = fixture_module(&package, "src/index.ts").unwrap();
        let names: Vec<(&str, bool)> = index
            .reexports
            .iter()
            .map(|e| (e.name.as_str(), e.is_resolved()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("PrimaryButton", true),
                ("Missing", false),
                ("Size", true),
                ("Theme", true),
            ]
        );

        let size = find_declaration(&package, "Size").unwrap();
        assert_eq!(size.kind(), DeclarationKind::Type);
        assert_eq!(size.base().documentation, "Size of a control");
    }

    #[test]
    fn test_boolean_members_collapse() {
        let package = analyze_sources(APP).unwrap();
        let Declaration::Type(theme) = find_declaration(&package, "Theme").unwrap() else {
            panic!("expected type");
        };
        let TypeBound::Object { properties, .. } = &theme.ty else {
            panic!("expected object");
        };
        let TypeBound::Union { types } = &properties[1].ty else {
            panic!("expected union");
        };
        // `Size` flattens into the outer union
        assert_eq!(types[0], TypeBound::named("boolean"));
        assert_eq!(types.len(), 3);
        assert!(types[1..]
            .iter()
            .all(|t| matches!(t, TypeBound::StringLiteral { .. })));
    }

    #[test]
    fn test_named_ids_walks_nested_bounds() {
        let bound = TypeBound::Union {
            types: vec![
                TypeBound::Named {
                    name: "A".to_string(),
                    parameters: Some(vec![TypeBound::Named {
                        name: "B".to_string(),
                        parameters: None,
                        id: Some("2".to_string()),
                        imported_from: None,
                    }]),
                    id: Some("1".to_string()),
                    imported_from: None,
                },
                TypeBound::named("string"),
            ],
        };
        assert_eq!(named_ids(&bound), vec!["1", "2"]);
    }
}
