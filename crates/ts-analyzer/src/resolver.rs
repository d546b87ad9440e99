//! Cross-reference resolution
//!
//! Runs after every module has been extracted, in two passes: wildcard
//! re-exports are expanded into named edges first, then every edge is
//! resolved to a declaration id and linked back through `exportedIn`.

use crate::extractor::StarExport;
use crate::node::{ExportedIn, Package, Reexport};
use tracing::{debug, trace};

/// Expand star exports, then resolve all re-export edges
pub fn resolve(package: &mut Package, star_exports: &[StarExport]) {
    expand_star_exports(package, star_exports);
    resolve_reexports(package);
}

/// Append one edge per declaration of `from` onto `module`
pub fn expand_star_exports(package: &mut Package, star_exports: &[StarExport]) {
    for star in star_exports {
        let Some(from) = package.modules.get(&star.from) else {
            trace!("star export source {} is not analyzed", star.from);
            continue;
        };
        let edges: Vec<Reexport> = from
            .declarations
            .values()
            .map(|d| Reexport::unresolved(d.name(), d.name(), star.from.clone()))
            .collect();
        if let Some(module) = package.modules.get_mut(&star.module) {
            module.reexports.extend(edges);
        }
    }
}

/// A resolved edge waiting to be written back
struct Link {
    module: String,
    edge: usize,
    target_module: String,
    declaration: String,
}

/// Point every unresolved edge at the declaration it names
///
/// Edges whose module or declaration is missing stay unresolved.
pub fn resolve_reexports(package: &mut Package) {
    let mut links = Vec::new();
    for (out_path, module) in &package.modules {
        for (index, edge) in module.reexports.iter().enumerate() {
            if edge.is_resolved() {
                continue;
            }
            let Some(target) = package.modules.get(&edge.path) else {
                trace!("{} re-exports from unanalyzed {}", out_path, edge.path);
                continue;
            };
            let Some(declaration) = target
                .declarations
                .values()
                .find(|d| d.name() == edge.src_name)
            else {
                trace!("{} has no declaration {}", edge.path, edge.src_name);
                continue;
            };
            links.push(Link {
                module: out_path.clone(),
                edge: index,
                target_module: edge.path.clone(),
                declaration: declaration.id().to_string(),
            });
        }
    }

    debug!("resolved {} re-export edges", links.len());
    for link in links {
        let Some(edge) = package
            .modules
            .get_mut(&link.module)
            .and_then(|m| m.reexports.get_mut(link.edge))
        else {
            continue;
        };
        edge.id = link.declaration.clone();
        let exported = ExportedIn {
            path: link.module.clone(),
            name: edge.name.clone(),
        };
        if let Some(declaration) = package
            .modules
            .get_mut(&link.target_module)
            .and_then(|m| m.declarations.get_mut(&link.declaration))
        {
            declaration.base_mut().exported_in.push(exported);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BaseDeclaration, Declaration, Module, VariableDeclaration};
    use crate::types::TypeBound;
    use pretty_assertions::assert_eq;

    fn variable(id: &str, name: &str) -> Declaration {
        Declaration::Variable(VariableDeclaration {
            base: BaseDeclaration::new(id, name, String::new()),
            ty: TypeBound::named("number"),
            value: "1".to_string(),
        })
    }

    fn module(out_path: &str, declarations: Vec<Declaration>, reexports: Vec<Reexport>) -> Module {
        Module {
            name: out_path.to_string(),
            src_path: out_path.to_string(),
            out_path: out_path.to_string(),
            declarations: declarations
                .into_iter()
                .map(|d| (d.id().to_string(), d))
                .collect(),
            reexports,
        }
    }

    fn package(modules: Vec<Module>) -> Package {
        let mut package = Package::new("pkg", "lib");
        for module in modules {
            for id in module.declarations.keys() {
                package
                    .declaration_module
                    .insert(id.clone(), module.out_path.clone());
            }
            package.modules.insert(module.out_path.clone(), module);
        }
        package
    }

    #[test]
    fn test_named_reexport_round_trip() {
        let mut package = package(vec![
            module("a.js", vec![variable("0", "X")], vec![]),
            module("b.js", vec![], vec![Reexport::unresolved("Y", "X", "a.js")]),
        ]);
        resolve(&mut package, &[]);

        assert_eq!(package.modules["b.js"].reexports[0].id, "0");
        assert_eq!(
            package.declaration("0").unwrap().exported_in(),
            &[ExportedIn {
                path: "b.js".to_string(),
                name: "Y".to_string()
            }]
        );
    }

    #[test]
    fn test_star_exports_expand_before_resolving() {
        let mut package = package(vec![
            module("a.js", vec![variable("0", "X"), variable("1", "Z")], vec![]),
            module("b.js", vec![], vec![]),
        ]);
        let stars = vec![StarExport {
            module: "b.js".to_string(),
            from: "a.js".to_string(),
        }];
        resolve(&mut package, &stars);

        let edges = &package.modules["b.js"].reexports;
        assert_eq!(edges.len(), 2);
        for edge in edges {
            assert_eq!(edge.name, edge.src_name);
            assert!(edge.is_resolved());
        }
        assert_eq!(edges[1].id, "1");
        assert_eq!(package.declaration("1").unwrap().exported_in()[0].name, "Z");
    }

    #[test]
    fn test_dangling_edges_stay_unresolved() {
        let mut package = package(vec![
            module("a.js", vec![variable("0", "X")], vec![]),
            module(
                "b.js",
                vec![],
                vec![
                    Reexport::unresolved("Q", "Q", "missing.js"),
                    Reexport::unresolved("W", "W", "a.js"),
                ],
            ),
        ]);
        let stars = vec![StarExport {
            module: "b.js".to_string(),
            from: "missing.js".to_string(),
        }];
        resolve(&mut package, &stars);

        let edges = &package.modules["b.js"].reexports;
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.id.is_empty()));
        assert!(package.declaration("0").unwrap().exported_in().is_empty());
    }
}
