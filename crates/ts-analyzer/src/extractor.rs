//! Declaration extraction
//!
//! The extractor walks the top level of every analyzed file and turns each
//! exported node into one [`Declaration`] (one per binding for variable
//! statements). Re-exports are recorded as unresolved edges; wildcard
//! re-exports are queued as [`StarExport`]s and expanded by the resolver
//! once every module is known.

use crate::checker::program::is_relative;
use crate::checker::{Checker, FileId, ModuleTarget, Space, SymbolId, TypeId};
use crate::node::{
    BaseDeclaration, ClassDeclaration, ComponentDeclaration, ConstructorEntry, Declaration,
    FunctionDeclaration, Module, Package, Reexport, TypeDeclaration, VariableDeclaration,
};
use crate::serializer::TypeSerializer;
use crate::types::{DocEntry, SignatureBound, TypeProperty};
use crate::utils::paths::{dirname, join, module_name, output_path, relative};
use crate::utils::swc::module_export_name;
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::Spanned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A pending `export * from '...'`, keyed by output paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarExport {
    /// Module containing the statement
    pub module: String,
    /// Module whose declarations are re-exported
    pub from: String,
}

/// What a value symbol turned out to be
enum ValueKind {
    Component(Vec<TypeProperty>),
    Function(SignatureBound),
    Other,
}

/// Extracts declarations of one analysis run into a [`Package`]
pub struct Extractor<'a, 'p> {
    checker: &'a mut Checker<'p>,
    package: &'a mut Package,
    package_path: PathBuf,
    next_id: u64,
    extracted: HashSet<SymbolId>,
    star_exports: Vec<StarExport>,
}

impl<'a, 'p> Extractor<'a, 'p> {
    pub fn new(
        checker: &'a mut Checker<'p>,
        package: &'a mut Package,
        package_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            checker,
            package,
            package_path: package_path.into(),
            next_id: 0,
            extracted: HashSet::new(),
            star_exports: Vec::new(),
        }
    }

    /// Extract every root file of the checker's program, in order
    pub fn extract_all(&mut self) {
        let program = self.checker.program();
        let roots: Vec<FileId> = program.root_files().map(|(id, _)| id).collect();
        for file in roots {
            self.visit_file(file);
        }
    }

    /// Star exports collected so far
    pub fn finish(self) -> Vec<StarExport> {
        self.star_exports
    }

    fn output_path(&self, src_path: &str) -> String {
        output_path(&self.package_path, &self.package.out_dir, Path::new(src_path))
    }

    fn next_id(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        id.to_string()
    }

    /// Register a module for `file` and extract its exported declarations
    pub fn visit_file(&mut self, file: FileId) {
        let program = self.checker.program();
        let source = program.file(file);
        let out_path = self.output_path(&source.path);
        if let Some(existing) = self.package.modules.get(&out_path) {
            // `a.ts` and `a.tsx` compile to the same module; the first one wins
            debug!(
                "skipping {}: {} already compiles to {}",
                source.path, existing.src_path, out_path
            );
            return;
        }
        debug!("extracting {} as {}", source.path, out_path);

        self.package.modules.insert(
            out_path.clone(),
            Module {
                name: module_name(&out_path),
                src_path: relative(&self.package_path, &source.path),
                out_path: out_path.clone(),
                ..Default::default()
            },
        );

        let Some(module) = source.parsed.module() else {
            return;
        };
        // Top-level declarations of a declaration module are implicitly exported
        let ambient = source.parsed.is_declaration_file() && source.parsed.is_es_module();
        for item in &module.body {
            self.visit_item(file, &out_path, item, ambient);
        }
    }

    fn visit_item(
        &mut self,
        file: FileId,
        out_path: &str,
        item: &'p swc_ast::ModuleItem,
        ambient: bool,
    ) {
        use swc_ast::{DefaultDecl, ModuleDecl, ModuleItem, Stmt};

        match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                self.visit_decl(file, out_path, &export.decl)
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &export.decl {
                DefaultDecl::Class(class) => match &class.ident {
                    Some(ident) => self.visit_class(file, out_path, &ident.sym),
                    None => trace!("skipping anonymous default class"),
                },
                DefaultDecl::Fn(function) => match &function.ident {
                    Some(ident) => self.visit_function(file, out_path, &ident.sym),
                    None => trace!("skipping anonymous default function"),
                },
                DefaultDecl::TsInterfaceDecl(iface) => {
                    self.visit_type(file, out_path, &iface.id.sym)
                }
            },
            ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(named)) => {
                if let Some(src) = &named.src {
                    self.visit_reexport(file, out_path, named, &crate::utils::swc::str_value(src));
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportAll(all)) => {
                let specifier = crate::utils::swc::str_value(&all.src);
                if let Some(from) = self.module_target(file, &specifier) {
                    trace!("star export {} -> {}", out_path, from);
                    self.star_exports.push(StarExport {
                        module: out_path.to_string(),
                        from,
                    });
                }
            }
            ModuleItem::Stmt(Stmt::Decl(decl)) if ambient => self.visit_decl(file, out_path, decl),
            _ => {}
        }
    }

    fn visit_decl(&mut self, file: FileId, out_path: &str, decl: &'p swc_ast::Decl) {
        use swc_ast::Decl;

        match decl {
            Decl::TsTypeAlias(alias) => self.visit_type(file, out_path, &alias.id.sym),
            Decl::TsInterface(iface) => self.visit_type(file, out_path, &iface.id.sym),
            Decl::Class(class) => self.visit_class(file, out_path, &class.ident.sym),
            Decl::Fn(function) => self.visit_function(file, out_path, &function.ident.sym),
            Decl::Var(var) => {
                for declarator in &var.decls {
                    match &declarator.name {
                        swc_ast::Pat::Ident(binding) => {
                            self.visit_variable(file, out_path, &binding.id.sym, declarator)
                        }
                        _ => trace!("skipping destructured export binding"),
                    }
                }
            }
            _ => trace!("skipping unsupported exported declaration"),
        }
    }

    /// Symbol behind an exported name, once per symbol
    fn claim(&mut self, file: FileId, space: Space, name: &str) -> Option<SymbolId> {
        let Some(sym) = self.checker.lookup(file, space, name) else {
            debug!("no symbol for exported {}", name);
            return None;
        };
        if !self.extracted.insert(sym) {
            // merged interface or overload
            return None;
        }
        Some(sym)
    }

    fn base(&mut self, name: &str, sym: SymbolId) -> BaseDeclaration {
        let documentation = self.checker.documentation(sym);
        BaseDeclaration::new(self.next_id(), name, documentation)
    }

    fn add_declaration(&mut self, out_path: &str, declaration: Declaration) {
        let id = declaration.id().to_string();
        trace!("{:?} {} -> {}", declaration.kind(), declaration.name(), id);
        self.package
            .declaration_module
            .insert(id.clone(), out_path.to_string());
        if let Some(module) = self.package.modules.get_mut(out_path) {
            module.declarations.insert(id, declaration);
        }
    }

    fn add_type_declaration(&mut self, ty: TypeId, out_path: &str, declaration: Declaration) {
        self.package
            .type_declaration
            .insert(ty.key(), declaration.id().to_string());
        self.add_declaration(out_path, declaration);
    }

    fn visit_type(&mut self, file: FileId, out_path: &str, name: &str) {
        let Some(sym) = self.claim(file, Space::Type, name) else {
            return;
        };
        let ty = self.checker.declared_type(sym);
        let mut serializer = TypeSerializer::new(self.checker);
        let bound = serializer.serialize_declared(ty);
        let parameters = serializer.type_parameters(sym);

        let declaration = Declaration::Type(TypeDeclaration {
            base: self.base(name, sym),
            ty: bound,
            parameters,
        });
        self.add_type_declaration(ty, out_path, declaration);
    }

    fn visit_class(&mut self, file: FileId, out_path: &str, name: &str) {
        let Some(sym) = self.claim(file, Space::Value, name) else {
            return;
        };
        let constructor = self.checker.type_of_symbol(sym);
        let instance = self.checker.declared_type(sym);
        let mut serializer = TypeSerializer::new(self.checker);

        if let Some(properties) = serializer.component_props(constructor) {
            let declaration = Declaration::Component(ComponentDeclaration {
                base: self.base(name, sym),
                properties,
            });
            self.add_type_declaration(instance, out_path, declaration);
            return;
        }

        let Some(members) = serializer.class_members(constructor) else {
            debug!("class {} has no construct signature", name);
            return;
        };
        let declaration = Declaration::Class(ClassDeclaration {
            base: self.base(name, sym),
            properties: members
                .properties
                .into_iter()
                .map(|(property, ty)| DocEntry {
                    name: property.name,
                    documentation: property.documentation,
                    ty,
                })
                .collect(),
            constructors: members
                .constructors
                .into_iter()
                .map(|(documentation, parameters)| ConstructorEntry {
                    documentation,
                    parameters,
                })
                .collect(),
            methods: members
                .methods
                .into_iter()
                .map(|(property, signature)| {
                    signature.into_entry(property.name, property.documentation)
                })
                .collect(),
        });
        self.add_type_declaration(instance, out_path, declaration);
    }

    /// Classify a value type: component shape first, then callability
    fn classify(&mut self, ty: TypeId) -> ValueKind {
        let mut serializer = TypeSerializer::new(self.checker);
        if let Some(properties) = serializer.component_props(ty) {
            return ValueKind::Component(properties);
        }
        match serializer.function(ty) {
            Some(signature) => ValueKind::Function(signature),
            None => ValueKind::Other,
        }
    }

    fn function_declaration(&mut self, name: &str, sym: SymbolId, signature: SignatureBound) -> Declaration {
        Declaration::Function(FunctionDeclaration {
            base: self.base(name, sym),
            type_parameters: signature.type_parameters,
            parameters: signature.parameters,
            return_type: signature.return_type,
        })
    }

    fn component_declaration(
        &mut self,
        name: &str,
        sym: SymbolId,
        properties: Vec<TypeProperty>,
    ) -> Declaration {
        Declaration::Component(ComponentDeclaration {
            base: self.base(name, sym),
            properties,
        })
    }

    fn visit_function(&mut self, file: FileId, out_path: &str, name: &str) {
        let Some(sym) = self.claim(file, Space::Value, name) else {
            return;
        };
        let ty = self.checker.type_of_symbol(sym);
        let declaration = match self.classify(ty) {
            ValueKind::Component(properties) => self.component_declaration(name, sym, properties),
            ValueKind::Function(signature) => self.function_declaration(name, sym, signature),
            ValueKind::Other => {
                debug!("function {} has no call signature", name);
                return;
            }
        };
        self.add_declaration(out_path, declaration);
    }

    fn visit_variable(
        &mut self,
        file: FileId,
        out_path: &str,
        name: &str,
        declarator: &'p swc_ast::VarDeclarator,
    ) {
        let Some(sym) = self.claim(file, Space::Value, name) else {
            return;
        };
        let ty = self.checker.type_of_symbol(sym);
        let declaration = match self.classify(ty) {
            ValueKind::Component(properties) => self.component_declaration(name, sym, properties),
            ValueKind::Function(signature) => self.function_declaration(name, sym, signature),
            ValueKind::Other => {
                let Some(init) = declarator.init.as_deref() else {
                    debug!("variable {} has no initializer", name);
                    return;
                };
                let value = self
                    .checker
                    .program()
                    .file(file)
                    .parsed
                    .text_for_span(init.span())
                    .to_string();
                let bound = TypeSerializer::new(self.checker).serialize(ty);
                Declaration::Variable(VariableDeclaration {
                    base: self.base(name, sym),
                    ty: bound,
                    value,
                })
            }
        };
        self.add_declaration(out_path, declaration);
    }

    fn visit_reexport(
        &mut self,
        file: FileId,
        out_path: &str,
        named: &'p swc_ast::NamedExport,
        specifier: &str,
    ) {
        let Some(target) = self.module_target(file, specifier) else {
            return;
        };
        let Some(module) = self.package.modules.get_mut(out_path) else {
            return;
        };
        for export in &named.specifiers {
            match export {
                swc_ast::ExportSpecifier::Named(export) => {
                    let src_name = module_export_name(&export.orig);
                    let name = export
                        .exported
                        .as_ref()
                        .map(module_export_name)
                        .unwrap_or_else(|| src_name.clone());
                    module
                        .reexports
                        .push(Reexport::unresolved(name, src_name, target.clone()));
                }
                _ => trace!("skipping namespace re-export from {}", specifier),
            }
        }
    }

    /// Output path of the module a specifier refers to
    ///
    /// Package imports are never module targets. A relative specifier that
    /// names no existing file still maps to where that file would compile
    /// to, so the edge is kept and stays unresolved.
    fn module_target(&self, file: FileId, specifier: &str) -> Option<String> {
        let program = self.checker.program();
        match program.resolve_module(file, specifier) {
            Some(ModuleTarget::File(target)) => {
                let path = &program.file(target).path;
                if path.contains("/node_modules/") {
                    None
                } else {
                    Some(self.output_path(path))
                }
            }
            Some(ModuleTarget::External) => None,
            None if is_relative(specifier) => {
                let mut path = join(&dirname(&program.file(file).path), specifier);
                if Path::new(&path).extension().is_none() {
                    path.push_str(".ts");
                }
                Some(self.output_path(&path))
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Program;
    use crate::node::DeclarationKind;
    use crate::types::TypeBound;
    use crate::utils::parse_typescript_source;
    use pretty_assertions::assert_eq;

    fn extract(files: &[(&str, &str)]) -> (Package, Vec<StarExport>) {
        let parsed = files
            .iter()
            .map(|(path, source)| parse_typescript_source(path, *source).unwrap())
            .collect();
        let program = Program::new(parsed);
        let mut checker = Checker::new(&program);
        let mut package = Package::new("pkg", "lib");
        let mut extractor = Extractor::new(&mut checker, &mut package, "/pkg");
        extractor.extract_all();
        let stars = extractor.finish();
        (package, stars)
    }

    fn module<'a>(package: &'a Package, out_path: &str) -> &'a Module {
        package.modules.get(out_path).unwrap()
    }

    #[test]
    fn test_module_keys() {
        let (package, _) = extract(&[("/pkg/src/button.tsx", "export const X = 1")]);
        let module = module(&package, "lib/src/button.js");
        assert_eq!(module.name, "button");
        assert_eq!(module.src_path, "src/button.tsx");
        assert_eq!(module.out_path, "lib/src/button.js");
    }

    #[test]
    fn test_unexported_nodes_are_skipped() {
        let (package, _) = extract(&[(
            "/pkg/src/a.ts",
            "const hidden = 1\nfunction helper() {}\nexport const shown = hidden",
        )]);
        let module = module(&package, "lib/src/a.js");
        assert_eq!(module.declarations.len(), 1);
        assert!(module.declaration_named("shown").is_some());
    }

    #[test]
    fn test_variable_keeps_source_text() {
        let (package, _) = extract(&[(
            "/pkg/src/a.ts",
            "/** Circle constant */\nexport const PI = 3.14159\nexport let big = 1_000, later: string",
        )]);
        let module = module(&package, "lib/src/a.js");
        let Declaration::Variable(pi) = module.declaration_named("PI").unwrap() else {
            panic!("expected variable");
        };
        assert_eq!(pi.value, "3.14159");
        assert_eq!(pi.base.documentation, "Circle constant");
        assert_eq!(
            pi.ty,
            TypeBound::NumberLiteral {
                value: "3.14159".to_string()
            }
        );

        let Declaration::Variable(big) = module.declaration_named("big").unwrap() else {
            panic!("expected variable");
        };
        assert_eq!(big.value, "1_000");
        assert_eq!(big.ty, TypeBound::named("number"));
        assert!(module.declaration_named("later").is_none());
    }

    #[test]
    fn test_type_declarations_register_identity() {
        let (package, _) = extract(&[(
            "/pkg/src/a.ts",
            "export interface Point { x: number }\nexport interface Point { y: number }\nexport type Pair<T> = [T, T]",
        )]);
        let module = module(&package, "lib/src/a.js");
        assert_eq!(module.declarations.len(), 2);

        let Declaration::Type(point) = module.declaration_named("Point").unwrap() else {
            panic!("expected type");
        };
        let TypeBound::Object { properties, .. } = &point.ty else {
            panic!("expected object");
        };
        assert_eq!(properties.len(), 2);

        let Declaration::Type(pair) = module.declaration_named("Pair").unwrap() else {
            panic!("expected type");
        };
        assert_eq!(pair.parameters, Some(vec![TypeBound::named("T")]));
        assert!(matches!(pair.ty, TypeBound::Tuple { .. }));

        assert_eq!(package.type_declaration.len(), 2);
        for id in package.type_declaration.values() {
            assert!(package.declaration(id).is_some());
        }
    }

    #[test]
    fn test_class_and_component_classification() {
        let (package, _) = extract(&[(
            "/pkg/src/a.tsx",
            "import * as React from 'react'\n\
             type Props = { label: string }\n\
             /** A badge */\n\
             export class Badge extends React.Component<Props> {\n  render() { return <b>{this.props.label}</b> }\n}\n\
             export class Queue {\n  constructor(public size: number) {}\n  push(item: string): void {}\n  private log: string[] = []\n}",
        )]);
        let module = module(&package, "lib/src/a.js");

        let badge = module.declaration_named("Badge").unwrap();
        assert_eq!(badge.kind(), DeclarationKind::Component);
        assert_eq!(badge.base().documentation, "A badge");
        let Declaration::Component(badge) = badge else {
            unreachable!()
        };
        assert_eq!(badge.properties[0].name, "label");

        let Declaration::Class(queue) = module.declaration_named("Queue").unwrap() else {
            panic!("expected class");
        };
        assert_eq!(queue.properties[0].name, "size");
        assert_eq!(queue.properties[1].name, "log");
        assert_eq!(queue.methods[0].name, "push");
        assert_eq!(queue.constructors.len(), 1);
        assert_eq!(queue.constructors[0].parameters[0].name, "size");
        assert!(package
            .type_declaration
            .values()
            .any(|id| id == queue.base.id.as_str()));
    }

    #[test]
    fn test_function_and_variable_components() {
        let (package, _) = extract(&[(
            "/pkg/src/a.tsx",
            "export function Empty() { return <i /> }\n\
             export const Card = (props: { title: string }) => <div>{props.title}</div>\n\
             export function sum(a: number, b = 2): number { return a + b }\n\
             export function Many(a: number, b: number, c: number) { return <div /> }",
        )]);
        let module = module(&package, "lib/src/a.js");
        assert_eq!(
            module.declaration_named("Empty").unwrap().kind(),
            DeclarationKind::Component
        );
        assert_eq!(
            module.declaration_named("Card").unwrap().kind(),
            DeclarationKind::Component
        );
        assert_eq!(
            module.declaration_named("Many").unwrap().kind(),
            DeclarationKind::Function
        );
        let Declaration::Function(sum) = module.declaration_named("sum").unwrap() else {
            panic!("expected function");
        };
        assert_eq!(sum.parameters[1].default_value.as_deref(), Some("2"));
        assert!(sum.parameters[1].optional);
        assert_eq!(sum.return_type, TypeBound::named("number"));
    }

    #[test]
    fn test_component_shape_boundaries() {
        let (package, _) = extract(&[(
            "/pkg/src/a.tsx",
            "import * as React from 'react'\n\
             type Props = { label: string }\n\
             export function Pair(props: Props, ref: any) { return <div /> }\n\
             export const Arrow = (props: Props, ref: any) => <div />\n\
             export class NeedsArgs extends React.Component<Props> {\n  render(mode: number) { return <div /> }\n}\n\
             export class Counts extends React.Component<Props> {\n  render() { return 1 }\n}\n\
             export class Inherited extends React.Component<Props> {}\n\
             export class PropsOnly {\n  props: Props = { label: '' }\n}\n\
             export class RenderOnly {\n  render() { return <div /> }\n}",
        )]);
        let module = module(&package, "lib/src/a.js");

        for name in ["Pair", "Arrow"] {
            let Declaration::Component(component) = module.declaration_named(name).unwrap() else {
                panic!("expected {} to be a component", name);
            };
            assert_eq!(component.properties.len(), 1);
            assert_eq!(component.properties[0].name, "label");
        }
        for name in ["NeedsArgs", "Counts", "Inherited", "PropsOnly", "RenderOnly"] {
            assert_eq!(
                module.declaration_named(name).unwrap().kind(),
                DeclarationKind::Class,
                "{} should be a class",
                name
            );
        }
    }

    #[test]
    fn test_overloads_produce_one_declaration() {
        let (package, _) = extract(&[(
            "/pkg/src/a.ts",
            "export function pick(a: string): string\nexport function pick(a: number): number\nexport function pick(a: any) { return a }",
        )]);
        let module = module(&package, "lib/src/a.js");
        assert_eq!(module.declarations.len(), 1);
        let Declaration::Function(pick) = module.declaration_named("pick").unwrap() else {
            panic!("expected function");
        };
        assert_eq!(pick.parameters[0].ty, TypeBound::named("string"));
    }

    #[test]
    fn test_default_exports() {
        let (package, _) = extract(&[
            ("/pkg/src/a.ts", "export default function main() {}"),
            ("/pkg/src/b.ts", "export default class {}"),
        ]);
        let a = module(&package, "lib/src/a.js");
        assert_eq!(a.declarations.len(), 1);
        assert!(a.declaration_named("main").is_some());
        assert!(module(&package, "lib/src/b.js").declarations.is_empty());
    }

    #[test]
    fn test_reexport_edges() {
        let (package, stars) = extract(&[
            ("/pkg/src/a.ts", "export const X = 1"),
            (
                "/pkg/src/index.ts",
                "export {X as Y, X} from './a'\nexport * from './a'\nexport {useState} from 'react'\nexport {Gone} from './gone'",
            ),
        ]);
        let index = module(&package, "lib/src/index.js");
        assert_eq!(
            index.reexports,
            vec![
                Reexport::unresolved("Y", "X", "lib/src/a.js"),
                Reexport::unresolved("X", "X", "lib/src/a.js"),
                Reexport::unresolved("Gone", "Gone", "lib/src/gone.js"),
            ]
        );
        assert_eq!(
            stars,
            vec![StarExport {
                module: "lib/src/index.js".to_string(),
                from: "lib/src/a.js".to_string(),
            }]
        );
    }

    #[test]
    fn test_colliding_output_paths_keep_first_module() {
        let (package, _) = extract(&[
            ("/pkg/src/a.ts", "export const X = 1"),
            ("/pkg/src/a.tsx", "export const Y = 2"),
        ]);
        let keys: Vec<&str> = package.modules.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["lib/src/a.js"]);
        let a = module(&package, "lib/src/a.js");
        assert_eq!(a.src_path, "src/a.ts");
        assert!(a.declaration_named("X").is_some());
        assert!(a.declaration_named("Y").is_none());
        for id in package.declaration_module.keys() {
            assert!(package.declaration(id).is_some());
        }
    }

    #[test]
    fn test_ids_are_sequential_per_run() {
        let (package, _) = extract(&[(
            "/pkg/src/a.ts",
            "export const A = 1\nexport const B = 2\nexport type C = { c: string }",
        )]);
        let ids: Vec<&str> = package.declaration_module.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
    }
}
