//! Symbol binding
//!
//! Walks every file of a [`Program`] once and records what each name means:
//! per-file locals and exports, the shared global scope (script files and
//! `declare global` blocks), and namespace members. Type and value meanings
//! live in separate spaces, so `interface Array<T>` and `declare var Array`
//! coexist. Imports and re-exports bind alias symbols that are followed
//! lazily through [`Bindings::resolve_alias`].

use super::program::{FileId, ModuleTarget, Program};
use crate::utils::swc::{module_export_name, str_value};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::{BytePos, Spanned};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::trace;

const MAX_ALIAS_DEPTH: usize = 32;

/// Index of a symbol in [`Bindings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

/// Which meaning of a name is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    Type,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    TypeAlias,
    Interface,
    Class,
    Function,
    Variable,
    Enum,
    Namespace,
    /// Import or export specifier, resolved on demand
    Alias,
    /// Binding from a package with no typings
    External,
    /// `import * as ns` of a file in the program
    ModuleNamespace,
}

/// The binding an import refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportName {
    Named(String),
    Default,
    Namespace,
}

/// Syntax behind a declaration
#[derive(Debug, Clone)]
pub enum DeclNode<'p> {
    TypeAlias(&'p swc_ast::TsTypeAliasDecl),
    Interface(&'p swc_ast::TsInterfaceDecl),
    Class(&'p swc_ast::Class),
    Function(&'p swc_ast::Function),
    Variable {
        declarator: &'p swc_ast::VarDeclarator,
        kind: swc_ast::VarDeclKind,
    },
    Enum(&'p swc_ast::TsEnumDecl),
    Namespace,
    /// `import {a as b} from 'm'`, `export {a} from 'm'`
    Import { specifier: String, name: ImportName },
    /// `export {a as b}`, `export default a`
    LocalAlias(String),
    External { module: String },
    ModuleNamespace(FileId),
}

/// One declaration of a symbol
#[derive(Debug, Clone)]
pub struct Declaration<'p> {
    pub file: FileId,
    /// Where the leading doc comment of the statement sits
    pub doc_pos: BytePos,
    pub node: DeclNode<'p>,
}

/// Names bound in one scope
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub types: IndexMap<String, SymbolId>,
    pub values: IndexMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn get(&self, space: Space, name: &str) -> Option<SymbolId> {
        match space {
            Space::Type => self.types.get(name).copied(),
            Space::Value => self.values.get(name).copied(),
        }
    }

    fn insert(&mut self, space: Space, name: &str, id: SymbolId) {
        let map = match space {
            Space::Type => &mut self.types,
            Space::Value => &mut self.values,
        };
        map.entry(name.to_string()).or_insert(id);
    }
}

#[derive(Debug, Clone)]
pub struct Symbol<'p> {
    pub name: String,
    pub kind: SymbolKind,
    /// Enclosing namespace
    pub parent: Option<SymbolId>,
    /// Declared in the global scope
    pub global: bool,
    pub decls: Vec<Declaration<'p>>,
    /// Namespace members
    pub members: SymbolTable,
}

impl<'p> Symbol<'p> {
    /// File of the first declaration
    pub fn file(&self) -> Option<FileId> {
        self.decls.first().map(|d| d.file)
    }
}

/// Per-file scope
#[derive(Debug, Clone, Default)]
pub struct FileScope {
    pub is_module: bool,
    pub locals: SymbolTable,
    pub exports: SymbolTable,
    /// Specifiers of `export * from '...'`
    pub star_exports: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    File(FileId),
    Global,
    Namespace(SymbolId),
}

#[derive(Debug, Clone, Copy)]
struct Context {
    file: FileId,
    target: Target,
    parent: Option<SymbolId>,
    global: bool,
}

/// All symbols of a program
#[derive(Debug)]
pub struct Bindings<'p> {
    program: &'p Program,
    symbols: Vec<Symbol<'p>>,
    files: Vec<FileScope>,
    global: SymbolTable,
    externals: HashMap<(String, String), SymbolId>,
    module_namespaces: HashMap<FileId, SymbolId>,
}

impl<'p> Bindings<'p> {
    /// Bind every file of the program
    pub fn bind(program: &'p Program) -> Self {
        let mut bindings = Self {
            program,
            symbols: Vec::new(),
            files: Vec::new(),
            global: SymbolTable::default(),
            externals: HashMap::new(),
            module_namespaces: HashMap::new(),
        };

        for (id, file) in program.files() {
            let is_module = file.parsed.is_es_module();
            bindings.files.push(FileScope {
                is_module,
                ..Default::default()
            });
            let Some(module) = file.parsed.module() else {
                continue;
            };
            let cx = Context {
                file: id,
                target: if is_module { Target::File(id) } else { Target::Global },
                parent: None,
                global: !is_module,
            };
            for item in &module.body {
                bindings.bind_item(item, cx);
            }
        }

        trace!("bound {} symbols", bindings.symbols.len());
        bindings
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol<'p> {
        &self.symbols[id.0 as usize]
    }

    pub fn file_scope(&self, file: FileId) -> &FileScope {
        &self.files[file.0 as usize]
    }

    fn table_mut(&mut self, target: Target) -> &mut SymbolTable {
        match target {
            Target::File(file) => &mut self.files[file.0 as usize].locals,
            Target::Global => &mut self.global,
            Target::Namespace(ns) => &mut self.symbols[ns.0 as usize].members,
        }
    }

    fn table(&self, target: Target) -> &SymbolTable {
        match target {
            Target::File(file) => &self.files[file.0 as usize].locals,
            Target::Global => &self.global,
            Target::Namespace(ns) => &self.symbols[ns.0 as usize].members,
        }
    }

    fn new_symbol(&mut self, symbol: Symbol<'p>) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Bind a name, merging interfaces, overloads and namespaces
    fn declare(
        &mut self,
        cx: Context,
        spaces: &[Space],
        name: &str,
        kind: SymbolKind,
        decl: Declaration<'p>,
    ) -> SymbolId {
        let mergeable = matches!(
            kind,
            SymbolKind::Interface | SymbolKind::Function | SymbolKind::Namespace
        );
        let existing = spaces
            .iter()
            .find_map(|space| self.table(cx.target).get(*space, name))
            .filter(|id| mergeable && self.symbol(*id).kind == kind);

        if let Some(id) = existing {
            self.symbols[id.0 as usize].decls.push(decl);
            return id;
        }

        let id = self.new_symbol(Symbol {
            name: name.to_string(),
            kind,
            parent: cx.parent,
            global: cx.global,
            decls: vec![decl],
            members: SymbolTable::default(),
        });
        let table = self.table_mut(cx.target);
        for space in spaces {
            table.insert(*space, name, id);
        }
        id
    }

    fn export(&mut self, file: FileId, space: Space, name: &str, id: SymbolId) {
        self.files[file.0 as usize].exports.insert(space, name, id);
    }

    fn bind_item(&mut self, item: &'p swc_ast::ModuleItem, cx: Context) {
        let doc_pos = item.span().lo;
        match item {
            swc_ast::ModuleItem::Stmt(swc_ast::Stmt::Decl(decl)) => {
                self.bind_decl(decl, cx, doc_pos);
            }
            swc_ast::ModuleItem::Stmt(_) => {}
            swc_ast::ModuleItem::ModuleDecl(module_decl) => {
                self.bind_module_decl(module_decl, cx, doc_pos)
            }
        }
    }

    fn bind_module_decl(&mut self, decl: &'p swc_ast::ModuleDecl, cx: Context, doc_pos: BytePos) {
        let file = cx.file;
        let in_file_scope = matches!(cx.target, Target::File(_));

        match decl {
            swc_ast::ModuleDecl::ExportDecl(export) => {
                let bound = self.bind_decl(&export.decl, cx, doc_pos);
                if in_file_scope {
                    for (space, name, id) in bound {
                        self.export(file, space, &name, id);
                    }
                }
            }
            swc_ast::ModuleDecl::ExportDefaultDecl(export) => {
                let (spaces, name, kind, node): (&[Space], _, _, _) = match &export.decl {
                    swc_ast::DefaultDecl::Class(class) => (
                        &[Space::Type, Space::Value],
                        class.ident.as_ref().map(|i| i.sym.to_string()),
                        SymbolKind::Class,
                        DeclNode::Class(&class.class),
                    ),
                    swc_ast::DefaultDecl::Fn(function) => (
                        &[Space::Value],
                        function.ident.as_ref().map(|i| i.sym.to_string()),
                        SymbolKind::Function,
                        DeclNode::Function(&function.function),
                    ),
                    swc_ast::DefaultDecl::TsInterfaceDecl(iface) => (
                        &[Space::Type],
                        Some(iface.id.sym.to_string()),
                        SymbolKind::Interface,
                        DeclNode::Interface(iface),
                    ),
                };
                let decl = Declaration { file, doc_pos, node };
                let id = self.declare(
                    cx,
                    spaces,
                    name.as_deref().unwrap_or("default"),
                    kind,
                    decl,
                );
                for space in spaces {
                    self.export(file, *space, "default", id);
                }
            }
            swc_ast::ModuleDecl::ExportDefaultExpr(export) => {
                if let swc_ast::Expr::Ident(ident) = export.expr.as_ref() {
                    let id = self.alias_symbol(
                        cx,
                        "default",
                        DeclNode::LocalAlias(ident.sym.to_string()),
                        doc_pos,
                    );
                    self.export(file, Space::Type, "default", id);
                    self.export(file, Space::Value, "default", id);
                }
            }
            swc_ast::ModuleDecl::ExportNamed(named) => {
                for specifier in &named.specifiers {
                    let (exported, node) = match (specifier, named.src.as_deref()) {
                        (swc_ast::ExportSpecifier::Named(s), src) => {
                            let orig = module_export_name(&s.orig);
                            let exported = s
                                .exported
                                .as_ref()
                                .map(module_export_name)
                                .unwrap_or_else(|| orig.clone());
                            let node = match src {
                                Some(src) => DeclNode::Import {
                                    specifier: str_value(src),
                                    name: ImportName::Named(orig),
                                },
                                None => DeclNode::LocalAlias(orig),
                            };
                            (exported, node)
                        }
                        (swc_ast::ExportSpecifier::Namespace(s), Some(src)) => (
                            module_export_name(&s.name),
                            DeclNode::Import {
                                specifier: str_value(src),
                                name: ImportName::Namespace,
                            },
                        ),
                        (swc_ast::ExportSpecifier::Default(s), Some(src)) => (
                            s.exported.sym.to_string(),
                            DeclNode::Import {
                                specifier: str_value(src),
                                name: ImportName::Default,
                            },
                        ),
                        _ => continue,
                    };
                    let alias = self.new_alias(cx, &exported, node, doc_pos);
                    self.export(file, Space::Type, &exported, alias);
                    self.export(file, Space::Value, &exported, alias);
                }
            }
            swc_ast::ModuleDecl::ExportAll(all) => {
                self.files[file.0 as usize]
                    .star_exports
                    .push(str_value(&all.src));
            }
            swc_ast::ModuleDecl::Import(import) => {
                let specifier = str_value(&import.src);
                for spec in &import.specifiers {
                    let (local, name) = match spec {
                        swc_ast::ImportSpecifier::Named(s) => (
                            s.local.sym.to_string(),
                            ImportName::Named(
                                s.imported
                                    .as_ref()
                                    .map(module_export_name)
                                    .unwrap_or_else(|| s.local.sym.to_string()),
                            ),
                        ),
                        swc_ast::ImportSpecifier::Default(s) => {
                            (s.local.sym.to_string(), ImportName::Default)
                        }
                        swc_ast::ImportSpecifier::Namespace(s) => {
                            (s.local.sym.to_string(), ImportName::Namespace)
                        }
                    };
                    let node = DeclNode::Import {
                        specifier: specifier.clone(),
                        name,
                    };
                    self.alias_symbol(cx, &local, node, doc_pos);
                }
            }
            _ => {}
        }
    }

    /// Alias bound in the local scope
    fn alias_symbol(
        &mut self,
        cx: Context,
        name: &str,
        node: DeclNode<'p>,
        doc_pos: BytePos,
    ) -> SymbolId {
        let decl = Declaration {
            file: cx.file,
            doc_pos,
            node,
        };
        self.declare(cx, &[Space::Type, Space::Value], name, SymbolKind::Alias, decl)
    }

    /// Alias reachable only through the export table
    fn new_alias(
        &mut self,
        cx: Context,
        name: &str,
        node: DeclNode<'p>,
        doc_pos: BytePos,
    ) -> SymbolId {
        self.new_symbol(Symbol {
            name: name.to_string(),
            kind: SymbolKind::Alias,
            parent: cx.parent,
            global: false,
            decls: vec![Declaration {
                file: cx.file,
                doc_pos,
                node,
            }],
            members: SymbolTable::default(),
        })
    }

    /// Bind a declaration; returns what was bound so exports can mirror it
    fn bind_decl(
        &mut self,
        decl: &'p swc_ast::Decl,
        cx: Context,
        doc_pos: BytePos,
    ) -> Vec<(Space, String, SymbolId)> {
        const BOTH: &[Space] = &[Space::Type, Space::Value];
        let mut bound = Vec::new();

        match decl {
            swc_ast::Decl::Class(class) => self.bind_name(
                cx,
                doc_pos,
                BOTH,
                class.ident.sym.to_string(),
                SymbolKind::Class,
                DeclNode::Class(&class.class),
                &mut bound,
            ),
            swc_ast::Decl::Fn(function) => self.bind_name(
                cx,
                doc_pos,
                &[Space::Value],
                function.ident.sym.to_string(),
                SymbolKind::Function,
                DeclNode::Function(&function.function),
                &mut bound,
            ),
            swc_ast::Decl::Var(var) => {
                for declarator in &var.decls {
                    if let swc_ast::Pat::Ident(ident) = &declarator.name {
                        self.bind_name(
                            cx,
                            doc_pos,
                            &[Space::Value],
                            ident.id.sym.to_string(),
                            SymbolKind::Variable,
                            DeclNode::Variable {
                                declarator,
                                kind: var.kind,
                            },
                            &mut bound,
                        );
                    }
                }
            }
            swc_ast::Decl::TsInterface(iface) => self.bind_name(
                cx,
                doc_pos,
                &[Space::Type],
                iface.id.sym.to_string(),
                SymbolKind::Interface,
                DeclNode::Interface(iface),
                &mut bound,
            ),
            swc_ast::Decl::TsTypeAlias(alias) => self.bind_name(
                cx,
                doc_pos,
                &[Space::Type],
                alias.id.sym.to_string(),
                SymbolKind::TypeAlias,
                DeclNode::TypeAlias(alias),
                &mut bound,
            ),
            swc_ast::Decl::TsEnum(ts_enum) => self.bind_name(
                cx,
                doc_pos,
                BOTH,
                ts_enum.id.sym.to_string(),
                SymbolKind::Enum,
                DeclNode::Enum(ts_enum),
                &mut bound,
            ),
            swc_ast::Decl::TsModule(module) => {
                if let Some((name, id)) = self.bind_namespace(module, cx, doc_pos) {
                    bound.push((Space::Type, name.clone(), id));
                    bound.push((Space::Value, name, id));
                }
            }
            _ => {}
        }
        bound
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_name(
        &mut self,
        cx: Context,
        doc_pos: BytePos,
        spaces: &[Space],
        name: String,
        kind: SymbolKind,
        node: DeclNode<'p>,
        bound: &mut Vec<(Space, String, SymbolId)>,
    ) {
        let decl = Declaration {
            file: cx.file,
            doc_pos,
            node,
        };
        let id = self.declare(cx, spaces, &name, kind, decl);
        for space in spaces {
            bound.push((*space, name.clone(), id));
        }
    }

    fn bind_namespace(
        &mut self,
        module: &'p swc_ast::TsModuleDecl,
        cx: Context,
        doc_pos: BytePos,
    ) -> Option<(String, SymbolId)> {
        let swc_ast::TsModuleName::Ident(ident) = &module.id else {
            // `declare module 'x'` augmentations are not modeled
            return None;
        };
        let body = module.body.as_ref()?;

        if &*ident.sym == "global" {
            let global_cx = Context {
                file: cx.file,
                target: Target::Global,
                parent: None,
                global: true,
            };
            self.bind_namespace_body(body, global_cx);
            return None;
        }

        let name = ident.sym.to_string();
        let id = self.declare(
            cx,
            &[Space::Type, Space::Value],
            &name,
            SymbolKind::Namespace,
            Declaration {
                file: cx.file,
                doc_pos,
                node: DeclNode::Namespace,
            },
        );
        let inner = Context {
            file: cx.file,
            target: Target::Namespace(id),
            parent: Some(id),
            global: cx.global,
        };
        self.bind_namespace_body(body, inner);
        Some((name, id))
    }

    fn bind_namespace_body(&mut self, body: &'p swc_ast::TsNamespaceBody, cx: Context) {
        match body {
            swc_ast::TsNamespaceBody::TsModuleBlock(block) => {
                for item in &block.body {
                    let doc_pos = item.span().lo;
                    match item {
                        swc_ast::ModuleItem::Stmt(swc_ast::Stmt::Decl(decl)) => {
                            self.bind_decl(decl, cx, doc_pos);
                        }
                        swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::ExportDecl(e)) => {
                            self.bind_decl(&e.decl, cx, doc_pos);
                        }
                        _ => {}
                    }
                }
            }
            swc_ast::TsNamespaceBody::TsNamespaceDecl(nested) => {
                let name = nested.id.sym.to_string();
                let id = self.declare(
                    cx,
                    &[Space::Type, Space::Value],
                    &name,
                    SymbolKind::Namespace,
                    Declaration {
                        file: cx.file,
                        doc_pos: nested.span.lo,
                        node: DeclNode::Namespace,
                    },
                );
                let inner = Context {
                    file: cx.file,
                    target: Target::Namespace(id),
                    parent: Some(id),
                    global: cx.global,
                };
                self.bind_namespace_body(&nested.body, inner);
            }
        }
    }

    /// Resolve a name as seen from `file`, inside namespace `ns` if any
    pub fn lookup(
        &self,
        file: FileId,
        ns: Option<SymbolId>,
        space: Space,
        name: &str,
    ) -> Option<SymbolId> {
        let mut current = ns;
        while let Some(namespace) = current {
            let symbol = self.symbol(namespace);
            if let Some(id) = symbol.members.get(space, name) {
                return Some(id);
            }
            current = symbol.parent;
        }
        let scope = self.file_scope(file);
        if scope.is_module {
            if let Some(id) = scope.locals.get(space, name) {
                return Some(id);
            }
        }
        self.global.get(space, name)
    }

    /// Resolve a global name
    pub fn global(&self, space: Space, name: &str) -> Option<SymbolId> {
        self.global.get(space, name)
    }

    /// Follow alias symbols to the declaration they stand for
    pub fn resolve_alias(&mut self, id: SymbolId, space: Space) -> Option<SymbolId> {
        self.resolve_alias_depth(id, space, 0)
    }

    fn resolve_alias_depth(&mut self, id: SymbolId, space: Space, depth: usize) -> Option<SymbolId> {
        if depth > MAX_ALIAS_DEPTH {
            return None;
        }
        let symbol = self.symbol(id);
        if symbol.kind != SymbolKind::Alias {
            return Some(id);
        }
        let decl = symbol.decls.first()?.clone();

        match decl.node {
            DeclNode::LocalAlias(local) => {
                let target = self.file_scope(decl.file).locals.get(space, &local)?;
                self.resolve_alias_depth(target, space, depth + 1)
            }
            DeclNode::Import { specifier, name } => {
                match self.program.resolve_module(decl.file, &specifier)? {
                    ModuleTarget::File(target) => match name {
                        ImportName::Named(n) => self.export_depth(target, space, &n, depth + 1),
                        ImportName::Default => {
                            self.export_depth(target, space, "default", depth + 1)
                        }
                        ImportName::Namespace => Some(self.module_namespace(target)),
                    },
                    ModuleTarget::External => {
                        let export = match name {
                            ImportName::Named(n) => n,
                            ImportName::Default => "default".to_string(),
                            ImportName::Namespace => "*".to_string(),
                        };
                        Some(self.external(&specifier, &export))
                    }
                }
            }
            _ => Some(id),
        }
    }

    /// Exported symbol `name` of `file`, following aliases and star exports
    pub fn export_of(&mut self, file: FileId, space: Space, name: &str) -> Option<SymbolId> {
        self.export_depth(file, space, name, 0)
    }

    fn export_depth(
        &mut self,
        file: FileId,
        space: Space,
        name: &str,
        depth: usize,
    ) -> Option<SymbolId> {
        if depth > MAX_ALIAS_DEPTH {
            return None;
        }
        if let Some(id) = self.file_scope(file).exports.get(space, name) {
            return self.resolve_alias_depth(id, space, depth + 1);
        }
        if name == "default" {
            return None;
        }
        for specifier in self.file_scope(file).star_exports.clone() {
            if let Some(ModuleTarget::File(target)) = self.program.resolve_module(file, &specifier)
            {
                if let Some(id) = self.export_depth(target, space, name, depth + 1) {
                    return Some(id);
                }
            }
        }
        None
    }

    /// Names of all value exports of `file`, star exports included
    pub fn export_names(&self, file: FileId) -> Vec<String> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        self.collect_export_names(file, &mut names, &mut seen);
        names
    }

    fn collect_export_names(
        &self,
        file: FileId,
        names: &mut Vec<String>,
        seen: &mut HashSet<FileId>,
    ) {
        if !seen.insert(file) {
            return;
        }
        let scope = self.file_scope(file);
        for name in scope.exports.values.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        for specifier in &scope.star_exports {
            if let Some(ModuleTarget::File(target)) = self.program.resolve_module(file, specifier) {
                self.collect_export_names(target, names, seen);
            }
        }
    }

    /// Member `name` of a namespace-like symbol
    pub fn member(&mut self, container: SymbolId, space: Space, name: &str) -> Option<SymbolId> {
        let container = self.resolve_alias(container, space)?;
        let symbol = self.symbol(container);
        match (&symbol.kind, symbol.decls.first().map(|d| &d.node)) {
            (SymbolKind::Namespace, _) => symbol.members.get(space, name),
            (SymbolKind::ModuleNamespace, Some(DeclNode::ModuleNamespace(file))) => {
                let file = *file;
                self.export_of(file, space, name)
            }
            (SymbolKind::External, Some(DeclNode::External { module })) => {
                let module = module.clone();
                Some(self.external(&module, name))
            }
            _ => None,
        }
    }

    /// Symbol standing for `import * as ns` of a program file
    pub fn module_namespace(&mut self, file: FileId) -> SymbolId {
        if let Some(id) = self.module_namespaces.get(&file) {
            return *id;
        }
        let name = crate::utils::paths::module_name(&self.program.file(file).path);
        let id = self.new_symbol(Symbol {
            name,
            kind: SymbolKind::ModuleNamespace,
            parent: None,
            global: false,
            decls: vec![Declaration {
                file,
                doc_pos: BytePos(0),
                node: DeclNode::ModuleNamespace(file),
            }],
            members: SymbolTable::default(),
        });
        self.module_namespaces.insert(file, id);
        id
    }

    /// Symbol for a binding of a package without typings
    pub fn external(&mut self, module: &str, name: &str) -> SymbolId {
        let key = (module.to_string(), name.to_string());
        if let Some(id) = self.externals.get(&key) {
            return *id;
        }
        // Externals have no file of their own; the first declaration points
        // at file 0 and the origin path comes from the module name
        let id = self.new_symbol(Symbol {
            name: name.to_string(),
            kind: SymbolKind::External,
            parent: None,
            global: false,
            decls: vec![Declaration {
                file: FileId(0),
                doc_pos: BytePos(0),
                node: DeclNode::External {
                    module: module.to_string(),
                },
            }],
            members: SymbolTable::default(),
        });
        self.externals.insert(key, id);
        id
    }
}
