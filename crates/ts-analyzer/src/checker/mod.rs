//! A bounded TypeScript type checker
//!
//! The analyzer needs a resolved type for every exported declaration, but
//! not the diagnostics of a full compiler. This checker binds a
//! [`Program`], lowers type annotations into a [`TypeArena`], and infers
//! the types of unannotated values from their initializers and `return`
//! statements.
//!
//! Everything is computed lazily and cached per symbol or per type, so the
//! identity of a declared type stays stable for the whole run.

pub mod binder;
mod infer;
mod lower;
pub mod program;
pub mod types;

pub use binder::{Bindings, DeclNode, Declaration, Space, Symbol, SymbolId, SymbolKind};
pub use program::{FileId, ModuleTarget, Program, SourceFile};
pub use types::{
    AliasRef, IndexInfo, Intrinsic, Modifier, ObjectShape, Parameter, Property, Signature,
    TypeArena, TypeData, TypeId, TypeInfo, TypeParameter,
};

use crate::embed;
use crate::js_doc::DocComment;
use deno_ast::swc::common::BytePos;
use infer::InferEnv;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::trace;

pub(crate) const MAX_DEPTH: usize = 32;

/// Fully qualified name of the element type JSX expressions produce
pub const JSX_ELEMENT: &str = "global.JSX.Element";

/// Substitution of type parameters
pub(crate) type TypeMap = HashMap<TypeId, TypeId>;

/// Where a type annotation is resolved
#[derive(Debug, Clone)]
pub(crate) struct TypeScope {
    pub file: FileId,
    pub namespace: Option<SymbolId>,
    params: Rc<Vec<(String, TypeId)>>,
    pub this_type: Option<TypeId>,
}

impl TypeScope {
    pub fn new(file: FileId, namespace: Option<SymbolId>) -> Self {
        Self {
            file,
            namespace,
            params: Rc::new(Vec::new()),
            this_type: None,
        }
    }

    pub fn with_params(&self, params: impl IntoIterator<Item = (String, TypeId)>) -> Self {
        let mut all = (*self.params).clone();
        all.extend(params);
        Self {
            params: Rc::new(all),
            ..self.clone()
        }
    }

    pub fn with_this(&self, this_type: TypeId) -> Self {
        Self {
            this_type: Some(this_type),
            ..self.clone()
        }
    }

    pub fn param(&self, name: &str) -> Option<TypeId> {
        self.params
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }
}

/// Type-checking context shared by one analysis run
#[derive(Debug)]
pub struct Checker<'p> {
    program: &'p Program,
    bindings: Bindings<'p>,
    arena: TypeArena,
    declared: HashMap<SymbolId, TypeId>,
    declaring: HashSet<SymbolId>,
    values: HashMap<SymbolId, TypeId>,
    resolving: HashSet<SymbolId>,
    type_params: HashMap<SymbolId, Vec<TypeId>>,
    structures: HashMap<SymbolId, Rc<ObjectShape>>,
    building: HashSet<SymbolId>,
    shapes: HashMap<TypeId, Rc<ObjectShape>>,
    shaping: HashSet<TypeId>,
    evaluated: HashMap<TypeId, TypeId>,
    evaluating: HashSet<TypeId>,
    jsx_element: Option<Option<TypeId>>,
}

impl<'p> Checker<'p> {
    /// Bind the program and set up an empty type arena
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            bindings: Bindings::bind(program),
            arena: TypeArena::new(),
            declared: HashMap::new(),
            declaring: HashSet::new(),
            values: HashMap::new(),
            resolving: HashSet::new(),
            type_params: HashMap::new(),
            structures: HashMap::new(),
            building: HashSet::new(),
            shapes: HashMap::new(),
            shaping: HashSet::new(),
            evaluated: HashMap::new(),
            evaluating: HashSet::new(),
            jsx_element: None,
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn info(&self, ty: TypeId) -> &TypeInfo {
        self.arena.info(ty)
    }

    pub fn data(&self, ty: TypeId) -> &TypeData {
        self.arena.data(ty)
    }

    pub fn alias(&self, ty: TypeId) -> Option<&AliasRef> {
        self.arena.alias(ty)
    }

    pub fn is_boolean(&self, ty: TypeId) -> bool {
        self.arena.is_boolean(ty)
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol<'p> {
        self.bindings.symbol(id)
    }

    /// Resolve a name in the top-level scope of `file`
    pub fn lookup(&self, file: FileId, space: Space, name: &str) -> Option<SymbolId> {
        self.bindings.lookup(file, None, space, name)
    }

    pub(crate) fn any(&self) -> TypeId {
        self.arena.any()
    }

    pub(crate) fn intrinsic(&self, intrinsic: Intrinsic) -> TypeId {
        self.arena.intrinsic(intrinsic)
    }

    /// Scope a symbol's own declarations are resolved in
    pub(crate) fn symbol_scope(&self, sym: SymbolId) -> TypeScope {
        let symbol = self.symbol(sym);
        TypeScope::new(symbol.file().unwrap_or(FileId(0)), symbol.parent)
    }

    fn symbol_decls(&self, sym: SymbolId) -> Vec<Declaration<'p>> {
        self.symbol(sym).decls.clone()
    }

    /// Doc comment leading a position in a file
    pub(crate) fn doc_at(&self, file: FileId, pos: BytePos) -> DocComment {
        self.program.file(file).parsed.doc_at(pos)
    }

    /// Description of the first documented declaration of a symbol
    pub fn documentation(&self, sym: SymbolId) -> String {
        self.symbol(sym)
            .decls
            .iter()
            .filter(|d| {
                !matches!(
                    d.node,
                    DeclNode::External { .. } | DeclNode::ModuleNamespace(_)
                )
            })
            .map(|d| self.doc_at(d.file, d.doc_pos).text())
            .find(|text| !text.is_empty())
            .unwrap_or_default()
    }

    /// Full doc comment of the first documented declaration
    pub fn doc_comment(&self, sym: SymbolId) -> DocComment {
        self.symbol(sym)
            .decls
            .iter()
            .filter(|d| {
                !matches!(
                    d.node,
                    DeclNode::External { .. } | DeclNode::ModuleNamespace(_)
                )
            })
            .map(|d| self.doc_at(d.file, d.doc_pos))
            .find(|doc| !doc.is_empty())
            .unwrap_or_default()
    }

    /// Type a symbol denotes in type position
    pub fn declared_type(&mut self, sym: SymbolId) -> TypeId {
        if let Some(ty) = self.declared.get(&sym) {
            return *ty;
        }
        let kind = self.symbol(sym).kind;
        let ty = match kind {
            SymbolKind::TypeAlias => return self.declared_alias_type(sym),
            SymbolKind::Interface | SymbolKind::Class => {
                let params = self.symbol_type_parameters(sym);
                self.arena.reference(sym, params)
            }
            SymbolKind::Alias => match self.bindings.resolve_alias(sym, Space::Type) {
                Some(target) if target != sym => self.declared_type(target),
                _ => {
                    let name = self.symbol(sym).name.clone();
                    self.unresolved(name, Vec::new())
                }
            },
            _ => {
                let name = self.display_name(sym);
                self.arena.alloc(TypeData::Opaque {
                    name,
                    args: Vec::new(),
                    symbol: Some(sym),
                })
            }
        };
        self.declared.insert(sym, ty);
        ty
    }

    fn declared_alias_type(&mut self, sym: SymbolId) -> TypeId {
        let decl = self.symbol_decls(sym).into_iter().find_map(|d| match d.node {
            DeclNode::TypeAlias(alias) => Some((d.file, alias)),
            _ => None,
        });
        let Some((file, alias)) = decl else {
            return self.any();
        };

        // Reserved first so self references inside the body resolve to it
        let name = self.symbol(sym).name.clone();
        let reserved = self.arena.alloc(TypeData::Opaque {
            name,
            args: Vec::new(),
            symbol: Some(sym),
        });
        self.declared.insert(sym, reserved);

        let params = self.symbol_type_parameters(sym);
        let names = alias
            .type_params
            .as_deref()
            .map(|p| p.params.iter().map(|p| p.name.sym.to_string()).collect())
            .unwrap_or_else(Vec::new);
        let scope = TypeScope::new(file, self.symbol(sym).parent)
            .with_params(names.into_iter().zip(params.iter().copied()));
        self.declaring.insert(sym);
        let body = self.lower_type(&alias.type_ann, &scope);
        self.declaring.remove(&sym);
        let data = self.arena.data(body).clone();

        let carries_alias = !self.arena.is_boolean(body)
            && matches!(
                data,
                TypeData::Object(_)
                    | TypeData::Union(_)
                    | TypeData::Intersection(_)
                    | TypeData::Tuple(_)
                    | TypeData::Mapped(_)
                    | TypeData::IndexedAccess { .. }
                    | TypeData::KeyOf(_)
                    | TypeData::Opaque { symbol: None, .. }
            );

        if carries_alias {
            self.arena.set(
                reserved,
                TypeInfo {
                    data,
                    alias: Some(AliasRef {
                        symbol: sym,
                        args: params,
                    }),
                },
            );
            reserved
        } else {
            self.arena.set(reserved, TypeInfo { data, alias: None });
            self.declared.insert(sym, body);
            body
        }
    }

    /// Type parameters declared by an alias, interface or class
    pub fn symbol_type_parameters(&mut self, sym: SymbolId) -> Vec<TypeId> {
        if let Some(params) = self.type_params.get(&sym) {
            return params.clone();
        }
        let decl = self.symbol_decls(sym).into_iter().find_map(|d| {
            let params = match d.node {
                DeclNode::TypeAlias(alias) => alias.type_params.as_deref(),
                DeclNode::Interface(iface) => iface.type_params.as_deref(),
                DeclNode::Class(class) => class.type_params.as_deref(),
                _ => None,
            };
            params.map(|p| (d.file, p))
        });
        let Some((file, decl)) = decl else {
            self.type_params.insert(sym, Vec::new());
            return Vec::new();
        };

        let scope = TypeScope::new(file, self.symbol(sym).parent);
        let ids = self.declare_type_params(decl, &scope, |checker, ids| {
            checker.type_params.insert(sym, ids.to_vec());
        });
        ids
    }

    /// Type a value symbol has
    pub fn type_of_symbol(&mut self, sym: SymbolId) -> TypeId {
        if let Some(ty) = self.values.get(&sym) {
            return *ty;
        }
        if !self.resolving.insert(sym) {
            return self.any();
        }
        let ty = self.compute_type_of_symbol(sym);
        self.resolving.remove(&sym);
        self.values.insert(sym, ty);
        ty
    }

    fn compute_type_of_symbol(&mut self, sym: SymbolId) -> TypeId {
        let kind = self.symbol(sym).kind;
        match kind {
            SymbolKind::Variable => self.variable_type(sym),
            SymbolKind::Function => {
                let call = self.function_signatures(sym);
                self.arena.object(ObjectShape {
                    call,
                    symbol: Some(sym),
                    ..Default::default()
                })
            }
            SymbolKind::Class => {
                let construct = self.class_construct_signatures(sym);
                self.arena.object(ObjectShape {
                    construct,
                    symbol: Some(sym),
                    ..Default::default()
                })
            }
            SymbolKind::Alias => match self.bindings.resolve_alias(sym, Space::Value) {
                Some(target) if target != sym => self.type_of_symbol(target),
                _ => self.any(),
            },
            SymbolKind::Namespace | SymbolKind::ModuleNamespace => self.namespace_object(sym),
            SymbolKind::Enum | SymbolKind::External => self.declared_type(sym),
            SymbolKind::TypeAlias | SymbolKind::Interface => self.any(),
        }
    }

    fn variable_type(&mut self, sym: SymbolId) -> TypeId {
        let decl = self.symbol_decls(sym).into_iter().find_map(|d| match d.node {
            DeclNode::Variable { declarator, kind } => Some((declarator, kind)),
            _ => None,
        });
        let Some((declarator, kind)) = decl else {
            return self.any();
        };
        let scope = self.symbol_scope(sym);

        let annotation = match &declarator.name {
            deno_ast::swc::ast::Pat::Ident(binding) => binding.type_ann.as_deref(),
            _ => None,
        };
        if let Some(annotation) = annotation {
            return self.lower_type(&annotation.type_ann, &scope);
        }
        match declarator.init.as_deref() {
            Some(init) => {
                let ty = self.infer_expr(init, &InferEnv::new(scope));
                if kind == deno_ast::swc::ast::VarDeclKind::Const {
                    ty
                } else {
                    self.arena.widen(ty)
                }
            }
            None => self.any(),
        }
    }

    fn function_signatures(&mut self, sym: SymbolId) -> Vec<Signature> {
        let decls: Vec<_> = self
            .symbol_decls(sym)
            .into_iter()
            .filter_map(|d| match d.node {
                DeclNode::Function(function) => Some((d.file, d.doc_pos, function)),
                _ => None,
            })
            .collect();
        let has_body = decls.iter().any(|(_, _, f)| f.body.is_some());
        let overloads = decls.iter().filter(|(_, _, f)| f.body.is_none()).count();

        let parent = self.symbol(sym).parent;
        decls
            .into_iter()
            .filter(|(_, _, f)| !(has_body && overloads > 0) || f.body.is_none())
            .map(|(file, pos, function)| {
                let doc = self.doc_at(file, pos);
                let env = InferEnv::new(TypeScope::new(file, parent));
                self.function_signature(function, &env, &doc)
            })
            .collect()
    }

    /// Object type of a namespace or module namespace import
    fn namespace_object(&mut self, sym: SymbolId) -> TypeId {
        let mut shape = ObjectShape {
            symbol: Some(sym),
            ..Default::default()
        };
        let members: Vec<(String, Option<SymbolId>)> = match self.symbol(sym).decls.first() {
            Some(Declaration {
                node: DeclNode::ModuleNamespace(file),
                ..
            }) => {
                let file = *file;
                self.bindings
                    .export_names(file)
                    .into_iter()
                    .map(|name| {
                        let target = self.bindings.export_of(file, Space::Value, &name);
                        (name, target)
                    })
                    .collect()
            }
            _ => self
                .symbol(sym)
                .members
                .values
                .iter()
                .map(|(name, id)| (name.clone(), Some(*id)))
                .collect(),
        };
        for (name, target) in members {
            let ty = match target {
                Some(target) => self.type_of_symbol(target),
                None => self.any(),
            };
            shape.add_property(Property {
                name,
                ty,
                optional: false,
                readonly: true,
                documentation: String::new(),
            });
        }
        self.arena.object(shape)
    }

    /// A type known only by name
    pub(crate) fn unresolved(&mut self, name: impl Into<String>, args: Vec<TypeId>) -> TypeId {
        self.arena.alloc(TypeData::Opaque {
            name: name.into(),
            args,
            symbol: None,
        })
    }

    /// `Alias<args>` written inside the body of `Alias` itself
    ///
    /// Such references stay unexpanded until their members are needed, so
    /// recursive generic aliases only unfold one level at a time.
    pub(crate) fn deferred_alias_instance(&mut self, sym: SymbolId, args: Vec<TypeId>) -> TypeId {
        let name = self.symbol(sym).name.clone();
        self.arena.alloc_info(TypeInfo {
            data: TypeData::Opaque {
                name,
                args: args.clone(),
                symbol: Some(sym),
            },
            alias: Some(AliasRef { symbol: sym, args }),
        })
    }

    /// Alias and arguments of a deferred alias instance
    fn deferred_alias(&self, ty: TypeId) -> Option<(SymbolId, Vec<TypeId>)> {
        let TypeData::Opaque {
            symbol: Some(symbol),
            ..
        } = self.arena.data(ty)
        else {
            return None;
        };
        let alias = self.arena.alias(ty)?;
        if alias.symbol != *symbol || self.declaring.contains(symbol) {
            return None;
        }
        Some((alias.symbol, alias.args.clone()))
    }

    /// Members of an interface or class instance, before instantiation
    pub(crate) fn structure(&mut self, sym: SymbolId) -> Rc<ObjectShape> {
        if let Some(shape) = self.structures.get(&sym) {
            return shape.clone();
        }
        if !self.building.insert(sym) {
            return Rc::new(ObjectShape::default());
        }
        let shape = match self.symbol(sym).kind {
            SymbolKind::Interface => self.interface_structure(sym),
            SymbolKind::Class => self.class_structure(sym),
            _ => ObjectShape::default(),
        };
        self.building.remove(&sym);
        let shape = Rc::new(shape);
        self.structures.insert(sym, shape.clone());
        shape
    }

    /// Apparent members of a type
    pub(crate) fn shape(&mut self, ty: TypeId) -> Rc<ObjectShape> {
        if let Some(shape) = self.shapes.get(&ty) {
            return shape.clone();
        }
        if !self.shaping.insert(ty) {
            return Rc::new(ObjectShape::default());
        }
        let shape = self.compute_shape(ty);
        self.shaping.remove(&ty);
        self.shapes.insert(ty, shape.clone());
        shape
    }

    fn compute_shape(&mut self, ty: TypeId) -> Rc<ObjectShape> {
        match self.arena.data(ty).clone() {
            TypeData::Object(shape) => shape,
            TypeData::Reference { symbol, args } => {
                let structure = self.structure(symbol);
                let params = self.symbol_type_parameters(symbol);
                if params.is_empty() || params == args {
                    return structure;
                }
                let map: TypeMap = params.into_iter().zip(args).collect();
                Rc::new(self.instantiate_shape(&structure, &map, 0))
            }
            TypeData::Intersection(members) => {
                let mut merged = ObjectShape::default();
                for member in members {
                    let shape = self.shape(member);
                    for property in &shape.properties {
                        match merged.properties.iter().position(|p| p.name == property.name) {
                            Some(index) => {
                                let existing = merged.properties[index].ty;
                                merged.properties[index].ty =
                                    self.arena.intersection([existing, property.ty]);
                            }
                            None => merged.properties.push(property.clone()),
                        }
                    }
                    merged.call.extend(shape.call.iter().cloned());
                    merged.construct.extend(shape.construct.iter().cloned());
                    if merged.string_index.is_none() {
                        merged.string_index = shape.string_index.clone();
                    }
                    if merged.number_index.is_none() {
                        merged.number_index = shape.number_index.clone();
                    }
                }
                Rc::new(merged)
            }
            TypeData::TypeParameter(param) => match param.constraint {
                Some(constraint) => self.shape(constraint),
                None => Rc::new(ObjectShape::default()),
            },
            TypeData::KeyOf(_) | TypeData::IndexedAccess { .. } | TypeData::Mapped(_) => {
                let evaluated = self.evaluate(ty);
                if evaluated == ty {
                    Rc::new(ObjectShape::default())
                } else {
                    self.shape(evaluated)
                }
            }
            TypeData::Intrinsic(Intrinsic::String) | TypeData::StringLiteral(_) => {
                self.global_interface_shape("String")
            }
            TypeData::Intrinsic(Intrinsic::Number) | TypeData::NumberLiteral(_) => {
                self.global_interface_shape("Number")
            }
            TypeData::BooleanLiteral(_) => self.global_interface_shape("Boolean"),
            TypeData::Union(_) if self.arena.is_boolean(ty) => {
                self.global_interface_shape("Boolean")
            }
            TypeData::Intrinsic(Intrinsic::Object) => self.global_interface_shape("Object"),
            TypeData::Tuple(elements) => {
                let element = self.arena.union(elements);
                let array = self.array_of(element);
                self.shape(array)
            }
            TypeData::Opaque { .. } => match self.deferred_alias(ty) {
                Some((sym, args)) => {
                    let expanded = self.alias_instance(sym, args);
                    if expanded == ty || self.deferred_alias(expanded).is_some() {
                        return Rc::new(ObjectShape::default());
                    }
                    self.shape(expanded)
                }
                None => Rc::new(ObjectShape::default()),
            },
            _ => Rc::new(ObjectShape::default()),
        }
    }

    fn global_interface_shape(&mut self, name: &str) -> Rc<ObjectShape> {
        match self.bindings.global(Space::Type, name) {
            Some(sym) => {
                let ty = self.declared_type(sym);
                self.shape(ty)
            }
            None => Rc::new(ObjectShape::default()),
        }
    }

    /// `Array<element>`
    pub(crate) fn array_of(&mut self, element: TypeId) -> TypeId {
        self.global_generic("Array", element)
    }

    /// `Promise<value>`
    pub(crate) fn promise_of(&mut self, value: TypeId) -> TypeId {
        self.global_generic("Promise", value)
    }

    fn global_generic(&mut self, name: &str, arg: TypeId) -> TypeId {
        match self.bindings.global(Space::Type, name) {
            Some(sym) => self.arena.reference(sym, vec![arg]),
            None => self.unresolved(name, vec![arg]),
        }
    }

    pub fn properties(&mut self, ty: TypeId) -> Vec<Property> {
        self.shape(ty).properties.clone()
    }

    pub fn property(&mut self, ty: TypeId, name: &str) -> Option<Property> {
        self.shape(ty).property(name).cloned()
    }

    pub fn call_signatures(&mut self, ty: TypeId) -> Vec<Signature> {
        self.shape(ty).call.clone()
    }

    pub fn construct_signatures(&mut self, ty: TypeId) -> Vec<Signature> {
        self.shape(ty).construct.clone()
    }

    pub fn string_index(&mut self, ty: TypeId) -> Option<IndexInfo> {
        self.shape(ty).string_index.clone()
    }

    /// Substitute type parameters
    pub(crate) fn instantiate(&mut self, ty: TypeId, map: &TypeMap) -> TypeId {
        if map.is_empty() {
            return ty;
        }
        self.instantiate_depth(ty, map, 0)
    }

    fn instantiate_all(&mut self, types: &[TypeId], map: &TypeMap, depth: usize) -> Vec<TypeId> {
        types
            .iter()
            .map(|t| self.instantiate_depth(*t, map, depth))
            .collect()
    }

    fn instantiate_depth(&mut self, ty: TypeId, map: &TypeMap, depth: usize) -> TypeId {
        if let Some(mapped) = map.get(&ty) {
            return *mapped;
        }
        if depth > MAX_DEPTH {
            return ty;
        }
        let depth = depth + 1;
        let info = self.arena.info(ty).clone();

        let alias = info.alias.as_ref().map(|alias| AliasRef {
            symbol: alias.symbol,
            args: self.instantiate_all(&alias.args, map, depth),
        });
        let alias_changed = alias != info.alias;

        let data = match &info.data {
            TypeData::Union(members) => {
                let new = self.instantiate_all(members, map, depth);
                (new != *members).then(|| TypeData::Union(new))
            }
            TypeData::Intersection(members) => {
                let new = self.instantiate_all(members, map, depth);
                (new != *members).then(|| TypeData::Intersection(new))
            }
            TypeData::Tuple(elements) => {
                let new = self.instantiate_all(elements, map, depth);
                (new != *elements).then(|| TypeData::Tuple(new))
            }
            TypeData::Reference { symbol, args } => {
                let new = self.instantiate_all(args, map, depth);
                (new != *args).then(|| TypeData::Reference {
                    symbol: *symbol,
                    args: new,
                })
            }
            TypeData::Opaque { name, args, symbol } => {
                let new = self.instantiate_all(args, map, depth);
                (new != *args).then(|| TypeData::Opaque {
                    name: name.clone(),
                    args: new,
                    symbol: *symbol,
                })
            }
            TypeData::Object(shape) => {
                let new = self.instantiate_shape(shape, map, depth);
                (new != **shape).then(|| TypeData::Object(Rc::new(new)))
            }
            TypeData::KeyOf(inner) => {
                let new = self.instantiate_depth(*inner, map, depth);
                (new != *inner).then_some(TypeData::KeyOf(new))
            }
            TypeData::IndexedAccess { object, index } => {
                let new_object = self.instantiate_depth(*object, map, depth);
                let new_index = self.instantiate_depth(*index, map, depth);
                (new_object != *object || new_index != *index).then_some(
                    TypeData::IndexedAccess {
                        object: new_object,
                        index: new_index,
                    },
                )
            }
            TypeData::Mapped(mapped) => {
                let constraint = self.instantiate_depth(mapped.constraint, map, depth);
                // the iteration parameter is bound inside the template
                let template = if map.contains_key(&mapped.param) {
                    let inner: TypeMap = map
                        .iter()
                        .filter(|(param, _)| **param != mapped.param)
                        .map(|(param, arg)| (*param, *arg))
                        .collect();
                    self.instantiate_depth(mapped.template, &inner, depth)
                } else {
                    self.instantiate_depth(mapped.template, map, depth)
                };
                (constraint != mapped.constraint || template != mapped.template).then(|| {
                    TypeData::Mapped(Rc::new(types::MappedType {
                        constraint,
                        template,
                        ..(**mapped).clone()
                    }))
                })
            }
            _ => None,
        };

        if data.is_none() && !alias_changed {
            return ty;
        }
        let data = data.unwrap_or(info.data);

        let normalized = match data {
            TypeData::Union(members) => {
                let union = self.arena.union(members);
                if alias.is_none() {
                    return union;
                }
                self.arena.data(union).clone()
            }
            TypeData::Intersection(members) => {
                let intersection = self.arena.intersection(members);
                if alias.is_none() {
                    return intersection;
                }
                self.arena.data(intersection).clone()
            }
            TypeData::Reference { symbol, args } if alias.is_none() => {
                return self.arena.reference(symbol, args);
            }
            other => other,
        };
        let result = self.arena.alloc_info(TypeInfo {
            data: normalized,
            alias,
        });
        let evaluated = self.evaluate(result);
        if evaluated != result && self.arena.alias(result).is_none() {
            return evaluated;
        }
        result
    }

    pub(crate) fn instantiate_shape(
        &mut self,
        shape: &ObjectShape,
        map: &TypeMap,
        depth: usize,
    ) -> ObjectShape {
        let mut out = shape.clone();
        for property in &mut out.properties {
            property.ty = self.instantiate_depth(property.ty, map, depth);
        }
        for signature in out.call.iter_mut().chain(out.construct.iter_mut()) {
            *signature = self.instantiate_signature_depth(signature, map, depth);
        }
        for index in [&mut out.string_index, &mut out.number_index]
            .into_iter()
            .flatten()
        {
            index.ty = self.instantiate_depth(index.ty, map, depth);
        }
        out
    }

    pub(crate) fn instantiate_signature(&mut self, signature: &Signature, map: &TypeMap) -> Signature {
        self.instantiate_signature_depth(signature, map, 0)
    }

    fn instantiate_signature_depth(
        &mut self,
        signature: &Signature,
        map: &TypeMap,
        depth: usize,
    ) -> Signature {
        let mut out = signature.clone();
        for param in &mut out.params {
            param.ty = self.instantiate_depth(param.ty, map, depth);
        }
        out.ret = self.instantiate_depth(out.ret, map, depth);
        out
    }

    /// Resolve `keyof`, indexed access and mapped types where possible
    pub fn evaluate(&mut self, ty: TypeId) -> TypeId {
        if let Some(done) = self.evaluated.get(&ty) {
            return *done;
        }
        if !self.evaluating.insert(ty) {
            return ty;
        }
        let result = match self.arena.data(ty).clone() {
            TypeData::KeyOf(inner) => self.evaluate_keyof(ty, inner),
            TypeData::IndexedAccess { object, index } => self.indexed_access(ty, object, index),
            TypeData::Mapped(mapped) => self.evaluate_mapped(ty, &mapped),
            _ => ty,
        };
        self.evaluating.remove(&ty);
        self.evaluated.insert(ty, result);
        result
    }

    fn is_deferred(&self, ty: TypeId) -> bool {
        matches!(self.arena.data(ty), TypeData::TypeParameter(_))
    }

    fn evaluate_keyof(&mut self, ty: TypeId, inner: TypeId) -> TypeId {
        let inner = self.evaluate(inner);
        if self.is_deferred(inner) {
            return ty;
        }
        if inner == self.any() {
            let keys = [Intrinsic::String, Intrinsic::Number, Intrinsic::Symbol]
                .map(|i| self.intrinsic(i));
            return self.arena.union(keys);
        }
        let shape = self.shape(inner);
        let mut keys: Vec<TypeId> = shape
            .properties
            .iter()
            .map(|p| self.arena.string_literal(p.name.clone()))
            .collect();
        if shape.string_index.is_some() {
            keys.push(self.intrinsic(Intrinsic::String));
        }
        if shape.number_index.is_some() {
            keys.push(self.intrinsic(Intrinsic::Number));
        }
        self.arena.union(keys)
    }

    fn indexed_access(&mut self, ty: TypeId, object: TypeId, index: TypeId) -> TypeId {
        let object = self.evaluate(object);
        let index = self.evaluate(index);
        if self.is_deferred(object) || self.is_deferred(index) {
            return ty;
        }
        match self.arena.data(index).clone() {
            TypeData::StringLiteral(name) => match self.property(object, &name) {
                Some(property) => property.ty,
                None => self
                    .string_index(object)
                    .map(|i| i.ty)
                    .unwrap_or_else(|| self.any()),
            },
            TypeData::NumberLiteral(text) => match self.arena.data(object).clone() {
                TypeData::Tuple(elements) => text
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| elements.get(i).copied())
                    .unwrap_or_else(|| self.any()),
                _ => self.number_index_type(object),
            },
            TypeData::Intrinsic(Intrinsic::Number) => match self.arena.data(object).clone() {
                TypeData::Tuple(elements) => self.arena.union(elements),
                _ => self.number_index_type(object),
            },
            TypeData::Intrinsic(Intrinsic::String) => self
                .string_index(object)
                .map(|i| i.ty)
                .unwrap_or_else(|| self.any()),
            TypeData::Union(members) => {
                let types: Vec<TypeId> = members
                    .into_iter()
                    .map(|m| self.indexed_access(ty, object, m))
                    .collect();
                self.arena.union(types)
            }
            _ => self.any(),
        }
    }

    fn number_index_type(&mut self, object: TypeId) -> TypeId {
        let shape = self.shape(object);
        shape
            .number_index
            .as_ref()
            .or(shape.string_index.as_ref())
            .map(|i| i.ty)
            .unwrap_or_else(|| self.any())
    }

    fn evaluate_mapped(&mut self, ty: TypeId, mapped: &types::MappedType) -> TypeId {
        let param_name = match self.arena.data(mapped.param) {
            TypeData::TypeParameter(p) => p.name.clone(),
            _ => "key".to_string(),
        };
        let mut shape = ObjectShape::default();
        let apply = |modifier: Option<Modifier>, source: bool| match modifier {
            Some(Modifier::Add) => true,
            Some(Modifier::Remove) => false,
            None => source,
        };

        if let TypeData::KeyOf(source) = self.arena.data(mapped.constraint).clone() {
            let source = self.evaluate(source);
            if source == self.any() {
                return self.any();
            }
            if self.is_deferred(source) {
                return ty;
            }
            let source_shape = self.shape(source);
            for property in &source_shape.properties {
                let key = self.arena.string_literal(property.name.clone());
                let map: TypeMap = [(mapped.param, key)].into_iter().collect();
                let value = self.instantiate(mapped.template, &map);
                let value = self.evaluate(value);
                shape.add_property(Property {
                    name: property.name.clone(),
                    ty: value,
                    optional: apply(mapped.optional, property.optional),
                    readonly: apply(mapped.readonly, property.readonly),
                    documentation: property.documentation.clone(),
                });
            }
            if let Some(index) = &source_shape.string_index {
                let key = self.intrinsic(Intrinsic::String);
                let map: TypeMap = [(mapped.param, key)].into_iter().collect();
                let value = self.instantiate(mapped.template, &map);
                shape.string_index = Some(IndexInfo {
                    key_name: index.key_name.clone(),
                    ty: self.evaluate(value),
                });
            }
            return self.arena.object(shape);
        }

        let keys = self.evaluate(mapped.constraint);
        let members = match self.arena.data(keys).clone() {
            TypeData::Union(members) => members,
            _ => vec![keys],
        };
        for key in members {
            let map: TypeMap = [(mapped.param, key)].into_iter().collect();
            match self.arena.data(key).clone() {
                TypeData::StringLiteral(name) | TypeData::NumberLiteral(name) => {
                    let value = self.instantiate(mapped.template, &map);
                    let value = self.evaluate(value);
                    shape.add_property(Property {
                        name,
                        ty: value,
                        optional: apply(mapped.optional, false),
                        readonly: apply(mapped.readonly, false),
                        documentation: String::new(),
                    });
                }
                TypeData::Intrinsic(Intrinsic::String) => {
                    let value = self.instantiate(mapped.template, &map);
                    shape.string_index = Some(IndexInfo {
                        key_name: param_name.clone(),
                        ty: self.evaluate(value),
                    });
                }
                TypeData::Intrinsic(Intrinsic::Number) => {
                    let value = self.instantiate(mapped.template, &map);
                    shape.number_index = Some(IndexInfo {
                        key_name: param_name.clone(),
                        ty: self.evaluate(value),
                    });
                }
                TypeData::TypeParameter(_) => return ty,
                _ => {}
            }
        }
        self.arena.object(shape)
    }

    /// Symbol a type was declared by, if any
    pub fn type_symbol(&self, ty: TypeId) -> Option<SymbolId> {
        match self.arena.data(ty) {
            TypeData::Reference { symbol, .. } => Some(*symbol),
            TypeData::Object(shape) => shape.symbol,
            TypeData::Opaque { symbol, .. } => *symbol,
            _ => None,
        }
    }

    /// `global.JSX.Element`, `React.Component`, `Props`
    pub fn fully_qualified_name(&self, sym: SymbolId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(sym);
        let mut global = false;
        while let Some(id) = current {
            let symbol = self.symbol(id);
            parts.push(symbol.name.clone());
            global = symbol.global;
            current = symbol.parent;
        }
        if global {
            parts.push("global".to_string());
        }
        parts.reverse();
        parts.join(".")
    }

    /// Name a symbol is printed with (`JSX.Element`, `Props`)
    pub fn display_name(&self, sym: SymbolId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(sym);
        while let Some(id) = current {
            let symbol = self.symbol(id);
            parts.push(symbol.name.clone());
            current = symbol.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Printed name of a type, without type arguments
    pub fn type_name(&self, ty: TypeId) -> String {
        let full = self.type_text(ty, 0);
        full.split('<').next().unwrap_or_default().to_string()
    }

    fn type_text(&self, ty: TypeId, depth: usize) -> String {
        if depth > MAX_DEPTH {
            return "...".to_string();
        }
        if let Some(alias) = self.arena.alias(ty) {
            return self.display_name(alias.symbol);
        }
        let join = |members: &[TypeId], separator: &str| {
            members
                .iter()
                .map(|m| self.type_text(*m, depth + 1))
                .collect::<Vec<_>>()
                .join(separator)
        };
        match self.arena.data(ty) {
            TypeData::Intrinsic(intrinsic) => intrinsic.name().to_string(),
            TypeData::BooleanLiteral(value) => value.to_string(),
            TypeData::NumberLiteral(text) => text.clone(),
            TypeData::StringLiteral(value) => format!("\"{}\"", value),
            TypeData::Union(_) if self.arena.is_boolean(ty) => "boolean".to_string(),
            TypeData::Union(members) => join(members, " | "),
            TypeData::Intersection(members) => join(members, " & "),
            TypeData::Tuple(elements) => format!("[{}]", join(elements, ", ")),
            TypeData::Object(shape) => match shape.symbol {
                Some(symbol) => format!("typeof {}", self.display_name(symbol)),
                None => "{}".to_string(),
            },
            TypeData::Reference { symbol, .. } => self.display_name(*symbol),
            TypeData::TypeParameter(param) => param.name.clone(),
            TypeData::KeyOf(inner) => format!("keyof {}", self.type_text(*inner, depth + 1)),
            TypeData::IndexedAccess { object, index } => format!(
                "{}[{}]",
                self.type_text(*object, depth + 1),
                self.type_text(*index, depth + 1)
            ),
            TypeData::Mapped(_) => "{}".to_string(),
            TypeData::Opaque { name, .. } => name.clone(),
        }
    }

    /// Path of the file a symbol is declared in
    pub fn origin_path(&self, sym: SymbolId) -> Option<String> {
        let decl = self.symbol(sym).decls.first()?;
        match &decl.node {
            DeclNode::External { module } => Some(embed::external_module_path(module)),
            _ => Some(self.program.file(decl.file).path.clone()),
        }
    }

    /// Declared type of the global `JSX.Element`
    pub fn jsx_element_type(&mut self) -> Option<TypeId> {
        if let Some(cached) = self.jsx_element {
            return cached;
        }
        let element = self
            .bindings
            .global(Space::Type, "JSX")
            .and_then(|jsx| self.bindings.member(jsx, Space::Type, "Element"))
            .map(|sym| self.declared_type(sym));
        trace!("JSX element type: {:?}", element);
        self.jsx_element = Some(element);
        element
    }

    /// True if a type is the element type JSX expressions produce
    pub fn is_jsx_element(&self, ty: TypeId) -> bool {
        self.type_symbol(ty)
            .map(|sym| self.fully_qualified_name(sym) == JSX_ELEMENT)
            .unwrap_or(false)
    }
}
