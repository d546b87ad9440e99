//! Checker types to [`TypeBound`] trees
//!
//! The serializer applies a fixed precedence of structural tests to a
//! checker type, so the same type always produces the same tree:
//!
//! 1. aliased types render as `Named` when named output is preferred
//! 2. object shapes render as `Function` (callable) or `Object`
//! 3. intersections, then unions other than `boolean`
//! 4. boolean, number and string literals
//! 5. everything else renders as `Named`
//!
//! `Named` bounds point at declarations only through an identity key.

use crate::checker::{
    Checker, Parameter, Property, Signature, SymbolId, SymbolKind, TypeData, TypeId, MAX_DEPTH,
};
use crate::types::{IndexBound, SignatureBound, TypeBound, TypeProperty};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

lazy_static! {
    static ref LIB_FILE_REGEX: Regex =
        Regex::new(r"/node_modules/typescript/lib/lib\.([a-z0-9]+)\.").unwrap();
    static ref PACKAGE_FILE_REGEX: Regex =
        Regex::new(r"/node_modules/(?:@types/)?((?:@[a-z0-9-]+/)?[a-z0-9-]+)/").unwrap();
}

/// Name of the wrapper alias unwrapped when collecting component props
const READONLY_ALIAS: &str = "Readonly";

/// Provenance label for a declaration file (`lib es5`, `react`)
pub fn imported_from(path: &str) -> Option<String> {
    if !path.contains("/node_modules/") {
        return None;
    }
    if let Some(captures) = LIB_FILE_REGEX.captures(path) {
        return Some(format!("lib {}", &captures[1]));
    }
    PACKAGE_FILE_REGEX
        .captures(path)
        .map(|captures| captures[1].to_string())
}

/// Instance members of a class, split by callability
#[derive(Debug, Clone, Default)]
pub struct ClassMembers {
    pub properties: Vec<(Property, TypeBound)>,
    pub methods: Vec<(Property, SignatureBound)>,
    pub constructors: Vec<(String, Vec<TypeProperty>)>,
}

/// Serializes types of one checker
pub struct TypeSerializer<'a, 'p> {
    checker: &'a mut Checker<'p>,
    depth: usize,
}

impl<'a, 'p> TypeSerializer<'a, 'p> {
    pub fn new(checker: &'a mut Checker<'p>) -> Self {
        Self { checker, depth: 0 }
    }

    /// Serialize a use-site type, preferring alias names
    pub fn serialize(&mut self, ty: TypeId) -> TypeBound {
        self.bound(ty, true)
    }

    /// Serialize the declared type of a type alias or interface
    ///
    /// The outer alias is decomposed so the declaration records its own
    /// shape rather than a reference to itself. Interfaces are decomposed
    /// into their members.
    pub fn serialize_declared(&mut self, ty: TypeId) -> TypeBound {
        if let TypeData::Reference { symbol, .. } = self.checker.data(ty) {
            if self.checker.symbol(*symbol).kind == SymbolKind::Interface {
                return self.object_bound(ty);
            }
        }
        self.bound(ty, false)
    }

    /// Serialize a type
    pub fn bound(&mut self, ty: TypeId, prefer_named: bool) -> TypeBound {
        if self.depth > MAX_DEPTH {
            trace!("serializer depth exceeded at type {}", ty);
            return TypeBound::named(self.checker.type_name(ty));
        }
        self.depth += 1;
        let bound = self.bound_inner(ty, prefer_named);
        self.depth -= 1;
        bound
    }

    fn bound_inner(&mut self, ty: TypeId, prefer_named: bool) -> TypeBound {
        if prefer_named && self.checker.alias(ty).is_some() {
            return self.named(ty);
        }

        match self.checker.data(ty).clone() {
            TypeData::Object(shape) => {
                if shape.call.is_empty() && !shape.construct.is_empty() {
                    // `typeof SomeClass`
                    return self.named(ty);
                }
                self.object_bound(ty)
            }
            TypeData::KeyOf(_) | TypeData::IndexedAccess { .. } | TypeData::Mapped(_) => {
                let evaluated = self.checker.evaluate(ty);
                if evaluated == ty {
                    self.named(ty)
                } else {
                    self.bound(evaluated, prefer_named)
                }
            }
            TypeData::Intersection(members) => TypeBound::Intersection {
                types: members.into_iter().map(|m| self.bound(m, true)).collect(),
            },
            TypeData::Union(members) if !self.checker.is_boolean(ty) => TypeBound::Union {
                types: self.union_members(&members),
            },
            TypeData::Tuple(elements) => TypeBound::Tuple {
                properties: elements.into_iter().map(|e| self.bound(e, true)).collect(),
            },
            TypeData::BooleanLiteral(value) => TypeBound::BooleanLiteral {
                value: value.to_string(),
            },
            TypeData::NumberLiteral(text) => TypeBound::NumberLiteral { value: text },
            TypeData::StringLiteral(value) => TypeBound::StringLiteral { value },
            _ => self.named(ty),
        }
    }

    /// Union members with `true`/`false` folded back into `boolean`
    fn union_members(&mut self, members: &[TypeId]) -> Vec<TypeBound> {
        let mut types: Vec<TypeBound> = Vec::with_capacity(members.len());
        for member in members {
            let is_literal = matches!(self.checker.data(*member), TypeData::BooleanLiteral(_));
            if is_literal && matches!(types.last(), Some(TypeBound::BooleanLiteral { .. })) {
                if let Some(last) = types.last_mut() {
                    *last = TypeBound::named("boolean");
                }
                continue;
            }
            types.push(self.bound(*member, true));
        }
        types
    }

    /// `Function` for callable shapes, `Object` otherwise
    fn object_bound(&mut self, ty: TypeId) -> TypeBound {
        let call = self.checker.call_signatures(ty);
        if let Some(signature) = call.first() {
            let signature = self.signature(signature);
            return TypeBound::Function {
                type_parameters: signature.type_parameters,
                parameters: signature.parameters,
                return_type: Box::new(signature.return_type),
            };
        }

        let properties = self
            .checker
            .properties(ty)
            .iter()
            .map(|p| self.property(p))
            .collect();
        let index = self.checker.string_index(ty).map(|index| IndexBound {
            name: index.key_name,
            ty: Box::new(self.bound(index.ty, true)),
        });
        TypeBound::Object { properties, index }
    }

    /// A type rendered by name with its arguments and link key
    fn named(&mut self, ty: TypeId) -> TypeBound {
        let name = self.checker.type_name(ty);
        let alias = self.checker.alias(ty).cloned();

        let (arguments, id, symbol) = match alias {
            Some(alias) => {
                let declared = self.checker.declared_type(alias.symbol);
                (alias.args, Some(declared.key()), Some(alias.symbol))
            }
            None => {
                let arguments = match self.checker.data(ty) {
                    TypeData::Reference { args, .. } | TypeData::Opaque { args, .. } => {
                        args.clone()
                    }
                    _ => Vec::new(),
                };
                let symbol = self.checker.type_symbol(ty);
                let id = symbol.map(|sym| self.link_key(sym, ty));
                (arguments, id, symbol)
            }
        };

        let parameters = if arguments.is_empty() {
            None
        } else {
            Some(arguments.into_iter().map(|a| self.bound(a, true)).collect())
        };
        let imported_from = symbol
            .and_then(|sym| self.checker.origin_path(sym))
            .and_then(|path| imported_from(&path));

        TypeBound::Named {
            name,
            parameters,
            id,
            imported_from,
        }
    }

    /// Key a named type links through: the declared type for named
    /// declarations, the type itself otherwise
    fn link_key(&mut self, sym: SymbolId, ty: TypeId) -> String {
        match self.checker.symbol(sym).kind {
            SymbolKind::Interface | SymbolKind::Class | SymbolKind::TypeAlias => {
                self.checker.declared_type(sym).key()
            }
            _ => ty.key(),
        }
    }

    /// An object member as a [`TypeProperty`]
    pub fn property(&mut self, property: &Property) -> TypeProperty {
        TypeProperty {
            name: property.name.clone(),
            documentation: property.documentation.clone(),
            ty: self.bound(property.ty, true),
            optional: property.optional,
            default_value: None,
        }
    }

    /// A signature parameter as a [`TypeProperty`]
    pub fn parameter(&mut self, parameter: &Parameter) -> TypeProperty {
        TypeProperty {
            name: parameter.name.clone(),
            documentation: parameter.documentation.clone(),
            ty: self.bound(parameter.ty, true),
            optional: parameter.optional,
            default_value: parameter.default_value.clone(),
        }
    }

    pub fn signature(&mut self, signature: &Signature) -> SignatureBound {
        let type_parameters = if signature.type_params.is_empty() {
            None
        } else {
            Some(
                signature
                    .type_params
                    .iter()
                    .map(|p| self.bound(*p, true))
                    .collect(),
            )
        };
        SignatureBound {
            type_parameters,
            parameters: signature.params.iter().map(|p| self.parameter(p)).collect(),
            return_type: self.bound(signature.ret, true),
        }
    }

    /// First call signature of a callable type
    pub fn function(&mut self, ty: TypeId) -> Option<SignatureBound> {
        let call = self.checker.call_signatures(ty);
        call.first().map(|signature| self.signature(signature))
    }

    /// Type parameters an alias, interface or class declares
    pub fn type_parameters(&mut self, sym: SymbolId) -> Option<Vec<TypeBound>> {
        let params = self.checker.symbol_type_parameters(sym);
        if params.is_empty() {
            return None;
        }
        Some(params.into_iter().map(|p| self.bound(p, true)).collect())
    }

    /// Flattened property list of a props type
    ///
    /// Unions and intersections contribute all members' properties, and a
    /// `Readonly<P>` wrapper is unwrapped to `P` first.
    pub fn props(&mut self, ty: TypeId) -> Vec<TypeProperty> {
        if self.depth > MAX_DEPTH {
            return Vec::new();
        }
        self.depth += 1;
        let props = self.props_inner(ty);
        self.depth -= 1;
        props
    }

    fn props_inner(&mut self, ty: TypeId) -> Vec<TypeProperty> {
        let members = match self.checker.data(ty) {
            TypeData::Union(members) | TypeData::Intersection(members)
                if !self.checker.is_boolean(ty) =>
            {
                Some(members.clone())
            }
            _ => None,
        };
        if let Some(members) = members {
            return members.into_iter().flat_map(|m| self.props(m)).collect();
        }

        if let Some(alias) = self.checker.alias(ty).cloned() {
            let is_readonly = self.checker.symbol(alias.symbol).name == READONLY_ALIAS;
            if let (true, Some(wrapped)) = (is_readonly, alias.args.first().copied()) {
                let unwrapped = match self.checker.alias(wrapped).map(|a| a.symbol) {
                    Some(inner) => self.checker.declared_type(inner),
                    None => wrapped,
                };
                return self.props(unwrapped);
            }
        }

        self.checker
            .properties(ty)
            .iter()
            .map(|p| self.property(p))
            .collect()
    }

    /// Props of a class or function component, `None` for other types
    pub fn component_props(&mut self, ty: TypeId) -> Option<Vec<TypeProperty>> {
        self.class_component_props(ty)
            .or_else(|| self.function_component_props(ty))
    }

    /// Instance type exposes `props` and a zero-argument `render`
    /// returning an element
    fn class_component_props(&mut self, ty: TypeId) -> Option<Vec<TypeProperty>> {
        let construct = self.checker.construct_signatures(ty);
        let instance = construct.first()?.ret;
        let props = self.checker.property(instance, "props")?;
        let render = self.checker.property(instance, "render")?;

        let call = self.checker.call_signatures(render.ty);
        let render_signature = call.first()?;
        if !render_signature.params.is_empty() {
            return None;
        }
        if !self.checker.is_jsx_element(render_signature.ret) {
            return None;
        }
        Some(self.props(props.ty))
    }

    /// Callable with at most two parameters returning an element
    fn function_component_props(&mut self, ty: TypeId) -> Option<Vec<TypeProperty>> {
        let call = self.checker.call_signatures(ty);
        let signature = call.first()?;
        if signature.params.len() > 2 {
            return None;
        }
        if !self.checker.is_jsx_element(signature.ret) {
            return None;
        }
        Some(match signature.params.first() {
            Some(props) => self.props(props.ty),
            None => Vec::new(),
        })
    }

    /// Members and constructors of a class constructor type
    pub fn class_members(&mut self, ty: TypeId) -> Option<ClassMembers> {
        let construct = self.checker.construct_signatures(ty);
        let instance = construct.first()?.ret;

        let mut members = ClassMembers::default();
        for property in self.checker.properties(instance) {
            match self.function(property.ty) {
                Some(signature) => members.methods.push((property, signature)),
                None => {
                    let bound = self.bound(property.ty, true);
                    members.properties.push((property, bound));
                }
            }
        }
        for signature in &construct {
            let parameters = signature.params.iter().map(|p| self.parameter(p)).collect();
            members
                .constructors
                .push((signature.documentation.clone(), parameters));
        }
        Some(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{Program, Space};
    use crate::utils::parse_typescript_source;
    use pretty_assertions::assert_eq;

    const PATH: &str = "/virtual/src/a.tsx";

    fn program(source: &str) -> Program {
        Program::new(vec![parse_typescript_source(PATH, source).unwrap()])
    }

    fn symbol(checker: &Checker, space: Space, name: &str) -> SymbolId {
        let file = checker.program().file_by_path(PATH).unwrap();
        checker.lookup(file, space, name).unwrap()
    }

    fn declared(checker: &mut Checker, name: &str) -> TypeBound {
        let sym = symbol(checker, Space::Type, name);
        let ty = checker.declared_type(sym);
        TypeSerializer::new(checker).serialize_declared(ty)
    }

    fn value(checker: &mut Checker, name: &str) -> TypeId {
        let sym = symbol(checker, Space::Value, name);
        checker.type_of_symbol(sym)
    }

    fn property_type<'b>(bound: &'b TypeBound, name: &str) -> &'b TypeBound {
        let TypeBound::Object { properties, .. } = bound else {
            panic!("expected object, got {:?}", bound);
        };
        &properties.iter().find(|p| p.name == name).unwrap().ty
    }

    #[test]
    fn test_imported_from() {
        assert_eq!(
            imported_from("/node_modules/typescript/lib/lib.es5.d.ts").as_deref(),
            Some("lib es5")
        );
        assert_eq!(
            imported_from("/node_modules/@types/react/index.d.ts").as_deref(),
            Some("react")
        );
        assert_eq!(
            imported_from("/node_modules/@scope/pkg/index.d.ts").as_deref(),
            Some("@scope/pkg")
        );
        assert_eq!(imported_from("/virtual/src/a.tsx"), None);
    }

    #[test]
    fn test_object_with_index_signature() {
        let program = program("export type Counts = { [key: string]: number }");
        let mut checker = Checker::new(&program);
        assert_eq!(
            declared(&mut checker, "Counts"),
            TypeBound::Object {
                properties: vec![],
                index: Some(IndexBound {
                    name: "key".to_string(),
                    ty: Box::new(TypeBound::named("number")),
                }),
            }
        );
    }

    #[test]
    fn test_boolean_union_collapses() {
        let program = program("interface Foo { a: string }\nexport type B = boolean | Foo");
        let mut checker = Checker::new(&program);
        let TypeBound::Union { types } = declared(&mut checker, "B") else {
            panic!("expected union");
        };
        assert_eq!(types.len(), 2);
        assert_eq!(types[0], TypeBound::named("boolean"));
        assert_eq!(types[1].name(), Some("Foo"));
        assert!(types[1].id().is_some());
    }

    #[test]
    fn test_plain_boolean_is_named() {
        let program = program("export type Flags = { on: boolean; mode: 'a' | 'b' }");
        let mut checker = Checker::new(&program);
        let flags = declared(&mut checker, "Flags");
        assert_eq!(property_type(&flags, "on"), &TypeBound::named("boolean"));
        assert_eq!(
            property_type(&flags, "mode"),
            &TypeBound::Union {
                types: vec![
                    TypeBound::StringLiteral { value: "a".to_string() },
                    TypeBound::StringLiteral { value: "b".to_string() },
                ]
            }
        );
    }

    #[test]
    fn test_alias_reference_links_to_declaration() {
        let program = program(
            "export type Size = 'small' | 'large'\nexport type Props = { size?: Size; items: Array<string> }",
        );
        let mut checker = Checker::new(&program);
        let size_sym = symbol(&checker, Space::Type, "Size");
        let size_key = checker.declared_type(size_sym).key();

        let props = declared(&mut checker, "Props");
        let TypeBound::Object { properties, .. } = &props else {
            panic!("expected object");
        };
        assert!(properties[0].optional);
        assert_eq!(properties[0].ty.name(), Some("Size"));
        assert_eq!(properties[0].ty.id(), Some(size_key.as_str()));

        let TypeBound::Named {
            name,
            parameters,
            imported_from,
            ..
        } = &properties[1].ty
        else {
            panic!("expected named");
        };
        assert_eq!(name, "Array");
        assert_eq!(parameters.as_deref(), Some(&[TypeBound::named("string")][..]));
        assert_eq!(imported_from.as_deref(), Some("lib es5"));
    }

    #[test]
    fn test_function_type() {
        let program = program("export type Handler = <T>(value: T, times?: number) => void");
        let mut checker = Checker::new(&program);
        let TypeBound::Function {
            type_parameters,
            parameters,
            return_type,
        } = declared(&mut checker, "Handler")
        else {
            panic!("expected function");
        };
        assert_eq!(type_parameters, Some(vec![TypeBound::named("T")]));
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].ty, TypeBound::named("T"));
        assert!(parameters[1].optional);
        assert_eq!(*return_type, TypeBound::named("void"));
    }

    #[test]
    fn test_interface_decomposes_structurally() {
        let program = program("/** Shape */\nexport interface Point {\n  /** Horizontal */\n  x: number\n  y: number\n}");
        let mut checker = Checker::new(&program);
        let point = declared(&mut checker, "Point");
        let TypeBound::Object { properties, index } = point else {
            panic!("expected object");
        };
        assert_eq!(index, None);
        assert_eq!(properties[0].name, "x");
        assert_eq!(properties[0].documentation, "Horizontal");
        assert_eq!(properties[1].ty, TypeBound::named("number"));
    }

    #[test]
    fn test_component_props_unwrap_readonly() {
        let program = program(
            "import {Component} from 'react'\ntype Props = { label: string } & { count: number }\nexport class Badge extends Component<Props> {\n  render() { return <b /> }\n}\nexport class Store {\n  items: string[]\n  add(item: string): void {}\n}",
        );
        let mut checker = Checker::new(&program);
        let badge = value(&mut checker, "Badge");
        let props = TypeSerializer::new(&mut checker).component_props(badge).unwrap();
        let names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["label", "count"]);

        let store = value(&mut checker, "Store");
        let mut serializer = TypeSerializer::new(&mut checker);
        assert!(serializer.component_props(store).is_none());
        let members = serializer.class_members(store).unwrap();
        assert_eq!(members.properties.len(), 1);
        assert_eq!(members.properties[0].0.name, "items");
        assert_eq!(members.methods.len(), 1);
        assert_eq!(members.methods[0].0.name, "add");
        assert_eq!(members.constructors.len(), 1);
    }

    #[test]
    fn test_function_component_shapes() {
        let program = program(
            "export function Empty() { return <i /> }\nexport function Card(props: { title: string }) { return <div /> }\nexport function Many(a: number, b: number, c: number) { return <div /> }\nexport function Two(props: { title: string }, ref: any) { return <div /> }\nexport function plain(a: number) { return a }",
        );
        let mut checker = Checker::new(&program);
        let empty = value(&mut checker, "Empty");
        let card = value(&mut checker, "Card");
        let many = value(&mut checker, "Many");
        let two = value(&mut checker, "Two");
        let plain = value(&mut checker, "plain");
        let mut serializer = TypeSerializer::new(&mut checker);
        assert_eq!(serializer.component_props(empty), Some(vec![]));
        let props = serializer.component_props(card).unwrap();
        assert_eq!(props[0].name, "title");
        assert!(serializer.component_props(many).is_none());
        let props = serializer.component_props(two).unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].name, "title");
        assert!(serializer.component_props(plain).is_none());
        assert!(serializer.function(plain).is_some());
    }

    #[test]
    fn test_jsx_element_is_imported_from_react() {
        let program = program("export const A = () => <span />");
        let mut checker = Checker::new(&program);
        let a = value(&mut checker, "A");
        let signature = TypeSerializer::new(&mut checker).function(a).unwrap();
        let TypeBound::Named {
            name, imported_from, ..
        } = signature.return_type
        else {
            panic!("expected named");
        };
        assert_eq!(name, "JSX.Element");
        assert_eq!(imported_from.as_deref(), Some("react"));
    }

    #[test]
    fn test_recursive_mapped_alias_keeps_inner_keys() {
        let program = program(
            "type DeepPartial<T> = { [K in keyof T]?: DeepPartial<T[K]> }\nexport type DP = DeepPartial<{a: {b: number}}>",
        );
        let mut checker = Checker::new(&program);
        let deep_partial = symbol(&checker, Space::Type, "DeepPartial");
        let deep_partial_key = checker.declared_type(deep_partial).key();

        let dp = declared(&mut checker, "DP");
        let TypeBound::Named {
            name,
            parameters,
            id,
            ..
        } = property_type(&dp, "a")
        else {
            panic!("expected named");
        };
        assert_eq!(name, "DeepPartial");
        assert_eq!(id.as_deref(), Some(deep_partial_key.as_str()));
        let inner = &parameters.as_ref().unwrap()[0];
        let TypeBound::Object { properties, .. } = inner else {
            panic!("expected object, got {:?}", inner);
        };
        let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_mapped_alias_over_self_referential_interface() {
        let program = program(
            "type DeepPartial<T> = { [K in keyof T]?: DeepPartial<T[K]> }\ninterface Tree { value: string; child: Tree }\nexport type DP = DeepPartial<Tree>",
        );
        let mut checker = Checker::new(&program);
        let dp = declared(&mut checker, "DP");
        let TypeBound::Object { properties, .. } = &dp else {
            panic!("expected object");
        };
        let names: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["value", "child"]);
        assert!(properties.iter().all(|p| p.optional));
        let TypeBound::Named { parameters, .. } = property_type(&dp, "child") else {
            panic!("expected named");
        };
        assert_eq!(parameters.as_ref().unwrap()[0].name(), Some("Tree"));
    }

    #[test]
    fn test_recursive_alias_terminates() {
        let program = program("export type Tree = { value: number; children: Tree[] }");
        let mut checker = Checker::new(&program);
        let tree = declared(&mut checker, "Tree");
        let children = property_type(&tree, "children");
        let TypeBound::Named { parameters, .. } = children else {
            panic!("expected named");
        };
        assert_eq!(parameters.as_ref().unwrap()[0].name(), Some("Tree"));
    }
}
