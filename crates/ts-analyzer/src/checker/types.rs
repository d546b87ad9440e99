//! Type arena
//!
//! Every type the checker produces lives in a [`TypeArena`] and is addressed
//! by a [`TypeId`]. Intrinsics, literals, references and unions are interned,
//! so structurally equal instances of those share an id. The decimal form of
//! an id is the identity key used in `Package::type_declaration`.

use super::binder::SymbolId;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Identity of a type within one checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Identity key rendered for the IR
    pub fn key(self) -> String {
        self.0.to_string()
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keyword types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    Any,
    Unknown,
    String,
    Number,
    BigInt,
    Symbol,
    Void,
    Undefined,
    Null,
    Never,
    Object,
}

impl Intrinsic {
    /// Keyword spelling
    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::Any => "any",
            Intrinsic::Unknown => "unknown",
            Intrinsic::String => "string",
            Intrinsic::Number => "number",
            Intrinsic::BigInt => "bigint",
            Intrinsic::Symbol => "symbol",
            Intrinsic::Void => "void",
            Intrinsic::Undefined => "undefined",
            Intrinsic::Null => "null",
            Intrinsic::Never => "never",
            Intrinsic::Object => "object",
        }
    }

    fn is_nullable(self) -> bool {
        matches!(self, Intrinsic::Undefined | Intrinsic::Null)
    }
}

// Creation order fixes union member order for the common cases
const INTRINSICS: [Intrinsic; 11] = [
    Intrinsic::Any,
    Intrinsic::Unknown,
    Intrinsic::String,
    Intrinsic::Number,
    Intrinsic::BigInt,
    Intrinsic::Symbol,
    Intrinsic::Void,
    Intrinsic::Undefined,
    Intrinsic::Null,
    Intrinsic::Never,
    Intrinsic::Object,
];

/// A named member of an object shape
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub readonly: bool,
    pub documentation: String,
}

/// A parameter of a signature
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub rest: bool,
    /// Source text of the default initializer
    pub default_value: Option<String>,
    pub documentation: String,
}

/// A call or construct signature
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub type_params: Vec<TypeId>,
    pub params: Vec<Parameter>,
    pub ret: TypeId,
    pub documentation: String,
}

/// An index signature (`[key: string]: T`)
#[derive(Debug, Clone, PartialEq)]
pub struct IndexInfo {
    /// Declared name of the index parameter
    pub key_name: String,
    pub ty: TypeId,
}

/// Members of an object-like type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    pub properties: Vec<Property>,
    pub call: Vec<Signature>,
    pub construct: Vec<Signature>,
    pub string_index: Option<IndexInfo>,
    pub number_index: Option<IndexInfo>,
    /// Declaring symbol (class constructors, functions)
    pub symbol: Option<SymbolId>,
}

impl ObjectShape {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Add a property unless one with the same name exists
    pub fn add_property(&mut self, property: Property) -> bool {
        if self.property(&property.name).is_some() {
            return false;
        }
        self.properties.push(property);
        true
    }

    /// Fill in everything `base` has that this shape lacks
    pub fn inherit(&mut self, base: &ObjectShape) {
        for property in &base.properties {
            self.add_property(property.clone());
        }
        if self.call.is_empty() {
            self.call = base.call.clone();
        }
        if self.construct.is_empty() {
            self.construct = base.construct.clone();
        }
        if self.string_index.is_none() {
            self.string_index = base.string_index.clone();
        }
        if self.number_index.is_none() {
            self.number_index = base.number_index.clone();
        }
    }
}

/// A type parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub name: String,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

/// `+`/`-` modifier of a mapped type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Add,
    Remove,
}

/// `{ [P in K]: T }`
#[derive(Debug, Clone, PartialEq)]
pub struct MappedType {
    /// The iteration parameter `P`
    pub param: TypeId,
    /// The key type `K`
    pub constraint: TypeId,
    pub template: TypeId,
    pub optional: Option<Modifier>,
    pub readonly: Option<Modifier>,
}

/// Structure of a type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeData {
    Intrinsic(Intrinsic),
    BooleanLiteral(bool),
    /// Literal text as JavaScript prints the number
    NumberLiteral(String),
    StringLiteral(String),
    Union(Vec<TypeId>),
    Intersection(Vec<TypeId>),
    Tuple(Vec<TypeId>),
    Object(Rc<ObjectShape>),
    /// Instance type of an interface or class
    Reference { symbol: SymbolId, args: Vec<TypeId> },
    TypeParameter(TypeParameter),
    KeyOf(TypeId),
    IndexedAccess { object: TypeId, index: TypeId },
    Mapped(Rc<MappedType>),
    /// A type the checker only knows by name
    Opaque {
        name: String,
        args: Vec<TypeId>,
        symbol: Option<SymbolId>,
    },
}

/// Alias identity attached to a type (`Props`, `Readonly<P>`)
#[derive(Debug, Clone, PartialEq)]
pub struct AliasRef {
    pub symbol: SymbolId,
    pub args: Vec<TypeId>,
}

/// A type together with the alias it was written as
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub data: TypeData,
    pub alias: Option<AliasRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum InternKey {
    Boolean(bool),
    Number(String),
    String(String),
    Reference(SymbolId, Vec<TypeId>),
    Union(Vec<TypeId>),
}

/// Storage for all types of one checker
#[derive(Debug)]
pub struct TypeArena {
    types: Vec<TypeInfo>,
    interned: HashMap<InternKey, TypeId>,
    false_type: TypeId,
    true_type: TypeId,
    boolean_type: TypeId,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        let mut arena = Self {
            types: Vec::new(),
            interned: HashMap::new(),
            false_type: TypeId(0),
            true_type: TypeId(0),
            boolean_type: TypeId(0),
        };
        for intrinsic in INTRINSICS {
            arena.alloc(TypeData::Intrinsic(intrinsic));
        }
        arena.false_type = arena.boolean_literal(false);
        arena.true_type = arena.boolean_literal(true);
        let members = vec![arena.false_type, arena.true_type];
        arena.boolean_type = arena.alloc(TypeData::Union(members.clone()));
        arena
            .interned
            .insert(InternKey::Union(members), arena.boolean_type);
        arena
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn info(&self, id: TypeId) -> &TypeInfo {
        &self.types[id.index()]
    }

    pub fn data(&self, id: TypeId) -> &TypeData {
        &self.info(id).data
    }

    pub fn alias(&self, id: TypeId) -> Option<&AliasRef> {
        self.info(id).alias.as_ref()
    }

    /// Allocate a fresh, uninterned type
    pub fn alloc(&mut self, data: TypeData) -> TypeId {
        self.alloc_info(TypeInfo { data, alias: None })
    }

    pub fn alloc_info(&mut self, info: TypeInfo) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(info);
        id
    }

    /// Overwrite a reserved slot
    pub fn set(&mut self, id: TypeId, info: TypeInfo) {
        self.types[id.index()] = info;
    }

    /// Overwrite the data of a type parameter once its constraint is known
    pub fn set_data(&mut self, id: TypeId, data: TypeData) {
        self.types[id.index()].data = data;
    }

    fn intern(&mut self, key: InternKey, data: TypeData) -> TypeId {
        if let Some(id) = self.interned.get(&key) {
            return *id;
        }
        let id = self.alloc(data);
        self.interned.insert(key, id);
        id
    }

    pub fn intrinsic(&self, intrinsic: Intrinsic) -> TypeId {
        let index = INTRINSICS
            .iter()
            .position(|i| *i == intrinsic)
            .unwrap_or_default();
        TypeId(index as u32)
    }

    pub fn any(&self) -> TypeId {
        self.intrinsic(Intrinsic::Any)
    }

    pub fn boolean(&self) -> TypeId {
        self.boolean_type
    }

    pub fn boolean_literal(&mut self, value: bool) -> TypeId {
        self.intern(InternKey::Boolean(value), TypeData::BooleanLiteral(value))
    }

    pub fn number_literal(&mut self, text: impl Into<String>) -> TypeId {
        let text = text.into();
        self.intern(
            InternKey::Number(text.clone()),
            TypeData::NumberLiteral(text),
        )
    }

    pub fn string_literal(&mut self, value: impl Into<String>) -> TypeId {
        let value = value.into();
        self.intern(
            InternKey::String(value.clone()),
            TypeData::StringLiteral(value),
        )
    }

    pub fn reference(&mut self, symbol: SymbolId, args: Vec<TypeId>) -> TypeId {
        self.intern(
            InternKey::Reference(symbol, args.clone()),
            TypeData::Reference { symbol, args },
        )
    }

    /// True for the `boolean` union, aliased or not
    pub fn is_boolean(&self, id: TypeId) -> bool {
        match self.data(id) {
            TypeData::Union(members) => {
                members.len() == 2
                    && members.contains(&self.false_type)
                    && members.contains(&self.true_type)
            }
            _ => false,
        }
    }

    fn intrinsic_of(&self, id: TypeId) -> Option<Intrinsic> {
        match self.data(id) {
            TypeData::Intrinsic(i) => Some(*i),
            _ => None,
        }
    }

    /// Normalized union
    ///
    /// Nested unions are flattened, duplicates removed and members ordered
    /// by identity. `any` absorbs everything, `never` disappears, and
    /// `null`/`undefined` are dropped next to other members since nullability
    /// is not tracked.
    pub fn union(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeId {
        let mut flat: Vec<TypeId> = Vec::new();
        for member in members {
            match self.data(member) {
                TypeData::Union(inner) => flat.extend(inner.iter().copied()),
                _ => flat.push(member),
            }
        }

        if let Some(absorbing) = flat.iter().copied().find(|m| {
            matches!(
                self.intrinsic_of(*m),
                Some(Intrinsic::Any) | Some(Intrinsic::Unknown)
            )
        }) {
            return absorbing;
        }

        flat.retain(|m| self.intrinsic_of(*m) != Some(Intrinsic::Never));
        if flat
            .iter()
            .any(|m| !self.intrinsic_of(*m).is_some_and(Intrinsic::is_nullable))
        {
            flat.retain(|m| !self.intrinsic_of(*m).is_some_and(Intrinsic::is_nullable));
        }

        flat.sort();
        flat.dedup();

        match flat.len() {
            0 => self.intrinsic(Intrinsic::Never),
            1 => flat[0],
            _ => self.intern(InternKey::Union(flat.clone()), TypeData::Union(flat)),
        }
    }

    /// Intersection with nested intersections flattened, order kept
    pub fn intersection(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeId {
        let mut flat: Vec<TypeId> = Vec::new();
        for member in members {
            let inner = match self.data(member) {
                TypeData::Intersection(inner) => inner.clone(),
                _ => vec![member],
            };
            for t in inner {
                if !flat.contains(&t) {
                    flat.push(t);
                }
            }
        }

        for absorbing in [Intrinsic::Any, Intrinsic::Never] {
            if flat.iter().any(|m| self.intrinsic_of(*m) == Some(absorbing)) {
                return self.intrinsic(absorbing);
            }
        }

        match flat.len() {
            0 => self.intrinsic(Intrinsic::Unknown),
            1 => flat[0],
            _ => self.alloc(TypeData::Intersection(flat)),
        }
    }

    pub fn tuple(&mut self, elements: Vec<TypeId>) -> TypeId {
        self.alloc(TypeData::Tuple(elements))
    }

    pub fn object(&mut self, shape: ObjectShape) -> TypeId {
        self.alloc(TypeData::Object(Rc::new(shape)))
    }

    /// Widen literal types to their primitive base
    pub fn widen(&mut self, id: TypeId) -> TypeId {
        match self.data(id).clone() {
            TypeData::BooleanLiteral(_) => self.boolean(),
            TypeData::NumberLiteral(_) => self.intrinsic(Intrinsic::Number),
            TypeData::StringLiteral(_) => self.intrinsic(Intrinsic::String),
            TypeData::Union(members) if self.alias(id).is_none() => {
                let widened: Vec<TypeId> = members.into_iter().map(|m| self.widen(m)).collect();
                self.union(widened)
            }
            _ => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsics_are_stable() {
        let arena = TypeArena::new();
        assert_eq!(arena.any(), TypeId(0));
        assert_eq!(
            arena.data(arena.intrinsic(Intrinsic::String)),
            &TypeData::Intrinsic(Intrinsic::String)
        );
    }

    #[test]
    fn test_literals_are_interned() {
        let mut arena = TypeArena::new();
        let a = arena.string_literal("a");
        let b = arena.string_literal("a");
        assert_eq!(a, b);
        assert_ne!(a, arena.string_literal("b"));
    }

    #[test]
    fn test_union_collapses_to_boolean() {
        let mut arena = TypeArena::new();
        let t = arena.boolean_literal(true);
        let f = arena.boolean_literal(false);
        let union = arena.union([t, f]);
        assert_eq!(union, arena.boolean());
        assert!(arena.is_boolean(union));
    }

    #[test]
    fn test_union_flattens_boolean_members() {
        let mut arena = TypeArena::new();
        let string = arena.intrinsic(Intrinsic::String);
        let boolean = arena.boolean();
        let union = arena.union([string, boolean]);
        let TypeData::Union(members) = arena.data(union) else {
            panic!("expected union");
        };
        assert_eq!(members.len(), 3);
        assert!(!arena.is_boolean(union));
    }

    #[test]
    fn test_union_drops_nullable_and_never() {
        let mut arena = TypeArena::new();
        let string = arena.intrinsic(Intrinsic::String);
        let undefined = arena.intrinsic(Intrinsic::Undefined);
        let never = arena.intrinsic(Intrinsic::Never);
        assert_eq!(arena.union([string, undefined, never]), string);
        let any = arena.any();
        assert_eq!(arena.union([string, any]), any);
    }

    #[test]
    fn test_widen() {
        let mut arena = TypeArena::new();
        let one = arena.number_literal("1");
        assert_eq!(arena.widen(one), arena.intrinsic(Intrinsic::Number));
        let yes = arena.boolean_literal(true);
        assert_eq!(arena.widen(yes), arena.boolean());
    }
}
