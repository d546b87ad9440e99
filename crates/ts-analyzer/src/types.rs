//! Serialized type representation
//!
//! `TypeBound` is the tree the type serializer produces for a checker type.
//! `Named` nodes refer to other declarations only through their `id`, which
//! is a lookup key into `Package::type_declaration`, never a pointer.

use serde::{Deserialize, Serialize};

/// A serialized type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeBound {
    /// A type rendered by name (`string`, `Props`, `Array<T>`)
    #[serde(rename_all = "camelCase")]
    Named {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        parameters: Option<Vec<TypeBound>>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        imported_from: Option<String>,
    },

    /// An object shape
    #[serde(rename_all = "camelCase")]
    Object {
        properties: Vec<TypeProperty>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        index: Option<IndexBound>,
    },

    /// `[A, B]`
    #[serde(rename_all = "camelCase")]
    Tuple { properties: Vec<TypeBound> },

    /// A callable shape
    #[serde(rename_all = "camelCase")]
    Function {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        type_parameters: Option<Vec<TypeBound>>,
        parameters: Vec<TypeProperty>,
        return_type: Box<TypeBound>,
    },

    /// `A & B`
    #[serde(rename_all = "camelCase")]
    Intersection { types: Vec<TypeBound> },

    /// `A | B`
    #[serde(rename_all = "camelCase")]
    Union { types: Vec<TypeBound> },

    /// `true` / `false`
    #[serde(rename_all = "camelCase")]
    BooleanLiteral { value: String },

    /// `42`
    #[serde(rename_all = "camelCase")]
    NumberLiteral { value: String },

    /// `"a"`
    #[serde(rename_all = "camelCase")]
    StringLiteral { value: String },
}

impl TypeBound {
    /// A bare named type without parameters or links
    pub fn named(name: impl Into<String>) -> Self {
        TypeBound::Named {
            name: name.into(),
            parameters: None,
            id: None,
            imported_from: None,
        }
    }

    /// The name of a `Named` bound
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeBound::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The link key of a `Named` bound
    pub fn id(&self) -> Option<&str> {
        match self {
            TypeBound::Named { id, .. } => id.as_deref(),
            _ => None,
        }
    }
}

/// String index signature of an object shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexBound {
    /// Name of the index parameter (`key` in `[key: string]: T`)
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Box<TypeBound>,
}

/// A documented, typed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocEntry {
    pub name: String,
    pub documentation: String,
    #[serde(rename = "type")]
    pub ty: TypeBound,
}

/// Object property, function parameter, or component prop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeProperty {
    pub name: String,
    pub documentation: String,
    #[serde(rename = "type")]
    pub ty: TypeBound,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_value: Option<String>,
}

/// A serialized call signature with a name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDocEntry {
    pub name: String,
    pub documentation: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub type_parameters: Option<Vec<TypeBound>>,
    pub parameters: Vec<TypeProperty>,
    pub return_type: TypeBound,
}

/// A serialized call signature before it is given a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBound {
    pub type_parameters: Option<Vec<TypeBound>>,
    pub parameters: Vec<TypeProperty>,
    pub return_type: TypeBound,
}

impl SignatureBound {
    /// Attach a name and documentation
    pub fn into_entry(self, name: impl Into<String>, documentation: String) -> FunctionDocEntry {
        FunctionDocEntry {
            name: name.into(),
            documentation,
            type_parameters: self.type_parameters,
            parameters: self.parameters,
            return_type: self.return_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_omits_empty_fields() {
        let value = serde_json::to_value(TypeBound::named("string")).unwrap();
        assert_eq!(value, json!({"kind": "Named", "name": "string"}));
    }

    #[test]
    fn test_object_index_shape() {
        let bound = TypeBound::Object {
            properties: vec![],
            index: Some(IndexBound {
                name: "key".to_string(),
                ty: Box::new(TypeBound::named("number")),
            }),
        };
        assert_eq!(
            serde_json::to_value(&bound).unwrap(),
            json!({
                "kind": "Object",
                "properties": [],
                "index": {"name": "key", "type": {"kind": "Named", "name": "number"}}
            })
        );
    }

    #[test]
    fn test_function_field_names() {
        let bound = TypeBound::Function {
            type_parameters: None,
            parameters: vec![TypeProperty {
                name: "x".to_string(),
                documentation: String::new(),
                ty: TypeBound::named("number"),
                optional: true,
                default_value: Some("1".to_string()),
            }],
            return_type: Box::new(TypeBound::named("void")),
        };
        let value = serde_json::to_value(&bound).unwrap();
        assert_eq!(value["returnType"]["name"], "void");
        assert_eq!(value["parameters"][0]["defaultValue"], "1");
        assert_eq!(value["parameters"][0]["type"]["name"], "number");
        assert!(value.get("typeParameters").is_none());
    }

    #[test]
    fn test_named_imported_from_is_camel_case() {
        let bound = TypeBound::Named {
            name: "Array".to_string(),
            parameters: Some(vec![TypeBound::named("string")]),
            id: Some("7".to_string()),
            imported_from: Some("lib es5".to_string()),
        };
        let value = serde_json::to_value(&bound).unwrap();
        assert_eq!(value["importedFrom"], "lib es5");
        let back: TypeBound = serde_json::from_value(value).unwrap();
        assert_eq!(back, bound);
    }
}
