//! Package-level documentation IR
//!
//! A [`Package`] is produced once per analysis run. Modules are keyed by
//! their output path, declarations by a run-local id.

use crate::types::{DocEntry, FunctionDocEntry, TypeBound, TypeProperty};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root document for one analyzed package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Package name from `package.json`
    pub name: String,
    /// Output directory root from `tsconfig.json`
    pub out_dir: String,
    /// Normalized `main` entry of `package.json`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub main_module: Option<String>,
    /// Type identity key → declaration id
    pub type_declaration: IndexMap<String, String>,
    /// Declaration id → owning module's output path
    pub declaration_module: IndexMap<String, String>,
    /// Output path → module
    pub modules: IndexMap<String, Module>,
    /// Directory output path → README text
    pub readmes: IndexMap<String, String>,
}

impl Package {
    /// Create an empty package document
    pub fn new(name: impl Into<String>, out_dir: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            out_dir: out_dir.into(),
            ..Default::default()
        }
    }

    /// Look up a declaration by id through `declaration_module`
    pub fn declaration(&self, id: &str) -> Option<&Declaration> {
        let module = self.declaration_module.get(id)?;
        self.modules.get(module)?.declarations.get(id)
    }

    /// The declaration a type identity key links to
    pub fn declaration_for_type(&self, type_id: &str) -> Option<&Declaration> {
        self.declaration(self.type_declaration.get(type_id)?)
    }

    /// Total number of declarations across all modules
    pub fn declaration_count(&self) -> usize {
        self.modules.values().map(|m| m.declarations.len()).sum()
    }
}

/// One source file's exported surface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub name: String,
    pub src_path: String,
    pub out_path: String,
    pub declarations: IndexMap<String, Declaration>,
    pub reexports: Vec<Reexport>,
}

impl Module {
    /// Find a declaration by its exported name
    pub fn declaration_named(&self, name: &str) -> Option<&Declaration> {
        self.declarations.values().find(|d| d.name() == name)
    }
}

/// A `export {srcName as name} from 'path'` edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reexport {
    /// Name under which the declaration is exported here
    pub name: String,
    /// Name of the declaration in the source module
    pub src_name: String,
    /// Output path of the source module
    pub path: String,
    /// Resolved declaration id, empty while unresolved
    pub id: String,
}

impl Reexport {
    /// Create an unresolved edge
    pub fn unresolved(
        name: impl Into<String>,
        src_name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            src_name: src_name.into(),
            path: path.into(),
            id: String::new(),
        }
    }

    /// Whether the resolver found the declaration
    pub fn is_resolved(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Back-link from a declaration to a module that re-exports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedIn {
    pub path: String,
    pub name: String,
}

/// Fields every declaration kind shares
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseDeclaration {
    pub id: String,
    pub name: String,
    pub documentation: String,
    pub exported_in: Vec<ExportedIn>,
}

impl BaseDeclaration {
    pub fn new(id: impl Into<String>, name: impl Into<String>, documentation: String) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            documentation,
            exported_in: Vec::new(),
        }
    }
}

/// Type alias or interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDeclaration {
    #[serde(flatten)]
    pub base: BaseDeclaration,
    #[serde(rename = "type")]
    pub ty: TypeBound,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parameters: Option<Vec<TypeBound>>,
}

/// UI component (class or function form)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDeclaration {
    #[serde(flatten)]
    pub base: BaseDeclaration,
    pub properties: Vec<TypeProperty>,
}

/// Construct signature of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorEntry {
    pub documentation: String,
    pub parameters: Vec<TypeProperty>,
}

/// Class that is not a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDeclaration {
    #[serde(flatten)]
    pub base: BaseDeclaration,
    pub properties: Vec<DocEntry>,
    pub constructors: Vec<ConstructorEntry>,
    pub methods: Vec<FunctionDocEntry>,
}

/// Function, or variable holding a callable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    #[serde(flatten)]
    pub base: BaseDeclaration,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub type_parameters: Option<Vec<TypeBound>>,
    pub parameters: Vec<TypeProperty>,
    pub return_type: TypeBound,
}

/// Non-callable variable with an initializer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    #[serde(flatten)]
    pub base: BaseDeclaration,
    #[serde(rename = "type")]
    pub ty: TypeBound,
    /// Initializer source text, verbatim
    pub value: String,
}

/// Kind of a declaration, as used in the `kind` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationKind {
    Component,
    Type,
    Class,
    Function,
    Variable,
}

/// One exported, documentable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Declaration {
    Component(ComponentDeclaration),
    Type(TypeDeclaration),
    Class(ClassDeclaration),
    Function(FunctionDeclaration),
    Variable(VariableDeclaration),
}

impl Declaration {
    /// Shared fields
    pub fn base(&self) -> &BaseDeclaration {
        match self {
            Declaration::Component(d) => &d.base,
            Declaration::Type(d) => &d.base,
            Declaration::Class(d) => &d.base,
            Declaration::Function(d) => &d.base,
            Declaration::Variable(d) => &d.base,
        }
    }

    /// Shared fields, mutably
    pub fn base_mut(&mut self) -> &mut BaseDeclaration {
        match self {
            Declaration::Component(d) => &mut d.base,
            Declaration::Type(d) => &mut d.base,
            Declaration::Class(d) => &mut d.base,
            Declaration::Function(d) => &mut d.base,
            Declaration::Variable(d) => &mut d.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn kind(&self) -> DeclarationKind {
        match self {
            Declaration::Component(_) => DeclarationKind::Component,
            Declaration::Type(_) => DeclarationKind::Type,
            Declaration::Class(_) => DeclarationKind::Class,
            Declaration::Function(_) => DeclarationKind::Function,
            Declaration::Variable(_) => DeclarationKind::Variable,
        }
    }

    pub fn exported_in(&self) -> &[ExportedIn] {
        &self.base().exported_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn variable(id: &str, name: &str) -> Declaration {
        Declaration::Variable(VariableDeclaration {
            base: BaseDeclaration::new(id, name, String::new()),
            ty: TypeBound::NumberLiteral {
                value: "1".to_string(),
            },
            value: "1".to_string(),
        })
    }

    #[test]
    fn test_declaration_json_is_flat_and_tagged() {
        let value = serde_json::to_value(variable("0", "ONE")).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "Variable",
                "id": "0",
                "name": "ONE",
                "documentation": "",
                "exportedIn": [],
                "type": {"kind": "NumberLiteral", "value": "1"},
                "value": "1"
            })
        );
    }

    #[test]
    fn test_package_lookups() {
        let mut package = Package::new("pkg", "lib");
        let mut module = Module {
            name: "a".to_string(),
            src_path: "src/a.ts".to_string(),
            out_path: "lib/src/a.js".to_string(),
            ..Default::default()
        };
        module.declarations.insert("0".to_string(), variable("0", "ONE"));
        package.modules.insert(module.out_path.clone(), module);
        package
            .declaration_module
            .insert("0".to_string(), "lib/src/a.js".to_string());
        package
            .type_declaration
            .insert("12".to_string(), "0".to_string());

        assert_eq!(package.declaration("0").map(Declaration::name), Some("ONE"));
        assert_eq!(
            package.declaration_for_type("12").map(Declaration::kind),
            Some(DeclarationKind::Variable)
        );
        assert_eq!(package.declaration_count(), 1);
        assert!(package.modules["lib/src/a.js"].declaration_named("ONE").is_some());
    }

    #[test]
    fn test_package_key_names() {
        let value = serde_json::to_value(Package::new("pkg", "lib")).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "name",
                "outDir",
                "typeDeclaration",
                "declarationModule",
                "modules",
                "readmes"
            ]
        );
    }

    #[test]
    fn test_reexport_resolution_flag() {
        let mut edge = Reexport::unresolved("Y", "X", "lib/a.js");
        assert!(!edge.is_resolved());
        edge.id = "3".to_string();
        assert!(edge.is_resolved());
    }
}
