//! Schema manifest parsing.
//!
//! A manifest is a TOML description of a data source's static shape:
//!
//! ```toml
//! [types.String]
//! kind = "scalar"
//!
//! [types.Person]
//! kind = "object"
//! fields = { name = "String", bestFriend = "Person?" }
//!
//! [[collections]]
//! name = "people"
//! type = "Person"
//! keys = [{ name = "people_pkey", fields = ["name"] }]
//!
//! [[relations]]
//! name = "best_friend"
//! tail = "people"
//! head = "people"
//! head_key = "people_pkey"
//! ```
//!
//! Declaration order of types and fields is preserved.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::util::diagnostic::suggestions;

/// Conventional manifest file name.
pub const MANIFEST_NAME: &str = "Schema.toml";

/// The parsed manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaManifest {
    #[serde(default)]
    pub types: IndexMap<String, TypeSpec>,

    #[serde(default)]
    pub collections: Vec<CollectionSpec>,

    #[serde(default)]
    pub relations: Vec<RelationSpec>,
}

/// A `[types.<name>]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeSpec {
    Scalar {
        #[serde(default)]
        description: Option<String>,
    },
    Alias {
        /// Type expression of the aliased type
        base: String,
        #[serde(default)]
        description: Option<String>,
    },
    Object {
        #[serde(default)]
        fields: IndexMap<String, FieldSpec>,
        #[serde(default)]
        description: Option<String>,
    },
}

impl TypeSpec {
    pub fn description(&self) -> Option<&str> {
        match self {
            TypeSpec::Scalar { description }
            | TypeSpec::Alias { description, .. }
            | TypeSpec::Object { description, .. } => description.as_deref(),
        }
    }
}

/// A field: either just a type expression, or a table with a description.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Short(String),
    Detailed {
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl FieldSpec {
    pub fn type_expr(&self) -> &str {
        match self {
            FieldSpec::Short(ty) | FieldSpec::Detailed { ty, .. } => ty,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            FieldSpec::Short(_) => None,
            FieldSpec::Detailed { description, .. } => description.as_deref(),
        }
    }
}

/// A `[[collections]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionSpec {
    pub name: String,

    /// Name of the object type, if any
    #[serde(default, rename = "type")]
    pub ty: Option<String>,

    #[serde(default)]
    pub keys: Vec<KeySpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeySpec {
    pub name: String,
    pub fields: Vec<String>,
}

/// A `[[relations]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationSpec {
    pub name: String,
    pub tail: String,
    pub head: String,
    #[serde(default)]
    pub head_key: Option<String>,
}

impl SchemaManifest {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        contents
            .parse()
            .with_context(|| {
                format!(
                    "failed to parse manifest: {}\n{}",
                    path.display(),
                    suggestions::BAD_MANIFEST
                )
            })
    }
}

impl FromStr for SchemaManifest {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// A parsed type expression: `T`, `T?` or `[E]`, nested freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(String),
    Nullable(Box<TypeExpr>),
    List(Box<TypeExpr>),
}

impl TypeExpr {
    /// The type name at the bottom of the expression.
    pub fn base_name(&self) -> &str {
        match self {
            TypeExpr::Named(name) => name,
            TypeExpr::Nullable(inner) | TypeExpr::List(inner) => inner.base_name(),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(inner) = s.strip_suffix('?') {
            let inner: TypeExpr = inner.parse()?;
            if matches!(inner, TypeExpr::Nullable(_)) {
                bail!("type expression `{}` is nullable twice", s);
            }
            return Ok(TypeExpr::Nullable(Box::new(inner)));
        }

        if let Some(rest) = s.strip_prefix('[') {
            let Some(inner) = rest.strip_suffix(']') else {
                bail!("unclosed `[` in type expression `{}`", s);
            };
            return Ok(TypeExpr::List(Box::new(inner.parse()?)));
        }

        if s.is_empty() {
            bail!("empty type expression");
        }
        if s.contains(|c: char| c.is_whitespace() || "[]?".contains(c)) {
            bail!("invalid type name `{}`", s);
        }

        Ok(TypeExpr::Named(s.to_string()))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => write!(f, "{}", name),
            TypeExpr::Nullable(inner) => write!(f, "{}?", inner),
            TypeExpr::List(inner) => write!(f, "[{}]", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::PEOPLE_MANIFEST;

    #[test]
    fn test_parse_manifest_preserves_order() {
        let manifest: SchemaManifest = PEOPLE_MANIFEST.parse().unwrap();

        let types: Vec<&str> = manifest.types.keys().map(String::as_str).collect();
        assert_eq!(types, ["String", "Email", "Person", "Pet"]);

        let TypeSpec::Object { fields, .. } = &manifest.types["Person"] else {
            panic!("Person should be an object type");
        };
        let fields: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(fields, ["name", "email", "bestFriend", "pets"]);

        assert_eq!(manifest.collections.len(), 2);
        assert_eq!(manifest.collections[0].keys[0].fields, ["name"]);
        assert_eq!(manifest.relations[0].head_key.as_deref(), Some("people_pkey"));
    }

    #[test]
    fn test_field_spec_forms() {
        let manifest: SchemaManifest = r#"
            [types.Person]
            kind = "object"
            fields = { name = "String", age = { type = "Int?", description = "Years" } }
        "#
        .parse()
        .unwrap();

        let TypeSpec::Object { fields, .. } = &manifest.types["Person"] else {
            panic!("Person should be an object type");
        };
        assert_eq!(fields["name"].type_expr(), "String");
        assert_eq!(fields["name"].description(), None);
        assert_eq!(fields["age"].type_expr(), "Int?");
        assert_eq!(fields["age"].description(), Some("Years"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result: Result<SchemaManifest> = r#"
            [types.Shape]
            kind = "union"
        "#
        .parse();

        assert!(result.is_err());
    }

    #[test]
    fn test_type_expressions() {
        let expr: TypeExpr = "[Person?]?".parse().unwrap();
        assert_eq!(
            expr,
            TypeExpr::Nullable(Box::new(TypeExpr::List(Box::new(TypeExpr::Nullable(
                Box::new(TypeExpr::Named("Person".to_string()))
            )))))
        );
        assert_eq!(expr.base_name(), "Person");
        assert_eq!(expr.to_string(), "[Person?]?");

        assert!("".parse::<TypeExpr>().is_err());
        assert!("[Person".parse::<TypeExpr>().is_err());
        assert!("Person??".parse::<TypeExpr>().is_err());
        assert!("Best Friend".parse::<TypeExpr>().is_err());
    }
}
