//! Serializable summaries of an inventory, for text and JSON output.

use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;

use crate::core::{Collection, Inventory, Name, Relation, Type, TypeKindTag};

/// Which parts of an inventory to include in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub types: bool,
    pub collections: bool,
    pub relations: bool,
}

impl Sections {
    pub fn all() -> Self {
        Sections {
            types: true,
            collections: true,
            relations: true,
        }
    }

    /// Build from explicit flags; no flags at all means everything.
    pub fn from_flags(types: bool, collections: bool, relations: bool) -> Self {
        if !(types || collections || relations) {
            return Self::all();
        }
        Sections {
            types,
            collections,
            relations,
        }
    }
}

impl Default for Sections {
    fn default() -> Self {
        Self::all()
    }
}

/// A snapshot of an inventory's contents, in registration order.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<TypeReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<CollectionReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<RelationReport>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeReport {
    pub name: Name,
    pub kind: TypeKindTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub name: Name,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub name: Name,
    #[serde(rename = "type")]
    pub ty: Option<Name>,
    pub keys: Vec<KeyReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyReport {
    pub name: Name,
    pub fields: Vec<Name>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationReport {
    pub name: Name,
    pub tail: Name,
    pub head: Name,
    pub head_key: Option<Name>,
}

impl From<&Type> for TypeReport {
    fn from(ty: &Type) -> Self {
        TypeReport {
            name: ty.name(),
            kind: ty.kind_tag(),
            base: ty.base_type().map(ToString::to_string),
            fields: ty
                .fields()
                .map(|(name, field)| FieldReport {
                    name: *name,
                    ty: field.type_ref().to_string(),
                    description: field.description().map(str::to_string),
                })
                .collect(),
            description: ty.description().map(str::to_string),
        }
    }
}

impl From<&Collection> for CollectionReport {
    fn from(collection: &Collection) -> Self {
        CollectionReport {
            name: collection.name(),
            ty: collection.object_type().map(Type::name),
            keys: collection
                .keys()
                .iter()
                .map(|key| KeyReport {
                    name: key.name(),
                    fields: key.fields().to_vec(),
                })
                .collect(),
        }
    }
}

impl From<&Relation> for RelationReport {
    fn from(relation: &Relation) -> Self {
        RelationReport {
            name: relation.name(),
            tail: relation.tail_collection().name(),
            head: relation.head_collection().name(),
            head_key: relation.head_collection_key().map(|key| key.name()),
        }
    }
}

impl InventoryReport {
    pub fn from_inventory(inventory: &Inventory, sections: Sections) -> Self {
        InventoryReport {
            types: sections
                .types
                .then(|| inventory.types().map(TypeReport::from).collect()),
            collections: sections
                .collections
                .then(|| inventory.collections().map(CollectionReport::from).collect()),
            relations: sections
                .relations
                .then(|| inventory.relations().map(RelationReport::from).collect()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as indented plain text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        if let Some(types) = &self.types {
            out.push_str("types:\n");
            for ty in types {
                match &ty.base {
                    Some(base) => {
                        let _ = writeln!(out, "  {} (alias of {})", ty.name, base);
                    }
                    None => {
                        let kind = match ty.kind {
                            TypeKindTag::Scalar => "scalar",
                            TypeKindTag::Alias => "alias",
                            TypeKindTag::Object => "object",
                        };
                        let _ = writeln!(out, "  {} ({})", ty.name, kind);
                    }
                }
                for field in &ty.fields {
                    let _ = writeln!(out, "    {}: {}", field.name, field.ty);
                }
            }
        }

        if let Some(collections) = &self.collections {
            out.push_str("collections:\n");
            for collection in collections {
                match collection.ty {
                    Some(ty) => {
                        let _ = writeln!(out, "  {}: {}", collection.name, ty);
                    }
                    None => {
                        let _ = writeln!(out, "  {}", collection.name);
                    }
                }
                for key in &collection.keys {
                    let fields: Vec<&str> = key.fields.iter().map(|f| f.as_str()).collect();
                    let _ = writeln!(out, "    key {} ({})", key.name, fields.join(", "));
                }
            }
        }

        if let Some(relations) = &self.relations {
            out.push_str("relations:\n");
            for relation in relations {
                let _ = write!(
                    out,
                    "  {}: {} -> {}",
                    relation.name, relation.tail, relation.head
                );
                if let Some(key) = relation.head_key {
                    let _ = write!(out, " via {}", key);
                }
                out.push('\n');
            }
        }

        out
    }
}
