//! Build an inventory from a schema manifest.
//!
//! Handles for every declared type are created before any object fields are
//! defined, so fields may refer to types declared later in the file or to
//! the object type itself.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::core::manifest::{CollectionSpec, RelationSpec, SchemaManifest, TypeSpec};
use crate::core::{
    Collection, Field, Inventory, InventoryOptions, Name, Relation, Type, TypeExpr, TypeRef,
};

/// Load a manifest file and build its inventory.
pub fn load_inventory(path: &Path, options: InventoryOptions) -> Result<Inventory> {
    let manifest = SchemaManifest::load(path)?;
    let inventory = build_inventory(&manifest, options)
        .with_context(|| format!("invalid schema in {}", path.display()))?;

    tracing::info!(
        "Loaded {}: {} types, {} collections, {} relations",
        path.display(),
        inventory.type_count(),
        inventory.collection_count(),
        inventory.relation_count()
    );

    Ok(inventory)
}

/// Build an inventory from a parsed manifest.
///
/// Types are registered in declaration order, then collections, then
/// relations.
pub fn build_inventory(manifest: &SchemaManifest, options: InventoryOptions) -> Result<Inventory> {
    let mut table = TypeTable::new(manifest);
    let types = table.declare_all()?;

    let mut inventory = Inventory::with_options(options);

    for ty in &types {
        inventory
            .add_type(ty)
            .with_context(|| format!("failed to add type `{}`", ty.name()))?;
    }

    for spec in &manifest.collections {
        let collection = build_collection(spec, &mut table)?;
        inventory
            .add_collection(&collection)
            .with_context(|| format!("failed to add collection `{}`", spec.name))?;
    }

    for spec in &manifest.relations {
        let relation = build_relation(spec, &inventory)?;
        inventory
            .add_relation(&relation)
            .with_context(|| format!("failed to add relation `{}`", spec.name))?;
    }

    Ok(inventory)
}

/// Type handles by declared name, created on first use.
struct TypeTable<'m> {
    manifest: &'m SchemaManifest,
    handles: HashMap<&'m str, Type>,
    /// Aliases currently being resolved, to reject alias cycles
    resolving: Vec<&'m str>,
}

impl<'m> TypeTable<'m> {
    fn new(manifest: &'m SchemaManifest) -> Self {
        TypeTable {
            manifest,
            handles: HashMap::new(),
            resolving: Vec::new(),
        }
    }

    /// Create every declared type and define object fields. Returns the
    /// types in declaration order.
    fn declare_all(&mut self) -> Result<Vec<Type>> {
        let manifest = self.manifest;

        let types = manifest
            .types
            .keys()
            .map(|name| self.lookup(name))
            .collect::<Result<Vec<_>>>()?;

        for (name, spec) in &manifest.types {
            if let TypeSpec::Object { fields, .. } = spec {
                let ty = self.lookup(name)?;
                let mut defined = Vec::with_capacity(fields.len());

                for (field_name, field_spec) in fields {
                    let type_ref = self
                        .resolve(field_spec.type_expr())
                        .with_context(|| format!("in field `{}.{}`", name, field_name))?;
                    let mut field = Field::new(type_ref);
                    if let Some(description) = field_spec.description() {
                        field = field.with_description(description);
                    }
                    defined.push((Name::parse(field_name)?, field));
                }

                ty.define_fields(defined)?;
            }
        }

        Ok(types)
    }

    /// Get the handle for a declared type, creating it if needed.
    fn lookup(&mut self, name: &str) -> Result<Type> {
        if let Some(ty) = self.handles.get(name) {
            return Ok(ty.clone());
        }

        let manifest: &'m SchemaManifest = self.manifest;
        let Some((name, spec)) = manifest.types.get_key_value(name) else {
            bail!("unknown type `{}`", name);
        };
        let name: &'m str = name;

        let ty = match spec {
            TypeSpec::Scalar { .. } => Type::scalar(Name::parse(name)?),
            TypeSpec::Object { .. } => Type::object(Name::parse(name)?),
            TypeSpec::Alias { base, .. } => {
                if self.resolving.contains(&name) {
                    bail!(
                        "alias cycle: {} -> {}",
                        self.resolving.join(" -> "),
                        name
                    );
                }
                self.resolving.push(name);
                let base = self
                    .resolve(base)
                    .with_context(|| format!("in base of alias `{}`", name));
                self.resolving.pop();
                Type::alias(Name::parse(name)?, base?)
            }
        };

        // Still the only handle, so the description sticks
        let ty = match spec.description() {
            Some(description) => ty.with_description(description),
            None => ty,
        };

        tracing::trace!("Declared type `{}`", name);
        self.handles.insert(name, ty.clone());
        Ok(ty)
    }

    /// Resolve a type expression string to a type reference.
    fn resolve(&mut self, expr: &str) -> Result<TypeRef> {
        let expr: TypeExpr = expr.parse()?;
        self.resolve_expr(&expr)
    }

    fn resolve_expr(&mut self, expr: &TypeExpr) -> Result<TypeRef> {
        Ok(match expr {
            TypeExpr::Named(name) => TypeRef::Named(self.lookup(name)?),
            TypeExpr::Nullable(inner) => TypeRef::nullable(self.resolve_expr(inner)?),
            TypeExpr::List(inner) => TypeRef::list(self.resolve_expr(inner)?),
        })
    }
}

fn build_collection(spec: &CollectionSpec, table: &mut TypeTable<'_>) -> Result<Collection> {
    let object_type = spec
        .ty
        .as_deref()
        .map(|name| table.lookup(name))
        .transpose()
        .with_context(|| format!("in collection `{}`", spec.name))?;

    let mut builder = Collection::builder(Name::parse(&spec.name)?).maybe_object_type(object_type);
    for key in &spec.keys {
        let fields = key
            .fields
            .iter()
            .map(Name::parse)
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.key(Name::parse(&key.name)?, fields);
    }

    Ok(builder.build()?)
}

fn build_relation(spec: &RelationSpec, inventory: &Inventory) -> Result<Relation> {
    let collection = |name: &str| {
        inventory.get_collection(name).ok_or_else(|| {
            anyhow!(
                "relation `{}` references undeclared collection `{}`",
                spec.name,
                name
            )
        })
    };

    let tail = collection(&spec.tail)?;
    let head = collection(&spec.head)?;
    let mut relation = Relation::new(Name::parse(&spec.name)?, tail, head);

    if let Some(key_name) = &spec.head_key {
        let key = head.key(key_name).ok_or_else(|| {
            anyhow!(
                "relation `{}` uses key `{}`, which collection `{}` does not declare",
                spec.name,
                key_name,
                head.name()
            )
        })?;
        relation = relation.with_head_key(key);
    }

    Ok(relation)
}
