//! Inventory - the validated registry of a data source's schema.
//!
//! An inventory owns three name-keyed registries: types, collections and
//! relations. Registering a collection pulls in its object type together with
//! every type that type is composed of; registering a relation checks that
//! both ends are already members. Names are unique per registry, and a name
//! can only ever be bound to one instance.
//!
//! Inventories grow monotonically. Build one on a single thread, then
//! [`freeze`](Inventory::freeze) it to share a read-only view.

use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::errors::{EntityKind, InventoryError, RelationEnd};
use crate::core::{Collection, Name, Relation, Type};

/// How a failed type closure walk affects the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosureMode {
    /// Nothing from the failed call is registered.
    #[default]
    Atomic,
    /// Everything registered before the failing step stays registered.
    BestEffort,
}

impl std::str::FromStr for ClosureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "atomic" => Ok(ClosureMode::Atomic),
            "best-effort" => Ok(ClosureMode::BestEffort),
            other => Err(format!(
                "unknown closure mode `{}` (expected `atomic` or `best-effort`)",
                other
            )),
        }
    }
}

/// Behavioural switches for an [`Inventory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryOptions {
    pub closure: ClosureMode,
}

/// Types collected during a closure walk, committed only once the walk ends.
type Staged = IndexMap<Name, Type>;

/// The aggregate registry of types, collections and relations.
#[derive(Debug, Default)]
pub struct Inventory {
    types: IndexMap<Name, Type>,
    collections: IndexMap<Name, Collection>,
    relations: IndexMap<Name, Relation>,
    options: InventoryOptions,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: InventoryOptions) -> Self {
        Inventory {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> InventoryOptions {
        self.options
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// Add a type along with every type it is composed of.
    ///
    /// Adding the exact instance that is already registered is a no-op.
    /// Adding a different type under a registered name fails with
    /// [`InventoryError::DuplicateName`].
    pub fn add_type(&mut self, ty: &Type) -> Result<&mut Self, InventoryError> {
        let mut staged = Staged::new();
        let outcome = self.stage_type(ty, &mut staged);

        match outcome {
            Ok(()) => {
                self.commit_types(staged);
                Ok(self)
            }
            Err(err) => {
                self.abandon_types(staged, &err);
                Err(err)
            }
        }
    }

    /// Depth-first walk over the type graph, in pre-order: the type, then its
    /// alias base, then its field types in declaration order.
    ///
    /// Recurses once per newly staged type, so a chain of thousands of
    /// distinct nested types needs a correspondingly large stack.
    fn stage_type(&self, ty: &Type, staged: &mut Staged) -> Result<(), InventoryError> {
        let name = ty.name();

        // Same instance already present: this is also what stops cycles.
        if self.has_type(ty) || staged.get(&name).is_some_and(|t| t.ptr_eq(ty)) {
            return Ok(());
        }

        if self.types.contains_key(&name) || staged.contains_key(&name) {
            return Err(InventoryError::DuplicateName {
                kind: EntityKind::Type,
                name,
            });
        }

        tracing::trace!("Staging type `{}`", name);
        staged.insert(name, ty.clone());

        for dependency in ty.dependencies() {
            self.stage_type(dependency, staged)?;
        }

        Ok(())
    }

    fn commit_types(&mut self, staged: Staged) {
        for (name, ty) in staged {
            tracing::debug!("Registered {:?} type `{}`", ty.kind_tag(), name);
            self.types.insert(name, ty);
        }
    }

    fn abandon_types(&mut self, staged: Staged, err: &InventoryError) {
        match self.options.closure {
            ClosureMode::Atomic => {
                tracing::debug!("Discarding {} staged type(s): {}", staged.len(), err);
            }
            ClosureMode::BestEffort => {
                if !staged.is_empty() {
                    tracing::warn!(
                        "Keeping {} type(s) registered before failure: {}",
                        staged.len(),
                        err
                    );
                }
                self.commit_types(staged);
            }
        }
    }

    /// All registered types, in registration order.
    pub fn types(&self) -> impl ExactSizeIterator<Item = &Type> {
        self.types.values()
    }

    /// Get a registered type by name.
    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    /// Returns true if this exact type instance is registered under its name.
    pub fn has_type(&self, ty: &Type) -> bool {
        self.types
            .get(&ty.name())
            .is_some_and(|registered| registered.ptr_eq(ty))
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    /// Add a collection and, if it has one, its object type (with closure).
    ///
    /// Re-adding the exact registered instance is a no-op, as for types.
    pub fn add_collection(&mut self, collection: &Collection) -> Result<&mut Self, InventoryError> {
        let name = collection.name();

        if let Some(existing) = self.collections.get(&name) {
            if existing.ptr_eq(collection) {
                return Ok(self);
            }
            return Err(InventoryError::DuplicateName {
                kind: EntityKind::Collection,
                name,
            });
        }

        let mut staged = Staged::new();
        let outcome = match collection.object_type() {
            Some(ty) => self.stage_type(ty, &mut staged),
            None => Ok(()),
        };

        match outcome {
            Ok(()) => {
                self.insert_collection(collection);
                self.commit_types(staged);
                Ok(self)
            }
            Err(err) => {
                if self.options.closure == ClosureMode::BestEffort {
                    self.insert_collection(collection);
                }
                self.abandon_types(staged, &err);
                Err(err)
            }
        }
    }

    fn insert_collection(&mut self, collection: &Collection) {
        tracing::debug!("Registered collection `{}`", collection.name());
        self.collections.insert(collection.name(), collection.clone());
    }

    /// All registered collections, in registration order.
    pub fn collections(&self) -> impl ExactSizeIterator<Item = &Collection> {
        self.collections.values()
    }

    /// Get a registered collection by name.
    pub fn get_collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Returns true if this exact collection instance is registered.
    pub fn has_collection(&self, collection: &Collection) -> bool {
        self.collections
            .get(&collection.name())
            .is_some_and(|registered| registered.ptr_eq(collection))
    }

    // ------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------

    /// Add a relation between two registered collections.
    ///
    /// Checks, in order: the head key belongs to the head collection, the
    /// tail collection is registered, the head collection is registered, the
    /// relation name is free.
    pub fn add_relation(&mut self, relation: &Relation) -> Result<&mut Self, InventoryError> {
        let name = relation.name();
        let tail = relation.tail_collection();
        let head = relation.head_collection();

        if let Some(key) = relation.head_collection_key() {
            if !head.has_key(key) {
                return Err(InventoryError::InvalidKey {
                    relation: name,
                    key: key.name(),
                    collection: head.name(),
                });
            }
        }

        for (end, collection) in [(RelationEnd::Tail, tail), (RelationEnd::Head, head)] {
            if !self.has_collection(collection) {
                return Err(InventoryError::UnknownCollection {
                    relation: name,
                    end,
                    collection: collection.name(),
                });
            }
        }

        if self.relations.contains_key(&name) {
            return Err(InventoryError::DuplicateName {
                kind: EntityKind::Relation,
                name,
            });
        }

        tracing::debug!("Registered relation {}", relation);
        self.relations.insert(name, relation.clone());

        Ok(self)
    }

    /// All registered relations, in registration order.
    pub fn relations(&self) -> impl ExactSizeIterator<Item = &Relation> {
        self.relations.values()
    }

    /// Get a registered relation by name.
    pub fn get_relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// Relations whose tail is this exact collection.
    pub fn relations_from<'a>(
        &'a self,
        collection: &'a Collection,
    ) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations
            .values()
            .filter(move |r| r.tail_collection().ptr_eq(collection))
    }

    /// Relations whose head is this exact collection.
    pub fn relations_to<'a>(
        &'a self,
        collection: &'a Collection,
    ) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations
            .values()
            .filter(move |r| r.head_collection().ptr_eq(collection))
    }

    // ------------------------------------------------------------------
    // Whole-inventory
    // ------------------------------------------------------------------

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.collections.is_empty() && self.relations.is_empty()
    }

    /// End the construction phase and get a shareable read-only view.
    pub fn freeze(self) -> FrozenInventory {
        tracing::debug!(
            "Freezing inventory with {} types, {} collections, {} relations",
            self.types.len(),
            self.collections.len(),
            self.relations.len()
        );
        FrozenInventory {
            inner: Arc::new(self),
        }
    }
}

/// An immutable, cheaply clonable inventory that can be shared across
/// threads. Only the read accessors of [`Inventory`] are reachable.
#[derive(Debug, Clone)]
pub struct FrozenInventory {
    inner: Arc<Inventory>,
}

impl Deref for FrozenInventory {
    type Target = Inventory;

    fn deref(&self) -> &Inventory {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Key, TypeRef};
    use crate::test_support::{people_collection, person_type};

    fn type_names(inventory: &Inventory) -> Vec<&str> {
        inventory.types().map(|t| t.name().as_str()).collect()
    }

    #[test]
    fn test_add_type_is_idempotent() {
        let string = Type::scalar("String");
        let mut inventory = Inventory::new();

        inventory.add_type(&string).unwrap();
        inventory.add_type(&string).unwrap();

        assert_eq!(type_names(&inventory), ["String"]);
        assert!(inventory.has_type(&string));
    }

    #[test]
    fn test_distinct_type_same_name_rejected() {
        let first = Type::scalar("String");
        let second = Type::scalar("String");
        let mut inventory = Inventory::new();

        inventory.add_type(&first).unwrap();
        let err = inventory.add_type(&second).unwrap_err();

        assert_eq!(
            err,
            InventoryError::DuplicateName {
                kind: EntityKind::Type,
                name: Name::new("String"),
            }
        );
        assert_eq!(inventory.type_count(), 1);
        assert!(inventory.has_type(&first));
        assert!(!inventory.has_type(&second));
    }

    #[test]
    fn test_alias_closure() {
        let string = Type::scalar("String");
        let email = Type::alias("Email", &string);
        let contact = Type::alias("Contact", TypeRef::nullable(&email));
        let mut inventory = Inventory::new();

        inventory.add_type(&contact).unwrap();

        assert_eq!(type_names(&inventory), ["Contact", "Email", "String"]);
    }

    #[test]
    fn test_object_closure_in_field_order() {
        let string = Type::scalar("String");
        let int = Type::scalar("Int");
        let email = Type::alias("Email", &string);
        let address = Type::object_with_fields("Address", [("street", &string)]).unwrap();
        let account = Type::object_with_fields(
            "Account",
            [
                ("id", TypeRef::from(&int)),
                ("emails", TypeRef::list(&email)),
                ("address", TypeRef::nullable(&address)),
            ],
        )
        .unwrap();
        let mut inventory = Inventory::new();

        inventory.add_type(&account).unwrap();

        assert_eq!(
            type_names(&inventory),
            ["Account", "Int", "Email", "String", "Address"]
        );
    }

    #[test]
    fn test_self_referential_type_terminates() {
        let (person, string) = person_type();
        let mut inventory = Inventory::new();

        inventory.add_type(&person).unwrap();

        assert_eq!(type_names(&inventory), ["Person", "String"]);
        assert!(inventory.has_type(&string));
    }

    #[test]
    fn test_mutually_recursive_types() {
        let person = Type::object("Person");
        let pet = Type::object("Pet");
        person.define_fields([("pets", TypeRef::list(&pet))]).unwrap();
        pet.define_fields([("owner", &person)]).unwrap();
        let mut inventory = Inventory::new();

        inventory.add_type(&pet).unwrap();

        assert_eq!(type_names(&inventory), ["Pet", "Person"]);
    }

    #[test]
    fn test_atomic_closure_rolls_back() {
        let string = Type::scalar("String");
        let other_string = Type::scalar("String");
        let int = Type::scalar("Int");
        let record = Type::object_with_fields(
            "Record",
            [("count", &int), ("label", &other_string)],
        )
        .unwrap();
        let mut inventory = Inventory::new();
        inventory.add_type(&string).unwrap();

        let err = inventory.add_type(&record).unwrap_err();

        assert!(matches!(err, InventoryError::DuplicateName { name, .. } if name == "String"));
        assert_eq!(type_names(&inventory), ["String"]);
    }

    #[test]
    fn test_best_effort_closure_keeps_prefix() {
        let string = Type::scalar("String");
        let other_string = Type::scalar("String");
        let int = Type::scalar("Int");
        let record = Type::object_with_fields(
            "Record",
            [("count", &int), ("label", &other_string)],
        )
        .unwrap();
        let mut inventory = Inventory::with_options(InventoryOptions {
            closure: ClosureMode::BestEffort,
        });
        inventory.add_type(&string).unwrap();

        assert!(inventory.add_type(&record).is_err());

        assert_eq!(type_names(&inventory), ["String", "Record", "Int"]);
        assert!(inventory.has_type(&string));
    }

    #[test]
    fn test_add_collection_registers_type_closure() {
        let people = people_collection();
        let mut inventory = Inventory::new();

        inventory.add_collection(&people).unwrap();

        assert!(inventory.has_collection(&people));
        assert_eq!(type_names(&inventory), ["Person", "String"]);
        assert!(inventory.get_collection("people").unwrap().ptr_eq(&people));
        assert!(inventory.get_collection("pets").is_none());
    }

    #[test]
    fn test_collection_readd_same_instance_is_noop() {
        let people = people_collection();
        let mut inventory = Inventory::new();

        inventory
            .add_collection(&people)
            .unwrap()
            .add_collection(&people)
            .unwrap();

        assert_eq!(inventory.collection_count(), 1);
    }

    #[test]
    fn test_collection_name_collision() {
        let mut inventory = Inventory::new();
        inventory.add_collection(&people_collection()).unwrap();

        let err = inventory.add_collection(&people_collection()).unwrap_err();

        assert!(matches!(
            err,
            InventoryError::DuplicateName {
                kind: EntityKind::Collection,
                ..
            }
        ));
    }

    #[test]
    fn test_collection_type_conflict_is_atomic() {
        let mut inventory = Inventory::new();
        inventory.add_type(&Type::scalar("String")).unwrap();

        let people = people_collection();
        assert!(inventory.add_collection(&people).is_err());

        assert!(!inventory.has_collection(&people));
        assert_eq!(type_names(&inventory), ["String"]);
    }

    #[test]
    fn test_collection_type_conflict_best_effort() {
        let mut inventory = Inventory::with_options(InventoryOptions {
            closure: ClosureMode::BestEffort,
        });
        inventory.add_type(&Type::scalar("String")).unwrap();

        let people = people_collection();
        assert!(inventory.add_collection(&people).is_err());

        assert!(inventory.has_collection(&people));
        assert_eq!(type_names(&inventory), ["String", "Person"]);
    }

    #[test]
    fn test_untyped_collection() {
        let blobs = Collection::new("blobs", None).unwrap();
        let mut inventory = Inventory::new();

        inventory.add_collection(&blobs).unwrap();

        assert_eq!(inventory.collection_count(), 1);
        assert_eq!(inventory.type_count(), 0);
    }

    #[test]
    fn test_relation_graph() {
        let (person, _) = person_type();
        let a = Collection::new("a", Some(person.clone())).unwrap();
        let b = Collection::new("b", Some(person)).unwrap();
        let mut inventory = Inventory::new();
        inventory.add_collection(&a).unwrap().add_collection(&b).unwrap();

        inventory.add_relation(&Relation::new("r1", &a, &b)).unwrap();

        let relations: Vec<&Relation> = inventory.relations().collect();
        assert_eq!(relations.len(), 1);
        assert!(relations[0].tail_collection().ptr_eq(&a));
        assert!(relations[0].head_collection().ptr_eq(&b));
        assert_eq!(inventory.relations_from(&a).count(), 1);
        assert_eq!(inventory.relations_to(&a).count(), 0);
        assert_eq!(inventory.relations_to(&b).count(), 1);
        assert!(inventory.get_relation("r1").is_some());
    }

    #[test]
    fn test_relation_requires_registered_collections() {
        let people = people_collection();
        let pets = Collection::new("pets", None).unwrap();
        let mut inventory = Inventory::new();
        inventory.add_collection(&people).unwrap();

        let err = inventory
            .add_relation(&Relation::new("owner", &pets, &people))
            .unwrap_err();
        assert!(matches!(
            err,
            InventoryError::UnknownCollection {
                end: RelationEnd::Tail,
                ..
            }
        ));

        let err = inventory
            .add_relation(&Relation::new("owns", &people, &pets))
            .unwrap_err();
        assert!(matches!(
            err,
            InventoryError::UnknownCollection {
                end: RelationEnd::Head,
                ..
            }
        ));

        // A same-named but different collection instance is not a member
        let impostor = people_collection();
        let err = inventory
            .add_relation(&Relation::new("friend", &people, &impostor))
            .unwrap_err();
        assert!(matches!(err, InventoryError::UnknownCollection { .. }));
        assert_eq!(inventory.relation_count(), 0);
    }

    #[test]
    fn test_relation_head_key_validated_first() {
        let people = people_collection();
        let pets = Collection::new("pets", None).unwrap();
        let mut inventory = Inventory::new();
        inventory.add_collection(&people).unwrap();

        // Checked before membership of the (unregistered) tail
        let foreign = Key::new("people_pkey", ["name"]);
        let err = inventory
            .add_relation(&Relation::new("owner", &pets, &people).with_head_key(&foreign))
            .unwrap_err();

        assert_eq!(
            err,
            InventoryError::InvalidKey {
                relation: Name::new("owner"),
                key: Name::new("people_pkey"),
                collection: Name::new("people"),
            }
        );
    }

    #[test]
    fn test_relation_key_of_other_member_rejected() {
        let (person, _) = person_type();
        let collection = |name: &str| {
            Collection::builder(name)
                .object_type(person.clone())
                .key("k", ["name"])
                .build()
                .unwrap()
        };
        let a = collection("a");
        let b = collection("b");
        let mut inventory = Inventory::new();
        inventory.add_collection(&a).unwrap();
        inventory.add_collection(&b).unwrap();

        // Same key name, but the instance belongs to `a`
        let err = inventory
            .add_relation(&Relation::new("r", &a, &b).with_head_key(a.key("k").unwrap()))
            .unwrap_err();

        assert!(matches!(
            err,
            InventoryError::InvalidKey { collection, .. } if collection == "b"
        ));
        assert_eq!(inventory.relation_count(), 0);
    }

    #[test]
    fn test_relation_with_declared_key() {
        let people = people_collection();
        let key = people.key("people_pkey").unwrap();
        let mut inventory = Inventory::new();
        inventory.add_collection(&people).unwrap();

        inventory
            .add_relation(&Relation::new("best_friend", &people, &people).with_head_key(key))
            .unwrap();

        let relation = inventory.get_relation("best_friend").unwrap();
        assert!(relation.head_collection_key().unwrap().ptr_eq(key));
    }

    #[test]
    fn test_relation_name_collision_any_instance() {
        let people = people_collection();
        let relation = Relation::new("best_friend", &people, &people);
        let mut inventory = Inventory::new();
        inventory.add_collection(&people).unwrap();
        inventory.add_relation(&relation).unwrap();

        let err = inventory.add_relation(&relation).unwrap_err();

        assert!(matches!(
            err,
            InventoryError::DuplicateName {
                kind: EntityKind::Relation,
                ..
            }
        ));
        assert_eq!(inventory.relation_count(), 1);
    }

    #[test]
    fn test_person_scenario() {
        let (person, string) = person_type();
        let people = Collection::new("people", Some(person.clone())).unwrap();
        let mut inventory = Inventory::new();

        inventory.add_collection(&people).unwrap();

        assert_eq!(inventory.type_count(), 2);
        assert!(inventory.has_type(&person));
        assert!(inventory.has_type(&string));
        assert_eq!(
            inventory
                .collections()
                .map(|c| c.name().as_str())
                .collect::<Vec<_>>(),
            ["people"]
        );
    }

    #[test]
    fn test_frozen_inventory_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FrozenInventory>();

        let mut inventory = Inventory::new();
        inventory.add_collection(&people_collection()).unwrap();
        let frozen = inventory.freeze();

        let reader = frozen.clone();
        let count = std::thread::spawn(move || reader.collection_count())
            .join()
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(frozen.type_count(), 2);
    }

    #[test]
    fn test_closure_mode_parse() {
        assert_eq!("atomic".parse::<ClosureMode>(), Ok(ClosureMode::Atomic));
        assert_eq!(
            "best-effort".parse::<ClosureMode>(),
            Ok(ClosureMode::BestEffort)
        );
        assert!("partial".parse::<ClosureMode>().is_err());
    }
}
