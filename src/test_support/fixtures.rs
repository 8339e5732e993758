//! Schema fixtures for common test scenarios.

use crate::core::{Collection, Field, Type, TypeRef};

/// `Person { name: String, bestFriend: Person? }`, returned with its `String`.
pub fn person_type() -> (Type, Type) {
    let string = Type::scalar("String");
    let person = Type::object("Person");
    person
        .define_fields([
            ("name", Field::new(&string)),
            ("bestFriend", Field::new(TypeRef::nullable(&person))),
        ])
        .unwrap();
    (person, string)
}

/// A `people` collection over a fresh [`person_type`], keyed by name.
pub fn people_collection() -> Collection {
    let (person, _) = person_type();
    Collection::builder("people")
        .object_type(person)
        .key("people_pkey", ["name"])
        .build()
        .unwrap()
}

/// Manifest for people owning pets, with recursive and forward references.
pub const PEOPLE_MANIFEST: &str = r#"
[types.String]
kind = "scalar"
description = "UTF-8 text"

[types.Email]
kind = "alias"
base = "String"

[types.Person]
kind = "object"

[types.Person.fields]
name = "String"
email = { type = "Email?", description = "Primary contact address" }
bestFriend = "Person?"
pets = "[Pet]"

[types.Pet]
kind = "object"
fields = { id = "String", owner = "Person" }

[[collections]]
name = "people"
type = "Person"
keys = [{ name = "people_pkey", fields = ["name"] }]

[[collections]]
name = "pets"
type = "Pet"
keys = [{ name = "pets_pkey", fields = ["id"] }]

[[relations]]
name = "best_friend"
tail = "people"
head = "people"
head_key = "people_pkey"

[[relations]]
name = "owner"
tail = "pets"
head = "people"
"#;
