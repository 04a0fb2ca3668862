use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use floe_error::{FloeResult, floe_bail};

use crate::index::{index_by_id, index_by_name};
use crate::{NestedField, NestedFieldRef, StructType, Type};

/// A shared pointer to an immutable [`Schema`].
pub type SchemaRef = Arc<Schema>;

/// An immutable tree of named, typed columns with unique field ids, plus the
/// derived name and id indexes.
///
/// Construction validates the id-uniqueness invariant: every id appearing
/// anywhere in the tree is indexed exactly once. Finished schemas may be
/// shared freely between threads.
#[derive(Debug, Clone)]
pub struct Schema {
    // invariant: always Type::Struct
    root: Type,
    aliases: HashMap<String, i32>,
    name_to_id: HashMap<String, i32>,
    id_to_field: HashMap<i32, NestedFieldRef>,
    highest_field_id: i32,
}

impl Schema {
    /// Create a schema from top-level columns.
    pub fn new(fields: Vec<NestedField>) -> FloeResult<Self> {
        Self::from_struct(StructType::new(fields), HashMap::new())
    }

    /// Create a schema with name aliases. Each alias must resolve to an id
    /// present in the tree.
    pub fn with_aliases(fields: Vec<NestedField>, aliases: HashMap<String, i32>) -> FloeResult<Self> {
        Self::from_struct(StructType::new(fields), aliases)
    }

    /// Create a schema from an existing struct type, sharing its subtrees.
    pub fn from_struct(r#struct: StructType, aliases: HashMap<String, i32>) -> FloeResult<Self> {
        let name_to_id = index_by_name(&r#struct)?;
        let id_to_field = index_by_id(&r#struct)?;
        for (alias, id) in &aliases {
            if !id_to_field.contains_key(id) {
                floe_bail!("alias {} refers to unknown field id {}", alias, id);
            }
        }
        let highest_field_id = id_to_field.keys().copied().max().unwrap_or(0);
        Ok(Self {
            root: Type::Struct(r#struct),
            aliases,
            name_to_id,
            id_to_field,
            highest_field_id,
        })
    }

    /// The root struct.
    pub fn as_struct(&self) -> &StructType {
        self.root.to_struct()
    }

    /// The root struct as a [`Type`].
    pub fn root_type(&self) -> &Type {
        &self.root
    }

    /// The top-level columns.
    pub fn columns(&self) -> &[NestedFieldRef] {
        self.as_struct().fields()
    }

    /// Resolve a dotted name to its field, consulting the main name index and
    /// then the aliases.
    pub fn find_field(&self, name: &str) -> Option<&NestedFieldRef> {
        self.name_to_id
            .get(name)
            .or_else(|| self.aliases.get(name))
            .and_then(|id| self.id_to_field.get(id))
    }

    /// Resolve an id to its field.
    pub fn find_field_by_id(&self, id: i32) -> Option<&NestedFieldRef> {
        self.id_to_field.get(&id)
    }

    /// Resolve a dotted name (or alias) to a field id.
    pub fn field_id(&self, name: &str) -> Option<i32> {
        self.name_to_id
            .get(name)
            .or_else(|| self.aliases.get(name))
            .copied()
    }

    /// The dotted-name index.
    pub fn name_index(&self) -> &HashMap<String, i32> {
        &self.name_to_id
    }

    /// The id index.
    pub fn id_index(&self) -> &HashMap<i32, NestedFieldRef> {
        &self.id_to_field
    }

    /// The alias map.
    pub fn aliases(&self) -> &HashMap<String, i32> {
        &self.aliases
    }

    /// The highest field id present in the tree.
    pub fn highest_field_id(&self) -> i32 {
        self.highest_field_id
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        // indexes are derived, so the root tree and aliases carry equality
        self.root == other.root && self.aliases == other.aliases
    }
}

impl Eq for Schema {}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "schema {}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ListType, PrimitiveType};

    #[test]
    fn find_field_by_name_and_alias() {
        let schema = Schema::with_aliases(
            vec![
                NestedField::required(1, "id", PrimitiveType::Long.into()),
                NestedField::optional(2, "data", PrimitiveType::String.into()),
            ],
            HashMap::from([("identifier".to_string(), 1)]),
        )
        .unwrap();

        assert_eq!(schema.find_field("id").unwrap().id(), 1);
        assert_eq!(schema.find_field("identifier").unwrap().id(), 1);
        assert!(schema.find_field("missing").is_none());
        assert_eq!(schema.field_id("data"), Some(2));
        assert_eq!(schema.highest_field_id(), 2);
    }

    #[test]
    fn nested_ids_count_toward_highest() {
        let schema = Schema::new(vec![
            NestedField::required(1, "id", PrimitiveType::Long.into()),
            NestedField::optional(
                2,
                "tags",
                ListType::of_optional(9, PrimitiveType::String.into()).into(),
            ),
        ])
        .unwrap();
        assert_eq!(schema.highest_field_id(), 9);
        assert_eq!(schema.find_field("tags.element").unwrap().id(), 9);
    }

    #[test]
    fn duplicate_ids_fail_construction() {
        let result = Schema::new(vec![
            NestedField::required(1, "a", PrimitiveType::Int.into()),
            NestedField::required(1, "b", PrimitiveType::Int.into()),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn dangling_alias_fails_construction() {
        let result = Schema::with_aliases(
            vec![NestedField::required(1, "a", PrimitiveType::Int.into())],
            HashMap::from([("ghost".to_string(), 42)]),
        );
        assert!(result.is_err());
    }
}
