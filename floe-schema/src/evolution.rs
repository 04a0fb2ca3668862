//! Batched schema evolution.
//!
//! A [`SchemaUpdate`] accumulates add/delete/update/rename edits against a
//! base schema, validating each edit when it is issued. [`SchemaUpdate::apply`]
//! reconstructs the tree in a single custom-order traversal; ids of untouched
//! fields are preserved and new ids are drawn from a monotone counter seeded
//! with the table's last column id.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use floe_error::{FloeResult, floe_bail, floe_err, floe_panic};
use tracing::debug;

use crate::index::index_by_id;
use crate::select::assign_fresh_ids;
use crate::visit::{CustomOrderVisitor, PendingField, PendingType, visit_schema_custom};
use crate::{
    ListType, MapType, NestedField, NestedFieldRef, PrimitiveType, Schema, SchemaRef, StructType,
    Type,
};

/// The pseudo-parent id used for additions at the schema root.
pub const TABLE_ROOT_ID: i32 = -1;

/// The opaque metadata store the core hands finished schemas to.
///
/// Implementations provide compare-and-swap on a current-metadata pointer;
/// of two concurrent swaps against the same base, exactly one succeeds.
pub trait MetadataStore {
    /// Atomically replace the current schema if `base` is still current.
    /// Returns false when the pointer moved and nothing was written.
    fn compare_and_swap(
        &self,
        base: &Schema,
        next: SchemaRef,
        last_column_id: i32,
    ) -> FloeResult<bool>;
}

/// A batch of pending schema edits.
///
/// A rejected edit leaves previously accepted edits intact; callers may keep
/// issuing edits after a validation error.
#[derive(Debug)]
pub struct SchemaUpdate {
    base: SchemaRef,
    last_column_id: i32,
    deletes: HashSet<i32>,
    updates: HashMap<i32, NestedField>,
    adds: HashMap<i32, Vec<NestedField>>,
}

impl SchemaUpdate {
    /// Start a new update against `base`. New column ids are drawn above
    /// `last_column_id` (and above any id already present in the base).
    pub fn new(base: SchemaRef, last_column_id: i32) -> Self {
        let last_column_id = last_column_id.max(base.highest_field_id());
        Self {
            base,
            last_column_id,
            deletes: HashSet::new(),
            updates: HashMap::new(),
            adds: HashMap::new(),
        }
    }

    /// The id counter after all accepted edits so far.
    pub fn last_column_id(&self) -> i32 {
        self.last_column_id
    }

    fn assign_new_column_id(&mut self) -> i32 {
        self.last_column_id += 1;
        self.last_column_id
    }

    // container slots (list element, map key/value) cannot be deleted or
    // renamed independently of their container
    fn is_container_slot(&self, id: i32) -> bool {
        self.base.id_index().values().any(|field| match field.field_type() {
            Type::List(list) => list.element_id() == id,
            Type::Map(map) => map.key_id() == id || map.value_id() == id,
            _ => false,
        })
    }

    /// Add an optional column. `parent` of `None` adds at the root; a parent
    /// name resolves through list elements and map values to a struct.
    /// Nested ids inside `field_type` are reassigned before being stored.
    pub fn add_column(
        &mut self,
        parent: Option<&str>,
        name: &str,
        field_type: Type,
    ) -> FloeResult<&mut Self> {
        let (parent_id, collision_name) = match parent {
            None => (TABLE_ROOT_ID, name.to_string()),
            Some(parent_name) => {
                let field = self
                    .base
                    .find_field(parent_name)
                    .ok_or_else(|| floe_err!("cannot find parent struct: {}", parent_name))?;
                let (target, prefix) = match field.field_type() {
                    Type::List(list) => (
                        NestedFieldRef::clone(list.element_field()),
                        format!("{}.element", parent_name),
                    ),
                    Type::Map(map) => (
                        NestedFieldRef::clone(map.value_field()),
                        format!("{}.value", parent_name),
                    ),
                    _ => (NestedFieldRef::clone(field), parent_name.to_string()),
                };
                if !target.field_type().is_struct() {
                    floe_bail!(
                        "parent {} is not a struct: {}",
                        parent_name,
                        target.field_type()
                    );
                }
                if self.deletes.contains(&field.id()) || self.deletes.contains(&target.id()) {
                    floe_bail!("cannot add to a column that will be deleted: {}", parent_name);
                }
                (target.id(), format!("{}.{}", prefix, name))
            }
        };

        if let Some(existing) = self.base.find_field(&collision_name) {
            if !self.deletes.contains(&existing.id()) {
                floe_bail!("cannot add column, name already exists: {}", collision_name);
            }
        }
        if self
            .adds
            .get(&parent_id)
            .is_some_and(|pending| pending.iter().any(|f| f.name().as_ref() == name))
        {
            floe_bail!("cannot add column, name already exists: {}", collision_name);
        }

        let new_id = self.assign_new_column_id();
        let mut next = self.last_column_id;
        let assigned_type = assign_fresh_ids(&field_type, || {
            next += 1;
            next
        });
        self.last_column_id = next;

        debug!(id = new_id, name, parent = parent_id, "adding column");
        self.adds
            .entry(parent_id)
            .or_default()
            .push(NestedField::optional(new_id, name, assigned_type));
        Ok(self)
    }

    /// Delete a column. The column must exist and must not carry pending
    /// additions or updates.
    pub fn delete_column(&mut self, name: &str) -> FloeResult<&mut Self> {
        let field = self
            .base
            .find_field(name)
            .ok_or_else(|| floe_err!("cannot find column to delete: {}", name))?;
        let id = field.id();
        if self.is_container_slot(id) {
            floe_bail!(
                "cannot delete {}: container slots are deleted with their container",
                name
            );
        }
        if self.adds.contains_key(&id) {
            floe_bail!("cannot delete a column that has additions: {}", name);
        }
        if self.updates.contains_key(&id) {
            floe_bail!("cannot delete a column that has updates: {}", name);
        }
        debug!(id, name, "deleting column");
        self.deletes.insert(id);
        Ok(self)
    }

    /// Rename a column, merging with any pending type update.
    pub fn rename_column(&mut self, name: &str, new_name: &str) -> FloeResult<&mut Self> {
        let field = self
            .base
            .find_field(name)
            .ok_or_else(|| floe_err!("cannot find column to rename: {}", name))?;
        let id = field.id();
        if self.deletes.contains(&id) {
            floe_bail!("cannot rename a column that will be deleted: {}", name);
        }
        if self.is_container_slot(id) {
            floe_bail!("cannot rename {}: container slot names are fixed", name);
        }
        let replacement = match self.updates.get(&id) {
            Some(pending) => pending.with_name(new_name),
            None => field.with_name(new_name),
        };
        self.updates.insert(id, replacement);
        Ok(self)
    }

    /// Change a column to a wider primitive type. Legal promotions are
    /// `int -> long`, `float -> double` and widening decimal precision at the
    /// same scale; updating to the same type is a no-op.
    pub fn update_column(&mut self, name: &str, new_type: PrimitiveType) -> FloeResult<&mut Self> {
        let field = self
            .base
            .find_field(name)
            .ok_or_else(|| floe_err!("cannot find column to update: {}", name))?;
        let id = field.id();
        if self.deletes.contains(&id) {
            floe_bail!("cannot update a column that will be deleted: {}", name);
        }
        let current = match field.field_type() {
            Type::Primitive(p) => *p,
            other => floe_bail!("cannot update a non-primitive column {}: {}", name, other),
        };
        if current == new_type {
            return Ok(self);
        }
        let legal = match (current, new_type) {
            (PrimitiveType::Int, PrimitiveType::Long) => true,
            (PrimitiveType::Float, PrimitiveType::Double) => true,
            (PrimitiveType::Decimal(from), PrimitiveType::Decimal(to)) => {
                from.scale() == to.scale() && to.precision() >= from.precision()
            }
            _ => false,
        };
        if !legal {
            floe_bail!("cannot change column type: {}: {} -> {}", name, current, new_type);
        }
        let replacement = match self.updates.get(&id) {
            Some(pending) => pending.with_type(Type::Primitive(new_type)),
            None => field.with_type(Type::Primitive(new_type)),
        };
        self.updates.insert(id, replacement);
        Ok(self)
    }

    /// Apply the accepted edits, producing the next schema. The update stays
    /// usable; apply again after further edits to get a newer result.
    pub fn apply(&self) -> FloeResult<Schema> {
        let mut visitor = ApplyChanges {
            deletes: &self.deletes,
            updates: &self.updates,
            adds: &self.adds,
        };
        let root = match visit_schema_custom(&self.base, &mut visitor) {
            Some(Type::Struct(st)) => st,
            Some(other) => floe_panic!("schema evolution produced a non-struct root {}", other),
            None => floe_panic!("schema evolution deleted the root struct"),
        };
        let kept_ids = index_by_id(&root)?;
        let aliases = self
            .base
            .aliases()
            .iter()
            .filter(|(_, id)| kept_ids.contains_key(id))
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        Schema::from_struct(root, aliases)
    }

    /// Apply the edits and hand the result to the metadata store for
    /// compare-and-swap. Loses the race with a [`CommitConflict`]; callers
    /// rebuild against the new base and retry.
    ///
    /// [`CommitConflict`]: floe_error::FloeError::CommitConflict
    pub fn commit(self, store: &dyn MetadataStore) -> FloeResult<SchemaRef> {
        let next = Arc::new(self.apply()?);
        debug!(last_column_id = self.last_column_id, "committing schema update");
        if store.compare_and_swap(&self.base, Arc::clone(&next), self.last_column_id)? {
            Ok(next)
        } else {
            Err(floe_err!(
                CommitConflict: "the current metadata changed; rebuild the update and retry"
            ))
        }
    }
}

fn add_fields(r#struct: StructType, additions: &[NestedField]) -> StructType {
    let fields = r#struct
        .fields()
        .iter()
        .cloned()
        .chain(additions.iter().cloned().map(Arc::new))
        .collect();
    StructType::from_fields(fields)
}

struct ApplyChanges<'a> {
    deletes: &'a HashSet<i32>,
    updates: &'a HashMap<i32, NestedField>,
    adds: &'a HashMap<i32, Vec<NestedField>>,
}

impl CustomOrderVisitor for ApplyChanges<'_> {
    type T = Option<Type>;

    fn schema(&mut self, _schema: &Schema, result: PendingType<'_>) -> Option<Type> {
        let root = match result.invoke(self) {
            Some(Type::Struct(st)) => st,
            _ => floe_panic!("the schema root must remain a struct"),
        };
        match self.adds.get(&TABLE_ROOT_ID) {
            Some(additions) => Some(Type::Struct(add_fields(root, additions))),
            None => Some(Type::Struct(root)),
        }
    }

    fn r#struct(&mut self, _struct: &StructType, fields: Vec<PendingField<'_>>) -> Option<Type> {
        let mut rebuilt: Vec<NestedFieldRef> = Vec::with_capacity(fields.len());
        for pending in fields {
            let field = NestedFieldRef::clone(pending.field());
            let Some(ty) = pending.invoke(self) else {
                // deleted
                continue;
            };
            let renamed = self.updates.get(&field.id()).map(|u| u.name().clone());
            if renamed.is_none() && ty == *field.field_type() {
                rebuilt.push(field);
            } else {
                let name = renamed.unwrap_or_else(|| field.name().clone());
                rebuilt.push(Arc::new(NestedField::new(
                    field.id(),
                    name,
                    field.is_required(),
                    ty,
                )));
            }
        }
        // a struct may be left empty; it is only removed by deleting it
        Some(Type::Struct(StructType::from_fields(rebuilt)))
    }

    fn field(&mut self, field: &NestedFieldRef, child: PendingType<'_>) -> Option<Type> {
        if self.deletes.contains(&field.id()) {
            return None;
        }
        let Some(mut ty) = child.invoke(self) else {
            floe_panic!("a field's type cannot be deleted: {}", field.name());
        };
        if let Some(update) = self.updates.get(&field.id()) {
            if update.field_type() != field.field_type() {
                ty = update.field_type().clone();
            }
        }
        match self.adds.get(&field.id()) {
            Some(additions) => {
                let st = match ty {
                    Type::Struct(st) => st,
                    other => {
                        floe_panic!(InvalidArgument: "cannot add fields to non-struct {}", other)
                    }
                };
                Some(Type::Struct(add_fields(st, additions)))
            }
            None => Some(ty),
        }
    }

    fn list(&mut self, list: &ListType, element: PendingField<'_>) -> Option<Type> {
        let element_type = element.field().field_type().clone();
        let Some(ty) = element.invoke(self) else {
            floe_panic!(InvalidArgument: "cannot delete the element of list<{}>", element_type);
        };
        if ty == element_type {
            Some(Type::List(list.clone()))
        } else {
            Some(Type::List(ListType::new(
                list.element_id(),
                list.is_element_required(),
                ty,
            )))
        }
    }

    fn map(&mut self, map: &MapType, key: PendingField<'_>, value: PendingField<'_>) -> Option<Type> {
        let key_type = key.field().field_type().clone();
        let value_type = value.field().field_type().clone();
        let Some(new_key) = key.invoke(self) else {
            floe_panic!(InvalidArgument: "cannot delete the key of map<{}, {}>", key_type, value_type);
        };
        let Some(new_value) = value.invoke(self) else {
            floe_panic!(InvalidArgument: "cannot delete the value of map<{}, {}>", key_type, value_type);
        };
        if new_key == key_type && new_value == value_type {
            Some(Type::Map(map.clone()))
        } else {
            Some(Type::Map(MapType::new(
                map.key_id(),
                new_key,
                map.value_id(),
                map.is_value_required(),
                new_value,
            )))
        }
    }

    fn primitive(&mut self, primitive: &PrimitiveType) -> Option<Type> {
        Some(Type::Primitive(*primitive))
    }
}
