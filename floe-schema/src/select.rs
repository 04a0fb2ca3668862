//! Projection operations over schemas: pruning, joining and id reassignment.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use floe_error::{FloeResult, floe_panic};

use crate::index::index_by_id;
use crate::visit::{CustomOrderVisitor, PendingField, PendingType, visit_schema_custom, visit_type_custom};
use crate::{
    ListType, MapType, NestedFieldRef, PrimitiveType, Schema, StructType, Type,
};

/// The set of all field ids appearing in the schema.
pub fn projected_ids(schema: &Schema) -> HashSet<i32> {
    schema.id_index().keys().copied().collect()
}

struct PruneColumns<'a> {
    selected: &'a HashSet<i32>,
}

impl CustomOrderVisitor for PruneColumns<'_> {
    type T = Option<Type>;

    fn r#struct(&mut self, _struct: &StructType, fields: Vec<PendingField<'_>>) -> Option<Type> {
        let mut kept: Vec<NestedFieldRef> = Vec::new();
        for pending in fields {
            let field = NestedFieldRef::clone(pending.field());
            if let Some(ty) = pending.invoke(self) {
                if &ty == field.field_type() {
                    // unchanged subtree, share it
                    kept.push(field);
                } else {
                    kept.push(Arc::new(field.with_type(ty)));
                }
            }
        }
        if kept.is_empty() {
            None
        } else {
            Some(Type::Struct(StructType::from_fields(kept)))
        }
    }

    fn field(&mut self, field: &NestedFieldRef, child: PendingType<'_>) -> Option<Type> {
        if self.selected.contains(&field.id()) {
            // a selected field keeps its whole subtree; skip the traversal
            return Some(field.field_type().clone());
        }
        child.invoke(self)
    }

    fn list(&mut self, list: &ListType, element: PendingField<'_>) -> Option<Type> {
        let element_type = element.field().field_type().clone();
        element.invoke(self).map(|ty| {
            if ty == element_type {
                Type::List(list.clone())
            } else {
                Type::List(ListType::new(list.element_id(), list.is_element_required(), ty))
            }
        })
    }

    fn map(&mut self, map: &MapType, _key: PendingField<'_>, value: PendingField<'_>) -> Option<Type> {
        // keys survive whenever the map survives; selection inside keys is
        // not supported, so the key thunk is dropped unevaluated
        let value_type = value.field().field_type().clone();
        match value.invoke(self) {
            Some(ty) if ty == value_type => Some(Type::Map(map.clone())),
            Some(ty) => Some(Type::Map(MapType::new(
                map.key_id(),
                map.key_type().clone(),
                map.value_id(),
                map.is_value_required(),
                ty,
            ))),
            None if self.selected.contains(&map.key_id()) => Some(Type::Map(map.clone())),
            None => None,
        }
    }

    fn primitive(&mut self, _primitive: &PrimitiveType) -> Option<Type> {
        None
    }
}

/// Prune `schema` to the transitive closure of the requested ids.
///
/// Field order is preserved, containers survive when any descendant is
/// selected, structs whose fields all disappear are omitted, and aliases
/// that still resolve are kept.
pub fn select(schema: &Schema, ids: &HashSet<i32>) -> FloeResult<Schema> {
    let mut visitor = PruneColumns { selected: ids };
    let pruned = match visit_schema_custom(schema, &mut visitor) {
        Some(Type::Struct(st)) => st,
        Some(other) => floe_panic!("pruning a schema produced a non-struct type {}", other),
        None => StructType::empty(),
    };
    let kept_ids = index_by_id(&pruned)?;
    let aliases: HashMap<String, i32> = schema
        .aliases()
        .iter()
        .filter(|(_, id)| kept_ids.contains_key(id))
        .map(|(name, id)| (name.clone(), *id))
        .collect();
    Schema::from_struct(pruned, aliases)
}

/// Prune `schema` to everything *except* the requested ids.
pub fn select_not(schema: &Schema, ids: &HashSet<i32>) -> FloeResult<Schema> {
    let keep: HashSet<i32> = projected_ids(schema).difference(ids).copied().collect();
    select(schema, &keep)
}

/// Concatenate the columns of two schemas. Ids must not collide.
pub fn join(left: &Schema, right: &Schema) -> FloeResult<Schema> {
    let fields = left
        .columns()
        .iter()
        .chain(right.columns())
        .cloned()
        .collect();
    let aliases = left
        .aliases()
        .iter()
        .chain(right.aliases())
        .map(|(name, id)| (name.clone(), *id))
        .collect();
    Schema::from_struct(StructType::from_fields(fields), aliases)
}

struct AssignFreshIds<F> {
    next_id: F,
    // old id -> new id, used to remap aliases
    refreshed: HashMap<i32, i32>,
}

impl<F: FnMut() -> i32> AssignFreshIds<F> {
    fn reassign(&mut self, old: i32) -> i32 {
        let new = (self.next_id)();
        self.refreshed.insert(old, new);
        new
    }
}

impl<F: FnMut() -> i32> CustomOrderVisitor for AssignFreshIds<F> {
    type T = Type;

    fn r#struct(&mut self, _struct: &StructType, fields: Vec<PendingField<'_>>) -> Type {
        // ids for this struct's fields are drawn before any child is
        // rebuilt, so sibling ids precede descendant ids
        let ids: Vec<i32> = fields
            .iter()
            .map(|pending| self.reassign(pending.field().id()))
            .collect();
        let rebuilt = fields
            .into_iter()
            .zip(ids)
            .map(|(pending, id)| {
                let field = NestedFieldRef::clone(pending.field());
                let ty = pending.invoke(self);
                Arc::new(field.with_id(id).with_type(ty))
            })
            .collect();
        Type::Struct(StructType::from_fields(rebuilt))
    }

    fn field(&mut self, _field: &NestedFieldRef, child: PendingType<'_>) -> Type {
        child.invoke(self)
    }

    fn list(&mut self, list: &ListType, element: PendingField<'_>) -> Type {
        let element_id = self.reassign(list.element_id());
        let ty = element.invoke(self);
        Type::List(ListType::new(element_id, list.is_element_required(), ty))
    }

    fn map(&mut self, map: &MapType, key: PendingField<'_>, value: PendingField<'_>) -> Type {
        let key_id = self.reassign(map.key_id());
        let value_id = self.reassign(map.value_id());
        let key_type = key.invoke(self);
        let value_type = value.invoke(self);
        Type::Map(MapType::new(
            key_id,
            key_type,
            value_id,
            map.is_value_required(),
            value_type,
        ))
    }

    fn primitive(&mut self, primitive: &PrimitiveType) -> Type {
        Type::Primitive(*primitive)
    }
}

/// Reassign every id in a bare type from the caller's generator, returning
/// the rebuilt type. Parent ids are drawn before their descendants'.
pub fn assign_fresh_ids(ty: &Type, next_id: impl FnMut() -> i32) -> Type {
    let mut visitor = AssignFreshIds {
        next_id,
        refreshed: HashMap::new(),
    };
    visit_type_custom(ty, &mut visitor)
}

/// Reassign every id in a schema from the caller's generator. Aliases are
/// remapped to the fresh ids.
pub fn reassign_ids(schema: &Schema, next_id: impl FnMut() -> i32) -> FloeResult<Schema> {
    let mut visitor = AssignFreshIds {
        next_id,
        refreshed: HashMap::new(),
    };
    let rebuilt = match visit_schema_custom(schema, &mut visitor) {
        Type::Struct(st) => st,
        other => floe_panic!("reassigning ids produced a non-struct type {}", other),
    };
    let aliases = schema
        .aliases()
        .iter()
        .filter_map(|(name, id)| visitor.refreshed.get(id).map(|new| (name.clone(), *new)))
        .collect();
    Schema::from_struct(rebuilt, aliases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NestedField;

    fn sample_schema() -> Schema {
        Schema::new(vec![
            NestedField::required(1, "id", PrimitiveType::Long.into()),
            NestedField::optional(
                2,
                "location",
                StructType::new(vec![
                    NestedField::required(3, "lat", PrimitiveType::Double.into()),
                    NestedField::required(4, "long", PrimitiveType::Double.into()),
                ])
                .into(),
            ),
            NestedField::optional(
                5,
                "tags",
                ListType::of_optional(6, PrimitiveType::String.into()).into(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn select_keeps_transitive_closure() {
        let schema = sample_schema();
        let selected = select(&schema, &HashSet::from([3])).unwrap();
        // the containing struct survives with only the selected descendant
        assert_eq!(selected.columns().len(), 1);
        assert_eq!(selected.find_field("location.lat").unwrap().id(), 3);
        assert!(selected.find_field("location.long").is_none());
        assert!(selected.find_field("id").is_none());
    }

    #[test]
    fn selecting_a_struct_keeps_its_subtree() {
        let schema = sample_schema();
        let selected = select(&schema, &HashSet::from([2])).unwrap();
        assert!(selected.find_field("location.lat").is_some());
        assert!(selected.find_field("location.long").is_some());
    }

    #[test]
    fn selecting_list_element_keeps_the_list() {
        let schema = sample_schema();
        let selected = select(&schema, &HashSet::from([6])).unwrap();
        assert_eq!(selected.find_field("tags.element").unwrap().id(), 6);
    }

    #[test]
    fn select_nothing_is_empty() {
        let schema = sample_schema();
        let selected = select(&schema, &HashSet::new()).unwrap();
        assert!(selected.columns().is_empty());
    }

    #[test]
    fn select_not_drops_requested() {
        let schema = sample_schema();
        let selected = select_not(&schema, &HashSet::from([2, 3, 4])).unwrap();
        assert!(selected.find_field("id").is_some());
        assert!(selected.find_field("location").is_none());
        assert!(selected.find_field("tags").is_some());
    }

    #[test]
    fn join_concatenates_columns() {
        let left = Schema::new(vec![NestedField::required(
            1,
            "a",
            PrimitiveType::Int.into(),
        )])
        .unwrap();
        let right = Schema::new(vec![NestedField::required(
            2,
            "b",
            PrimitiveType::String.into(),
        )])
        .unwrap();
        let joined = join(&left, &right).unwrap();
        assert_eq!(joined.columns().len(), 2);
        assert_eq!(joined.field_id("b"), Some(2));
    }

    #[test]
    fn join_rejects_id_collisions() {
        let left = Schema::new(vec![NestedField::required(
            1,
            "a",
            PrimitiveType::Int.into(),
        )])
        .unwrap();
        let right = Schema::new(vec![NestedField::required(
            1,
            "b",
            PrimitiveType::String.into(),
        )])
        .unwrap();
        assert!(join(&left, &right).is_err());
    }

    #[test]
    fn reassign_draws_parent_ids_first() {
        let schema = sample_schema();
        let mut counter = 100;
        let reassigned = reassign_ids(&schema, || {
            counter += 1;
            counter
        })
        .unwrap();
        assert_eq!(reassigned.field_id("id"), Some(101));
        assert_eq!(reassigned.field_id("location"), Some(102));
        assert_eq!(reassigned.field_id("tags"), Some(103));
        assert_eq!(reassigned.field_id("location.lat"), Some(104));
        assert_eq!(reassigned.field_id("location.long"), Some(105));
        assert_eq!(reassigned.field_id("tags.element"), Some(106));
    }

    #[test]
    fn projected_ids_match_id_index() {
        let schema = sample_schema();
        let ids = projected_ids(&schema);
        assert_eq!(ids, HashSet::from([1, 2, 3, 4, 5, 6]));
        assert_eq!(
            ids,
            schema.id_index().keys().copied().collect::<HashSet<_>>()
        );
    }

    struct CollectIds {
        ids: Vec<i32>,
    }

    impl CustomOrderVisitor for CollectIds {
        type T = ();

        fn r#struct(&mut self, _struct: &StructType, fields: Vec<PendingField<'_>>) {
            for field in fields {
                field.invoke(self);
            }
        }

        fn field(&mut self, field: &NestedFieldRef, child: PendingType<'_>) {
            child.invoke(self);
            self.ids.push(field.id());
        }

        fn list(&mut self, _list: &ListType, element: PendingField<'_>) {
            element.invoke(self);
        }

        fn map(&mut self, _map: &MapType, key: PendingField<'_>, value: PendingField<'_>) {
            key.invoke(self);
            value.invoke(self);
        }

        fn primitive(&mut self, _primitive: &PrimitiveType) {}
    }

    #[test]
    fn projected_ids_match_the_identity_traversal() {
        let schema = sample_schema();
        let mut visitor = CollectIds { ids: Vec::new() };
        visit_schema_custom(&schema, &mut visitor);
        let visited: HashSet<i32> = visitor.ids.iter().copied().collect();
        assert_eq!(visited.len(), visitor.ids.len());
        assert_eq!(visited, projected_ids(&schema));
    }
}
