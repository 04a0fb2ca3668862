//! Index builders over schema trees.
//!
//! A single pre-order traversal produces the dotted-name index; ids are
//! indexed by a custom-order walk so that map-key interiors are covered too.

use std::collections::HashMap;

use floe_error::{FloeError, FloeResult, floe_err};

use crate::visit::{
    CustomOrderVisitor, PendingField, PendingType, SchemaVisitor, visit_struct, visit_type_custom,
};
use crate::{
    LIST_ELEMENT_NAME, ListType, MAP_KEY_NAME, MAP_VALUE_NAME, MapType, NestedFieldRef,
    PrimitiveType, StructType,
};

/// The maximum nesting depth a schema may have.
pub const MAX_SCHEMA_DEPTH: usize = 100;

struct IndexByName {
    stack: Vec<String>,
    index: HashMap<String, i32>,
    error: Option<FloeError>,
}

impl IndexByName {
    fn add(&mut self, leaf: &str, id: i32) {
        let name = if self.stack.is_empty() {
            leaf.to_string()
        } else {
            format!("{}.{}", self.stack.join("."), leaf)
        };
        if self.index.insert(name.clone(), id).is_some() && self.error.is_none() {
            self.error = Some(floe_err!("invalid schema: multiple fields for name {}", name));
        }
    }
}

impl SchemaVisitor for IndexByName {
    type T = ();

    fn before_field(&mut self, field: &NestedFieldRef) {
        if self.stack.len() >= MAX_SCHEMA_DEPTH && self.error.is_none() {
            self.error = Some(floe_err!(
                "invalid schema: nesting depth exceeds {}",
                MAX_SCHEMA_DEPTH
            ));
        }
        self.stack.push(field.name().to_string());
    }

    fn after_field(&mut self, _field: &NestedFieldRef) {
        self.stack.pop();
    }

    fn r#struct(&mut self, _struct: &StructType, _results: Vec<()>) {}

    fn field(&mut self, field: &NestedFieldRef, _result: ()) {
        self.add(field.name(), field.id());
    }

    fn list(&mut self, list: &ListType, _element_result: ()) {
        self.add(LIST_ELEMENT_NAME, list.element_id());
    }

    fn map(&mut self, map: &MapType, _value_result: ()) {
        self.add(MAP_KEY_NAME, map.key_id());
        self.add(MAP_VALUE_NAME, map.value_id());
    }

    fn primitive(&mut self, _primitive: &PrimitiveType) {}
}

/// Build the dotted-name index of a struct: `a.b` for nested structs,
/// `a.element` for list interiors, `m.key`/`m.value` for map interiors.
pub fn index_by_name(r#struct: &StructType) -> FloeResult<HashMap<String, i32>> {
    let mut visitor = IndexByName {
        stack: Vec::new(),
        index: HashMap::new(),
        error: None,
    };
    visit_struct(r#struct, &mut visitor);
    match visitor.error {
        Some(err) => Err(err),
        None => Ok(visitor.index),
    }
}

struct IndexById {
    index: HashMap<i32, NestedFieldRef>,
    error: Option<FloeError>,
}

impl IndexById {
    fn add(&mut self, field: &NestedFieldRef) {
        if self
            .index
            .insert(field.id(), NestedFieldRef::clone(field))
            .is_some()
            && self.error.is_none()
        {
            self.error = Some(floe_err!(
                "invalid schema: multiple fields for id {}",
                field.id()
            ));
        }
    }
}

impl CustomOrderVisitor for IndexById {
    type T = ();

    fn r#struct(&mut self, _struct: &StructType, fields: Vec<PendingField<'_>>) {
        for field in fields {
            field.invoke(self);
        }
    }

    fn field(&mut self, field: &NestedFieldRef, child: PendingType<'_>) {
        self.add(field);
        child.invoke(self);
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

/// Build the id index of a struct. Every id appearing anywhere in the tree
/// is present exactly once; duplicates are a validation error.
pub fn index_by_id(r#struct: &StructType) -> FloeResult<HashMap<i32, NestedFieldRef>> {
    let mut visitor = IndexById {
        index: HashMap::new(),
        error: None,
    };
    visit_type_custom(&crate::Type::Struct(r#struct.clone()), &mut visitor);
    match visitor.error {
        Some(err) => Err(err),
        None => Ok(visitor.index),
    }
}
