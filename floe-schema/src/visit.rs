//! Traversals over schema trees.
//!
//! Two flavours are provided. [`SchemaVisitor`] is a pre-order traversal with
//! before/after hooks that let the visitor maintain a field-name stack.
//! [`CustomOrderVisitor`] hands the visitor one-shot thunks
//! ([`PendingType`]/[`PendingField`]) that perform the child traversal on
//! demand, enabling post-order reconstruction and subtree skipping.

use crate::{ListType, MapType, NestedFieldRef, PrimitiveType, Schema, StructType, Type};

/// A pre-order visitor over a schema tree.
///
/// Traversal order for a struct field: `before_field`, recurse into the field
/// type, `after_field`, then `field` with the child result. List elements and
/// map values recurse the same way; map keys are treated as fixed (the
/// visitor sees the key type through the [`MapType`] itself).
pub trait SchemaVisitor {
    /// The result type produced by this visitor.
    type T;

    /// Called before recursing into a struct field's type.
    fn before_field(&mut self, _field: &NestedFieldRef) {}

    /// Called after recursing into a struct field's type.
    fn after_field(&mut self, _field: &NestedFieldRef) {}

    /// Called before recursing into a list's element type.
    fn before_list_element(&mut self, field: &NestedFieldRef) {
        self.before_field(field);
    }

    /// Called after recursing into a list's element type.
    fn after_list_element(&mut self, field: &NestedFieldRef) {
        self.after_field(field);
    }

    /// Called before recursing into a map's value type.
    fn before_map_value(&mut self, field: &NestedFieldRef) {
        self.before_field(field);
    }

    /// Called after recursing into a map's value type.
    fn after_map_value(&mut self, field: &NestedFieldRef) {
        self.after_field(field);
    }

    /// Wraps the root struct result.
    fn schema(&mut self, _schema: &Schema, result: Self::T) -> Self::T {
        result
    }

    /// Combines the results of a struct's fields.
    fn r#struct(&mut self, r#struct: &StructType, results: Vec<Self::T>) -> Self::T;

    /// Combines a field with its child result.
    fn field(&mut self, field: &NestedFieldRef, result: Self::T) -> Self::T;

    /// Combines a list with its element result.
    fn list(&mut self, list: &ListType, element_result: Self::T) -> Self::T;

    /// Combines a map with its value result.
    fn map(&mut self, map: &MapType, value_result: Self::T) -> Self::T;

    /// Visits a primitive leaf.
    fn primitive(&mut self, primitive: &PrimitiveType) -> Self::T;
}

/// Pre-order traversal of a schema.
pub fn visit_schema<V: SchemaVisitor>(schema: &Schema, visitor: &mut V) -> V::T {
    let result = visit_struct(schema.as_struct(), visitor);
    visitor.schema(schema, result)
}

/// Pre-order traversal of a struct type.
pub fn visit_struct<V: SchemaVisitor>(r#struct: &StructType, visitor: &mut V) -> V::T {
    let mut results = Vec::with_capacity(r#struct.len());
    for field in r#struct.fields() {
        visitor.before_field(field);
        let result = visit_type(field.field_type(), visitor);
        visitor.after_field(field);
        results.push(visitor.field(field, result));
    }
    visitor.r#struct(r#struct, results)
}

/// Pre-order traversal of any type.
pub fn visit_type<V: SchemaVisitor>(ty: &Type, visitor: &mut V) -> V::T {
    match ty {
        Type::Primitive(primitive) => visitor.primitive(primitive),
        Type::Struct(r#struct) => visit_struct(r#struct, visitor),
        Type::List(list) => {
            let element = list.element_field();
            visitor.before_list_element(element);
            let result = visit_type(element.field_type(), visitor);
            visitor.after_list_element(element);
            visitor.list(list, result)
        }
        Type::Map(map) => {
            let value = map.value_field();
            visitor.before_map_value(value);
            let result = visit_type(value.field_type(), visitor);
            visitor.after_map_value(value);
            visitor.map(map, result)
        }
    }
}

/// A one-shot thunk that traverses a type when invoked.
///
/// Invoking consumes the thunk, so each child is traversed at most once. The
/// thunk borrows the tree, not the visitor, and is therefore invocable from
/// inside the enclosing visitor method. Dropping it without invoking skips
/// the subtree.
pub struct PendingType<'a> {
    ty: &'a Type,
}

impl<'a> PendingType<'a> {
    fn new(ty: &'a Type) -> Self {
        Self { ty }
    }

    /// Perform the deferred traversal.
    pub fn invoke<V: CustomOrderVisitor>(self, visitor: &mut V) -> V::T {
        visit_type_custom(self.ty, visitor)
    }
}

/// A one-shot thunk that visits a field (through
/// [`CustomOrderVisitor::field`]) when invoked.
pub struct PendingField<'a> {
    field: &'a NestedFieldRef,
}

impl<'a> PendingField<'a> {
    fn new(field: &'a NestedFieldRef) -> Self {
        Self { field }
    }

    /// The field this thunk will visit. Inspecting it does not count as an
    /// evaluation.
    pub fn field(&self) -> &'a NestedFieldRef {
        self.field
    }

    /// Perform the deferred visit.
    pub fn invoke<V: CustomOrderVisitor>(self, visitor: &mut V) -> V::T {
        let child = PendingType::new(self.field.field_type());
        visitor.field(self.field, child)
    }
}

/// A visitor that controls the traversal order of its children.
///
/// Unlike [`SchemaVisitor`], map keys are traversed (id reassignment must
/// renumber them); a visitor that treats keys as fixed simply drops the key
/// thunk.
pub trait CustomOrderVisitor: Sized {
    /// The result type produced by this visitor.
    type T;

    /// Visits the schema root.
    fn schema(&mut self, _schema: &Schema, result: PendingType<'_>) -> Self::T {
        result.invoke(self)
    }

    /// Visits a struct; `fields` are thunks in field order.
    fn r#struct(&mut self, r#struct: &StructType, fields: Vec<PendingField<'_>>) -> Self::T;

    /// Visits a field; `child` traverses the field's type.
    fn field(&mut self, field: &NestedFieldRef, child: PendingType<'_>) -> Self::T;

    /// Visits a list; `element` visits the element slot as a field.
    fn list(&mut self, list: &ListType, element: PendingField<'_>) -> Self::T;

    /// Visits a map; `key` and `value` visit the key/value slots as fields.
    fn map(&mut self, map: &MapType, key: PendingField<'_>, value: PendingField<'_>) -> Self::T;

    /// Visits a primitive leaf.
    fn primitive(&mut self, primitive: &PrimitiveType) -> Self::T;
}

/// Custom-order traversal of a schema.
pub fn visit_schema_custom<V: CustomOrderVisitor>(schema: &Schema, visitor: &mut V) -> V::T {
    visitor.schema(schema, PendingType::new(schema.root_type()))
}

/// Custom-order traversal of any type.
pub fn visit_type_custom<V: CustomOrderVisitor>(ty: &Type, visitor: &mut V) -> V::T {
    match ty {
        Type::Primitive(primitive) => visitor.primitive(primitive),
        Type::Struct(r#struct) => {
            let fields = r#struct.fields().iter().map(PendingField::new).collect();
            visitor.r#struct(r#struct, fields)
        }
        Type::List(list) => visitor.list(list, PendingField::new(list.element_field())),
        Type::Map(map) => visitor.map(
            map,
            PendingField::new(map.key_field()),
            PendingField::new(map.value_field()),
        ),
    }
}
