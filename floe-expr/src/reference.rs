use std::fmt::{Display, Formatter};

use floe_schema::{FieldName, NestedFieldRef, Type};

/// An unresolved reference to a column by (possibly dotted) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedReference {
    name: FieldName,
}

impl NamedReference {
    /// Reference a column by name.
    pub fn new(name: impl Into<FieldName>) -> Self {
        Self { name: name.into() }
    }

    /// The referenced name.
    pub fn name(&self) -> &FieldName {
        &self.name
    }
}

impl Display for NamedReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.name, f)
    }
}

/// A reference resolved against a schema, carrying the field it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundReference {
    field: NestedFieldRef,
}

impl BoundReference {
    /// Bind a reference to a resolved field.
    pub fn new(field: NestedFieldRef) -> Self {
        Self { field }
    }

    /// The resolved field.
    pub fn field(&self) -> &NestedFieldRef {
        &self.field
    }

    /// The resolved field id.
    pub fn field_id(&self) -> i32 {
        self.field.id()
    }

    /// The resolved field type.
    pub fn field_type(&self) -> &Type {
        self.field.field_type()
    }
}

impl Display for BoundReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.field.name(), f)
    }
}
