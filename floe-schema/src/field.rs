use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::Type;

/// A name for a field in a struct.
pub type FieldName = Arc<str>;

/// A shared pointer to a [`NestedField`]; schemas share unchanged subtrees.
pub type NestedFieldRef = Arc<NestedField>;

/// A named, typed member of a struct (or the element/key/value slot of a
/// list/map), identified by an id that is unique within its schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NestedField {
    id: i32,
    name: FieldName,
    required: bool,
    field_type: Type,
}

impl NestedField {
    /// Create a new field.
    pub fn new(id: i32, name: impl Into<FieldName>, required: bool, field_type: Type) -> Self {
        Self {
            id,
            name: name.into(),
            required,
            field_type,
        }
    }

    /// Create a required field.
    pub fn required(id: i32, name: impl Into<FieldName>, field_type: Type) -> Self {
        Self::new(id, name, true, field_type)
    }

    /// Create an optional field.
    pub fn optional(id: i32, name: impl Into<FieldName>, field_type: Type) -> Self {
        Self::new(id, name, false, field_type)
    }

    /// The field id, unique within a schema across its lifetime.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// The field name.
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// Whether values of this field must be non-null.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether values of this field may be null.
    pub fn is_optional(&self) -> bool {
        !self.required
    }

    /// The field type.
    pub fn field_type(&self) -> &Type {
        &self.field_type
    }

    /// A copy of this field with a different name.
    pub fn with_name(&self, name: impl Into<FieldName>) -> Self {
        Self {
            id: self.id,
            name: name.into(),
            required: self.required,
            field_type: self.field_type.clone(),
        }
    }

    /// A copy of this field with a different type.
    pub fn with_type(&self, field_type: Type) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            required: self.required,
            field_type,
        }
    }

    /// A copy of this field with a different id.
    pub fn with_id(&self, id: i32) -> Self {
        Self {
            id,
            name: self.name.clone(),
            required: self.required,
            field_type: self.field_type.clone(),
        }
    }
}

impl Display for NestedField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: {} {}",
            self.id,
            self.name,
            if self.required { "required" } else { "optional" },
            self.field_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrimitiveType;

    #[test]
    fn display() {
        let field = NestedField::required(1, "id", Type::Primitive(PrimitiveType::Long));
        assert_eq!(field.to_string(), "1: id: required long");
        assert_eq!(
            field.with_name("renamed").to_string(),
            "1: renamed: required long"
        );
    }

    #[test]
    fn copies_preserve_the_rest() {
        let field = NestedField::optional(7, "data", Type::Primitive(PrimitiveType::String));
        let retyped = field.with_type(Type::Primitive(PrimitiveType::Binary));
        assert_eq!(retyped.id(), 7);
        assert!(retyped.is_optional());
        assert_eq!(retyped.name().as_ref(), "data");
    }
}
