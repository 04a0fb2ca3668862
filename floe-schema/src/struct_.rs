use std::fmt::{Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;

use crate::{NestedField, NestedFieldRef};

/// An ordered list of named, typed fields.
///
/// Struct types compare structurally; two structs are equal when their fields
/// (ids, names, optionality and types) are equal in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructType {
    fields: Arc<[NestedFieldRef]>,
}

impl StructType {
    /// Create a new [`StructType`] from a list of fields.
    pub fn new(fields: Vec<NestedField>) -> Self {
        Self {
            fields: fields.into_iter().map(Arc::new).collect::<Vec<_>>().into(),
        }
    }

    /// Create a new [`StructType`] from already-shared fields, reusing
    /// unchanged subtrees.
    pub fn from_fields(fields: Vec<NestedFieldRef>) -> Self {
        Self {
            fields: fields.into(),
        }
    }

    /// An empty struct. Empty structs are legal (e.g. after evolution deletes
    /// every child of a struct without deleting the struct itself).
    pub fn empty() -> Self {
        Self {
            fields: Vec::new().into(),
        }
    }

    /// The ordered fields of this struct.
    pub fn fields(&self) -> &[NestedFieldRef] {
        &self.fields
    }

    /// The number of fields in this struct.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether this struct has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Find a direct child field by name.
    pub fn field(&self, name: &str) -> Option<&NestedFieldRef> {
        self.fields.iter().find(|f| f.name().as_ref() == name)
    }

    /// Find a direct child field by id.
    pub fn field_by_id(&self, id: i32) -> Option<&NestedFieldRef> {
        self.fields.iter().find(|f| f.id() == id)
    }
}

impl Display for StructType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "struct<{}>", self.fields.iter().join(", "))
    }
}

impl FromIterator<NestedField> for StructType {
    fn from_iter<I: IntoIterator<Item = NestedField>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
