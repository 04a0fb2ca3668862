use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use floe_error::{FloeError, floe_bail, floe_err, floe_panic};

use crate::{DecimalType, NestedField, NestedFieldRef, StructType};

/// The implicit name of a list's element slot.
pub const LIST_ELEMENT_NAME: &str = "element";
/// The implicit name of a map's key slot.
pub const MAP_KEY_NAME: &str = "key";
/// The implicit name of a map's value slot.
pub const MAP_VALUE_NAME: &str = "value";

/// The primitive types of the lattice.
///
/// Primitives are value types and compare structurally, including `Decimal`
/// parameters and `Fixed` length.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// True or false.
    Boolean,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE 754 floating point.
    Float,
    /// 64-bit IEEE 754 floating point.
    Double,
    /// Calendar date without timezone or time, as days from 1970-01-01.
    Date,
    /// Time of day without date or timezone, as microseconds from midnight.
    Time,
    /// Timestamp without timezone, as microseconds from 1970-01-01T00:00:00.
    Timestamp,
    /// Timestamp with timezone, stored adjusted to UTC.
    Timestamptz,
    /// Arbitrary-length character sequence.
    String,
    /// Universally unique identifier.
    Uuid,
    /// Fixed-length byte array.
    Fixed(u64),
    /// Arbitrary-length byte array.
    Binary,
    /// Fixed-point decimal with precision and scale.
    Decimal(DecimalType),
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveType::Boolean => write!(f, "boolean"),
            PrimitiveType::Int => write!(f, "int"),
            PrimitiveType::Long => write!(f, "long"),
            PrimitiveType::Float => write!(f, "float"),
            PrimitiveType::Double => write!(f, "double"),
            PrimitiveType::Date => write!(f, "date"),
            PrimitiveType::Time => write!(f, "time"),
            PrimitiveType::Timestamp => write!(f, "timestamp"),
            PrimitiveType::Timestamptz => write!(f, "timestamptz"),
            PrimitiveType::String => write!(f, "string"),
            PrimitiveType::Uuid => write!(f, "uuid"),
            PrimitiveType::Fixed(length) => write!(f, "fixed[{}]", length),
            PrimitiveType::Binary => write!(f, "binary"),
            PrimitiveType::Decimal(decimal) => Display::fmt(decimal, f),
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = FloeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(PrimitiveType::Boolean),
            "int" => Ok(PrimitiveType::Int),
            "long" => Ok(PrimitiveType::Long),
            "float" => Ok(PrimitiveType::Float),
            "double" => Ok(PrimitiveType::Double),
            "date" => Ok(PrimitiveType::Date),
            "time" => Ok(PrimitiveType::Time),
            "timestamp" => Ok(PrimitiveType::Timestamp),
            "timestamptz" => Ok(PrimitiveType::Timestamptz),
            "string" => Ok(PrimitiveType::String),
            "uuid" => Ok(PrimitiveType::Uuid),
            "binary" => Ok(PrimitiveType::Binary),
            _ => {
                if let Some(length) = s.strip_prefix("fixed[").and_then(|r| r.strip_suffix(']')) {
                    let length = length
                        .parse::<u64>()
                        .map_err(|_| floe_err!("invalid fixed length: {}", s))?;
                    return Ok(PrimitiveType::Fixed(length));
                }
                if let Some(args) = s.strip_prefix("decimal(").and_then(|r| r.strip_suffix(')')) {
                    let (precision, scale) = args
                        .split_once(',')
                        .ok_or_else(|| floe_err!("invalid decimal type: {}", s))?;
                    let precision = precision
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| floe_err!("invalid decimal precision: {}", s))?;
                    let scale = scale
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| floe_err!("invalid decimal scale: {}", s))?;
                    return Ok(PrimitiveType::Decimal(DecimalType::try_new(
                        precision, scale,
                    )?));
                }
                floe_bail!("unknown primitive type: {}", s)
            }
        }
    }
}

/// A variable-length collection of a single element type.
///
/// The element slot is modelled as a [`NestedField`] named `element`, whose id
/// is drawn from the same id space as struct fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListType {
    element: NestedFieldRef,
}

impl ListType {
    /// Create a list type from the element's id, optionality and type.
    pub fn new(element_id: i32, element_required: bool, element_type: Type) -> Self {
        Self {
            element: Arc::new(NestedField::new(
                element_id,
                LIST_ELEMENT_NAME,
                element_required,
                element_type,
            )),
        }
    }

    /// A list whose elements may be null.
    pub fn of_optional(element_id: i32, element_type: Type) -> Self {
        Self::new(element_id, false, element_type)
    }

    /// A list whose elements must be non-null.
    pub fn of_required(element_id: i32, element_type: Type) -> Self {
        Self::new(element_id, true, element_type)
    }

    /// The element slot as a field.
    pub fn element_field(&self) -> &NestedFieldRef {
        &self.element
    }

    /// The element id.
    pub fn element_id(&self) -> i32 {
        self.element.id()
    }

    /// The element type.
    pub fn element_type(&self) -> &Type {
        self.element.field_type()
    }

    /// Whether elements must be non-null.
    pub fn is_element_required(&self) -> bool {
        self.element.is_required()
    }
}

impl Display for ListType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "list<{}>", self.element.field_type())
    }
}

/// A collection of key-value pairs. Keys are required; values may be optional.
///
/// Key and value slots are modelled as [`NestedField`]s named `key` and
/// `value` with ids from the schema's id space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapType {
    key: NestedFieldRef,
    value: NestedFieldRef,
}

impl MapType {
    /// Create a map type from key/value ids and types.
    pub fn new(
        key_id: i32,
        key_type: Type,
        value_id: i32,
        value_required: bool,
        value_type: Type,
    ) -> Self {
        Self {
            key: Arc::new(NestedField::required(key_id, MAP_KEY_NAME, key_type)),
            value: Arc::new(NestedField::new(
                value_id,
                MAP_VALUE_NAME,
                value_required,
                value_type,
            )),
        }
    }

    /// A map whose values may be null.
    pub fn of_optional(key_id: i32, key_type: Type, value_id: i32, value_type: Type) -> Self {
        Self::new(key_id, key_type, value_id, false, value_type)
    }

    /// A map whose values must be non-null.
    pub fn of_required(key_id: i32, key_type: Type, value_id: i32, value_type: Type) -> Self {
        Self::new(key_id, key_type, value_id, true, value_type)
    }

    /// The key slot as a field. Keys are always required.
    pub fn key_field(&self) -> &NestedFieldRef {
        &self.key
    }

    /// The value slot as a field.
    pub fn value_field(&self) -> &NestedFieldRef {
        &self.value
    }

    /// The key id.
    pub fn key_id(&self) -> i32 {
        self.key.id()
    }

    /// The value id.
    pub fn value_id(&self) -> i32 {
        self.value.id()
    }

    /// The key type.
    pub fn key_type(&self) -> &Type {
        self.key.field_type()
    }

    /// The value type.
    pub fn value_type(&self) -> &Type {
        self.value.field_type()
    }

    /// Whether values must be non-null.
    pub fn is_value_required(&self) -> bool {
        self.value.is_required()
    }
}

impl Display for MapType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "map<{}, {}>", self.key.field_type(), self.value.field_type())
    }
}

/// A type in the lattice: a primitive, or a nested composition of types.
///
/// This is a closed sum; matches over it must be exhaustive, and unreachable
/// branches abort rather than fall back to a default.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A primitive type.
    Primitive(PrimitiveType),
    /// An ordered tuple of named fields.
    Struct(StructType),
    /// A variable-length list.
    List(ListType),
    /// A key-value map.
    Map(MapType),
}

impl Type {
    /// Whether this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Whether this is a nested (struct, list or map) type.
    pub fn is_nested(&self) -> bool {
        !self.is_primitive()
    }

    /// Whether this is a struct type.
    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct(_))
    }

    /// Whether this is a list type.
    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_))
    }

    /// Whether this is a map type.
    pub fn is_map(&self) -> bool {
        matches!(self, Type::Map(_))
    }

    /// The primitive type, if this is a primitive.
    pub fn as_primitive(&self) -> Option<&PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// The struct type, if this is a struct.
    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            Type::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// The list type, if this is a list.
    pub fn as_list(&self) -> Option<&ListType> {
        match self {
            Type::List(l) => Some(l),
            _ => None,
        }
    }

    /// The map type, if this is a map.
    pub fn as_map(&self) -> Option<&MapType> {
        match self {
            Type::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the primitive type, panicking if this is nested.
    pub fn to_primitive(&self) -> PrimitiveType {
        match self {
            Type::Primitive(p) => *p,
            _ => floe_panic!("type {} is not a primitive type", self),
        }
    }

    /// Returns the struct type, panicking if this is not a struct.
    pub fn to_struct(&self) -> &StructType {
        match self {
            Type::Struct(s) => s,
            _ => floe_panic!("type {} is not a struct type", self),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Primitive(p) => Display::fmt(p, f),
            Type::Struct(s) => Display::fmt(s, f),
            Type::List(l) => Display::fmt(l, f),
            Type::Map(m) => Display::fmt(m, f),
        }
    }
}

impl From<PrimitiveType> for Type {
    fn from(value: PrimitiveType) -> Self {
        Type::Primitive(value)
    }
}

impl From<StructType> for Type {
    fn from(value: StructType) -> Self {
        Type::Struct(value)
    }
}

impl From<ListType> for Type {
    fn from(value: ListType) -> Self {
        Type::List(value)
    }
}

impl From<MapType> for Type {
    fn from(value: MapType) -> Self {
        Type::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(PrimitiveType::Boolean, "boolean")]
    #[case(PrimitiveType::Int, "int")]
    #[case(PrimitiveType::Long, "long")]
    #[case(PrimitiveType::Float, "float")]
    #[case(PrimitiveType::Double, "double")]
    #[case(PrimitiveType::Date, "date")]
    #[case(PrimitiveType::Time, "time")]
    #[case(PrimitiveType::Timestamp, "timestamp")]
    #[case(PrimitiveType::Timestamptz, "timestamptz")]
    #[case(PrimitiveType::String, "string")]
    #[case(PrimitiveType::Uuid, "uuid")]
    #[case(PrimitiveType::Binary, "binary")]
    #[case(PrimitiveType::Fixed(16), "fixed[16]")]
    #[case(PrimitiveType::Decimal(DecimalType::new(9, 2)), "decimal(9,2)")]
    fn primitive_display_roundtrip(#[case] primitive: PrimitiveType, #[case] rendered: &str) {
        assert_eq!(primitive.to_string(), rendered);
        assert_eq!(rendered.parse::<PrimitiveType>().unwrap(), primitive);
    }

    #[test]
    fn primitive_parse_rejects_garbage() {
        assert!("tinyint".parse::<PrimitiveType>().is_err());
        assert!("fixed[zero]".parse::<PrimitiveType>().is_err());
        assert!("decimal(40,2)".parse::<PrimitiveType>().is_err());
    }

    #[test]
    fn structural_equality() {
        assert_eq!(
            Type::Primitive(PrimitiveType::Fixed(4)),
            Type::Primitive(PrimitiveType::Fixed(4))
        );
        assert_ne!(
            Type::Primitive(PrimitiveType::Fixed(4)),
            Type::Primitive(PrimitiveType::Fixed(8))
        );
        assert_ne!(
            Type::Primitive(PrimitiveType::Decimal(DecimalType::new(9, 2))),
            Type::Primitive(PrimitiveType::Decimal(DecimalType::new(9, 0)))
        );
    }

    #[test]
    fn nested_accessors() {
        let list = Type::List(ListType::of_required(3, PrimitiveType::Int.into()));
        assert!(list.is_nested());
        assert!(list.as_list().is_some());
        assert!(list.as_struct().is_none());
        assert_eq!(list.as_list().unwrap().element_id(), 3);
        assert_eq!(list.to_string(), "list<int>");

        let map = Type::Map(MapType::of_optional(
            4,
            PrimitiveType::String.into(),
            5,
            PrimitiveType::Double.into(),
        ));
        assert_eq!(map.to_string(), "map<string, double>");
        assert!(map.as_map().unwrap().key_field().is_required());
        assert!(!map.as_map().unwrap().is_value_required());
    }

    #[test]
    #[should_panic(expected = "is not a struct type")]
    fn to_struct_aborts_on_primitive() {
        Type::Primitive(PrimitiveType::Int).to_struct();
    }
}
