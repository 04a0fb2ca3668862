//! JSON (de)serialization of schemas.
//!
//! A schema serialises as `{"type":"struct","fields":[...]}`; primitive types
//! use their keyword spelling (including `fixed[N]` and `decimal(P,S)`),
//! lists and maps are objects carrying their interior ids.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

use floe_error::{FloeResult, floe_bail, floe_err};

use crate::{ListType, MapType, NestedField, Schema, StructType, Type};

/// Render a type as its JSON value.
pub fn type_to_json(ty: &Type) -> Value {
    match ty {
        Type::Primitive(primitive) => Value::String(primitive.to_string()),
        Type::Struct(r#struct) => {
            let fields: Vec<Value> = r#struct
                .fields()
                .iter()
                .map(|field| {
                    json!({
                        "id": field.id(),
                        "name": field.name().as_ref(),
                        "required": field.is_required(),
                        "type": type_to_json(field.field_type()),
                    })
                })
                .collect();
            json!({ "type": "struct", "fields": fields })
        }
        Type::List(list) => json!({
            "type": "list",
            "element-id": list.element_id(),
            "element": type_to_json(list.element_type()),
            "element-required": list.is_element_required(),
        }),
        Type::Map(map) => json!({
            "type": "map",
            "key-id": map.key_id(),
            "key": type_to_json(map.key_type()),
            "value-id": map.value_id(),
            "value": type_to_json(map.value_type()),
            "value-required": map.is_value_required(),
        }),
    }
}

fn get_i32(object: &Map<String, Value>, key: &str) -> FloeResult<i32> {
    object
        .get(key)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| floe_err!("invalid type JSON: missing or invalid {}", key))
}

fn get_bool(object: &Map<String, Value>, key: &str) -> FloeResult<bool> {
    object
        .get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| floe_err!("invalid type JSON: missing or invalid {}", key))
}

fn get_type(object: &Map<String, Value>, key: &str) -> FloeResult<Type> {
    object
        .get(key)
        .ok_or_else(|| floe_err!("invalid type JSON: missing {}", key))
        .and_then(type_from_json)
}

/// Parse a type from its JSON value.
pub fn type_from_json(value: &Value) -> FloeResult<Type> {
    match value {
        Value::String(keyword) => Ok(Type::Primitive(keyword.parse()?)),
        Value::Object(object) => {
            let tag = object
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| floe_err!("invalid type JSON: missing type tag"))?;
            match tag {
                "struct" => {
                    let fields = object
                        .get("fields")
                        .and_then(Value::as_array)
                        .ok_or_else(|| floe_err!("invalid struct JSON: missing fields"))?;
                    let fields = fields
                        .iter()
                        .map(field_from_json)
                        .collect::<FloeResult<Vec<_>>>()?;
                    Ok(Type::Struct(StructType::new(fields)))
                }
                "list" => Ok(Type::List(ListType::new(
                    get_i32(object, "element-id")?,
                    get_bool(object, "element-required")?,
                    get_type(object, "element")?,
                ))),
                "map" => Ok(Type::Map(MapType::new(
                    get_i32(object, "key-id")?,
                    get_type(object, "key")?,
                    get_i32(object, "value-id")?,
                    get_bool(object, "value-required")?,
                    get_type(object, "value")?,
                ))),
                other => floe_bail!("invalid type JSON: unknown type tag {}", other),
            }
        }
        other => floe_bail!("invalid type JSON: {}", other),
    }
}

fn field_from_json(value: &Value) -> FloeResult<NestedField> {
    let object = value
        .as_object()
        .ok_or_else(|| floe_err!("invalid field JSON: {}", value))?;
    let name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| floe_err!("invalid field JSON: missing name"))?;
    Ok(NestedField::new(
        get_i32(object, "id")?,
        name,
        get_bool(object, "required")?,
        get_type(object, "type")?,
    ))
}

impl Schema {
    /// Render this schema as its JSON document.
    pub fn to_json(&self) -> FloeResult<String> {
        Ok(serde_json::to_string(&type_to_json(self.root_type()))?)
    }

    /// Parse a schema from its JSON document.
    pub fn from_json(s: &str) -> FloeResult<Self> {
        let value: Value = serde_json::from_str(s)?;
        match type_from_json(&value)? {
            Type::Struct(r#struct) => Schema::from_struct(r#struct, Default::default()),
            other => floe_bail!("schema JSON must be a struct, got {}", other),
        }
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        type_to_json(self.root_type()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match type_from_json(&value).map_err(D::Error::custom)? {
            Type::Struct(r#struct) => {
                Schema::from_struct(r#struct, Default::default()).map_err(D::Error::custom)
            }
            other => Err(D::Error::custom(format!(
                "schema JSON must be a struct, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecimalType, PrimitiveType};

    fn sample_schema() -> Schema {
        Schema::new(vec![
            NestedField::required(1, "id", PrimitiveType::Long.into()),
            NestedField::optional(
                2,
                "prices",
                ListType::of_required(
                    3,
                    PrimitiveType::Decimal(DecimalType::new(9, 2)).into(),
                )
                .into(),
            ),
            NestedField::optional(
                4,
                "props",
                MapType::of_optional(
                    5,
                    PrimitiveType::String.into(),
                    6,
                    PrimitiveType::Fixed(16).into(),
                )
                .into(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn roundtrip() {
        let schema = sample_schema();
        let rendered = schema.to_json().unwrap();
        let parsed = Schema::from_json(&rendered).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn wire_shape() {
        let schema = Schema::new(vec![NestedField::required(
            1,
            "id",
            PrimitiveType::Long.into(),
        )])
        .unwrap();
        let value: Value = serde_json::from_str(&schema.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "struct",
                "fields": [
                    {"id": 1, "name": "id", "required": true, "type": "long"}
                ]
            })
        );
    }

    #[test]
    fn parses_spec_documents() {
        let schema = Schema::from_json(
            r#"{
                "type": "struct",
                "fields": [
                    {"id": 1, "name": "level", "required": true, "type": "string"},
                    {"id": 2, "name": "event_time", "required": true, "type": "timestamptz"},
                    {"id": 3, "name": "payload", "required": false, "type": {
                        "type": "list", "element-id": 4, "element": "string", "element-required": false
                    }}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.field_id("payload.element"), Some(4));
        assert_eq!(
            schema.find_field("event_time").unwrap().field_type(),
            &Type::Primitive(PrimitiveType::Timestamptz)
        );
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(Schema::from_json(r#"{"type":"wat"}"#).is_err());
        assert!(Schema::from_json(r#""long""#).is_err());
        assert!(
            Schema::from_json(
                r#"{"type":"struct","fields":[{"id":1,"name":"x","required":true,"type":"tinyint"}]}"#,
            )
            .is_err()
        );
    }
}
