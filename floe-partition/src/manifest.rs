//! Parsing of manifest-header key/value metadata.
//!
//! The manifest codec itself is external; it hands the core a string map
//! from the file header, which must carry the table schema and the partition
//! spec under well-known keys.

use std::collections::HashMap;
use std::sync::Arc;

use floe_error::{FloeResult, floe_err};
use floe_schema::{Schema, SchemaRef};

use crate::PartitionSpec;

/// The metadata key holding the schema JSON.
pub const SCHEMA_KEY: &str = "schema";

/// The metadata key holding the partition spec JSON.
pub const PARTITION_SPEC_KEY: &str = "partition-spec";

/// Parse a manifest header's key/value metadata into the schema and the
/// partition spec it was written with.
pub fn parse_manifest_metadata(
    metadata: &HashMap<String, String>,
) -> FloeResult<(SchemaRef, PartitionSpec)> {
    let schema_json = metadata
        .get(SCHEMA_KEY)
        .ok_or_else(|| floe_err!("manifest metadata is missing key: {}", SCHEMA_KEY))?;
    let schema = Arc::new(Schema::from_json(schema_json)?);

    let spec_json = metadata
        .get(PARTITION_SPEC_KEY)
        .ok_or_else(|| floe_err!("manifest metadata is missing key: {}", PARTITION_SPEC_KEY))?;
    let spec = PartitionSpec::from_json(Arc::clone(&schema), spec_json)?;

    Ok((schema, spec))
}

#[cfg(test)]
mod tests {
    use floe_schema::{NestedField, PrimitiveType};

    use super::*;

    #[test]
    fn parses_schema_and_spec() {
        let schema = Schema::new(vec![
            NestedField::required(1, "id", PrimitiveType::Long.into()),
            NestedField::optional(2, "data", PrimitiveType::String.into()),
        ])
        .unwrap();
        let spec = PartitionSpec::builder(Arc::new(schema.clone()))
            .bucket("id", 16)
            .unwrap()
            .build();

        let metadata = HashMap::from([
            (SCHEMA_KEY.to_string(), schema.to_json().unwrap()),
            (PARTITION_SPEC_KEY.to_string(), spec.to_json().unwrap()),
        ]);

        let (parsed_schema, parsed_spec) = parse_manifest_metadata(&metadata).unwrap();
        assert_eq!(parsed_schema.as_ref(), &schema);
        assert_eq!(parsed_spec.fields().len(), 1);
        assert_eq!(parsed_spec.fields()[0].name(), "id_bucket");
    }

    #[test]
    fn missing_keys_are_errors() {
        let err = parse_manifest_metadata(&HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("missing key: schema"));

        let only_schema = HashMap::from([(
            SCHEMA_KEY.to_string(),
            r#"{"type":"struct","fields":[]}"#.to_string(),
        )]);
        let err = parse_manifest_metadata(&only_schema).unwrap_err();
        assert!(err.to_string().contains("missing key: partition-spec"));
    }

    #[test]
    fn malformed_documents_are_errors() {
        let metadata = HashMap::from([
            (SCHEMA_KEY.to_string(), "{not json".to_string()),
            (PARTITION_SPEC_KEY.to_string(), "{}".to_string()),
        ]);
        assert!(parse_manifest_metadata(&metadata).is_err());
    }
}
