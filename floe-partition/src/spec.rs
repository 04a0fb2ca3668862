use std::fmt::{Display, Formatter};
use std::sync::Arc;

use itertools::Itertools as _;
use serde::{Deserialize, Serialize};

use floe_error::{FloeExpect as _, FloeResult, floe_bail, floe_err};
use floe_expr::{BoundExpr, UnboundExpr};
use floe_schema::{NestedField, Schema, SchemaRef, StructType};

use crate::Transform;

/// Partition field ids live in a dedicated sub-range, disjoint from data
/// field ids.
pub const PARTITION_DATA_ID_START: i32 = 1000;

/// A shared pointer to an immutable [`PartitionSpec`].
pub type PartitionSpecRef = Arc<PartitionSpec>;

/// One partition column: a source data column, a transform, and the name of
/// the resulting partition column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionField {
    source_id: i32,
    name: String,
    transform: Transform,
}

impl PartitionField {
    /// The id of the source data column.
    pub fn source_id(&self) -> i32 {
        self.source_id
    }

    /// The partition column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The transform from source values to partition values.
    pub fn transform(&self) -> Transform {
        self.transform
    }
}

impl Display for PartitionField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}({})", self.name, self.transform, self.source_id)
    }
}

/// An ordered list of partition fields over a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSpec {
    spec_id: i32,
    schema: SchemaRef,
    fields: Vec<PartitionField>,
}

impl PartitionSpec {
    /// Start building a spec over `schema`.
    pub fn builder(schema: SchemaRef) -> PartitionSpecBuilder {
        PartitionSpecBuilder {
            schema,
            spec_id: 0,
            fields: Vec::new(),
        }
    }

    /// A spec with no partition fields.
    pub fn unpartitioned(schema: SchemaRef) -> Self {
        Self {
            spec_id: 0,
            schema,
            fields: Vec::new(),
        }
    }

    /// The spec id.
    pub fn spec_id(&self) -> i32 {
        self.spec_id
    }

    /// The data schema this spec partitions.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The shared pointer to the data schema.
    pub fn schema_ref(&self) -> &SchemaRef {
        &self.schema
    }

    /// The ordered partition fields.
    pub fn fields(&self) -> &[PartitionField] {
        &self.fields
    }

    /// The partition fields derived from a given source column.
    pub fn fields_for_source(&self, source_id: i32) -> impl Iterator<Item = &PartitionField> {
        self.fields
            .iter()
            .filter(move |field| field.source_id == source_id)
    }

    /// The struct type of partition values, with ids drawn from the
    /// dedicated partition sub-range. Partition columns are optional since
    /// null source values produce null partition values.
    pub fn partition_type(&self) -> StructType {
        let fields = self
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let source = self
                    .schema
                    .find_field_by_id(field.source_id)
                    .floe_expect("partition source column missing from schema");
                let result = field
                    .transform
                    .result_type(source.field_type())
                    .floe_expect("partition transform no longer fits its source type");
                NestedField::optional(
                    PARTITION_DATA_ID_START + index as i32,
                    field.name.as_str(),
                    result,
                )
            })
            .collect();
        StructType::new(fields)
    }

    /// The partition struct as a schema, for binding partition-space
    /// predicates such as the output of a projection.
    pub fn partition_schema(&self) -> FloeResult<Schema> {
        Schema::from_struct(self.partition_type(), Default::default())
    }

    /// Bind a partition-space expression against this spec's partition
    /// struct.
    pub fn bind_partition_expr(&self, expr: &UnboundExpr) -> FloeResult<BoundExpr> {
        expr.bind(&self.partition_schema()?)
    }

    /// Render this spec as its JSON document.
    pub fn to_json(&self) -> FloeResult<String> {
        Ok(serde_json::to_string(&SpecJson::from(self))?)
    }

    /// Parse a spec from its JSON document, resolving and validating the
    /// fields against `schema`.
    pub fn from_json(schema: SchemaRef, s: &str) -> FloeResult<Self> {
        let parsed: SpecJson = serde_json::from_str(s)?;
        let mut builder = PartitionSpec::builder(schema).with_spec_id(parsed.spec_id);
        for field in parsed.fields {
            let transform: Transform = field.transform.parse()?;
            builder = builder.add_field_by_id(field.source_id, field.name, transform)?;
        }
        Ok(builder.build())
    }
}

impl Display for PartitionSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.fields.iter().join(", "))
    }
}

impl Serialize for PartitionSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        SpecJson::from(self).serialize(serializer)
    }
}

#[derive(Serialize, Deserialize)]
struct SpecJson {
    #[serde(rename = "spec-id")]
    spec_id: i32,
    fields: Vec<SpecFieldJson>,
}

#[derive(Serialize, Deserialize)]
struct SpecFieldJson {
    name: String,
    transform: String,
    #[serde(rename = "source-id")]
    source_id: i32,
}

impl From<&PartitionSpec> for SpecJson {
    fn from(spec: &PartitionSpec) -> Self {
        SpecJson {
            spec_id: spec.spec_id,
            fields: spec
                .fields
                .iter()
                .map(|field| SpecFieldJson {
                    name: field.name.clone(),
                    transform: field.transform.to_string(),
                    source_id: field.source_id,
                })
                .collect(),
        }
    }
}

/// Builds a [`PartitionSpec`], validating each field as it is added.
pub struct PartitionSpecBuilder {
    schema: SchemaRef,
    spec_id: i32,
    fields: Vec<PartitionField>,
}

impl PartitionSpecBuilder {
    /// Set the spec id.
    pub fn with_spec_id(mut self, spec_id: i32) -> Self {
        self.spec_id = spec_id;
        self
    }

    /// Add a partition field from a source column name.
    pub fn add_field(
        self,
        source: &str,
        name: impl Into<String>,
        transform: Transform,
    ) -> FloeResult<Self> {
        let source_id = self
            .schema
            .field_id(source)
            .ok_or_else(|| floe_err!("cannot find source column: {}", source))?;
        self.add_field_by_id(source_id, name.into(), transform)
    }

    fn add_field_by_id(
        mut self,
        source_id: i32,
        name: String,
        transform: Transform,
    ) -> FloeResult<Self> {
        let source = self
            .schema
            .find_field_by_id(source_id)
            .ok_or_else(|| floe_err!("cannot find source column id: {}", source_id))?;
        if !transform.can_transform(source.field_type()) {
            return Err(floe_err!(
                InvalidArgument: "cannot use {} with source type {}: {}",
                transform,
                source.field_type(),
                source.name()
            ));
        }
        if name.is_empty() {
            floe_bail!("partition field names cannot be empty");
        }
        if self.fields.iter().any(|field| field.name == name) {
            floe_bail!("partition field name already used: {}", name);
        }
        self.fields.push(PartitionField {
            source_id,
            name,
            transform,
        });
        Ok(self)
    }

    /// Partition identically by a source column.
    pub fn identity(self, source: &str) -> FloeResult<Self> {
        self.add_field(source, source.to_string(), Transform::Identity)
    }

    /// Partition by hash buckets of a source column.
    pub fn bucket(self, source: &str, buckets: u32) -> FloeResult<Self> {
        self.add_field(
            source,
            format!("{}_bucket", source),
            Transform::Bucket(buckets),
        )
    }

    /// Partition by truncated values of a source column.
    pub fn truncate(self, source: &str, width: u32) -> FloeResult<Self> {
        self.add_field(
            source,
            format!("{}_trunc", source),
            Transform::Truncate(width),
        )
    }

    /// Partition by year of a temporal source column.
    pub fn year(self, source: &str) -> FloeResult<Self> {
        self.add_field(source, format!("{}_year", source), Transform::Year)
    }

    /// Partition by month of a temporal source column.
    pub fn month(self, source: &str) -> FloeResult<Self> {
        self.add_field(source, format!("{}_month", source), Transform::Month)
    }

    /// Partition by day of a temporal source column.
    pub fn day(self, source: &str) -> FloeResult<Self> {
        self.add_field(source, format!("{}_day", source), Transform::Day)
    }

    /// Partition by hour of a timestamp source column.
    pub fn hour(self, source: &str) -> FloeResult<Self> {
        self.add_field(source, format!("{}_hour", source), Transform::Hour)
    }

    /// Finish the spec.
    pub fn build(self) -> PartitionSpec {
        PartitionSpec {
            spec_id: self.spec_id,
            schema: self.schema,
            fields: self.fields,
        }
    }
}
