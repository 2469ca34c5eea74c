//! Warehouse Table Metadata
//!
//! The live side of a sync. Anything that can report a table's description,
//! labels and schema implements [`WarehouseTable`]; [`TableMetadata`] reads
//! the JSON printed by `bq show --format=prettyjson PROJECT:DATASET.TABLE`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::columns::SchemaField;
use crate::error::WarehouseError;

/// Table labels, written to the `meta` key of the source table.
pub type Labels = BTreeMap<String, String>;

/// Metadata of a live warehouse table.
pub trait WarehouseTable {
    fn description(&self) -> Option<&str>;

    fn labels(&self) -> Option<&Labels>;

    /// Top-level schema fields in table order.
    fn schema(&self) -> &[WarehouseField];
}

/// A schema field as the warehouse describes it. `RECORD` fields carry
/// their children in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseField {
    pub name: String,

    #[serde(rename = "type", default)]
    pub field_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<WarehouseField>,
}

impl WarehouseField {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<WarehouseField>) -> Self {
        self.fields = fields;
        self
    }
}

/// Flatten warehouse fields into dbt column entries.
///
/// Children of a record follow their parent and are named `parent.child`,
/// recursively. An empty description counts as no description.
pub fn extract_schema_info(fields: &[WarehouseField]) -> Vec<SchemaField> {
    let mut out = Vec::new();
    flatten_into(fields, None, &mut out);
    out
}

fn flatten_into(fields: &[WarehouseField], prefix: Option<&str>, out: &mut Vec<SchemaField>) {
    for field in fields {
        let name = match prefix {
            Some(parent) => format!("{}.{}", parent, field.name),
            None => field.name.clone(),
        };
        out.push(SchemaField {
            name: name.clone(),
            description: non_empty(field.description.as_deref()).map(str::to_string),
        });
        if !field.fields.is_empty() {
            flatten_into(&field.fields, Some(&name), out);
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<WarehouseField>,
}

/// Table metadata in the BigQuery REST representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_reference: Option<TableReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,

    #[serde(default)]
    pub schema: TableSchema,
}

impl TableMetadata {
    pub fn new(fields: Vec<WarehouseField>) -> Self {
        Self {
            schema: TableSchema { fields },
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, WarehouseError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, WarehouseError> {
        let json = std::fs::read_to_string(path).map_err(|source| WarehouseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// `project.dataset.table`, when the reference is present.
    pub fn full_table_id(&self) -> Option<String> {
        self.table_reference.as_ref().map(|r| {
            format!("{}.{}.{}", r.project_id, r.dataset_id, r.table_id)
        })
    }
}

impl WarehouseTable for TableMetadata {
    fn description(&self) -> Option<&str> {
        non_empty(self.description.as_deref())
    }

    fn labels(&self) -> Option<&Labels> {
        self.labels.as_ref()
    }

    fn schema(&self) -> &[WarehouseField] {
        &self.schema.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BQ_SHOW: &str = r#"{
  "kind": "bigquery#table",
  "tableReference": {
    "projectId": "acme",
    "datasetId": "raw",
    "tableId": "events"
  },
  "description": "Clickstream events",
  "labels": { "owner": "data-eng", "tier": "gold" },
  "numRows": "1024",
  "schema": {
    "fields": [
      { "name": "event_id", "type": "STRING", "mode": "REQUIRED", "description": "Event key" },
      { "name": "payload", "type": "RECORD", "mode": "NULLABLE", "fields": [
          { "name": "kind", "type": "STRING", "description": "" },
          { "name": "geo", "type": "RECORD", "fields": [
              { "name": "country", "type": "STRING", "description": "ISO code" }
          ]}
      ]},
      { "name": "ts", "type": "TIMESTAMP" }
    ]
  }
}"#;

    #[test]
    fn test_parse_bq_show_output() {
        let table = TableMetadata::from_json_str(BQ_SHOW).unwrap();

        assert_eq!(table.full_table_id().as_deref(), Some("acme.raw.events"));
        assert_eq!(WarehouseTable::description(&table), Some("Clickstream events"));
        assert_eq!(table.labels().unwrap().get("owner").map(String::as_str), Some("data-eng"));
        assert_eq!(table.schema().len(), 3);
        assert_eq!(table.schema()[1].fields.len(), 2);
    }

    #[test]
    fn test_extract_schema_info_flattens_records() {
        let table = TableMetadata::from_json_str(BQ_SHOW).unwrap();
        let fields = extract_schema_info(table.schema());

        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["event_id", "payload", "payload.kind", "payload.geo", "payload.geo.country", "ts"]
        );
        assert_eq!(fields[0].description.as_deref(), Some("Event key"));
        // Empty warehouse description is treated as absent.
        assert_eq!(fields[2].description, None);
        assert_eq!(fields[4].description.as_deref(), Some("ISO code"));
        assert_eq!(fields[5].description, None);
    }

    #[test]
    fn test_empty_table_description_is_absent() {
        let table = TableMetadata::new(vec![]).with_description("");
        assert_eq!(WarehouseTable::description(&table), None);
    }

    #[test]
    fn test_minimal_metadata() {
        let table = TableMetadata::from_json_str("{}").unwrap();
        assert!(table.schema().is_empty());
        assert!(table.labels().is_none());
        assert!(table.full_table_id().is_none());
    }

    #[test]
    fn test_invalid_json() {
        let err = TableMetadata::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, WarehouseError::Json(_)));
    }
}
