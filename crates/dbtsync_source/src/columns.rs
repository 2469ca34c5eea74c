//! Column Reconciliation
//!
//! Merges the live column list of a warehouse table into the hand-edited
//! `columns:` sequence of a source document.
//!
//! The warehouse decides which columns exist and their order. The document
//! keeps everything a human added: descriptions the warehouse does not know
//! about, tests, tags, any other key on a column entry.
//!
//! New columns are placed by chasing a cursor: the cursor sits on the last
//! column that matched, and each unknown column is inserted right after it,
//! becoming the new cursor. A run of new columns therefore keeps its schema
//! order, while already documented columns are never moved.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Sequence, Value};
use tracing::debug;

const NAME_KEY: &str = "name";
const DESCRIPTION_KEY: &str = "description";

/// One column as reported by the warehouse, already flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,

    /// `None` means the warehouse has no opinion; existing text is kept.
    pub description: Option<String>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn to_column(&self) -> Value {
        let mut column = Mapping::new();
        column.insert(Value::from(NAME_KEY), Value::from(self.name.as_str()));
        if let Some(description) = &self.description {
            column.insert(Value::from(DESCRIPTION_KEY), Value::from(description.as_str()));
        }
        Value::Mapping(column)
    }
}

/// What a reconciliation did to the column list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChanges {
    /// Columns inserted because the warehouse reported them
    pub added: Vec<String>,

    /// Columns dropped because the warehouse no longer has them
    pub removed: Vec<String>,

    /// Existing columns whose description text changed
    pub redescribed: Vec<String>,
}

impl ColumnChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.redescribed.is_empty()
    }
}

/// Reconcile `columns` with `fields` in place and hand the list back.
///
/// Duplicate names in `fields` are not handled specially; each occurrence
/// is processed in turn against the list as it stands.
pub fn update_columns<'a>(columns: &'a mut Sequence, fields: &[SchemaField]) -> &'a mut Sequence {
    reconcile_columns(columns, fields);
    columns
}

/// Same as [`update_columns`], returning a summary of the edits instead.
pub fn reconcile_columns(columns: &mut Sequence, fields: &[SchemaField]) -> ColumnChanges {
    let mut changes = ColumnChanges::default();
    let mut cursor = 0usize;

    for field in fields {
        let mut matched = None;
        let mut redescribed = false;
        for (index, column) in columns.iter_mut().enumerate() {
            if column_name(column) != Some(field.name.as_str()) {
                continue;
            }
            if let Some(description) = &field.description {
                redescribed |= set_column_description(column, description);
            }
            matched = Some(index);
        }
        if redescribed {
            changes.redescribed.push(field.name.clone());
        }

        match matched {
            Some(index) => cursor = index,
            None => {
                let at = (cursor + 1).min(columns.len());
                debug!(column = %field.name, position = at, "Adding column");
                columns.insert(at, field.to_column());
                changes.added.push(field.name.clone());
                cursor = at;
            }
        }
    }

    let live: HashSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    columns.retain(|column| match column_name(column) {
        Some(name) if live.contains(name) => true,
        other => {
            let name = other.unwrap_or("<unnamed>");
            debug!(column = %name, "Removing column");
            changes.removed.push(name.to_string());
            false
        }
    });

    changes
}

/// Names of the columns, in document order. Entries without a name are skipped.
pub fn column_names(columns: &[Value]) -> Vec<&str> {
    columns.iter().filter_map(column_name).collect()
}

pub(crate) fn column_name(column: &Value) -> Option<&str> {
    column.get(NAME_KEY)?.as_str()
}

/// Returns true when the stored text actually changed.
fn set_column_description(column: &mut Value, description: &str) -> bool {
    let Some(mapping) = column.as_mapping_mut() else {
        return false;
    };
    if mapping.get(DESCRIPTION_KEY).and_then(Value::as_str) == Some(description) {
        return false;
    }
    mapping.insert(Value::from(DESCRIPTION_KEY), Value::from(description));
    true
}
