//! Source Table Updater
//!
//! Owns one validated source document for a load -> update -> dump cycle.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Sequence, Value};
use tracing::{debug, info};

use crate::columns::{column_names, reconcile_columns, ColumnChanges, SchemaField};
use crate::document::{validate, SourceDocument};
use crate::error::{Result, SourceError};
use crate::warehouse::{extract_schema_info, Labels, WarehouseTable};

const NAME_KEY: &str = "name";
const DESCRIPTION_KEY: &str = "description";
const META_KEY: &str = "meta";
const COLUMNS_KEY: &str = "columns";

/// A single-table dbt source document, ready to be updated.
///
/// Construction always validates the document shape, so every accessor can
/// rely on `sources[0].tables[0]` being a mapping.
#[derive(Debug, Clone)]
pub struct SourceTableUpdater {
    document: SourceDocument,
    path: Option<PathBuf>,
    changes: ColumnChanges,
}

impl SourceTableUpdater {
    /// Read, parse and validate the YAML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = read_document(path)?;
        let mut updater = Self::from_document(document)?;
        updater.path = Some(path.to_path_buf());
        debug!(path = %path.display(), "Loaded source document");
        Ok(updater)
    }

    /// Validate an already parsed document.
    pub fn from_document(document: SourceDocument) -> Result<Self> {
        validate(document.root())?;
        Ok(Self {
            document,
            path: None,
            changes: ColumnChanges::default(),
        })
    }

    /// Validate a bare YAML tree.
    pub fn from_value(root: Value) -> Result<Self> {
        Self::from_document(SourceDocument::new(root))
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::from_document(SourceDocument::parse(text)?)
    }

    /// Discard in-memory edits and read the file this updater was loaded from.
    ///
    /// On failure the current document is left as it was.
    pub fn reload(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(SourceError::NoSourcePath)?;
        let document = read_document(&path)?;
        validate(document.root())?;
        self.document = document;
        self.changes = ColumnChanges::default();
        Ok(())
    }

    /// Write the document to `path`, replacing whatever is there.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_yaml_string()?;
        std::fs::write(path, text).map_err(|e| SourceError::io(path, e))?;
        debug!(path = %path.display(), "Wrote source document");
        Ok(())
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        self.document.render()
    }

    /// The file this updater was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Column edits made by the most recent reconciliation.
    pub fn changes(&self) -> &ColumnChanges {
        &self.changes
    }

    /// Pull description, labels and columns from a live table.
    pub fn update_with_warehouse_table<T>(&mut self, table: &T) -> &mut Self
    where
        T: WarehouseTable + ?Sized,
    {
        self.set_description(table.description());
        self.set_labels(table.labels());
        let fields = extract_schema_info(table.schema());
        self.update_columns(&fields);
        info!(
            table = self.table_name().unwrap_or("<unnamed>"),
            added = self.changes.added.len(),
            removed = self.changes.removed.len(),
            redescribed = self.changes.redescribed.len(),
            "Updated source table from warehouse"
        );
        self
    }

    /// Reconcile the documented columns with `fields`.
    pub fn update_columns(&mut self, fields: &[SchemaField]) -> &mut Self {
        self.changes = reconcile_columns(self.columns_mut(), fields);
        self
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table().get(NAME_KEY)?.as_str()
    }

    pub fn description(&self) -> Option<&str> {
        self.table().get(DESCRIPTION_KEY)?.as_str()
    }

    /// Set the table description. `None` leaves the current one alone.
    pub fn set_description(&mut self, description: Option<&str>) {
        match description {
            Some(text) => {
                self.table_mut()
                    .insert(Value::from(DESCRIPTION_KEY), Value::from(text));
            }
            None => debug!("No table description supplied, keeping existing"),
        }
    }

    /// The `meta` mapping of the table.
    pub fn labels(&self) -> Option<&Mapping> {
        self.table().get(META_KEY)?.as_mapping()
    }

    /// Replace the `meta` mapping. `None` or an empty map leaves it alone.
    pub fn set_labels(&mut self, labels: Option<&Labels>) {
        let Some(labels) = labels.filter(|l| !l.is_empty()) else {
            debug!("No table labels supplied, keeping existing");
            return;
        };
        let meta: Mapping = labels
            .iter()
            .map(|(k, v)| (Value::from(k.as_str()), Value::from(v.as_str())))
            .collect();
        self.table_mut().insert(Value::from(META_KEY), Value::Mapping(meta));
    }

    /// The documented columns, in order.
    pub fn columns(&self) -> &[Value] {
        match self.table().get(COLUMNS_KEY).and_then(Value::as_sequence) {
            Some(columns) => columns.as_slice(),
            None => &[],
        }
    }

    /// Live access to the `columns` sequence, created empty when missing.
    pub fn columns_mut(&mut self) -> &mut Sequence {
        let table = self.table_mut();
        if !table.get(COLUMNS_KEY).map_or(false, Value::is_sequence) {
            table.insert(Value::from(COLUMNS_KEY), Value::Sequence(Sequence::new()));
        }
        match table.get_mut(COLUMNS_KEY) {
            Some(Value::Sequence(columns)) => columns,
            _ => unreachable!("columns was just set to a sequence"),
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        column_names(self.columns())
    }

    fn table(&self) -> &Mapping {
        match self.document.table() {
            Some(table) => table,
            None => unreachable!("document shape is validated on construction"),
        }
    }

    fn table_mut(&mut self) -> &mut Mapping {
        match self.document.table_mut() {
            Some(table) => table,
            None => unreachable!("document shape is validated on construction"),
        }
    }
}

fn read_document(path: &Path) -> Result<SourceDocument> {
    let text = std::fs::read_to_string(path).map_err(|e| SourceError::io(path, e))?;
    SourceDocument::parse(&text)
}
