//! Source Document
//!
//! A dbt source file, held as a `serde_yaml` tree so that keys we do not
//! understand (tests, freshness, loaded_at_field, ...) survive a round trip
//! in their original order.
//!
//! `serde_yaml` drops comments. The leading comment block of the file is
//! captured separately and written back on render; comments inside the
//! body are lost.

use serde_yaml::{Mapping, Sequence, Value};

use crate::error::{Result, ShapeError};

const SOURCES_KEY: &str = "sources";
const TABLES_KEY: &str = "tables";

/// A parsed dbt source document.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    header: String,
    root: Value,
}

impl SourceDocument {
    /// Wrap an already parsed YAML tree. No validation happens here.
    pub fn new(root: Value) -> Self {
        Self {
            header: String::new(),
            root,
        }
    }

    /// Parse YAML text, keeping the leading comment block.
    pub fn parse(text: &str) -> Result<Self> {
        let header = leading_header(text);
        let root: Value = serde_yaml::from_str(text)?;
        Ok(Self {
            header: header.to_string(),
            root,
        })
    }

    /// Render the document back to YAML text.
    pub fn render(&self) -> Result<String> {
        let body = serde_yaml::to_string(&self.root)?;
        let mut out = String::with_capacity(self.header.len() + body.len());
        out.push_str(&self.header);
        out.push_str(&body);
        Ok(out)
    }

    /// Comment lines (and an optional `---` marker) that preceded the body.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// `sources[0].tables[0]`, if the document has that shape.
    pub fn table(&self) -> Option<&Mapping> {
        self.root
            .get(SOURCES_KEY)?
            .get(0)?
            .get(TABLES_KEY)?
            .get(0)?
            .as_mapping()
    }

    pub(crate) fn table_mut(&mut self) -> Option<&mut Mapping> {
        self.root
            .get_mut(SOURCES_KEY)?
            .get_mut(0)?
            .get_mut(TABLES_KEY)?
            .get_mut(0)?
            .as_mapping_mut()
    }
}

/// Check that a document describes exactly one dataset holding exactly one table.
pub fn validate(root: &Value) -> std::result::Result<(), ShapeError> {
    let sources = root
        .get(SOURCES_KEY)
        .ok_or(ShapeError::NotASourceDocument)?;
    let source = single_entry(sources, ShapeError::NotASourceDocument, ShapeError::MultipleDatasets)?;

    let tables = source.get(TABLES_KEY).ok_or(ShapeError::NoTables)?;
    let table = single_entry(tables, ShapeError::NoTables, ShapeError::MultipleTables)?;
    if !table.is_mapping() {
        return Err(ShapeError::NoTables);
    }
    Ok(())
}

fn single_entry(
    value: &Value,
    empty: ShapeError,
    many: ShapeError,
) -> std::result::Result<&Value, ShapeError> {
    let seq: &Sequence = value.as_sequence().ok_or(empty)?;
    match seq.as_slice() {
        [] => Err(empty),
        [entry] => Ok(entry),
        _ => Err(many),
    }
}

/// Everything before the first line that belongs to the YAML body.
fn leading_header(text: &str) -> &str {
    let mut end = 0;
    let mut seen_marker = false;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        let is_header = if trimmed.is_empty() || trimmed.starts_with('#') {
            true
        } else if !seen_marker && is_document_marker(trimmed) {
            seen_marker = true;
            true
        } else {
            false
        };
        if !is_header {
            break;
        }
        end += line.len();
    }
    &text[..end]
}

/// `---` on its own or followed only by a comment.
fn is_document_marker(line: &str) -> bool {
    match line.strip_prefix("---") {
        Some("") => true,
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start().starts_with('#'),
        _ => false,
    }
}
