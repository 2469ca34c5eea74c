//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;

use dbtsync_source::{ShapeError, SourceError, WarehouseError};

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// File does not exist
    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestions([
                format!("TRY: Check if the file exists: ls -la {}", path.display()),
                format!("TRY: Look for similar files: ls {}",
                    path.parent().map(|p| p.display().to_string()).unwrap_or_else(|| ".".to_string())),
            ])
    }

    /// File cannot be read or written
    pub fn cannot_access_file(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot access file: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                format!("TRY: Check file permissions: ls -la {}", path.display()),
                "TRY: Ensure the file is not open in another program".to_string(),
            ])
    }

    /// The YAML is well formed but is not a single-table dbt source file
    pub fn not_a_source_table(path: &Path, shape: ShapeError) -> Self {
        let hint = match shape {
            ShapeError::NotASourceDocument => "TRY: Point at a file with a top-level 'sources:' list",
            ShapeError::MultipleDatasets => "TRY: Split the file so each holds a single entry under 'sources:'",
            ShapeError::NoTables => "TRY: Add a 'tables:' list with one table under the source",
            ShapeError::MultipleTables => "TRY: Split the file so each source lists exactly one table",
        };
        Self::new(format!("Invalid source file: {}", shape))
            .with_context(format!("{} must describe exactly one dataset with one table", path.display()))
            .with_suggestion(hint)
    }

    /// YAML parsing error
    pub fn yaml_parse_error(path: &Path, details: &str) -> Self {
        Self::new(format!("YAML parse error: {}", details))
            .with_context(format!("Failed to parse YAML file: {}", path.display()))
            .with_suggestions([
                "TRY: Check indentation; YAML does not allow tabs".to_string(),
                format!("TRY: Inspect the file: cat -A {}", path.display()),
            ])
    }

    /// JSON parsing error
    pub fn json_parse_error(path: &Path, details: &str) -> Self {
        Self::new(format!("JSON parse error: {}", details))
            .with_context(format!("Failed to parse table metadata: {}", path.display()))
            .with_suggestions([
                "TRY: Regenerate it: bq show --format=prettyjson PROJECT:DATASET.TABLE > FILE".to_string(),
                "TRY: Validate the JSON: cat FILE | python -m json.tool".to_string(),
            ])
    }

    /// Map a source document error for the file at `path`.
    pub fn from_source_error(path: &Path, err: &SourceError) -> Self {
        match err {
            SourceError::Shape(shape) => Self::not_a_source_table(path, *shape),
            SourceError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                Self::file_not_found(path)
            }
            SourceError::Io { source, .. } => Self::cannot_access_file(path, &source.to_string()),
            SourceError::Yaml(e) => Self::yaml_parse_error(path, &e.to_string()),
            SourceError::Warehouse(e) => Self::from_warehouse_error(path, e),
            SourceError::NoSourcePath => Self::new(err.to_string()),
        }
    }

    /// Map a table metadata error for the file at `path`.
    pub fn from_warehouse_error(path: &Path, err: &WarehouseError) -> Self {
        match err {
            WarehouseError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                Self::file_not_found(path)
            }
            WarehouseError::Io { source, .. } => Self::cannot_access_file(path, &source.to_string()),
            WarehouseError::Json(e) => Self::json_parse_error(path, &e.to_string()),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.message,
            "context": self.context,
            "suggestions": self.suggestions,
        })
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Print an error as a JSON object on stdout, for `--json` callers.
pub fn print_json_error(err: &anyhow::Error) {
    let payload = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => helpful.to_json(),
        None => serde_json::json!({
            "error": format!("{:#}", err),
            "context": null,
            "suggestions": [],
        }),
    };
    println!("{}", payload);
}
