//! dbt Source Synchronization
//!
//! Keeps a dbt `sources:` YAML file describing a single warehouse table in
//! step with the live table.
//!
//! The lifecycle of one sync:
//!
//! 1. **Load**: read the YAML and check it holds exactly one dataset and one table
//! 2. **Fetch**: obtain table metadata from the warehouse (see [`warehouse`])
//! 3. **Reconcile**: merge the live schema into the documented columns
//! 4. **Dump**: write the document back, usually in place
//!
//! Reconciliation trusts the warehouse for WHICH columns exist and in WHAT
//! order. It does not trust it to erase descriptions a human wrote: a column
//! the warehouse reports without a description keeps the one in the file.
//!
//! # Modules
//!
//! - [`document`]: YAML document wrapper and shape validation
//! - [`columns`]: the column reconciliation algorithm
//! - [`updater`]: [`SourceTableUpdater`], the load/mutate/dump owner
//! - [`warehouse`]: warehouse table contract and schema flattening
//! - [`error`]: error types

pub mod columns;
pub mod document;
pub mod error;
pub mod updater;
pub mod warehouse;

pub use columns::{reconcile_columns, update_columns, ColumnChanges, SchemaField};
pub use document::{validate, SourceDocument};
pub use error::{Result, ShapeError, SourceError, WarehouseError};
pub use updater::SourceTableUpdater;
pub use warehouse::{
    extract_schema_info, Labels, TableMetadata, TableReference, WarehouseField, WarehouseTable,
};
