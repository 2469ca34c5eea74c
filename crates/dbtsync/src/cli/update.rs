//! Update command - pull a warehouse table's schema into a source file

use anyhow::{Context, Result};
use clap::Args;
use dbtsync_source::{SourceTableUpdater, TableMetadata};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::error::HelpfulError;
use crate::cli::output::print_changes;

/// Arguments for the `update` command
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// dbt source YAML describing a single table
    pub source: PathBuf,

    /// Table metadata JSON, as printed by `bq show --format=prettyjson`
    #[arg(short = 't', long, env = "DBTSYNC_TABLE_JSON")]
    pub table: PathBuf,

    /// Write the result here instead of updating SOURCE in place
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Print the updated YAML instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: UpdateArgs) -> Result<()> {
    let mut updater = load_source(&args.source)?;
    let table = TableMetadata::from_path(&args.table)
        .map_err(|e| HelpfulError::from_warehouse_error(&args.table, &e))?;

    if let Some(id) = table.full_table_id() {
        info!(table = %id, source = %args.source.display(), "Updating source from warehouse table");
    }
    updater.update_with_warehouse_table(&table);

    let target = args.output.clone().unwrap_or_else(|| args.source.clone());
    let rendered = if args.dry_run {
        Some(updater.to_yaml_string().context("Failed to render source YAML")?)
    } else {
        updater
            .dump(&target)
            .map_err(|e| HelpfulError::from_source_error(&target, &e))?;
        info!(path = %target.display(), "Wrote source file");
        None
    };

    if args.json {
        let payload = serde_json::json!({
            "source": args.source.to_string_lossy(),
            "output": if args.dry_run { None } else { Some(target.to_string_lossy()) },
            "dry_run": args.dry_run,
            "table": updater.table_name(),
            "warehouse_table": table.full_table_id(),
            "description": updater.description(),
            "columns": updater.column_names(),
            "changes": updater.changes(),
            "yaml": rendered,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if let Some(yaml) = rendered {
        print!("{}", yaml);
        return Ok(());
    }

    println!(
        "Updated {} (table '{}', {} columns)",
        target.display(),
        updater.table_name().unwrap_or("?"),
        updater.columns().len()
    );
    print_changes(updater.changes());
    Ok(())
}

/// Load a source file, turning failures into actionable errors.
pub fn load_source(path: &Path) -> Result<SourceTableUpdater> {
    SourceTableUpdater::load(path).map_err(|e| HelpfulError::from_source_error(path, &e).into())
}
