//! Check command - validate that a file is a single-table dbt source

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cli::update::load_source;

/// Arguments for the `check` command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// dbt source YAML to validate
    pub source: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let updater = load_source(&args.source)?;
    let columns = updater.column_names();

    if args.json {
        let payload = serde_json::json!({
            "source": args.source.to_string_lossy(),
            "valid": true,
            "table": updater.table_name(),
            "description": updater.description(),
            "columns": columns,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "OK: {} describes table '{}' with {} columns",
        args.source.display(),
        updater.table_name().unwrap_or("?"),
        columns.len()
    );
    for name in columns {
        println!("  - {}", name);
    }
    Ok(())
}
