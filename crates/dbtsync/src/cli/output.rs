//! Output formatting utilities for CLI commands

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use dbtsync_source::ColumnChanges;

/// Print a table with custom column colors
pub fn print_table_colored(headers: &[&str], rows: Vec<Vec<(String, Option<Color>)>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        let cells: Vec<Cell> = row
            .into_iter()
            .map(|(text, color)| {
                let cell = Cell::new(text);
                if let Some(c) = color {
                    cell.fg(c)
                } else {
                    cell
                }
            })
            .collect();
        table.add_row(cells);
    }

    println!("{}", table);
}

/// One row per changed column: (change, column), colored by kind.
pub fn change_rows(changes: &ColumnChanges) -> Vec<Vec<(String, Option<Color>)>> {
    let kinds = [
        ("added", Color::Green, &changes.added),
        ("removed", Color::Red, &changes.removed),
        ("description", Color::Yellow, &changes.redescribed),
    ];
    kinds
        .into_iter()
        .flat_map(|(label, color, names)| {
            names
                .iter()
                .map(move |name| vec![(label.to_string(), Some(color)), (name.clone(), None)])
        })
        .collect()
}

/// Print a column change summary, or a note that nothing changed.
pub fn print_changes(changes: &ColumnChanges) {
    if changes.is_empty() {
        println!("No column changes.");
        return;
    }
    print_table_colored(&["CHANGE", "COLUMN"], change_rows(changes));
}
