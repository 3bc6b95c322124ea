use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::pipelines::{default_choice, Catalog};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// One row per pipeline: folder, name, and the short form of its Jenkins class.
/// The default interactive choice is highlighted.
pub fn catalog_table(catalog: &Catalog) -> Table {
    let names = catalog.names();
    let default = default_choice(&names);

    let mut table = create_table();
    table.set_header(vec!["Folder", "Pipeline", "Type"]);

    for job in catalog.jobs() {
        let short = job.short_name();
        let folder = job.name.rsplit_once('/').map_or("", |(folder, _)| folder);
        let kind = job.class.rsplit('.').next().unwrap_or(&job.class);

        let name_cell = if Some(job.name.as_str()) == default {
            Cell::new(format!("{short} (default)")).fg(TableColor::Green)
        } else {
            Cell::new(short)
        };

        table.add_row(vec![
            Cell::new(folder),
            name_cell,
            Cell::new(kind).fg(TableColor::DarkGrey),
        ]);
    }

    table
}
