use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::providers::Outcome;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn color_coded_outcome_cell(outcome: &Outcome) -> Cell {
    let cell = Cell::new(outcome.to_string());
    match outcome {
        Outcome::Succeeded(_) => cell.fg(TableColor::Green),
        Outcome::Failed(_) => cell.fg(TableColor::Red),
        Outcome::Canceled(_) | Outcome::Running => cell.fg(TableColor::Yellow),
        Outcome::Unknown | Outcome::Unresolvable => cell.fg(TableColor::DarkGrey),
    }
}

pub fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => Cell::new("?").fg(TableColor::DarkGrey),
    }
}
