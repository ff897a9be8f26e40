//! Terminal rendering of result tables.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use std::fmt::Display;

use crate::parser::AgeProfile;
use crate::table::WideTable;

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn value_cell(value: Option<f64>) -> Cell {
    match value {
        Some(v) => Cell::new(format!("{v:.1}")).set_alignment(CellAlignment::Right),
        None => Cell::new("-").set_alignment(CellAlignment::Center),
    }
}

pub fn render_table<K: Display>(table: &WideTable<K>) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![header_cell(table.index_name())];
    header.extend(table.columns().iter().map(|c| header_cell(c)));
    out.set_header(header);

    for row in table.rows() {
        let mut cells = vec![Cell::new(&row.key)];
        cells.extend(row.values.iter().map(|v| value_cell(*v)));
        out.add_row(cells);
    }
    out
}

/// One line per year with the age of highest rate
pub fn render_age_peaks(profile: &AgeProfile) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL_CONDENSED);
    out.set_header(vec![
        header_cell("Year"),
        header_cell("Peak age"),
        header_cell("Rate"),
    ]);

    for year in profile.years() {
        if let Some((age, rate)) = profile.peak(year) {
            out.add_row(vec![
                Cell::new(year),
                Cell::new(age).set_alignment(CellAlignment::Right),
                value_cell(Some(rate)),
            ]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::pivot;

    #[test]
    fn test_render_table_contents() {
        let table = pivot(
            "LOCATION",
            vec![("Japan".to_string(), "TOT", 83.0), ("Spain".to_string(), "MEN", 79.2)],
        )
        .unwrap();

        let rendered = render_table(&table).to_string();
        assert!(rendered.contains("LOCATION"));
        assert!(rendered.contains("Japan"));
        assert!(rendered.contains("83.0"));
        assert!(rendered.contains("79.2"));
    }
}
