//! `markgrid-io` — table ingestion and export.
//!
//! Loads CSV/TSV/Excel files into the engine's in-memory `Table` and writes
//! tables back out, picking the codec from the file extension.

use std::path::Path;

use markgrid_engine::Table;

pub mod csv;
pub mod xlsx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Excel,
}

/// Pick a codec from the file extension.
pub fn detect_format(path: &Path) -> Option<TableFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "csv" => Some(TableFormat::Csv),
        "tsv" | "tab" => Some(TableFormat::Tsv),
        "xlsx" | "xls" | "xlsb" | "ods" => Some(TableFormat::Excel),
        _ => None,
    }
}

/// Load a table, dispatching on extension. Unknown extensions fall back to
/// CSV with delimiter sniffing.
pub fn load_table(path: &Path) -> Result<Table, String> {
    match detect_format(path) {
        Some(TableFormat::Excel) => xlsx::import(path),
        Some(TableFormat::Tsv) => csv::import_tsv(path),
        _ => csv::import(path),
    }
}

/// Write a table, dispatching on extension. Unknown extensions write CSV.
pub fn write_table(table: &Table, path: &Path) -> Result<(), String> {
    match detect_format(path) {
        Some(TableFormat::Excel) => xlsx::export(table, path),
        Some(TableFormat::Tsv) => csv::export_tsv(table, path),
        _ => csv::export(table, path),
    }
}
