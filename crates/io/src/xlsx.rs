// Excel table import/export
//
// Import goes through calamine (xlsx, xls, xlsb, ods); export through
// rust_xlsxwriter. The first worksheet row is the header row.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use markgrid_engine::{Scalar, Table};

/// Import the first sheet of an Excel file.
pub fn import(path: &Path) -> Result<Table, String> {
    import_sheet(path, None)
}

/// Import a named sheet, or the first sheet when `sheet` is None.
pub fn import_sheet(path: &Path, sheet: Option<&str>) -> Result<Table, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err("Excel file contains no sheets".to_string());
    }

    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(format!(
                    "Sheet '{}' not found (available: {})",
                    name,
                    sheet_names.join(", ")
                ));
            }
            name.to_string()
        }
        None => sheet_names[0].clone(),
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| format!("Sheet '{}' is empty", sheet_name))?;

    let columns: Vec<String> = header.iter().map(|c| cell_text(c).trim().to_string()).collect();
    let mut table = Table::new(columns);

    for row in rows {
        table.push_row(row.iter().map(convert_cell).collect());
    }

    Ok(table)
}

/// Header cells are always read as text.
fn cell_text(cell: &Data) -> String {
    match convert_cell(cell) {
        Scalar::Empty => String::new(),
        other => other.to_display(),
    }
}

fn convert_cell(cell: &Data) -> Scalar {
    match cell {
        Data::Empty => Scalar::Empty,
        Data::String(s) => {
            if s.is_empty() {
                Scalar::Empty
            } else {
                Scalar::Text(s.clone())
            }
        }
        Data::Float(n) => Scalar::Number(*n),
        Data::Int(n) => Scalar::Number(*n as f64),
        Data::Bool(b) => Scalar::Bool(*b),
        // Store error as text representation
        Data::Error(e) => Scalar::Text(format!("#{:?}", e)),
        // Raw serial value; grading compares text forms, so no date formats
        Data::DateTime(dt) => Scalar::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Scalar::Text(s.clone()),
        Data::DurationIso(s) => Scalar::Text(s.clone()),
    }
}

/// Export a table as a single-sheet XLSX file with a bold header row.
pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    for (col, name) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header_format)
            .map_err(|e| format!("Failed to write header: {}", e))?;
    }

    for row in 0..table.row_count() {
        let target_row = (row + 1) as u32;
        for col in 0..table.columns.len() {
            let target_col = col as u16;
            let write_result = match table.cell(row, col) {
                Scalar::Empty => continue,
                Scalar::Number(n) if n.is_nan() => continue,
                Scalar::Number(n) => worksheet.write_number(target_row, target_col, *n),
                Scalar::Bool(b) => worksheet.write_boolean(target_row, target_col, *b),
                Scalar::Text(s) => worksheet.write_string(target_row, target_col, s),
            };
            write_result.map_err(|e| format!("Failed to write cell: {}", e))?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["题号".into(), "答案".into(), "分值".into()]);
        table.push_row(vec![
            Scalar::Text("Q1".into()),
            Scalar::Text("A".into()),
            Scalar::Number(5.0),
        ]);
        table.push_row(vec![
            Scalar::Text("Q2".into()),
            Scalar::Number(3.0),
            Scalar::Number(2.5),
        ]);
        table.push_row(vec![
            Scalar::Text("Q3".into()),
            Scalar::Empty,
            Scalar::Number(1.0),
        ]);
        table
    }

    #[test]
    fn test_xlsx_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bank.xlsx");

        export(&sample_table(), &path).unwrap();
        let imported = import(&path).unwrap();

        assert_eq!(imported.columns, vec!["题号", "答案", "分值"]);
        assert_eq!(imported.row_count(), 3);
        assert_eq!(imported.cell_by_name(0, "题号"), &Scalar::Text("Q1".into()));
        assert_eq!(imported.cell_by_name(1, "答案"), &Scalar::Number(3.0));
        assert_eq!(imported.cell_by_name(1, "分值"), &Scalar::Number(2.5));
        assert_eq!(imported.cell_by_name(2, "答案"), &Scalar::Empty);
    }

    #[test]
    fn test_numeric_cells_display_without_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nums.xlsx");

        export(&sample_table(), &path).unwrap();
        let imported = import(&path).unwrap();

        // whole-valued floats read back as "3", not "3.0"
        assert_eq!(imported.cell_by_name(1, "答案").to_display(), "3");
    }

    #[test]
    fn test_missing_sheet_named() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.xlsx");
        export(&sample_table(), &path).unwrap();

        let err = import_sheet(&path, Some("NoSuch")).unwrap_err();
        assert!(err.contains("NoSuch"), "error should name the sheet: {err}");
    }
}
