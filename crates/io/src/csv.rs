// CSV/TSV table import/export

use std::io::Read;
use std::path::Path;

use markgrid_engine::{Scalar, Table};

pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t')
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count.
        // Higher field count breaks ties in favor of more columns.
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    // First record carries the column names
    let columns: Vec<String> = match records.next() {
        Some(header) => header
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Err("empty input: no header row".to_string()),
    };

    let mut table = Table::new(columns);
    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        let row: Vec<Scalar> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Scalar::Empty
                } else {
                    Scalar::Text(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b',')
}

pub fn export_tsv(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b'\t')
}

fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), String> {
    // Trailing empties are omitted, so rows can have different field counts
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    writer
        .write_record(&table.columns)
        .map_err(|e| e.to_string())?;

    for row in 0..table.row_count() {
        let mut record: Vec<String> = Vec::new();
        let mut last_non_empty = 0;

        for col in 0..table.columns.len() {
            let value = table.cell(row, col).to_display();
            if !value.is_empty() {
                last_non_empty = col + 1;
            }
            record.push(value);
        }

        // Only write rows that have data
        if last_non_empty > 0 {
            record.truncate(last_non_empty);
            writer.write_record(&record).map_err(|e| e.to_string())?;
        }
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\nBob,25,London\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        // Semicolon delimiter but commas appear inside quoted fields
        let content = "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_first_record_becomes_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.csv");
        fs::write(&path, "题号,答案,分值\nQ1,A,5\nQ2,,5\n").unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.columns, vec!["题号", "答案", "分值"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell_by_name(0, "题号"), &Scalar::Text("Q1".into()));
        assert_eq!(table.cell_by_name(1, "答案"), &Scalar::Empty);
    }

    #[test]
    fn test_semicolon_csv_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.csv");
        fs::write(&path, "Name;Age;City\nAlice;30;Paris\nBob;25;London\n").unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.columns, vec!["Name", "Age", "City"]);
        assert_eq!(table.cell(0, 0), &Scalar::Text("Alice".into()));
        assert_eq!(table.cell(1, 2), &Scalar::Text("London".into()));
    }

    #[test]
    fn test_ragged_rows_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "name,Q1,Q2\nAlice,A\nBob,A,B,extra\n").unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.cell_by_name(0, "Q2"), &Scalar::Empty);
        assert_eq!(table.cell_by_name(1, "Q2"), &Scalar::Text("B".into()));
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Café" with 0xE9 (Windows-1252 é), invalid as UTF-8
        fs::write(&path, [b"name,Q1\nCaf".as_ref(), &[0xE9], b",A\n"].concat()).unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.cell(0, 0), &Scalar::Text("Café".into()));
    }

    #[test]
    fn test_tsv_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.tsv");

        let mut table = Table::new(vec!["Name".into(), "Score".into()]);
        table.push_row(vec![Scalar::Text("Alice".into()), Scalar::Number(42.0)]);
        table.push_row(vec![Scalar::Text("Bob".into()), Scalar::Number(17.5)]);

        export_tsv(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains('\t'), "TSV should contain tab characters");

        let imported = import_tsv(&path).unwrap();
        assert_eq!(imported.columns, vec!["Name", "Score"]);
        assert_eq!(imported.cell(0, 1), &Scalar::Text("42".into()));
        assert_eq!(imported.cell(1, 1), &Scalar::Text("17.5".into()));
    }

    #[test]
    fn test_export_skips_blank_rows_and_trailing_empties() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::new(vec!["a".into(), "b".into(), "c".into()]);
        table.push_row(vec![Scalar::Text("x".into()), Scalar::Empty, Scalar::Empty]);
        table.push_row(vec![Scalar::Empty, Scalar::Empty, Scalar::Empty]);

        export(&table, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["a,b,c", "x"]);
    }
}
