use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};

use super::model::{CellValue, Table};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Sheet '{sheet}' not found. Available sheets: {}", available.join(", "))]
    SheetNotFound { sheet: String, available: Vec<String> },

    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

enum SourceKind {
    Workbook,
    Csv,
}

fn source_kind(path: &Path) -> Result<SourceKind, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceKind::Workbook),
        "csv" => Ok(SourceKind::Csv),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Sheet names in workbook order. A CSV file has a single implicit sheet
/// named after its file stem.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, LoadError> {
    match source_kind(path)? {
        SourceKind::Workbook => {
            let workbook = open_workbook_auto(path)?;
            Ok(workbook.sheet_names().to_vec())
        }
        SourceKind::Csv => Ok(vec![path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("csv")
            .to_string()]),
    }
}

/// Load one sheet of a spreadsheet into a [`Table`]. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first row is the header
/// * `.csv` – header row plus records; `sheet` is ignored
pub fn load_table(path: &Path, sheet: &str) -> Result<Table, LoadError> {
    match source_kind(path)? {
        SourceKind::Workbook => load_sheet(path, sheet),
        SourceKind::Csv => load_csv(path),
    }
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_sheet(path: &Path, sheet: &str) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let available = workbook.sheet_names().to_vec();
    if !available.iter().any(|s| s == sheet) {
        return Err(LoadError::SheetNotFound {
            sheet: sheet.to_string(),
            available,
        });
    }

    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range.rows();

    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let columns: Vec<String> = header.iter().map(|c| cell_value(c).to_string()).collect();

    let body: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_value).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| !c.is_null()))
        .collect();

    Ok(Table::new(columns, body))
}

/// Convert a calamine cell into a [`CellValue`].
pub(crate) fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => {
            // Whole numbers come back as floats from xlsx.
            if f.fract() == 0.0 && f.abs() < 1e15 {
                CellValue::Integer(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) if dt.time() == chrono::NaiveTime::MIN => {
                CellValue::Date(dt.format("%Y-%m-%d").to_string())
            }
            Some(dt) => CellValue::Date(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Null,
        },
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(Table::new(columns, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.trim().is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn write_workbook(path: &Path) {
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet().set_name("Admissions").unwrap();
        ws.write_string(0, 0, "PatientID").unwrap();
        ws.write_string(0, 1, "DiseaseName").unwrap();
        ws.write_string(0, 2, "Age").unwrap();
        ws.write_number(1, 0, 1001.0).unwrap();
        ws.write_string(1, 1, "Type 2 Diabetes").unwrap();
        ws.write_number(1, 2, 61.5).unwrap();
        ws.write_number(2, 0, 1002.0).unwrap();
        ws.write_string(2, 1, "Asthma").unwrap();
        workbook.add_worksheet().set_name("Notes").unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_sheet_names_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.xlsx");
        write_workbook(&path);
        assert_eq!(sheet_names(&path).unwrap(), vec!["Admissions", "Notes"]);
    }

    #[test]
    fn test_load_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.xlsx");
        write_workbook(&path);

        let table = load_table(&path, "Admissions").unwrap();
        assert_eq!(table.columns, vec!["PatientID", "DiseaseName", "Age"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], CellValue::Integer(1001));
        assert_eq!(table.rows[0][2], CellValue::Float(61.5));
        assert_eq!(table.rows[1][1], CellValue::String("Asthma".into()));
        assert!(table.rows[1][2].is_null());
    }

    #[test]
    fn test_missing_sheet_lists_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.xlsx");
        write_workbook(&path);

        let err = load_table(&path, "Sheet1").unwrap_err();
        assert!(matches!(err, LoadError::SheetNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "Sheet 'Sheet1' not found. Available sheets: Admissions, Notes"
        );
    }

    #[test]
    fn test_load_csv_ignores_sheet_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.csv");
        std::fs::write(&path, "PatientID,DiseaseName,Stable\n7,Asthma,true\n8,,false\n").unwrap();

        let table = load_table(&path, "whatever").unwrap();
        assert_eq!(table.columns, vec!["PatientID", "DiseaseName", "Stable"]);
        assert_eq!(table.rows[0][0], CellValue::Integer(7));
        assert_eq!(table.rows[0][2], CellValue::Bool(true));
        assert!(table.rows[1][1].is_null());
        assert_eq!(sheet_names(&path).unwrap(), vec!["ward"]);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_table(Path::new("guidelines.pdf"), "Sheet1").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file extension: .pdf");
    }
}
