use std::collections::BTreeSet;

use super::model::Table;

// ---------------------------------------------------------------------------
// Filtered row set: indices into the source table, in row order
// ---------------------------------------------------------------------------

/// Indices of rows that passed a filter.
pub type FilteredRows = Vec<usize>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FilterError {
    #[error("Column '{0}' not found in the sheet.")]
    ColumnNotFound(String),
}

/// Return indices of rows whose `column` contains `term`, ignoring case.
pub fn filter_rows(table: &Table, column: &str, term: &str) -> Result<FilteredRows, FilterError> {
    filter_rows_any(table, column, &[term.trim().to_string()])
}

/// Return indices of rows whose `column` contains any of `terms`, ignoring
/// case. Blank terms never match.
pub fn filter_rows_any(
    table: &Table,
    column: &str,
    terms: &[String],
) -> Result<FilteredRows, FilterError> {
    let col = table
        .column_index(column)
        .ok_or_else(|| FilterError::ColumnNotFound(column.to_string()))?;

    let needles: Vec<String> = terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    Ok(table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            let value = row[col].to_string().to_lowercase();
            needles.iter().any(|n| value.contains(n.as_str()))
        })
        .map(|(i, _)| i)
        .collect())
}

/// Merge two row sets, keeping source-table order and dropping duplicates.
pub fn union(a: &[usize], b: &[usize]) -> FilteredRows {
    a.iter()
        .chain(b)
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// First `limit` distinct non-null values of `column`, in row order.
pub fn unique_values(table: &Table, column: &str, limit: usize) -> Result<Vec<String>, FilterError> {
    let col = table
        .column_index(column)
        .ok_or_else(|| FilterError::ColumnNotFound(column.to_string()))?;

    let mut seen = BTreeSet::new();
    let mut values = Vec::new();
    for row in &table.rows {
        if values.len() >= limit {
            break;
        }
        if row[col].is_null() {
            continue;
        }
        let text = row[col].to_string();
        if seen.insert(text.clone()) {
            values.push(text);
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn table(values: &[&str]) -> Table {
        Table::new(
            vec!["Code".into()],
            values
                .iter()
                .map(|v| vec![CellValue::String((*v).to_string())])
                .collect(),
        )
    }

    #[test]
    fn test_filter_case_insensitive() {
        let t = table(&["ABC123", "xyz", "AABCZ"]);
        assert_eq!(filter_rows(&t, "Code", "abc").unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_filter_empty_result_is_ok() {
        let t = table(&["ABC123", "xyz"]);
        assert!(filter_rows(&t, "Code", "nothing").unwrap().is_empty());
    }

    #[test]
    fn test_filter_missing_column() {
        let t = table(&["ABC123"]);
        let err = filter_rows(&t, "Disease", "abc").unwrap_err();
        assert_eq!(err.to_string(), "Column 'Disease' not found in the sheet.");
    }

    #[test]
    fn test_filter_matches_numbers_by_string_form() {
        let t = Table::new(
            vec!["Ward".into()],
            vec![
                vec![CellValue::Integer(1204)],
                vec![CellValue::Integer(88)],
                vec![CellValue::Null],
            ],
        );
        assert_eq!(filter_rows(&t, "Ward", "20").unwrap(), vec![0]);
    }

    #[test]
    fn test_null_cells_do_not_match_nan() {
        let t = Table::new(
            vec!["Code".into()],
            vec![
                vec![CellValue::Null],
                vec![CellValue::String("Nan Hospital".into())],
                vec![CellValue::Null],
            ],
        );
        assert_eq!(filter_rows(&t, "Code", "nan").unwrap(), vec![1]);
        assert!(unique_values(&t, "Code", 10).unwrap().iter().all(|v| v != "NaN"));
    }

    #[test]
    fn test_filter_any_ignores_blank_terms() {
        let t = table(&["Diabetes", "Hypertension", "Asthma"]);
        let rows = filter_rows_any(&t, "Code", &["".into(), "TENSION".into(), "asth".into()]).unwrap();
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn test_union_keeps_row_order() {
        assert_eq!(union(&[4, 1], &[1, 3]), vec![1, 3, 4]);
    }

    #[test]
    fn test_unique_values_limit_and_order() {
        let t = table(&["b", "a", "b", "c", "d"]);
        assert_eq!(unique_values(&t, "Code", 3).unwrap(), vec!["b", "a", "c"]);
    }
}
