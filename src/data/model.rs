use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what a dataframe would hold.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date or date-time, already rendered as ISO text.
    Date(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) | CellValue::Date(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text used when rendering the row table for the model.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Null => "NaN".to_string(),
            other => other.to_string(),
        }
    }

}

fn align(values: &[String], widths: &[usize]) -> String {
    values
        .iter()
        .zip(widths)
        .map(|(v, &w)| format!("{v:>w$}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Table – one loaded sheet
// ---------------------------------------------------------------------------

/// A loaded sheet: header row plus data rows, all rows as wide as the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table from a header and raw rows, padding or truncating rows
    /// to the header width. Blank headers get dataframe-style placeholders.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let columns: Vec<String> = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let c = c.trim().to_string();
                if c.is_empty() {
                    format!("Unnamed: {i}")
                } else {
                    c
                }
            })
            .collect();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Render the selected rows as a right-aligned text table without an
    /// index column, the layout the model sees.
    pub fn render_rows(&self, indices: &[usize]) -> String {
        let cells: Vec<Vec<String>> = indices
            .iter()
            .map(|&i| self.rows[i].iter().map(CellValue::display_text).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(c, name)| {
                cells
                    .iter()
                    .map(|r| r[c].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(cells.len() + 1);
        lines.push(align(&self.columns, &widths));
        for row in &cells {
            lines.push(align(row, &widths));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["Name".into(), "Age".into()],
            vec![
                vec![CellValue::String("Ann".into()), CellValue::Integer(42)],
                vec![CellValue::String("Bartholomew".into()), CellValue::Null],
            ],
        )
    }

    #[test]
    fn test_new_pads_rows_and_names_blank_headers() {
        let table = Table::new(
            vec!["A".into(), " ".into(), "C".into()],
            vec![vec![CellValue::Integer(1)]],
        );
        assert_eq!(table.columns, vec!["A", "Unnamed: 1", "C"]);
        assert_eq!(table.rows[0].len(), 3);
        assert!(table.rows[0][2].is_null());
    }

    #[test]
    fn test_render_rows_aligns_columns() {
        let text = sample().render_rows(&[0, 1]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "       Name Age");
        assert_eq!(lines[1], "        Ann  42");
        assert_eq!(lines[2], "Bartholomew NaN");
    }

    #[test]
    fn test_render_rows_subset_only() {
        let text = sample().render_rows(&[1]);
        assert!(!text.contains("Ann\n"));
        assert!(text.contains("Bartholomew"));
    }

    #[test]
    fn test_display_bool_and_null() {
        assert_eq!(CellValue::Bool(true).to_string(), "True");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Float(1.5).to_string(), "1.5");
    }
}
