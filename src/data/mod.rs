/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  one sheet → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  header + Vec<Vec<CellValue>>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  substring match on one column → row indices
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
