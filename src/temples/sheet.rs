//! Spreadsheet ingest: positional columns out of a workbook (calamine) or a CSV export.

use std::fmt;
use std::path::Path;

use calamine::Reader;

use crate::config::SheetConfig;
use crate::literal::js_number;

use super::Bonus;

/// One cell, reduced to the shapes the temple sheet actually holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SheetCell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl SheetCell {
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell as text, the way JS `String(value)` renders it.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => js_number(*n),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Integer value, or `None` for blank, non-numeric or fractional cells.
    pub fn parse_int(&self) -> Option<i64> {
        match self {
            Self::Number(n) => float_to_int(*n),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_int))
            }
            Self::Empty | Self::Bool(_) => None,
        }
    }

    /// `true` only for a boolean TRUE cell or text equal to "true" in any case.
    pub fn is_true(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn to_bonus(&self) -> Bonus {
        match self {
            Self::Number(n) => match float_to_int(*n) {
                Some(i) => Bonus::Integer(i),
                None => Bonus::Decimal(*n),
            },
            other => Bonus::Text(other.as_text()),
        }
    }
}

fn float_to_int(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Some(n as i64)
    } else {
        None
    }
}

impl From<&calamine::Data> for SheetCell {
    fn from(d: &calamine::Data) -> Self {
        match d {
            calamine::Data::Empty => Self::Empty,
            calamine::Data::String(s) => Self::text(s),
            calamine::Data::Float(f) => Self::Number(*f),
            calamine::Data::Int(i) => Self::Number(*i as f64),
            calamine::Data::Bool(b) => Self::Bool(*b),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Zero-based column positions of the temple sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub id: usize,
    pub x: usize,
    pub y: usize,
    pub name: usize,
    pub bonus: usize,
    pub kind: usize,
    pub focus: usize,
}

impl Default for ColumnLayout {
    /// A=id, B=x, C=y, D=name, F=bonus, G=type, K=focus.
    fn default() -> Self {
        Self {
            id: 0,
            x: 1,
            y: 2,
            name: 3,
            bonus: 5,
            kind: 6,
            focus: 10,
        }
    }
}

/// One data row of the temple sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    pub id: SheetCell,
    pub x: SheetCell,
    pub y: SheetCell,
    pub name: SheetCell,
    pub kind: SheetCell,
    pub bonus: SheetCell,
    pub focus: SheetCell,
}

impl RawRow {
    fn from_cells(layout: &ColumnLayout, mut cell: impl FnMut(usize) -> SheetCell) -> Self {
        Self {
            id: cell(layout.id),
            x: cell(layout.x),
            y: cell(layout.y),
            name: cell(layout.name),
            kind: cell(layout.kind),
            bonus: cell(layout.bonus),
            focus: cell(layout.focus),
        }
    }

    fn is_blank(&self) -> bool {
        [
            &self.id,
            &self.x,
            &self.y,
            &self.name,
            &self.kind,
            &self.bonus,
            &self.focus,
        ]
        .iter()
        .all(|c| c.is_blank())
    }
}

#[derive(Debug)]
pub enum SheetError {
    Csv(csv::Error),
    Workbook(calamine::Error),
    MissingSheet { name: String, available: Vec<String> },
    Io(std::io::Error),
    Xlsx(rust_xlsxwriter::XlsxError),
    Unsupported(String),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "failed to read CSV sheet: {err}"),
            Self::Workbook(err) => write!(f, "failed to read workbook: {err}"),
            Self::MissingSheet { name, available } => write!(
                f,
                "sheet '{name}' not found (available: {})",
                available.join(", ")
            ),
            Self::Io(err) => write!(f, "failed to write sheet: {err}"),
            Self::Xlsx(err) => write!(f, "failed to write workbook: {err}"),
            Self::Unsupported(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for SheetError {}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

pub(super) fn is_csv(path: &Path) -> bool {
    has_extension(path, "csv")
}

pub(super) fn is_xlsx(path: &Path) -> bool {
    has_extension(path, "xlsx")
}

/// Reads the temple rows of a sheet, skipping `header_rows` and fully blank rows.
pub fn read_sheet(path: &Path, sheet: &SheetConfig) -> Result<Vec<RawRow>, SheetError> {
    let layout = ColumnLayout::default();
    let rows = if is_csv(path) {
        read_csv_rows(path, sheet.header_rows, &layout)?
    } else {
        read_workbook_rows(path, sheet, &layout)?
    };
    tracing::debug!(path = %path.display(), rows = rows.len(), "read temple sheet");
    Ok(rows)
}

fn read_csv_rows(
    path: &Path,
    header_rows: usize,
    layout: &ColumnLayout,
) -> Result<Vec<RawRow>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(SheetError::Csv)?;

    let mut rows = Vec::new();
    for result in reader.records().skip(header_rows) {
        let record = result.map_err(SheetError::Csv)?;
        let row = RawRow::from_cells(layout, |col| {
            record.get(col).map(SheetCell::text).unwrap_or_default()
        });
        if !row.is_blank() {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn read_workbook_rows(
    path: &Path,
    sheet: &SheetConfig,
    layout: &ColumnLayout,
) -> Result<Vec<RawRow>, SheetError> {
    let mut wb = calamine::open_workbook_auto(path).map_err(SheetError::Workbook)?;
    let names = wb.sheet_names();
    if !names.iter().any(|n| n == &sheet.name) {
        return Err(SheetError::MissingSheet {
            name: sheet.name.clone(),
            available: names,
        });
    }
    let range = wb
        .worksheet_range(&sheet.name)
        .map_err(SheetError::Workbook)?;

    let (Some((first_row, _)), Some((last_row, _))) = (range.start(), range.end()) else {
        return Ok(Vec::new());
    };

    // Columns are absolute (A is A even when A is empty); rows count from the first used row.
    let mut rows = Vec::new();
    let data_start = first_row.saturating_add(sheet.header_rows as u32);
    for r in data_start..=last_row {
        let row = RawRow::from_cells(layout, |col| {
            range
                .get_value((r, col as u32))
                .map(SheetCell::from)
                .unwrap_or_default()
        });
        if !row.is_blank() {
            rows.push(row);
        }
    }
    Ok(rows)
}
