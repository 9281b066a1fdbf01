//! Writes the curated flag back into the temple sheet, so the next scrape
//! carries `Focus = TRUE` for every hand-curated temple.

use std::collections::HashSet;
use std::path::Path;

use calamine::{Data, Reader};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::config::SheetConfig;

use super::normalize::name_key;
use super::sheet::{is_csv, is_xlsx, ColumnLayout, SheetCell, SheetError};
use super::TempleRecord;

/// Canonical names of every curated temple.
pub fn curated_names(temples: &[TempleRecord]) -> HashSet<String> {
    temples
        .iter()
        .filter(|t| t.focus)
        .filter_map(|t| name_key(&t.name))
        .collect()
}

/// Sets the focus column (K) to TRUE on every data row naming a curated
/// temple, rewriting the sheet in place. CSV exports and `.xlsx` workbooks are
/// supported; returns how many rows were marked.
pub fn mark_focus(
    path: &Path,
    curated: &HashSet<String>,
    sheet: &SheetConfig,
) -> Result<usize, SheetError> {
    let marked = if is_csv(path) {
        mark_focus_csv(path, curated, sheet)?
    } else if is_xlsx(path) {
        mark_focus_xlsx(path, curated, sheet)?
    } else {
        return Err(SheetError::Unsupported(format!(
            "{} is neither a CSV export nor an .xlsx workbook",
            path.display()
        )));
    };
    tracing::info!(path = %path.display(), marked, "marked curated temples in sheet");
    Ok(marked)
}

fn mark_focus_csv(
    path: &Path,
    curated: &HashSet<String>,
    sheet: &SheetConfig,
) -> Result<usize, SheetError> {
    let layout = ColumnLayout::default();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(SheetError::Csv)?;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(SheetError::Csv)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let mut marked = 0usize;
    for row in rows.iter_mut().skip(sheet.header_rows) {
        let Some(key) = row.get(layout.name).and_then(|name| name_key(name)) else {
            continue;
        };
        if !curated.contains(&key) {
            continue;
        }
        if row.len() <= layout.focus {
            row.resize(layout.focus + 1, String::new());
        }
        row[layout.focus] = "TRUE".to_string();
        marked += 1;
    }

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(SheetError::Csv)?;
    for row in &rows {
        writer.write_record(row).map_err(SheetError::Csv)?;
    }
    writer.flush().map_err(SheetError::Io)?;
    Ok(marked)
}

/// Reads every sheet with calamine and writes the workbook back with
/// rust_xlsxwriter. Cell values and sheet order survive; styling and formulas
/// (only their cached values are readable) do not.
fn mark_focus_xlsx(
    path: &Path,
    curated: &HashSet<String>,
    sheet: &SheetConfig,
) -> Result<usize, SheetError> {
    let layout = ColumnLayout::default();

    let mut source = calamine::open_workbook_auto(path).map_err(SheetError::Workbook)?;
    let names = source.sheet_names();
    if !names.iter().any(|n| n == &sheet.name) {
        return Err(SheetError::MissingSheet {
            name: sheet.name.clone(),
            available: names,
        });
    }
    let mut ranges = Vec::with_capacity(names.len());
    for name in names {
        let range = source.worksheet_range(&name).map_err(SheetError::Workbook)?;
        ranges.push((name, range));
    }
    drop(source);

    let mut out = Workbook::new();
    let mut marked = 0usize;
    for (name, range) in &ranges {
        let worksheet = out.add_worksheet();
        worksheet.set_name(name.as_str()).map_err(SheetError::Xlsx)?;
        let (Some((first_row, first_col)), Some((last_row, _))) = (range.start(), range.end())
        else {
            continue;
        };

        for (r, cells) in range.rows().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                write_cell(worksheet, first_row + r as u32, first_col + c as u32, cell)?;
            }
        }

        if name != &sheet.name {
            continue;
        }
        for r in first_row.saturating_add(sheet.header_rows as u32)..=last_row {
            let key = range
                .get_value((r, layout.name as u32))
                .and_then(|cell| name_key(&SheetCell::from(cell).as_text()));
            if key.is_some_and(|k| curated.contains(&k)) {
                worksheet
                    .write_boolean(r, layout.focus as u16, true)
                    .map_err(SheetError::Xlsx)?;
                marked += 1;
            }
        }
    }
    out.save(path).map_err(SheetError::Xlsx)?;
    Ok(marked)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u32,
    cell: &Data,
) -> Result<(), SheetError> {
    let col = u16::try_from(col)
        .map_err(|_| SheetError::Unsupported(format!("column {col} is past the xlsx limit")))?;
    let written = match cell {
        Data::Empty => return Ok(()),
        Data::String(s) => worksheet.write_string(row, col, s.as_str()),
        Data::Float(f) => worksheet.write_number(row, col, *f),
        Data::Int(i) => worksheet.write_number(row, col, *i as f64),
        Data::Bool(b) => worksheet.write_boolean(row, col, *b),
        Data::DateTime(dt) => worksheet.write_number(row, col, dt.as_f64()),
        other => worksheet.write_string(row, col, other.to_string()),
    };
    written.map_err(SheetError::Xlsx)?;
    Ok(())
}
