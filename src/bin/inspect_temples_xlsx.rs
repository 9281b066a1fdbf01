//! Inspect a temples workbook: print sheet names, the first rows of the temple
//! sheet by column letter, and how the first data rows map onto temple fields.
//! Usage: cargo run --bin inspect_temples_xlsx -- path/to/temples.xlsx [sheet]

use std::path::Path;

use calamine::Reader;
use grepomap::config::{SheetConfig, DEFAULT_SHEET_NAME};
use grepomap::temples::{read_sheet, SheetCell};

const PREVIEW_ROWS: usize = 15;

fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("Usage: inspect_temples_xlsx <path-to.xlsx> [sheet]")?;
    let path = Path::new(&path);
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let mut wb = calamine::open_workbook_auto(path)?;
    let names = wb.sheet_names();
    println!("Sheets ({}): {}", names.len(), names.join(", "));

    let wanted = std::env::args()
        .nth(2)
        .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
    let sheet_name = names
        .iter()
        .find(|s| **s == wanted)
        .or(names.first())
        .ok_or("No sheets")?
        .clone();
    println!("\nUsing sheet: {}", sheet_name);

    let range = wb.worksheet_range(&sheet_name)?;
    let (height, width) = range.get_size();
    let first_col = range.start().map(|(_, c)| c as usize).unwrap_or(0);
    println!("Size: {} rows x {} cols\nFirst {} rows:", height, width, PREVIEW_ROWS);

    for (i, row) in range.rows().take(PREVIEW_ROWS).enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(j, c)| format!("{}={}", column_letter(first_col + j), SheetCell::from(c).as_text()))
            .collect();
        println!("  {}: {}", i, cells.join(" | "));
    }

    let sheet = SheetConfig {
        path: path.to_path_buf(),
        name: sheet_name,
        ..SheetConfig::default()
    };
    let rows = read_sheet(path, &sheet)?;
    println!("\nMapped {} data row(s); first {}:", rows.len(), PREVIEW_ROWS.min(rows.len()));
    for row in rows.iter().take(PREVIEW_ROWS) {
        println!(
            "  id={} x={} y={} name={:?} type={:?} bonus={:?} focus={}",
            row.id.as_text(),
            row.x.as_text(),
            row.y.as_text(),
            row.name.as_text(),
            row.kind.as_text().trim(),
            row.bonus.as_text(),
            row.focus.is_true()
        );
    }
    Ok(())
}
