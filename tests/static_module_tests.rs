//! Sheet ingest through to the static temples module and back.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use std::collections::HashSet;

use calamine::Reader;
use rust_xlsxwriter::Workbook;

use grepomap::config::SheetConfig;
use grepomap::temples::{
    build_temples, curated_names, load_static_module, mark_focus, read_sheet,
    render_static_module, write_static_module, Bonus, SheetCell, SheetError,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("grepomap-{name}-{stamp}.{ext}"))
}

fn csv_sheet(header_rows: usize) -> SheetConfig {
    SheetConfig {
        path: fixture_path("temples.csv"),
        header_rows,
        ..SheetConfig::default()
    }
}

#[test]
fn csv_sheet_skips_header_and_blank_rows() {
    let sheet = csv_sheet(1);
    let rows = read_sheet(&sheet.path, &sheet).expect("read fixture");
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].name.as_text(), "Zeus");
    assert_eq!(rows[0].bonus.as_text(), "+10atk");
    assert_eq!(rows[0].kind.as_text(), "war ");
    assert!(rows[1].focus.is_true());
}

#[test]
fn header_is_only_skipped_when_configured() {
    let sheet = csv_sheet(0);
    let rows = read_sheet(&sheet.path, &sheet).expect("read fixture");
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].name.as_text(), "Nom");
    assert_eq!(rows[0].id.parse_int(), None);
}

#[test]
fn build_sorts_dedups_and_keeps_sheet_focus() {
    let sheet = csv_sheet(1);
    let rows = read_sheet(&sheet.path, &sheet).expect("read fixture");
    let temples = build_temples(&rows);

    let names: Vec<&str> = temples.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Poséidon", "Zeus", "Héra", "Athéna"]);
    assert!(temples[2].focus);
    assert_eq!(temples[1].kind, "war");
    assert_eq!(temples[3].x, None);
    assert_eq!(temples[3].bonus, Bonus::Text("+3".to_string()));
    assert!(temples.iter().all(|t| t.size == "small" && t.owner == 0 && t.contest == "none"));
}

#[test]
fn written_module_loads_back_identically() {
    let sheet = csv_sheet(1);
    let rows = read_sheet(&sheet.path, &sheet).expect("read fixture");
    let temples = build_temples(&rows);

    let path = unique_temp_path("static", "js");
    write_static_module(&path, &temples).expect("write module");
    let raw = fs::read_to_string(&path).expect("read module");
    assert!(raw.starts_with("// auto-generated by grepomap"));
    assert!(raw.contains("    x: NaN,"));
    assert!(raw.trim_end().ends_with("module.exports = { staticTemples };"));

    let loaded = load_static_module(&path).expect("load module");
    assert_eq!(loaded, temples);
    assert_eq!(render_static_module(&loaded), raw);

    let _ = fs::remove_file(path);
}

#[test]
fn missing_module_is_an_empty_first_run() {
    let path = unique_temp_path("absent", "js");
    assert!(load_static_module(&path).expect("missing is ok").is_empty());
}

#[test]
fn malformed_module_is_an_error() {
    let path = unique_temp_path("broken", "js");
    fs::write(&path, "const staticTemples = [ { id: 1, name: 'x' ").expect("fixture");
    assert!(load_static_module(&path).is_err());
    let _ = fs::remove_file(path);
}

#[test]
fn mark_focus_sets_column_k_for_curated_names() {
    let path = unique_temp_path("mark", "csv");
    fs::write(
        &path,
        "ID,X,Y,Nom,Ile,Effet,Type,Mer,Joueur,Alliance,Focus\n\
         1,1,1,Zeus,1,a,war,1,,,false\n\
         2,1,1,Hera,1,b,def\n\
         3,1,1,Ares,1,c,war,1,,,false\n",
    )
    .expect("fixture");

    let sheet = csv_sheet(1);
    let built = build_temples(&read_sheet(&fixture_path("temples.csv"), &sheet).expect("fixture"));
    let curated = curated_names(&built);
    let marked = mark_focus(&path, &curated, &sheet).expect("mark");
    assert_eq!(marked, 1);

    let rewritten = fs::read_to_string(&path).expect("read back");
    let lines: Vec<&str> = rewritten.lines().collect();
    assert_eq!(lines[0], "ID,X,Y,Nom,Ile,Effet,Type,Mer,Joueur,Alliance,Focus");
    assert_eq!(lines[1], "1,1,1,Zeus,1,a,war,1,,,false");
    assert_eq!(lines[2], "2,1,1,Hera,1,b,def,,,,TRUE");
    assert_eq!(lines[3], "3,1,1,Ares,1,c,war,1,,,false");

    let _ = fs::remove_file(path);
}

/// A scrape-shaped workbook: a leading "Notes" sheet, then "Feuil1" whose used
/// range starts at B3 (two blank rows, column A never written).
fn write_temple_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let notes = workbook.add_worksheet();
    notes.set_name("Notes").expect("sheet name");
    notes.write_string(0, 0, "scraped by hand").expect("note");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Feuil1").expect("sheet name");
    let header = ["X", "Y", "Nom", "Ile", "Effet", "Type", "Mer", "Joueur", "Alliance", "Focus"];
    for (i, title) in header.iter().enumerate() {
        sheet.write_string(2, 1 + i as u16, *title).expect("header");
    }

    sheet.write_number(3, 1, 500.0).expect("x");
    sheet.write_number(3, 2, 501.0).expect("y");
    sheet.write_string(3, 3, "Zeus").expect("name");
    sheet.write_number(3, 5, 15.0).expect("bonus");
    sheet.write_string(3, 6, "war").expect("type");
    sheet.write_boolean(3, 10, true).expect("focus");

    sheet.write_number(4, 1, 510.0).expect("x");
    sheet.write_number(4, 2, 511.0).expect("y");
    sheet.write_string(4, 3, "Héra").expect("name");
    sheet.write_string(4, 5, "+5def").expect("bonus");
    sheet.write_string(4, 6, "def").expect("type");
    sheet.write_boolean(4, 10, false).expect("focus");

    sheet.write_number(5, 1, 520.0).expect("x");
    sheet.write_number(5, 2, 521.0).expect("y");
    sheet.write_string(5, 3, "Athéna").expect("name");
    sheet.write_string(5, 5, "+3").expect("bonus");
    sheet.write_string(5, 6, "wis").expect("type");

    workbook.save(path).expect("save workbook");
}

fn workbook_sheet(path: &Path) -> SheetConfig {
    SheetConfig {
        path: path.to_path_buf(),
        ..SheetConfig::default()
    }
}

#[test]
fn workbook_columns_are_absolute_and_header_counts_from_first_used_row() {
    let path = unique_temp_path("workbook", "xlsx");
    write_temple_workbook(&path);
    let sheet = workbook_sheet(&path);

    let rows = read_sheet(&path, &sheet).expect("read workbook");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].id, SheetCell::Empty);
    assert_eq!(rows[0].x, SheetCell::Number(500.0));
    assert_eq!(rows[0].name.as_text(), "Zeus");
    assert_eq!(rows[0].focus, SheetCell::Bool(true));
    assert_eq!(rows[2].name.as_text(), "Athéna");

    let temples = build_temples(&rows);
    let zeus = temples.iter().find(|t| t.name == "Zeus").expect("zeus");
    assert_eq!(zeus.id, None);
    assert_eq!(zeus.x, Some(500));
    assert_eq!(zeus.bonus, Bonus::Integer(15));
    assert!(zeus.focus);
    assert!(!temples.iter().find(|t| t.name == "Héra").expect("hera").focus);

    let _ = fs::remove_file(path);
}

#[test]
fn missing_worksheet_lists_available_sheets() {
    let path = unique_temp_path("workbook-missing", "xlsx");
    write_temple_workbook(&path);
    let sheet = SheetConfig {
        name: "Temples".to_string(),
        ..workbook_sheet(&path)
    };

    match read_sheet(&path, &sheet) {
        Err(SheetError::MissingSheet { name, available }) => {
            assert_eq!(name, "Temples");
            assert_eq!(available, vec!["Notes".to_string(), "Feuil1".to_string()]);
        }
        other => panic!("expected missing sheet, got {other:?}"),
    }

    let _ = fs::remove_file(path);
}

#[test]
fn mark_focus_rewrites_workbook_in_place() {
    let path = unique_temp_path("workbook-mark", "xlsx");
    write_temple_workbook(&path);
    let sheet = workbook_sheet(&path);

    let curated: HashSet<String> = ["athena".to_string()].into_iter().collect();
    let marked = mark_focus(&path, &curated, &sheet).expect("mark workbook");
    assert_eq!(marked, 1);

    let rows = read_sheet(&path, &sheet).expect("read back");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].focus, SheetCell::Bool(true));
    assert_eq!(rows[0].bonus, SheetCell::Number(15.0));
    assert_eq!(rows[1].focus, SheetCell::Bool(false));
    assert_eq!(rows[2].name.as_text(), "Athéna");
    assert_eq!(rows[2].focus, SheetCell::Bool(true));

    let mut workbook = calamine::open_workbook_auto(&path).expect("reopen");
    assert_eq!(workbook.sheet_names(), vec!["Notes".to_string(), "Feuil1".to_string()]);
    let notes = workbook.worksheet_range("Notes").expect("notes sheet");
    assert_eq!(
        notes.get_value((0, 0)),
        Some(&calamine::Data::String("scraped by hand".to_string()))
    );

    let _ = fs::remove_file(path);
}
