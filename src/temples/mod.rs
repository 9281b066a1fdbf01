//! Temple landmarks: the record model, spreadsheet ingest, reconciliation
//! against the curated set, and the static module the map loads.

mod focus;
mod normalize;
mod reconcile;
mod sheet;
mod static_module;

use serde::{Deserialize, Serialize};

pub use focus::{curated_names, mark_focus};
pub use normalize::{canonical_name, name_key};
pub use reconcile::{build_temples, reconcile, reconcile_with_report, ReconcileReport, Reconciled};
pub use sheet::{read_sheet, ColumnLayout, RawRow, SheetCell, SheetError};
pub use static_module::{
    load_static_module, parse_static_module, render_static_module, write_static_module,
    ModuleError, STATIC_MODULE_BANNER, STATIC_TEMPLES_IDENT,
};

pub const DEFAULT_SIZE: &str = "small";
pub const DEFAULT_OWNER: i64 = 0;
pub const DEFAULT_CONTEST: &str = "none";

/// Effect descriptor, passed through from the sheet as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bonus {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl Default for Bonus {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// One temple on the world map.
///
/// `id`, `x` and `y` are `None` when the source cell did not hold a number;
/// the static module writes that as `NaN`, JSON as `null`. Keys hand-added to a
/// curated entry land in `extra` and are written back after the known fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempleRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub x: Option<i64>,
    #[serde(default)]
    pub y: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub bonus: Bonus,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default)]
    pub owner: i64,
    #[serde(default = "default_contest")]
    pub contest: String,
    #[serde(default)]
    pub focus: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_size() -> String {
    DEFAULT_SIZE.to_string()
}

fn default_contest() -> String {
    DEFAULT_CONTEST.to_string()
}

impl TempleRecord {
    /// A record built from sheet data alone: user-tunable fields get their defaults.
    pub fn discovered(row: &RawRow, focus: bool) -> Self {
        Self {
            id: row.id.parse_int(),
            x: row.x.parse_int(),
            y: row.y.parse_int(),
            name: row.name.as_text(),
            kind: row.kind.as_text().trim().to_string(),
            bonus: row.bonus.to_bonus(),
            size: default_size(),
            owner: DEFAULT_OWNER,
            contest: default_contest(),
            focus,
            extra: serde_json::Map::new(),
        }
    }
}

/// Stable sort by ascending id; records without a numeric id go last.
pub fn sort_by_id(temples: &mut [TempleRecord]) {
    temples.sort_by_key(|t| (t.id.is_none(), t.id));
}
