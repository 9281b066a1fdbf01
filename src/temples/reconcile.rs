//! Merges a fresh sheet snapshot into the curated temple set.
//!
//! Curated (`focus`) records are hand-authored: the sheet may only refresh
//! their `id`, since ids move between exports while names do not. Everything
//! else in the sheet is only used to discover temples we have never seen.

use std::collections::HashMap;

use serde::Serialize;

use super::normalize::name_key;
use super::sheet::RawRow;
use super::{sort_by_id, TempleRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Curated records whose id was matched (whether or not it changed).
    pub refreshed: usize,
    /// Curated records whose id actually changed.
    pub id_changes: usize,
    pub added: usize,
    /// Non-focus rows whose name is already known.
    pub skipped_existing: usize,
    /// Focus rows with no curated record of that name.
    pub dropped_focus: usize,
    /// Rows with a blank name, appended without dedup.
    pub unkeyed: usize,
    /// Existing records merged away because their name collided.
    pub existing_collisions: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub temples: Vec<TempleRecord>,
    pub report: ReconcileReport,
}

/// Insertion-ordered set of records keyed by canonical name.
/// Blank-named records are stored but never indexed.
#[derive(Default)]
struct TempleIndex {
    records: Vec<TempleRecord>,
    by_name: HashMap<String, usize>,
}

impl TempleIndex {
    fn get_mut(&mut self, key: &str) -> Option<&mut TempleRecord> {
        let slot = *self.by_name.get(key)?;
        self.records.get_mut(slot)
    }

    fn contains(&self, key: &str) -> bool {
        self.by_name.contains_key(key)
    }

    fn push(&mut self, key: Option<String>, record: TempleRecord) {
        if let Some(key) = key {
            self.by_name.insert(key, self.records.len());
        }
        self.records.push(record);
    }

    fn into_sorted(self) -> Vec<TempleRecord> {
        let mut records = self.records;
        sort_by_id(&mut records);
        records
    }
}

/// Builds the index of the existing set. On a name collision a curated record
/// beats an auto-discovered one, otherwise the first one wins.
fn index_existing(existing: Vec<TempleRecord>, report: &mut ReconcileReport) -> TempleIndex {
    let mut index = TempleIndex::default();
    for record in existing {
        let key = name_key(&record.name);
        let Some(key) = key else {
            index.push(None, record);
            continue;
        };
        match index.get_mut(&key) {
            None => index.push(Some(key), record),
            Some(kept) => {
                report.existing_collisions += 1;
                tracing::warn!(
                    name = %record.name,
                    kept_id = ?kept.id,
                    dropped_id = ?record.id,
                    "duplicate temple name in existing set"
                );
                if record.focus && !kept.focus {
                    *kept = record;
                }
            }
        }
    }
    index
}

/// Merges `incoming` sheet rows into `existing`; see [reconcile_with_report].
pub fn reconcile(existing: Vec<TempleRecord>, incoming: &[RawRow]) -> Vec<TempleRecord> {
    reconcile_with_report(existing, incoming).temples
}

/// Merges `incoming` sheet rows into `existing`.
///
/// - focus row, curated match: only the curated `id` is refreshed
/// - focus row, no curated match: dropped
/// - non-focus row, known name: skipped, existing data wins
/// - non-focus row, new name: appended with default size/owner/contest and `focus = false`
///
/// Output has one record per canonical name and is sorted by ascending id.
pub fn reconcile_with_report(existing: Vec<TempleRecord>, incoming: &[RawRow]) -> Reconciled {
    let mut report = ReconcileReport::default();
    let mut index = index_existing(existing, &mut report);

    for row in incoming {
        let name = row.name.as_text();
        let key = name_key(&name);

        if row.focus.is_true() {
            let curated = key
                .as_deref()
                .and_then(|k| index.get_mut(k))
                .filter(|t| t.focus);
            match curated {
                Some(temple) => {
                    let id = row.id.parse_int();
                    if temple.id != id {
                        tracing::debug!(name = %temple.name, old = ?temple.id, new = ?id, "refreshed temple id");
                        report.id_changes += 1;
                    }
                    temple.id = id;
                    report.refreshed += 1;
                }
                None => {
                    tracing::debug!(name = %name, "focus row without curated temple, dropped");
                    report.dropped_focus += 1;
                }
            }
            continue;
        }

        match key {
            Some(k) if index.contains(&k) => report.skipped_existing += 1,
            Some(k) => {
                index.push(Some(k), TempleRecord::discovered(row, false));
                report.added += 1;
            }
            None => {
                index.push(None, TempleRecord::discovered(row, false));
                report.unkeyed += 1;
            }
        }
    }

    Reconciled {
        temples: index.into_sorted(),
        report,
    }
}

/// First-time conversion of a whole sheet: every row becomes a record, with
/// `focus` read from the sheet. Later rows with an already-seen name are dropped.
pub fn build_temples(rows: &[RawRow]) -> Vec<TempleRecord> {
    let mut index = TempleIndex::default();
    for row in rows {
        let record = TempleRecord::discovered(row, row.focus.is_true());
        let key = name_key(&record.name);
        if let Some(k) = key.as_deref() {
            if index.contains(k) {
                tracing::warn!(name = %record.name, id = ?record.id, "duplicate temple name in sheet, keeping first");
                continue;
            }
        }
        index.push(key, record);
    }
    index.into_sorted()
}
