//! Keyed list reconciliation.
//!
//! Turns a full snapshot into in-place updates, removals and appends against
//! the rows currently on screen:
//!
//! 1. index the snapshot by id
//! 2. walk the existing rows in order: a row whose id is in the index is
//!    updated and its entry consumed; any other row is removed
//! 3. append rows for the unconsumed entries, in snapshot order
//!
//! Survivors keep their relative order and new rows go after them, so the
//! table never reshuffles under the viewer. Runs in O(rows + snapshot).
//!
//! When a snapshot repeats an id, the row sits where the first occurrence is
//! and shows the fields of the last one.

use std::collections::HashMap;

use neckview_core::model::SessionRecord;

/// A rendered row that can be matched to a session by id.
pub trait KeyedRow {
    /// Whatever rows need from their owner to be built or refreshed.
    type Context;

    fn key(&self) -> &str;

    fn create(record: &SessionRecord, ctx: &mut Self::Context) -> Self;

    /// Overwrites the row with `record`. Returns whether anything visible changed.
    fn update(&mut self, record: &SessionRecord, ctx: &mut Self::Context) -> bool;
}

/// One operation performed by [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOp {
    Update { key: String, changed: bool },
    Remove { key: String },
    Append { key: String },
}

/// The operations performed by one [`reconcile`] call, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub ops: Vec<RowOp>,
}

impl ReconcileReport {
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            RowOp::Remove { key } => Some(key.as_str()),
            _ => None,
        })
    }

    pub fn appended(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            RowOp::Append { key } => Some(key.as_str()),
            _ => None,
        })
    }

    /// True when nothing was added, removed or visibly changed.
    pub fn is_unchanged(&self) -> bool {
        self.ops
            .iter()
            .all(|op| matches!(op, RowOp::Update { changed: false, .. }))
    }
}

/// Brings `rows` in line with `snapshot`.
pub fn reconcile<R: KeyedRow>(
    rows: &mut Vec<R>,
    snapshot: &[SessionRecord],
    ctx: &mut R::Context,
) -> ReconcileReport {
    // Later duplicates overwrite the index; the first occurrence fixes the
    // append position below.
    let mut pending: HashMap<&str, usize> = HashMap::with_capacity(snapshot.len());
    for (idx, record) in snapshot.iter().enumerate() {
        pending.insert(record.id.as_str(), idx);
    }

    let mut ops = Vec::with_capacity(rows.len() + snapshot.len());
    rows.retain_mut(|row| match pending.remove(row.key()) {
        Some(idx) => {
            let changed = row.update(&snapshot[idx], ctx);
            ops.push(RowOp::Update {
                key: row.key().to_string(),
                changed,
            });
            true
        }
        None => {
            ops.push(RowOp::Remove {
                key: row.key().to_string(),
            });
            false
        }
    });

    for record in snapshot {
        if let Some(idx) = pending.remove(record.id.as_str()) {
            let row = R::create(&snapshot[idx], ctx);
            ops.push(RowOp::Append {
                key: row.key().to_string(),
            });
            rows.push(row);
        }
    }

    ReconcileReport { ops }
}
