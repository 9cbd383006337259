//! Computed views. Never persisted; rebuilt from storage on every request.

use serde::{Deserialize, Serialize};

use super::Mark;

/// Per-date tally of marks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkCounts {
    pub yes: usize,
    pub maybe: usize,
    pub no: usize,
}

impl MarkCounts {
    pub fn add(&mut self, mark: Mark) {
        match mark {
            Mark::Yes => self.yes += 1,
            Mark::Maybe => self.maybe += 1,
            Mark::No => self.no += 1,
        }
    }
}

/// One entry of the comment feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentEntry {
    pub name: String,
    pub comment: String,
    pub time: String,
}

/// One grid cell: a participant's answer for a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellView {
    pub name: String,
    pub mark: Option<Mark>,
    pub symbol: String,
    pub reason: String,
}

/// One grid row: a date column with its tally and cells in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRow {
    pub label: String,
    pub counts: MarkCounts,
    pub cells: Vec<CellView>,
}

/// Everything the event page shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub event_id: String,
    pub event_name: String,
    pub host: bool,
    pub member_url: String,
    pub names: Vec<String>,
    pub rows: Vec<DateRow>,
    pub comments: Vec<CommentEntry>,
}

/// One date on the edit form, pre-filled from the participant's row.
#[derive(Debug, Clone, Serialize)]
pub struct EditField {
    pub label: String,
    pub mark_field: String,
    pub reason_field: String,
    pub mark: Mark,
    pub reason: String,
}

/// The edit form for one participant.
#[derive(Debug, Clone, Serialize)]
pub struct EditView {
    pub event_id: String,
    pub event_name: String,
    pub name: String,
    pub comment: String,
    pub fields: Vec<EditField>,
}
