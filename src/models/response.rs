//! Participant responses and availability marks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Availability for one participant on one date.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Yes,
    Maybe,
    #[default]
    No,
}

impl Mark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Yes => "yes",
            Mark::Maybe => "maybe",
            Mark::No => "no",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(Mark::Yes),
            "maybe" => Some(Mark::Maybe),
            "no" => Some(Mark::No),
            _ => None,
        }
    }

    /// Symbol shown in the grid.
    pub fn symbol(&self) -> &'static str {
        match self {
            Mark::Yes => "◯",
            Mark::Maybe => "△",
            Mark::No => "×",
        }
    }
}

/// One participant's row in the response table.
///
/// `marks` only holds dates the participant actually answered; a date column
/// added after their last save has no entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub name: String,
    pub comment: String,
    pub comment_time: String,
    pub marks: HashMap<String, Mark>,
    pub reasons: HashMap<String, String>,
}

impl Response {
    pub fn mark(&self, date: &str) -> Option<Mark> {
        self.marks.get(date).copied()
    }

    pub fn reason(&self, date: &str) -> &str {
        self.reasons.get(date).map(String::as_str).unwrap_or("")
    }
}

/// A participant's submission from the edit form.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub name: String,
    pub comment: String,
    pub marks: HashMap<String, Mark>,
    pub reasons: HashMap<String, String>,
    /// Name the edit form was opened for; lets a participant rename their row.
    pub replaces: Option<String>,
}

const MARK_PREFIX: &str = "mark:";
const REASON_PREFIX: &str = "reason:";

/// Form field carrying the mark for a date.
pub fn mark_field(date: &str) -> String {
    format!("{}{}", MARK_PREFIX, date)
}

/// Form field carrying the reason for a date.
pub fn reason_field(date: &str) -> String {
    format!("{}{}", REASON_PREFIX, date)
}

impl Submission {
    /// Build a submission from the raw edit form.
    ///
    /// Unknown mark values are dropped here and end up as `no` once the
    /// submission is applied to the current date columns.
    pub fn from_form(form: &HashMap<String, String>, replaces: &str) -> Self {
        let mut marks = HashMap::new();
        let mut reasons = HashMap::new();
        for (key, value) in form {
            if let Some(date) = key.strip_prefix(MARK_PREFIX) {
                if let Some(mark) = Mark::from_str(value.trim()) {
                    marks.insert(date.to_string(), mark);
                }
            } else if let Some(date) = key.strip_prefix(REASON_PREFIX) {
                reasons.insert(date.to_string(), value.clone());
            }
        }

        Self {
            name: form.get("name").map(|n| n.trim().to_string()).unwrap_or_default(),
            comment: form.get("comment").cloned().unwrap_or_default(),
            marks,
            reasons,
            replaces: Some(replaces.to_string()),
        }
    }
}
