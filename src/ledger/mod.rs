//! Availability ledger.
//!
//! Pure rules over a loaded snapshot: upserting a participant, dropping a date
//! column, and deriving the ordered grid, per-date tallies and comment feed.
//! Nothing here touches storage.

use std::collections::{HashMap, HashSet};

use chrono::Local;

use crate::models::{
    CellView, CommentEntry, DateRow, EventSnapshot, EventView, Mark, MarkCounts, Response,
    Submission,
};

/// Format of `commentTime`. Lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// marksByDateByName: date label -> participant name -> mark.
pub type MarkTable = HashMap<String, HashMap<String, Mark>>;

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Insert or replace a participant's row.
///
/// The row whose name equals the submitted name is replaced in place. Failing
/// that, the row named by `submission.replaces` is replaced (a rename). Otherwise
/// the row is appended. Every current date gets a mark (default `no`) and a
/// reason (default empty), and `comment_time` is always set to `now`.
pub fn upsert_response(
    mut responses: Vec<Response>,
    dates: &[String],
    submission: Submission,
    now: &str,
) -> Vec<Response> {
    let Submission {
        name,
        comment,
        mut marks,
        mut reasons,
        replaces,
    } = submission;

    let position = responses
        .iter()
        .position(|r| r.name == name)
        .or_else(|| {
            replaces
                .as_deref()
                .and_then(|old| responses.iter().position(|r| r.name == old))
        });

    let row = Response {
        name,
        comment,
        comment_time: now.to_string(),
        marks: dates
            .iter()
            .map(|d| (d.clone(), marks.remove(d).unwrap_or_default()))
            .collect(),
        reasons: dates
            .iter()
            .map(|d| (d.clone(), reasons.remove(d).unwrap_or_default()))
            .collect(),
    };

    match position {
        Some(index) => responses[index] = row,
        None => responses.push(row),
    }
    responses
}

/// Strip a date column's mark and reason from every response.
pub fn remove_date_cascade(mut responses: Vec<Response>, removed_label: &str) -> Vec<Response> {
    for response in &mut responses {
        response.marks.remove(removed_label);
        response.reasons.remove(removed_label);
    }
    responses
}

/// Participant names in display order.
///
/// Names listed in the override come first, in override order; everyone else
/// follows in storage order. Override entries naming nobody are skipped.
pub fn compute_ordered_names(responses: &[Response], order: Option<&[String]>) -> Vec<String> {
    let names: Vec<&str> = responses.iter().map(|r| r.name.as_str()).collect();
    let Some(order) = order else {
        return names.into_iter().map(str::to_string).collect();
    };

    let present: HashSet<&str> = names.iter().copied().collect();
    let mut placed: HashSet<&str> = HashSet::new();
    let mut ordered = Vec::with_capacity(names.len());

    for name in order {
        if present.contains(name.as_str()) && placed.insert(name.as_str()) {
            ordered.push(name.clone());
        }
    }
    for name in names {
        if placed.insert(name) {
            ordered.push(name.to_string());
        }
    }
    ordered
}

/// Build marksByDateByName for the given date columns.
pub fn mark_table(responses: &[Response], dates: &[String]) -> MarkTable {
    dates
        .iter()
        .map(|date| {
            let by_name = responses
                .iter()
                .filter_map(|r| r.mark(date).map(|m| (r.name.clone(), m)))
                .collect();
            (date.clone(), by_name)
        })
        .collect()
}

/// Per-date tallies over the listed participants. Cells without a mark are
/// not counted.
pub fn compute_counts(
    dates: &[String],
    names: &[String],
    marks: &MarkTable,
) -> HashMap<String, MarkCounts> {
    dates
        .iter()
        .map(|date| {
            let mut counts = MarkCounts::default();
            if let Some(by_name) = marks.get(date) {
                for name in names {
                    if let Some(mark) = by_name.get(name) {
                        counts.add(*mark);
                    }
                }
            }
            (date.clone(), counts)
        })
        .collect()
}

/// (date, name) -> reason, empty when none was given.
pub fn reason_lookup(responses: &[Response], dates: &[String]) -> HashMap<(String, String), String> {
    let mut lookup = HashMap::new();
    for response in responses {
        for date in dates {
            lookup.insert(
                (date.clone(), response.name.clone()),
                response.reason(date).to_string(),
            );
        }
    }
    lookup
}

/// Responses with a non-blank comment, newest first.
pub fn compute_comment_feed(responses: &[Response]) -> Vec<CommentEntry> {
    let mut feed: Vec<CommentEntry> = responses
        .iter()
        .filter(|r| !r.comment.trim().is_empty())
        .map(|r| CommentEntry {
            name: r.name.clone(),
            comment: r.comment.clone(),
            time: r.comment_time.clone(),
        })
        .collect();
    feed.sort_by(|a, b| b.time.cmp(&a.time));
    feed
}

/// Assemble the page view for a snapshot.
pub fn build_view(snapshot: &EventSnapshot, host: bool, member_url: String) -> EventView {
    let names = compute_ordered_names(&snapshot.responses, snapshot.order.as_deref());
    let marks = mark_table(&snapshot.responses, &snapshot.dates);
    let counts = compute_counts(&snapshot.dates, &names, &marks);
    let reasons = reason_lookup(&snapshot.responses, &snapshot.dates);

    let rows = snapshot
        .dates
        .iter()
        .map(|date| {
            let by_name = marks.get(date);
            let cells = names
                .iter()
                .map(|name| {
                    let mark = by_name.and_then(|m| m.get(name)).copied();
                    CellView {
                        name: name.clone(),
                        mark,
                        symbol: mark.map(|m| m.symbol().to_string()).unwrap_or_default(),
                        reason: reasons
                            .get(&(date.clone(), name.clone()))
                            .cloned()
                            .unwrap_or_default(),
                    }
                })
                .collect();
            DateRow {
                label: date.clone(),
                counts: counts.get(date).copied().unwrap_or_default(),
                cells,
            }
        })
        .collect();

    EventView {
        event_id: snapshot.event.id.clone(),
        event_name: snapshot.event.name.clone(),
        host,
        member_url,
        names,
        rows,
        comments: compute_comment_feed(&snapshot.responses),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Event;

    fn dates(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn response(name: &str, comment: &str, time: &str, marks: &[(&str, Mark)]) -> Response {
        Response {
            name: name.to_string(),
            comment: comment.to_string(),
            comment_time: time.to_string(),
            marks: marks.iter().map(|(d, m)| (d.to_string(), *m)).collect(),
            reasons: marks.iter().map(|(d, _)| (d.to_string(), String::new())).collect(),
        }
    }

    fn submission(name: &str, marks: &[(&str, Mark)], reasons: &[(&str, &str)]) -> Submission {
        Submission {
            name: name.to_string(),
            comment: String::new(),
            marks: marks.iter().map(|(d, m)| (d.to_string(), *m)).collect(),
            reasons: reasons
                .iter()
                .map(|(d, r)| (d.to_string(), r.to_string()))
                .collect(),
            replaces: None,
        }
    }

    #[test]
    fn test_upsert_appends_new_participant_with_defaults() {
        let dates = dates(&["Day1", "Day2"]);
        let sub = submission("Alice", &[("Day1", Mark::Yes)], &[]);

        let out = upsert_response(Vec::new(), &dates, sub, "2024-05-01 10:00:00");

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].mark("Day1"), Some(Mark::Yes));
        assert_eq!(out[0].mark("Day2"), Some(Mark::No));
        assert_eq!(out[0].reason("Day2"), "");
        assert_eq!(out[0].comment_time, "2024-05-01 10:00:00");
    }

    #[test]
    fn test_upsert_is_idempotent_per_name() {
        let dates = dates(&["Day1"]);
        let first = upsert_response(
            Vec::new(),
            &dates,
            submission("Alice", &[("Day1", Mark::Maybe)], &[("Day1", "late")]),
            "2024-05-01 10:00:00",
        );
        let second = upsert_response(
            first,
            &dates,
            submission("Alice", &[("Day1", Mark::Maybe)], &[("Day1", "late")]),
            "2024-05-01 11:00:00",
        );

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].mark("Day1"), Some(Mark::Maybe));
        assert_eq!(second[0].reason("Day1"), "late");
        assert_eq!(second[0].comment_time, "2024-05-01 11:00:00");
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let dates = dates(&["Day1"]);
        let existing = vec![
            response("Alice", "", "t", &[("Day1", Mark::Yes)]),
            response("Bob", "", "t", &[("Day1", Mark::Yes)]),
            response("Carol", "", "t", &[("Day1", Mark::Yes)]),
        ];

        let out = upsert_response(
            existing,
            &dates,
            submission("Bob", &[("Day1", Mark::No)], &[]),
            "now",
        );

        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(out[1].mark("Day1"), Some(Mark::No));
    }

    #[test]
    fn test_upsert_renames_the_edited_row() {
        let dates = dates(&["Day1"]);
        let existing = vec![
            response("Alice", "", "t", &[("Day1", Mark::Yes)]),
            response("Bobby", "", "t", &[("Day1", Mark::Yes)]),
        ];
        let mut sub = submission("Bob", &[("Day1", Mark::Maybe)], &[]);
        sub.replaces = Some("Bobby".to_string());

        let out = upsert_response(existing, &dates, sub, "now");

        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_upsert_prefers_exact_name_over_rename_target() {
        let dates = dates(&["Day1"]);
        let existing = vec![
            response("Alice", "", "t", &[("Day1", Mark::Yes)]),
            response("Bob", "", "t", &[("Day1", Mark::Yes)]),
        ];
        let mut sub = submission("Bob", &[("Day1", Mark::No)], &[]);
        sub.replaces = Some("Alice".to_string());

        let out = upsert_response(existing, &dates, sub, "now");

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "Alice");
        assert_eq!(out[0].mark("Day1"), Some(Mark::Yes));
        assert_eq!(out[1].mark("Day1"), Some(Mark::No));
    }

    #[test]
    fn test_upsert_accepts_blank_name_literally() {
        let out = upsert_response(Vec::new(), &[], submission("", &[], &[]), "now");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "");
    }

    #[test]
    fn test_upsert_drops_marks_for_unknown_dates() {
        let dates = dates(&["Day1"]);
        let sub = submission("Alice", &[("Gone", Mark::Yes)], &[("Gone", "x")]);

        let out = upsert_response(Vec::new(), &dates, sub, "now");

        assert_eq!(out[0].marks.len(), 1);
        assert!(out[0].mark("Gone").is_none());
        assert!(out[0].reasons.get("Gone").is_none());
    }

    #[test]
    fn test_remove_date_cascade_leaves_other_fields() {
        let mut alice = response(
            "Alice",
            "hi",
            "t1",
            &[("Day1", Mark::Yes), ("Day2", Mark::Maybe)],
        );
        alice.reasons.insert("Day2".to_string(), "busy morning".to_string());
        let bob = response("Bob", "", "t2", &[("Day2", Mark::No)]);

        let out = remove_date_cascade(vec![alice.clone(), bob.clone()], "Day1");

        assert_eq!(out.len(), 2);
        assert!(out[0].mark("Day1").is_none());
        assert!(out[0].reasons.get("Day1").is_none());
        assert_eq!(out[0].mark("Day2"), Some(Mark::Maybe));
        assert_eq!(out[0].reason("Day2"), "busy morning");
        assert_eq!(out[0].comment, "hi");
        assert_eq!(out[0].comment_time, "t1");
        assert_eq!(out[1], bob);
    }

    #[test]
    fn test_ordered_names_override_then_rest() {
        let responses = vec![
            response("A", "", "", &[]),
            response("B", "", "", &[]),
            response("C", "", "", &[]),
        ];
        let order = vec!["C".to_string(), "A".to_string()];

        assert_eq!(
            compute_ordered_names(&responses, Some(&order)),
            vec!["C", "A", "B"]
        );
    }

    #[test]
    fn test_ordered_names_skips_unknown_and_duplicate_entries() {
        let responses = vec![response("A", "", "", &[]), response("B", "", "", &[])];
        let order = vec![
            "Ghost".to_string(),
            "B".to_string(),
            "B".to_string(),
            "A".to_string(),
        ];

        assert_eq!(
            compute_ordered_names(&responses, Some(&order)),
            vec!["B", "A"]
        );
        assert_eq!(compute_ordered_names(&responses, None), vec!["A", "B"]);
    }

    #[test]
    fn test_counts_for_date_without_responses_are_zero() {
        let dates = dates(&["Day1"]);
        let counts = compute_counts(&dates, &[], &MarkTable::new());
        assert_eq!(counts["Day1"], MarkCounts::default());
    }

    #[test]
    fn test_counts_skip_unset_cells() {
        let dates = dates(&["Day1", "Day2"]);
        let responses = vec![
            response("Alice", "", "", &[("Day1", Mark::Yes), ("Day2", Mark::Maybe)]),
            response("Bob", "", "", &[("Day1", Mark::Yes)]),
            response("Carol", "", "", &[("Day1", Mark::No), ("Day2", Mark::No)]),
        ];
        let names = compute_ordered_names(&responses, None);
        let table = mark_table(&responses, &dates);

        let counts = compute_counts(&dates, &names, &table);

        assert_eq!(counts["Day1"], MarkCounts { yes: 2, maybe: 0, no: 1 });
        assert_eq!(counts["Day2"], MarkCounts { yes: 0, maybe: 1, no: 1 });
    }

    #[test]
    fn test_comment_feed_filters_blank_and_sorts_newest_first() {
        let responses = vec![
            response("Alice", "hi", "2024-05-01 09:00:00", &[]),
            response("Bob", "", "2024-05-01 10:00:00", &[]),
            response("Carol", "   ", "2024-05-01 11:00:00", &[]),
            response("Dave", "later", "2024-05-02 08:00:00", &[]),
        ];

        let feed = compute_comment_feed(&responses);

        let names: Vec<&str> = feed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Dave", "Alice"]);
        assert_eq!(feed[1].comment, "hi");
        assert_eq!(feed[1].time, "2024-05-01 09:00:00");
    }

    #[test]
    fn test_build_view_rows_follow_display_order() {
        let mut alice = response("Alice", "", "", &[("Day1", Mark::Maybe)]);
        alice.reasons.insert("Day1".to_string(), "after 3pm".to_string());
        let snapshot = EventSnapshot {
            event: Event {
                id: "deadbeef".to_string(),
                name: "Trip".to_string(),
            },
            dates: dates(&["Day1"]),
            responses: vec![alice, response("Bob", "", "", &[])],
            order: Some(vec!["Bob".to_string()]),
        };

        let view = build_view(&snapshot, true, "http://x/event/deadbeef".to_string());

        assert_eq!(view.names, vec!["Bob", "Alice"]);
        let row = &view.rows[0];
        assert_eq!(row.counts, MarkCounts { yes: 0, maybe: 1, no: 0 });
        assert_eq!(row.cells[0].name, "Bob");
        assert!(row.cells[0].mark.is_none());
        assert_eq!(row.cells[0].symbol, "");
        assert_eq!(row.cells[1].symbol, "△");
        assert_eq!(row.cells[1].reason, "after 3pm");
    }

    #[test]
    fn test_timestamp_format_is_sortable() {
        let now = timestamp_now();
        assert_eq!(now.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&now, TIMESTAMP_FORMAT).is_ok());
    }
}
