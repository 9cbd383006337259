//! Codecs for the flat files: the response table CSV, the registry CSV and
//! the one-entry-per-line lists.

use std::collections::HashMap;

use crate::errors::AppError;
use crate::models::{Event, Mark, Response};

pub const NAME_COLUMN: &str = "name";
pub const COMMENT_COLUMN: &str = "comment";
pub const COMMENT_TIME_COLUMN: &str = "commentTime";
const REASON_SUFFIX: &str = "_reason";

fn reason_column(date: &str) -> String {
    format!("{}{}", date, REASON_SUFFIX)
}

/// Header for the given date columns.
pub fn table_header(dates: &[String]) -> Vec<String> {
    let mut header = vec![
        NAME_COLUMN.to_string(),
        COMMENT_COLUMN.to_string(),
        COMMENT_TIME_COLUMN.to_string(),
    ];
    for date in dates {
        header.push(date.clone());
        header.push(reason_column(date));
    }
    header
}

/// Serialize the whole response table. Only the listed dates are written; a
/// response with no mark for one of them gets an empty cell.
pub fn encode_responses(responses: &[Response], dates: &[String]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table_header(dates))?;

    for response in responses {
        let mut record = vec![
            response.name.as_str(),
            response.comment.as_str(),
            response.comment_time.as_str(),
        ];
        for date in dates {
            record.push(response.mark(date).map(|m| m.as_str()).unwrap_or(""));
            record.push(response.reason(date));
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV buffer: {}", e)))
}

/// Parse a response table against the current date list.
///
/// The header must start with the three fixed columns, followed by
/// `<date>, <date>_reason` pairs. Columns are matched by position so a label
/// equal to a fixed column or to another label's reason column cannot be
/// mistaken for it. Pairs for labels no longer in `dates` are dropped, and
/// dates missing from the header stay unset. Short rows and empty or unknown
/// marks leave the mark unset.
pub fn decode_responses(bytes: &[u8], dates: &[String]) -> Result<Vec<Response>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let header = reader.headers()?.clone();
    let fixed = [NAME_COLUMN, COMMENT_COLUMN, COMMENT_TIME_COLUMN];
    if header.len() < fixed.len() || header.iter().zip(fixed).any(|(h, f)| h != f) {
        return Err(AppError::DataCorruption(format!(
            "Response table header must start with {:?}",
            fixed
        )));
    }

    let pairs: Vec<&str> = header.iter().skip(fixed.len()).collect();
    if pairs.len() % 2 != 0 {
        return Err(AppError::DataCorruption(
            "Response table has an unpaired date column".to_string(),
        ));
    }

    // (label, mark column index) for every stored pair that is still a date.
    let mut columns: Vec<(&str, usize)> = Vec::new();
    for (n, pair) in pairs.chunks(2).enumerate() {
        let (label, reason) = (pair[0], pair[1]);
        if reason != reason_column(label) {
            return Err(AppError::DataCorruption(format!(
                "Column {:?} does not follow date {:?}",
                reason, label
            )));
        }
        if columns.iter().any(|(seen, _)| *seen == label) {
            return Err(AppError::DataCorruption(format!(
                "Date {:?} appears twice in the response table",
                label
            )));
        }
        if dates.iter().any(|d| d == label) {
            columns.push((label, fixed.len() + 2 * n));
        } else {
            tracing::warn!("Dropping stored column for unknown date {:?}", label);
        }
    }

    let mut responses = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let mut marks = HashMap::new();
        let mut reasons = HashMap::new();
        for (date, mark_idx) in &columns {
            let raw = field(*mark_idx);
            match Mark::from_str(raw) {
                Some(mark) => {
                    marks.insert(date.to_string(), mark);
                }
                None if !raw.is_empty() => {
                    tracing::warn!("Ignoring unknown mark {:?} for date {:?}", raw, date);
                }
                None => {}
            }
            reasons.insert(date.to_string(), field(mark_idx + 1).to_string());
        }

        responses.push(Response {
            name: field(0).to_string(),
            comment: field(1).to_string(),
            comment_time: field(2).to_string(),
            marks,
            reasons,
        });
    }

    Ok(responses)
}

/// Serialize one registry row, terminated by a newline.
pub fn encode_registry_row(event: &Event) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record([event.id.as_str(), event.name.as_str()])?;
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV buffer: {}", e)))
}

/// Parse the registry.
pub fn decode_registry(bytes: &[u8]) -> Result<Vec<Event>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut events = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let id = record.get(0).unwrap_or("").trim();
        if id.is_empty() {
            return Err(AppError::DataCorruption(format!(
                "Registry row {} has no event id",
                line + 1
            )));
        }
        events.push(Event {
            id: id.to_string(),
            name: record.get(1).unwrap_or("").to_string(),
        });
    }
    Ok(events)
}

/// Parse a one-entry-per-line list, trimming entries and skipping blanks.
pub fn decode_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Serialize a one-entry-per-line list.
pub fn encode_lines(entries: &[String]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    out
}
