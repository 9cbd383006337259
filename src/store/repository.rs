//! Event store: load and save operations over the flat files.
//!
//! Whole files are replaced on every write. Read-modify-write sequences for one
//! event are serialized through a per-event lock so concurrent submissions are
//! applied one after the other instead of overwriting each other.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::table::{
    decode_lines, decode_registry, decode_responses, encode_lines, encode_registry_row,
    encode_responses,
};
use super::{is_valid_event_id, read_event_file, read_optional, utf8, write_atomic, Layout};
use crate::errors::AppError;
use crate::ledger;
use crate::models::{Event, EventSnapshot, Response, Submission};

/// Length of generated event ids, in hex characters.
const EVENT_ID_LEN: usize = 8;

/// Labels and names are stored one per line in the list files.
fn check_single_line(value: &str, what: &str) -> Result<(), AppError> {
    if value.contains(['\n', '\r']) {
        return Err(AppError::Validation(format!("{} must be a single line", what)));
    }
    Ok(())
}

/// File-backed store for events, date columns, responses and display order.
pub struct EventStore {
    layout: Layout,
    registry_lock: Mutex<()>,
    event_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EventStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub async fn open(data_dir: &Path) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(data_dir).await?;
        Ok(Self {
            layout: Layout::new(data_dir),
            registry_lock: Mutex::new(()),
            event_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Lock for one event's read-modify-write. Entries nobody holds are
    /// pruned here so the map only tracks events with work in flight.
    async fn event_lock(&self, event_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.event_locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(event_id.to_string()).or_default().clone()
    }

    // ==================== EVENTS ====================

    async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        match read_optional(&self.layout.registry()).await? {
            Some(bytes) => decode_registry(&bytes),
            None => Ok(Vec::new()),
        }
    }

    /// Create an event with an empty date list and a header-only response table.
    pub async fn create_event(&self, name: &str) -> Result<Event, AppError> {
        let _guard = self.registry_lock.lock().await;

        let taken: HashSet<String> = self.list_events().await?.into_iter().map(|e| e.id).collect();
        let id = loop {
            let candidate = uuid::Uuid::new_v4().simple().to_string()[..EVENT_ID_LEN].to_string();
            if !taken.contains(&candidate)
                && !tokio::fs::try_exists(self.layout.dates(&candidate)).await?
            {
                break candidate;
            }
            tracing::debug!("Event id {} already taken, regenerating", candidate);
        };

        let event = Event {
            id,
            name: name.to_string(),
        };

        write_atomic(&self.layout.responses(&event.id), &encode_responses(&[], &[])?).await?;
        write_atomic(&self.layout.dates(&event.id), b"").await?;

        let mut registry = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.layout.registry())
            .await?;
        registry.write_all(&encode_registry_row(&event)?).await?;
        registry.flush().await?;

        tracing::info!("Created event {} ({:?})", event.id, event.name);
        Ok(event)
    }

    /// Registry lookup.
    pub async fn get_event_name(&self, event_id: &str) -> Result<Option<String>, AppError> {
        if !is_valid_event_id(event_id) {
            return Ok(None);
        }
        Ok(self
            .list_events()
            .await?
            .into_iter()
            .find(|e| e.id == event_id)
            .map(|e| e.name))
    }

    /// An event exists when it is registered and its date list and response
    /// table are both on disk.
    pub async fn get_event(&self, event_id: &str) -> Result<Event, AppError> {
        let name = self
            .get_event_name(event_id)
            .await?
            .ok_or_else(AppError::event_not_found)?;

        if !tokio::fs::try_exists(self.layout.dates(event_id)).await?
            || !tokio::fs::try_exists(self.layout.responses(event_id)).await?
        {
            return Err(AppError::event_not_found());
        }

        Ok(Event {
            id: event_id.to_string(),
            name,
        })
    }

    /// Load every piece of state a view needs.
    pub async fn snapshot(&self, event_id: &str) -> Result<EventSnapshot, AppError> {
        let event = self.get_event(event_id).await?;
        let dates = self.load_dates(event_id).await?;
        let responses = self.read_responses(event_id, &dates).await?;
        let order = self.load_order(event_id).await?;

        Ok(EventSnapshot {
            event,
            dates,
            responses,
            order,
        })
    }

    // ==================== DATE COLUMNS ====================

    pub async fn load_dates(&self, event_id: &str) -> Result<Vec<String>, AppError> {
        if !is_valid_event_id(event_id) {
            return Err(AppError::event_not_found());
        }
        let path = self.layout.dates(event_id);
        let text = utf8(read_event_file(&path).await?, &path)?;
        Ok(decode_lines(&text))
    }

    async fn save_dates(&self, event_id: &str, dates: &[String]) -> Result<(), AppError> {
        write_atomic(&self.layout.dates(event_id), encode_lines(dates).as_bytes()).await
    }

    /// Append a date column. Returns `false` when the trimmed label is blank
    /// or already present.
    pub async fn append_date(&self, event_id: &str, label: &str) -> Result<bool, AppError> {
        let label = label.trim();
        check_single_line(label, "Date label")?;

        self.get_event(event_id).await?;
        let lock = self.event_lock(event_id).await;
        let _guard = lock.lock().await;

        let mut dates = self.load_dates(event_id).await?;

        if label.is_empty() {
            tracing::debug!("Ignoring blank date label for event {}", event_id);
            return Ok(false);
        }
        if dates.iter().any(|d| d == label) {
            tracing::debug!("Date {:?} already exists in event {}", label, event_id);
            return Ok(false);
        }

        dates.push(label.to_string());
        self.save_dates(event_id, &dates).await?;

        tracing::info!("Added date {:?} to event {}", label, event_id);
        Ok(true)
    }

    /// Remove a date column and strip it from every stored response.
    /// Returns `false` when the label was not present.
    pub async fn remove_date(&self, event_id: &str, label: &str) -> Result<bool, AppError> {
        self.get_event(event_id).await?;
        let lock = self.event_lock(event_id).await;
        let _guard = lock.lock().await;

        let dates = self.load_dates(event_id).await?;
        if !dates.iter().any(|d| d == label) {
            tracing::debug!("Date {:?} not found in event {}", label, event_id);
            return Ok(false);
        }

        let responses = self.read_responses(event_id, &dates).await?;
        let responses = ledger::remove_date_cascade(responses, label);
        let remaining: Vec<String> = dates.into_iter().filter(|d| d != label).collect();

        self.save_responses(event_id, &responses, &remaining).await?;
        self.save_dates(event_id, &remaining).await?;

        tracing::info!("Removed date {:?} from event {}", label, event_id);
        Ok(true)
    }

    // ==================== RESPONSES ====================

    pub async fn load_responses(&self, event_id: &str) -> Result<Vec<Response>, AppError> {
        let dates = self.load_dates(event_id).await?;
        self.read_responses(event_id, &dates).await
    }

    async fn read_responses(
        &self,
        event_id: &str,
        dates: &[String],
    ) -> Result<Vec<Response>, AppError> {
        if !is_valid_event_id(event_id) {
            return Err(AppError::event_not_found());
        }
        let bytes = read_event_file(&self.layout.responses(event_id)).await?;
        decode_responses(&bytes, dates)
    }

    /// Rewrite the whole response table with a header derived from `dates`.
    pub async fn save_responses(
        &self,
        event_id: &str,
        responses: &[Response],
        dates: &[String],
    ) -> Result<(), AppError> {
        if !is_valid_event_id(event_id) {
            return Err(AppError::event_not_found());
        }
        let bytes = encode_responses(responses, dates)?;
        write_atomic(&self.layout.responses(event_id), &bytes).await
    }

    /// Load, upsert and save one participant's submission.
    pub async fn submit_response(
        &self,
        event_id: &str,
        submission: Submission,
        now: &str,
    ) -> Result<Response, AppError> {
        check_single_line(&submission.name, "Participant name")?;
        if let Some(replaces) = &submission.replaces {
            check_single_line(replaces, "Participant name")?;
        }

        self.get_event(event_id).await?;
        let lock = self.event_lock(event_id).await;
        let _guard = lock.lock().await;

        let dates = self.load_dates(event_id).await?;
        let responses = self.read_responses(event_id, &dates).await?;

        let name = submission.name.clone();
        let responses = ledger::upsert_response(responses, &dates, submission, now);
        self.save_responses(event_id, &responses, &dates).await?;

        tracing::info!("Saved response from {:?} for event {}", name, event_id);
        responses
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| AppError::Internal(format!("Response {:?} vanished after save", name)))
    }

    // ==================== ORDER OVERRIDE ====================

    pub async fn load_order(&self, event_id: &str) -> Result<Option<Vec<String>>, AppError> {
        if !is_valid_event_id(event_id) {
            return Err(AppError::event_not_found());
        }
        let path = self.layout.order(event_id);
        match read_optional(&path).await? {
            Some(bytes) => Ok(Some(decode_lines(&utf8(bytes, &path)?))),
            None => Ok(None),
        }
    }

    /// Replace the display order wholesale.
    pub async fn save_order(&self, event_id: &str, names: &[String]) -> Result<(), AppError> {
        for name in names {
            check_single_line(name, "Ordered name")?;
        }

        self.get_event(event_id).await?;
        let lock = self.event_lock(event_id).await;
        let _guard = lock.lock().await;

        write_atomic(&self.layout.order(event_id), encode_lines(names).as_bytes()).await?;

        tracing::info!("Saved order of {} names for event {}", names.len(), event_id);
        Ok(())
    }
}
