//! Event model and the requests that create or rearrange one.

use serde::{Deserialize, Serialize};

use super::Response;

/// One scheduling poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub name: String,
}

/// Everything persisted for one event, loaded in one go.
#[derive(Debug, Clone)]
pub struct EventSnapshot {
    pub event: Event,
    pub dates: Vec<String>,
    pub responses: Vec<Response>,
    pub order: Option<Vec<String>>,
}

/// Form body for creating a new event.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventForm {
    #[serde(default)]
    pub event_name: String,
}

/// Form body posted from the host view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostActionForm {
    #[serde(default)]
    pub new_date: Option<String>,
    #[serde(default)]
    pub delete_date: Option<String>,
}

/// JSON body for saving the participant order.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub order: Vec<String>,
}

/// JSON reply telling the sort page where to go next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectResponse {
    pub redirect: String,
}
