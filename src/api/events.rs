//! Event creation, host and member pages.

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};

use super::{host_path, success, ApiResult};
use crate::errors::AppError;
use crate::ledger;
use crate::models::{CreateEventForm, EventView, HostActionForm};
use crate::AppState;

/// GET / - Event creation form.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.views.index()
}

/// POST /create - Create an event and send the host to its page.
pub async fn create_event(
    State(state): State<AppState>,
    Form(form): Form<CreateEventForm>,
) -> Result<Redirect, AppError> {
    let event = state.store.create_event(form.event_name.trim()).await?;
    Ok(Redirect::to(&host_path(&event.id)))
}

async fn event_view(state: &AppState, event_id: &str, host: bool) -> Result<EventView, AppError> {
    let snapshot = state.store.snapshot(event_id).await?;
    Ok(ledger::build_view(
        &snapshot,
        host,
        state.config.member_url(event_id),
    ))
}

/// GET /host/:id - Grid with date controls.
pub async fn host_view(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let view = event_view(&state, &event_id, true).await?;
    state.views.event(&view)
}

/// POST /host/:id - Add or delete a date column.
pub async fn host_action(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Form(form): Form<HostActionForm>,
) -> Result<Redirect, AppError> {
    if let Some(label) = form.new_date {
        state.store.append_date(&event_id, &label).await?;
    } else if let Some(label) = form.delete_date {
        state.store.remove_date(&event_id, &label).await?;
    } else {
        state.store.get_event(&event_id).await?;
    }
    Ok(Redirect::to(&host_path(&event_id)))
}

/// GET /event/:id - Read-only grid for participants.
pub async fn member_view(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let view = event_view(&state, &event_id, false).await?;
    state.views.event(&view)
}

/// GET /api/events/:id - The computed member view as JSON.
pub async fn event_json(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<EventView> {
    let view = event_view(&state, &event_id, false).await?;
    success(view)
}
