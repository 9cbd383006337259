//! Participant edit form.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};

use super::member_path;
use crate::errors::AppError;
use crate::ledger;
use crate::models::{mark_field, reason_field, EditField, EditView, Submission};
use crate::AppState;

/// GET /edit/:id/:name - Form pre-filled from the named participant's row.
pub async fn edit_form(
    State(state): State<AppState>,
    Path((event_id, name)): Path<(String, String)>,
) -> Result<Html<String>, AppError> {
    render_edit(&state, &event_id, name).await
}

/// GET /edit/:id/ - Same form for the row whose name is blank.
pub async fn edit_blank_form(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Html<String>, AppError> {
    render_edit(&state, &event_id, String::new()).await
}

async fn render_edit(
    state: &AppState,
    event_id: &str,
    name: String,
) -> Result<Html<String>, AppError> {
    let snapshot = state.store.snapshot(event_id).await?;
    let existing = snapshot.responses.iter().find(|r| r.name == name);

    let fields = snapshot
        .dates
        .iter()
        .map(|date| EditField {
            label: date.clone(),
            mark_field: mark_field(date),
            reason_field: reason_field(date),
            mark: existing.and_then(|r| r.mark(date)).unwrap_or_default(),
            reason: existing.map(|r| r.reason(date).to_string()).unwrap_or_default(),
        })
        .collect();

    let view = EditView {
        event_id: snapshot.event.id.clone(),
        event_name: snapshot.event.name.clone(),
        name: existing.map(|r| r.name.clone()).unwrap_or(name),
        comment: existing.map(|r| r.comment.clone()).unwrap_or_default(),
        fields,
    };
    state.views.edit(&view)
}

/// POST /edit/:id/:name - Upsert the submitted row and show the member page.
pub async fn submit_edit(
    State(state): State<AppState>,
    Path((event_id, name)): Path<(String, String)>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    save_edit(&state, &event_id, &name, &form).await
}

/// POST /edit/:id/ - Upsert for the row whose name is blank.
pub async fn submit_blank_edit(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    save_edit(&state, &event_id, "", &form).await
}

async fn save_edit(
    state: &AppState,
    event_id: &str,
    name: &str,
    form: &HashMap<String, String>,
) -> Result<Redirect, AppError> {
    let submission = Submission::from_form(form, name);

    state
        .store
        .submit_response(event_id, submission, &ledger::timestamp_now())
        .await?;

    Ok(Redirect::to(&member_path(event_id)))
}
