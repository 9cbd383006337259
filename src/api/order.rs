//! Participant display order.

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};

use super::host_path;
use crate::errors::{AppError, JsonError};
use crate::ledger;
use crate::models::{RedirectResponse, ReorderRequest};
use crate::AppState;

/// GET /host/:id/sort - Drag-and-drop page starting from the current order.
pub async fn sort_page(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let snapshot = state.store.snapshot(&event_id).await?;
    let names = ledger::compute_ordered_names(&snapshot.responses, snapshot.order.as_deref());
    state
        .views
        .sort(&snapshot.event.id, &snapshot.event.name, &names)
}

/// POST /host/:id/reorder - Replace the saved order.
pub async fn save_order(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<RedirectResponse>, JsonError> {
    state.store.save_order(&event_id, &request.order).await?;
    Ok(Json(RedirectResponse {
        redirect: host_path(&event_id),
    }))
}
