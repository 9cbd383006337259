//! HTTP handlers.
//!
//! HTML pages for hosts and participants plus a small JSON surface for the
//! reorder action and the computed event view.

mod events;
mod order;
mod responses;

pub use events::*;
pub use order::*;
pub use responses::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::JsonError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Path of the host page for an event.
pub fn host_path(event_id: &str) -> String {
    format!("/host/{}", event_id)
}

/// Path of the read-only member page for an event.
pub fn member_path(event_id: &str) -> String {
    format!("/event/{}", event_id)
}
