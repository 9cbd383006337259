//! Data models for the poll server.
//!
//! Stored records, form payloads and the computed view handed to templates and
//! the JSON endpoint.

mod event;
mod response;
mod view;

pub use event::*;
pub use response::*;
pub use view::*;
