//! Server-side HTML rendering.
//!
//! Templates are compiled into the binary and auto-escaped by Tera.

use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};

use crate::errors::AppError;
use crate::models::{EditView, EventView};

const INDEX: &str = "index.html";
const EVENT: &str = "event.html";
const EDIT: &str = "edit.html";
const SORT: &str = "sort.html";

/// Compiled page templates.
pub struct Views {
    tera: Tera,
}

#[derive(Serialize)]
struct SortPage<'a> {
    event_id: &'a str,
    event_name: &'a str,
    names: &'a [String],
}

impl Views {
    pub fn new() -> Result<Self, AppError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (INDEX, include_str!("../../templates/index.html")),
            (EVENT, include_str!("../../templates/event.html")),
            (EDIT, include_str!("../../templates/edit.html")),
            (SORT, include_str!("../../templates/sort.html")),
        ])?;
        Ok(Self { tera })
    }

    fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<Html<String>, AppError> {
        let context = Context::from_serialize(data)?;
        Ok(Html(self.tera.render(template, &context)?))
    }

    /// Event creation form.
    pub fn index(&self) -> Result<Html<String>, AppError> {
        Ok(Html(self.tera.render(INDEX, &Context::new())?))
    }

    /// Host or member grid.
    pub fn event(&self, view: &EventView) -> Result<Html<String>, AppError> {
        self.render(EVENT, view)
    }

    /// Participant edit form.
    pub fn edit(&self, view: &EditView) -> Result<Html<String>, AppError> {
        self.render(EDIT, view)
    }

    /// Drag-and-drop ordering page.
    pub fn sort(
        &self,
        event_id: &str,
        event_name: &str,
        names: &[String],
    ) -> Result<Html<String>, AppError> {
        self.render(
            SORT,
            &SortPage {
                event_id,
                event_name,
                names,
            },
        )
    }
}
