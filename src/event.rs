use crate::error::{AppError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled community activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an event. All fields are required.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub description: String,
}

impl NewEvent {
    /// Trims the text fields and rejects blank ones
    pub fn validated(self) -> Result<Self> {
        let title = required("title", &self.title)?;
        let location = required("location", &self.location)?;
        let description = required("description", &self.description)?;

        Ok(NewEvent {
            title,
            location,
            description,
            ..self
        })
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("Event {} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Explicit ordering for event listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrder {
    DateAscending,
    DateDescending,
    NewestFirst,
}

impl EventOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            EventOrder::DateAscending => "date ASC, time ASC, id ASC",
            EventOrder::DateDescending => "date DESC, time DESC, id DESC",
            EventOrder::NewestFirst => "created_at DESC, id DESC",
        }
    }
}

/// Title and description of a past event, used as prompt context
#[derive(Debug, Clone, PartialEq)]
pub struct EventContext {
    pub title: String,
    pub description: String,
}

impl From<&Event> for EventContext {
    fn from(event: &Event) -> Self {
        EventContext {
            title: event.title.clone(),
            description: event.description.clone(),
        }
    }
}
