use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A resident's star rating for one event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub id: i64,
    pub event_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Feedback joined with the title of the event it refers to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackWithEvent {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub event_title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
    pub event_id: i64,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewFeedback {
    /// Checks the rating range and normalizes a blank comment to `None`
    pub fn validated(self) -> Result<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(AppError::Validation(format!(
                "Rating must be between {} and {} stars",
                MIN_RATING, MAX_RATING
            )));
        }

        let comment = self
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(NewFeedback { comment, ..self })
    }
}

/// The two columns the analytics aggregator consumes
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRating {
    pub rating: i32,
    pub event_title: Option<String>,
}

impl FeedbackRating {
    pub fn new(rating: i32, event_title: Option<&str>) -> Self {
        FeedbackRating {
            rating,
            event_title: event_title.map(str::to_string),
        }
    }
}
