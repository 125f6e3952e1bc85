use crate::event::Event;
use crate::feedback::{Feedback, FeedbackRating, FeedbackWithEvent};
use rusqlite::Row;

/// Factory for creating Event objects from database rows
pub struct EventRowFactory;

impl EventRowFactory {
    /// Expected columns: id, title, location, date, time, description, created_at
    pub fn from_row(row: &Row) -> rusqlite::Result<Event> {
        Ok(Event {
            id: row.get(0)?,
            title: row.get(1)?,
            location: row.get(2)?,
            date: row.get(3)?,
            time: row.get(4)?,
            description: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

/// Factory for creating Feedback objects from database rows
pub struct FeedbackRowFactory;

impl FeedbackRowFactory {
    /// Expected columns: id, event_id, rating, comment, submitted_at
    pub fn from_row(row: &Row) -> rusqlite::Result<Feedback> {
        Ok(Feedback {
            id: row.get(0)?,
            event_id: row.get(1)?,
            rating: row.get(2)?,
            comment: row.get(3)?,
            submitted_at: row.get(4)?,
        })
    }

    /// Same columns as `from_row` followed by the joined event title
    pub fn with_event_from_row(row: &Row) -> rusqlite::Result<FeedbackWithEvent> {
        Ok(FeedbackWithEvent {
            feedback: Self::from_row(row)?,
            event_title: row.get(5)?,
        })
    }

    /// Expected columns: rating, event title
    pub fn rating_from_row(row: &Row) -> rusqlite::Result<FeedbackRating> {
        Ok(FeedbackRating {
            rating: row.get(0)?,
            event_title: row.get(1)?,
        })
    }
}
