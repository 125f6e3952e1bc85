pub mod analytics;
pub mod connection;
pub mod events;
pub mod feedback;

use crate::analytics::AnalyticsSummary;
use crate::date_provider::{DateProvider, SystemDateProvider};
use crate::error::{AppError, Result};
use crate::event::{Event, EventContext, EventOrder, NewEvent};
use crate::feedback::{Feedback, FeedbackWithEvent, NewFeedback};
use crate::suggestions::RECENT_EVENT_LIMIT;
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::Connection;
use std::sync::Arc;

pub use analytics::Analytics;
pub use events::EventsRepository;
pub use feedback::FeedbackRepository;

/// Main Database struct providing access to all repositories
pub struct Database {
    pub conn: Connection,
    date_provider: Arc<dyn DateProvider>,
}

impl Database {
    pub fn new(db_path: &str) -> Result<Self> {
        Self::init(db_path, Arc::new(SystemDateProvider))
    }

    pub fn with_date_provider(db_path: &str, date_provider: Arc<dyn DateProvider>) -> Result<Self> {
        Self::init(db_path, date_provider)
    }

    fn init(db_path: &str, date_provider: Arc<dyn DateProvider>) -> Result<Self> {
        let conn = connection::init_connection(db_path)?;
        Ok(Database {
            conn,
            date_provider,
        })
    }

    fn get_current_time(&self) -> DateTime<Utc> {
        self.date_provider.get_current_time()
    }

    fn events(&self) -> EventsRepository<'_> {
        EventsRepository::new(&self.conn, Box::new(|| self.get_current_time()))
    }

    fn feedback(&self) -> FeedbackRepository<'_> {
        FeedbackRepository::new(&self.conn, Box::new(|| self.get_current_time()))
    }

    // ===== Events =====

    /// Validates and stores a new event, returning the stored row
    pub fn create_event(&self, event: NewEvent) -> Result<Event> {
        let event = event.validated()?;
        let repo = self.events();
        let id = repo.insert(&event)?;
        debug!("Created event {} ({})", id, event.title);
        repo.get(id)?
            .ok_or_else(|| AppError::NotFound(format!("Event {}", id)))
    }

    pub fn get_event(&self, event_id: i64) -> Result<Option<Event>> {
        Ok(self.events().get(event_id)?)
    }

    pub fn list_events(&self, order: EventOrder) -> Result<Vec<Event>> {
        Ok(self.events().list(order)?)
    }

    pub fn recent_events(&self, limit: i64) -> Result<Vec<Event>> {
        Ok(self.events().get_recent(limit)?)
    }

    /// The newest events, reduced to what the suggestion prompt quotes
    pub fn suggestion_context(&self) -> Result<Vec<EventContext>> {
        let recent = self.recent_events(RECENT_EVENT_LIMIT)?;
        Ok(recent.iter().map(EventContext::from).collect())
    }

    pub fn count_events(&self) -> Result<i64> {
        Ok(self.events().count()?)
    }

    // ===== Feedback =====

    /// Validates and stores feedback for an existing event
    pub fn submit_feedback(&self, feedback: NewFeedback) -> Result<Feedback> {
        let feedback = feedback.validated()?;
        if self.events().get(feedback.event_id)?.is_none() {
            return Err(AppError::NotFound(format!("Event {}", feedback.event_id)));
        }

        let repo = self.feedback();
        let id = repo.insert(&feedback)?;
        debug!(
            "Stored feedback {} for event {} ({} stars)",
            id, feedback.event_id, feedback.rating
        );
        repo.get(id)?
            .ok_or_else(|| AppError::NotFound(format!("Feedback {}", id)))
    }

    pub fn get_feedback(&self, feedback_id: i64) -> Result<Option<Feedback>> {
        Ok(self.feedback().get(feedback_id)?)
    }

    pub fn list_feedback_with_events(&self) -> Result<Vec<FeedbackWithEvent>> {
        Ok(self.feedback().list_with_events()?)
    }

    pub fn count_feedback(&self) -> Result<i64> {
        Ok(self.feedback().count()?)
    }

    // ===== Analytics =====

    pub fn compute_analytics(&self) -> Result<AnalyticsSummary> {
        let analytics = Analytics::new(&self.conn);
        Ok(analytics.ratings().summary()?)
    }
}
