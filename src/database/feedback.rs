use crate::feedback::{Feedback, FeedbackWithEvent, NewFeedback};
use crate::row_factories::FeedbackRowFactory;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result, params};

pub struct FeedbackRepository<'a> {
    conn: &'a Connection,
    get_current_time: Box<dyn Fn() -> DateTime<Utc> + 'a>,
}

impl<'a> FeedbackRepository<'a> {
    pub fn new(
        conn: &'a Connection,
        get_current_time: Box<dyn Fn() -> DateTime<Utc> + 'a>,
    ) -> Self {
        FeedbackRepository {
            conn,
            get_current_time,
        }
    }

    /// Inserts the feedback and returns its id. Fails with a constraint
    /// violation when the event does not exist or the rating is out of range.
    pub fn insert(&self, feedback: &NewFeedback) -> Result<i64> {
        let submitted_at = (self.get_current_time)().to_rfc3339();
        self.conn.execute(
            "INSERT INTO feedback (event_id, rating, comment, submitted_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                feedback.event_id,
                feedback.rating,
                feedback.comment,
                submitted_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get(&self, feedback_id: i64) -> Result<Option<Feedback>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, event_id, rating, comment, submitted_at FROM feedback WHERE id = ?1",
        )?;

        let mut rows = stmt.query([feedback_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(FeedbackRowFactory::from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// All feedback with the event title, newest submission first
    pub fn list_with_events(&self) -> Result<Vec<FeedbackWithEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.event_id, f.rating, f.comment, f.submitted_at, e.title
             FROM feedback f
             LEFT JOIN events e ON f.event_id = e.id
             ORDER BY f.submitted_at DESC, f.id DESC",
        )?;

        let rows = stmt.query_map([], FeedbackRowFactory::with_event_from_row)?;
        rows.collect()
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?;
        Ok(count)
    }
}
