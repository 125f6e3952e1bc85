use crate::analytics::{AnalyticsSummary, aggregate};
use crate::feedback::FeedbackRating;
use crate::row_factories::FeedbackRowFactory;
use rusqlite::{Connection, Result};

pub struct RatingsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> RatingsRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        RatingsRepository { conn }
    }

    /// Every feedback rating with its event title, in submission order.
    /// The title is NULL when the event row is gone.
    pub fn all(&self) -> Result<Vec<FeedbackRating>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.rating, e.title
             FROM feedback f
             LEFT JOIN events e ON f.event_id = e.id
             ORDER BY f.id ASC",
        )?;

        let rows = stmt.query_map([], FeedbackRowFactory::rating_from_row)?;
        rows.collect()
    }

    pub fn summary(&self) -> Result<AnalyticsSummary> {
        Ok(aggregate(&self.all()?))
    }
}
