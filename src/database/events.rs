use crate::event::{Event, EventOrder, NewEvent};
use crate::row_factories::EventRowFactory;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result, params};

const EVENT_COLUMNS: &str = "id, title, location, date, time, description, created_at";

pub struct EventsRepository<'a> {
    conn: &'a Connection,
    get_current_time: Box<dyn Fn() -> DateTime<Utc> + 'a>,
}

impl<'a> EventsRepository<'a> {
    pub fn new(
        conn: &'a Connection,
        get_current_time: Box<dyn Fn() -> DateTime<Utc> + 'a>,
    ) -> Self {
        EventsRepository {
            conn,
            get_current_time,
        }
    }

    /// Inserts the event and returns its id. Expects already validated input.
    pub fn insert(&self, event: &NewEvent) -> Result<i64> {
        let created_at = (self.get_current_time)().to_rfc3339();
        self.conn.execute(
            "INSERT INTO events (title, location, date, time, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.title,
                event.location,
                event.date,
                event.time,
                event.description,
                created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get(&self, event_id: i64) -> Result<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS))?;

        let mut rows = stmt.query([event_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(EventRowFactory::from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list(&self, order: EventOrder) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM events ORDER BY {}",
            EVENT_COLUMNS,
            order.as_sql()
        ))?;

        let rows = stmt.query_map([], EventRowFactory::from_row)?;
        rows.collect()
    }

    /// Most recently created events first
    pub fn get_recent(&self, limit: i64) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM events ORDER BY {} LIMIT ?1",
            EVENT_COLUMNS,
            EventOrder::NewestFirst.as_sql()
        ))?;

        let rows = stmt.query_map([limit], EventRowFactory::from_row)?;
        rows.collect()
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }
}
