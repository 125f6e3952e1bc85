pub mod ratings;

use rusqlite::Connection;

pub use ratings::RatingsRepository;

/// Analytics facade providing high-level analytics operations
pub struct Analytics<'a> {
    pub conn: &'a Connection,
}

impl<'a> Analytics<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Analytics { conn }
    }

    pub fn ratings(&self) -> RatingsRepository<'a> {
        RatingsRepository::new(self.conn)
    }
}
