use crate::error::Result;
use log::debug;
use rusqlite::Connection;

refinery::embed_migrations!("migrations");

/// Opens the database, enables foreign keys and applies pending migrations
pub fn init_connection(db_path: &str) -> Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    let report = migrations::runner().run(&mut conn)?;
    debug!(
        "Applied {} migration(s) to {}",
        report.applied_migrations().len(),
        db_path
    );

    Ok(conn)
}
