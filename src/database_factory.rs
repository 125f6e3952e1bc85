use crate::database::Database;
use crate::date_provider::{DateProvider, OverrideDateProvider, SystemDateProvider};
use crate::error::Result;
use chrono::NaiveDate;
use std::sync::Arc;

pub const DEFAULT_DATABASE_PATH: &str = "community_events.db";

/// Database configuration
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Whether to use in-memory database
    pub is_test_mode: bool,
    /// Custom database file path (ignored if in test mode)
    pub custom_path: Option<String>,
    /// Date stamped on new rows instead of today
    pub override_date: Option<NaiveDate>,
}

impl DatabaseConfig {
    pub fn builder() -> DatabaseConfigBuilder {
        DatabaseConfigBuilder::default()
    }

    /// Gets the effective database path
    pub fn get_path(&self) -> &str {
        if self.is_test_mode {
            ":memory:"
        } else {
            self.custom_path.as_deref().unwrap_or(DEFAULT_DATABASE_PATH)
        }
    }

    fn date_provider(&self) -> Arc<dyn DateProvider> {
        match self.override_date {
            Some(date) => Arc::new(OverrideDateProvider::new(date)),
            None => Arc::new(SystemDateProvider),
        }
    }
}

#[derive(Debug, Default)]
pub struct DatabaseConfigBuilder {
    config: DatabaseConfig,
}

impl DatabaseConfigBuilder {
    pub fn test_mode(mut self) -> Self {
        self.config.is_test_mode = true;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.custom_path = Some(path.into());
        self
    }

    pub fn override_date(mut self, date: Option<NaiveDate>) -> Self {
        self.config.override_date = date;
        self
    }

    /// Shorthand for `override_date`; invalid dates are ignored
    pub fn date_ymd(self, year: i32, month: u32, day: u32) -> Self {
        self.override_date(NaiveDate::from_ymd_opt(year, month, day))
    }

    pub fn build(self) -> DatabaseConfig {
        self.config
    }
}

/// Factory for creating Database instances
pub struct DatabaseFactory;

impl DatabaseFactory {
    /// Creates a database with the specified configuration
    pub fn create(config: DatabaseConfig) -> Result<Database> {
        Database::with_date_provider(config.get_path(), config.date_provider())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        let config = DatabaseConfig::builder().build();
        assert_eq!(config.get_path(), "community_events.db");
    }

    #[test]
    fn test_test_mode_path() {
        let config = DatabaseConfig::builder().test_mode().build();
        assert_eq!(config.get_path(), ":memory:");
    }

    #[test]
    fn test_custom_path() {
        let config = DatabaseConfig::builder().path("custom.db").build();
        assert_eq!(config.get_path(), "custom.db");
    }

    #[test]
    fn test_test_mode_ignores_custom_path() {
        let config = DatabaseConfig::builder().path("custom.db").test_mode().build();
        assert_eq!(config.get_path(), ":memory:");
    }

    #[test]
    fn test_invalid_date_is_ignored() {
        let config = DatabaseConfig::builder().date_ymd(2025, 2, 30).build();
        assert!(config.override_date.is_none());
    }

    #[test]
    fn test_create_with_memory_database() {
        let config = DatabaseConfig::builder().test_mode().build();
        let db = DatabaseFactory::create(config).expect("Failed to create in-memory database");
        assert!(db.count_events().is_ok());
    }
}
