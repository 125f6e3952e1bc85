pub mod analytics;
pub mod cli;
pub mod commands;
pub mod config;
pub mod database;
pub mod database_factory;
pub mod date_provider;
pub mod error;
pub mod event;
pub mod feedback;
pub mod report;
pub mod row_factories;
pub mod server;
pub mod suggestions;
