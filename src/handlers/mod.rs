pub mod analytics;
pub mod health;
pub mod me;
pub mod sleep_logs;
pub mod translate;
