pub mod sleep_log;
pub mod user;
