pub mod activity_log;
pub mod assessment;
pub mod mood_entry;
pub mod user;
