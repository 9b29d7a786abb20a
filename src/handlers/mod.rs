pub mod assessments;
pub mod chat;
pub mod health;
pub mod journal;
pub mod users;
