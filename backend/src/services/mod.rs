pub mod access;
pub mod auth;
pub mod done_records;
pub mod mailer;
pub mod pets;
pub mod schedule;
pub mod tasks;
pub mod weight_records;
