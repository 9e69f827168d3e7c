//! Presentation logic for the summary and to-do tabs.

pub mod chat;
pub mod summary;
pub mod todo;
