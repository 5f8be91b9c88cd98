//! Extracted records and message rendering

pub mod messages;
pub mod records;
pub mod template;
