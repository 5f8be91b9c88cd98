//! Completion endpoint integration

pub mod client;
pub mod credentials;
pub mod extractor;
pub mod prompts;
