//! Application assistant library
//!
//! Turns a job description and a stored resume into a follow-up email, a
//! short networking message and a PDF cover letter.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;
pub mod session;

pub use config::Config;
pub use error::{AppError, Recovered, Result};
pub use session::Session;
