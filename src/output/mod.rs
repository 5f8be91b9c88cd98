//! Cover letter layout and PDF output

pub mod font_metrics;
pub mod layout;
pub mod pdf;
