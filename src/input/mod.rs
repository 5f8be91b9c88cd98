//! Resume input: file detection, text extraction and the on-disk resume store

pub mod file_detector;
pub mod resume_store;
pub mod text_extractor;

pub use resume_store::ResumeStore;
