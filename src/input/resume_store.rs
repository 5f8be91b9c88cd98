//! Plain-text resume persistence

use crate::error::{AppError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The resume text the generator works from, stored as a single text file.
pub struct ResumeStore {
    path: PathBuf,
}

impl ResumeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when no resume has been saved yet.
    pub fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, text)?;
        info!("Saved resume text to {}", self.path.display());
        Ok(())
    }

    /// Extract text from a PDF, text or markdown file and store it.
    pub async fn import(&self, source: &Path) -> Result<String> {
        let text = extract_resume_text(source).await?;
        self.save(&text)?;
        Ok(text)
    }
}

pub async fn extract_resume_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(AppError::InvalidInput(format!(
            "File does not exist: {}",
            path.display()
        )));
    }

    match FileType::from_path(path) {
        FileType::Pdf => {
            info!("Extracting text from PDF: {}", path.display());
            PdfExtractor.extract(path).await
        }
        FileType::Text => {
            info!("Reading plain text file: {}", path.display());
            PlainTextExtractor.extract(path).await
        }
        FileType::Markdown => {
            info!("Processing markdown file: {}", path.display());
            MarkdownExtractor.extract(path).await
        }
        FileType::Unknown => Err(AppError::UnsupportedFormat(format!(
            "Unsupported resume file: {} (expected pdf, txt or md)",
            path.display()
        ))),
    }
}
