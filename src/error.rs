//! Error handling for the application assistant

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not parse model reply: {0}")]
    ResponseParse(String),

    #[error("Template error: {0}")]
    Template(#[from] crate::processing::template::TemplateError),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document rendering error: {0}")]
    DocumentRender(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Convert anyhow errors to our custom error type, keeping the context chain
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InvalidInput(format!("{:#}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

/// A value that is always usable, plus the error that forced a fallback
/// when one was substituted.
///
/// Model calls and template substitution degrade to placeholder text instead
/// of failing the session; callers surface `error` as a notice.
#[derive(Debug)]
pub struct Recovered<T> {
    pub value: T,
    pub error: Option<AppError>,
}

impl<T> Recovered<T> {
    pub fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    pub fn fallback(value: T, error: AppError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_parts(self) -> (T, Option<AppError>) {
        (self.value, self.error)
    }
}
