//! API key lookup and persistence in a `.env`-style file

use crate::error::{AppError, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Reads the API key from the process environment or a `VARNAME=value` file.
pub struct CredentialStore {
    env_path: PathBuf,
}

impl CredentialStore {
    pub fn new(env_path: impl Into<PathBuf>) -> Self {
        Self {
            env_path: env_path.into(),
        }
    }

    /// `.env` in the working directory.
    pub fn default_location() -> Self {
        Self::new(".env")
    }

    pub fn env_path(&self) -> &Path {
        &self.env_path
    }

    /// The process environment wins over the file, matching dotenv semantics.
    pub fn api_key(&self) -> Result<Option<String>> {
        if let Ok(key) = std::env::var(API_KEY_VAR) {
            if !key.trim().is_empty() {
                debug!("Using {} from the environment", API_KEY_VAR);
                return Ok(Some(key));
            }
        }
        self.api_key_from_file()
    }

    fn api_key_from_file(&self) -> Result<Option<String>> {
        if !self.env_path.exists() {
            return Ok(None);
        }

        let entries = dotenvy::from_path_iter(&self.env_path).map_err(|e| {
            AppError::Configuration(format!("Failed to read {}: {}", self.env_path.display(), e))
        })?;

        for entry in entries {
            let (name, value) = entry.map_err(|e| {
                AppError::Configuration(format!("Failed to parse {}: {}", self.env_path.display(), e))
            })?;
            if name == API_KEY_VAR && !value.trim().is_empty() {
                debug!("Using {} from {}", API_KEY_VAR, self.env_path.display());
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Replace the key line in the file, or append one; other lines are kept as they are.
    pub fn save_api_key(&self, api_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() || api_key.contains(['\n', '\r']) {
            return Err(AppError::InvalidInput(
                "API key must be a single non-empty line".to_string(),
            ));
        }

        let new_line = format!("{}={}", API_KEY_VAR, api_key);
        let prefix = format!("{}=", API_KEY_VAR);

        let mut lines: Vec<String> = if self.env_path.exists() {
            std::fs::read_to_string(&self.env_path)?
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        match lines.iter_mut().find(|line| line.starts_with(&prefix)) {
            Some(line) => *line = new_line,
            None => lines.push(new_line),
        }

        let mut content = lines.join("\n");
        content.push('\n');
        std::fs::write(&self.env_path, content)?;

        info!("Saved API key to {}", self.env_path.display());
        Ok(())
    }
}
