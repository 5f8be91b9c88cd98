//! Configuration management for the application assistant

use crate::error::{AppError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Models offered for generation, as `(display name, model id)`.
pub const AVAILABLE_MODELS: &[(&str, &str)] = &[
    ("GPT-4o", "gpt-4o"),
    ("GPT-4o (Mini)", "gpt-4o-mini"),
];

pub const DEFAULT_MODEL: &str = "gpt-4o";

const DEFAULT_RESUME_FILE: &str = "resume_context.txt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub personal_info: PersonalInfo,
    #[serde(default = "default_resume_path")]
    pub resume_path: PathBuf,
    #[serde(default = "Templates::detailed")]
    pub templates: Templates,
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub linkedin: String,
    pub portfolio: String,
    pub github: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Templates {
    pub email: EmailTemplate,
    pub linkedin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

fn default_resume_path() -> PathBuf {
    PathBuf::from(DEFAULT_RESUME_FILE)
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for PersonalInfo {
    fn default() -> Self {
        Self {
            full_name: "Your Name".to_string(),
            location: "City, Country".to_string(),
            phone: "123-456-7890".to_string(),
            email: "email@example.com".to_string(),
            linkedin: "https://linkedin.com/in/username".to_string(),
            portfolio: "https://yourportfolio.com".to_string(),
            github: "https://github.com/username".to_string(),
        }
    }
}

impl PersonalInfo {
    /// Field name/value pairs, named as they appear in templates.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("full_name", self.full_name.as_str()),
            ("location", self.location.as_str()),
            ("phone", self.phone.as_str()),
            ("email", self.email.as_str()),
            ("linkedin", self.linkedin.as_str()),
            ("portfolio", self.portfolio.as_str()),
            ("github", self.github.as_str()),
        ]
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "full_name" => Some(&mut self.full_name),
            "location" => Some(&mut self.location),
            "phone" => Some(&mut self.phone),
            "email" => Some(&mut self.email),
            "linkedin" => Some(&mut self.linkedin),
            "portfolio" => Some(&mut self.portfolio),
            "github" => Some(&mut self.github),
            _ => None,
        }
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            email: EmailTemplate {
                subject: "Application Follow-Up - {position_title} Position".to_string(),
                body: "Dear {hiring_manager_name},\n\n\
                       I'm writing to follow up on my application for the {position_title} position at {company_name}.\n\n\
                       Best regards,\n\
                       {full_name}"
                    .to_string(),
            },
            linkedin: "Hello! I'm interested in the {position_title} opportunity at {company_name}."
                .to_string(),
        }
    }
}

impl Templates {
    /// Fuller templates used when an existing config file has no `templates` section.
    pub fn detailed() -> Self {
        Self {
            email: EmailTemplate {
                subject: "Follow-Up on {position_title} Application".to_string(),
                body: "Hi {hiring_manager_name},\n\n\
                       I hope you are doing well. I recently applied for the {position_title} position, \
                       and wanted to check in on your decision timeline. I am very excited about the \
                       opportunity to join {company_name} and help {specific_work}\n\n\
                       I understand how busy you probably are and want to thank you in advance for \
                       considering my application. Please let me know if I can provide any additional information.\n\n\
                       I look forward to hearing from you soon.\n\n\
                       Sincerely,\n\
                       {full_name}"
                    .to_string(),
            },
            linkedin: "Hi! I'm interested in the {position_title} role at {company_name}. \
                       My background includes {required_skills}. Looking forward to connecting!"
                .to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            resume_path: default_resume_path(),
            templates: Templates::default(),
            model: default_model(),
        }
    }
}

impl Config {
    /// Load the config at `path`, writing the defaults there on first access.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let table: toml::Table = toml::from_str(&content)
            .map_err(|e| AppError::Configuration(format!("Failed to parse config: {}", e)))?;
        let has_templates = table.contains_key("templates");

        let config: Config = toml::Value::Table(table)
            .try_into()
            .map_err(|e| AppError::Configuration(format!("Failed to parse config: {}", e)))?;

        if !has_templates {
            debug!("Config has no templates section, adding defaults");
            config.save_to(path)?;
        }

        Ok(config)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Persist the whole record, replacing whatever was on disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("application-assistant")
            .join("config.toml")
    }

    /// Resume location; a relative `resume_path` is taken relative to the config file.
    pub fn resume_file(&self, config_path: &Path) -> PathBuf {
        if self.resume_path.is_absolute() {
            return self.resume_path.clone();
        }
        config_path
            .parent()
            .map(|dir| dir.join(&self.resume_path))
            .unwrap_or_else(|| self.resume_path.clone())
    }

    /// Set a single value by dotted key, e.g. `personal_info.full_name` or `templates.email.subject`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "model" => {
                if !is_known_model(value) {
                    let known: Vec<&str> = AVAILABLE_MODELS.iter().map(|(_, id)| *id).collect();
                    return Err(AppError::InvalidInput(format!(
                        "Unknown model: {}. Supported: {}",
                        value,
                        known.join(", ")
                    )));
                }
                self.model = value.to_string();
            }
            "resume_path" => self.resume_path = PathBuf::from(value),
            "templates.email.subject" => self.templates.email.subject = value.to_string(),
            "templates.email.body" => self.templates.email.body = value.to_string(),
            "templates.linkedin" => self.templates.linkedin = value.to_string(),
            _ => {
                let field = key
                    .strip_prefix("personal_info.")
                    .and_then(|name| self.personal_info.field_mut(name))
                    .ok_or_else(|| {
                        AppError::InvalidInput(format!("Unknown configuration key: {}", key))
                    })?;
                *field = value.to_string();
            }
        }
        Ok(())
    }
}

pub fn is_known_model(model: &str) -> bool {
    AVAILABLE_MODELS.iter().any(|(_, id)| *id == model)
}
