//! CLI interface for the application assistant

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "application-assistant")]
#[command(about = "Generate follow-up emails, LinkedIn messages and cover letters from a job description")]
#[command(long_about = "Extract job details with a chat-completion model, fill your message templates and compose a PDF cover letter from your stored resume")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// File holding OPENAI_API_KEY
    #[arg(long, global = true, default_value = ".env")]
    pub env_file: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the email, LinkedIn message and cover letter for a job
    Generate {
        /// Job description file (TXT, MD), or "-" for stdin
        #[arg(short, long)]
        job: PathBuf,

        /// Resume file (PDF, TXT, MD); replaces the stored resume
        #[arg(short, long)]
        resume: Option<PathBuf>,

        /// Model to use for this run
        #[arg(short, long)]
        model: Option<String>,

        /// Directory for the generated files
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Re-render messages and cover letter from a saved (possibly edited) session file
    Render {
        /// Session JSON written by `generate`
        #[arg(short, long)]
        session: PathBuf,

        /// Cover letter output path
        #[arg(short, long, default_value = "cover_letter.pdf")]
        out: PathBuf,
    },

    /// Stored resume commands
    Resume {
        #[command(subcommand)]
        action: ResumeAction,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// API key commands
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// List the placeholders templates may use
    Placeholders,
}

#[derive(Subcommand)]
pub enum ResumeAction {
    /// Import a resume file and store its text
    Set {
        /// Path to resume file (PDF, TXT, MD)
        file: PathBuf,
    },

    /// Print the stored resume text
    Show,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "personal_info.full_name", "templates.linkedin")
        key: String,

        /// Configuration value; "\n" is read as a line break
        value: String,
    },
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Save the API key to the env file
    SetKey {
        key: String,
    },

    /// Show whether an API key is available
    Status,
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

/// Command line values can't easily carry newlines; accept `\n` escapes instead.
pub fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}

/// Show the start of an API key and mask the rest.
pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(6).collect();
    if key.chars().count() <= 6 {
        "*".repeat(key.chars().count())
    } else {
        format!("{}…", visible)
    }
}
