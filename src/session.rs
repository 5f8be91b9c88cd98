//! One user's working state: config, resume and the last generation
//!
//! A `Session` owns everything an interactive run touches. Model calls go
//! through any [`CompletionBackend`], so the whole flow can be driven without
//! the network.

use crate::config::{is_known_model, Config};
use crate::error::{AppError, Result};
use crate::input::ResumeStore;
use crate::llm::client::CompletionBackend;
use crate::llm::extractor::InformationExtractor;
use crate::output::layout::{compose, CoverLetter};
use crate::output::pdf::render_pdf;
use crate::processing::messages::{render_outputs, validate_templates};
use crate::processing::records::{CvContent, Generation, RenderedOutputs};
use chrono::NaiveDate;
use log::{info, warn};
use std::path::{Path, PathBuf};

pub struct Session {
    config_path: PathBuf,
    config: Config,
    resume: ResumeStore,
    resume_text: Option<String>,
    model_override: Option<String>,
    generation: Option<Generation>,
    notices: Vec<String>,
}

impl Session {
    /// Load the config at `config_path` (created with defaults if absent) and the saved resume.
    pub fn open(config_path: impl Into<PathBuf>) -> Result<Self> {
        let config_path = config_path.into();
        let config = Config::load_from(&config_path)?;
        let resume = ResumeStore::new(config.resume_file(&config_path));
        let resume_text = resume.load()?;

        match &resume_text {
            Some(text) => info!("Loaded resume ({} characters) from {}", text.len(), resume.path().display()),
            None => info!("No saved resume at {}", resume.path().display()),
        }

        Ok(Self {
            config_path,
            config,
            resume,
            resume_text,
            model_override: None,
            generation: None,
            notices: Vec::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn resume_path(&self) -> &Path {
        self.resume.path()
    }

    /// Replace the config wholesale and persist it. Templates must only use known placeholders.
    pub fn save_config(&mut self, config: Config) -> Result<()> {
        validate_templates(&config.templates)?;

        let resume_file = config.resume_file(&self.config_path);
        let moved_resume = if resume_file != self.resume.path() {
            let store = ResumeStore::new(resume_file);
            let text = store.load()?;
            Some((store, text))
        } else {
            None
        };

        config.save_to(&self.config_path)?;
        if let Some((store, text)) = moved_resume {
            self.resume = store;
            self.resume_text = text;
        }
        self.config = config;
        info!("Saved configuration to {}", self.config_path.display());
        Ok(())
    }

    /// Extract text from a PDF, text or markdown resume and keep it as the saved resume.
    pub async fn upload_resume(&mut self, path: &Path) -> Result<&str> {
        let text = self.resume.import(path).await?;
        Ok(self.resume_text.insert(text).as_str())
    }

    pub fn set_resume_text(&mut self, text: &str) -> Result<()> {
        self.resume.save(text)?;
        self.resume_text = Some(text.to_string());
        Ok(())
    }

    pub fn resume_text(&self) -> Option<&str> {
        self.resume_text.as_deref()
    }

    /// Use `model` for this session only; the saved config is left alone.
    pub fn use_model(&mut self, model: &str) -> Result<()> {
        if !is_known_model(model) {
            return Err(AppError::InvalidInput(format!("Unknown model: {}", model)));
        }
        self.model_override = Some(model.to_string());
        Ok(())
    }

    pub fn model(&self) -> &str {
        self.model_override.as_deref().unwrap_or(&self.config.model)
    }

    /// Extract job facts, write the cover letter narrative and render both messages.
    ///
    /// Model and template failures fall back to placeholder content and are
    /// reported through [`Session::notices`].
    pub async fn generate<B: CompletionBackend>(
        &mut self,
        backend: &B,
        job_description: &str,
    ) -> Result<&Generation> {
        if job_description.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter a job description.".to_string(),
            ));
        }
        let resume = match self.resume_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                return Err(AppError::InvalidInput(
                    "Please upload a resume first.".to_string(),
                ))
            }
        };

        self.notices.clear();
        let extractor = InformationExtractor::new(backend, self.model());

        let (job_info, job_error) = extractor
            .extract_job_info(job_description, resume)
            .await
            .into_parts();
        if let Some(e) = job_error {
            self.notices.push(format!("Job details fell back to placeholders: {}", e));
        }

        let (cv_content, cv_error) = extractor
            .generate_cv_content(&job_info, resume)
            .await
            .into_parts();
        if let Some(e) = cv_error {
            self.notices.push(format!("Cover letter content fell back to defaults: {}", e));
        }

        let (outputs, template_errors) = render_outputs(&job_info, &self.config);
        record_template_errors(&mut self.notices, template_errors);

        info!("Generated application materials for {}", job_info.company_name);
        Ok(self.generation.insert(Generation {
            job_info,
            cv_content,
            outputs,
        }))
    }

    pub fn generation(&self) -> Option<&Generation> {
        self.generation.as_ref()
    }

    /// Problems recovered from during the last generation or re-render.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    fn current(&self) -> Result<&Generation> {
        self.generation.as_ref().ok_or_else(nothing_generated)
    }

    pub fn edit_cv_content(&mut self, cv_content: CvContent) -> Result<()> {
        let generation = self.generation.as_mut().ok_or_else(nothing_generated)?;
        generation.cv_content = cv_content;
        Ok(())
    }

    /// Render the messages again from the stored job facts and the current templates.
    pub fn rerender_messages(&mut self) -> Result<&RenderedOutputs> {
        let generation = self.generation.as_mut().ok_or_else(nothing_generated)?;
        let (outputs, errors) = render_outputs(&generation.job_info, &self.config);
        generation.outputs = outputs;

        self.notices.clear();
        record_template_errors(&mut self.notices, errors);
        Ok(&generation.outputs)
    }

    pub fn compose_document(&self, date: NaiveDate) -> Result<CoverLetter> {
        let generation = self.current()?;
        Ok(compose(
            &generation.job_info,
            &generation.cv_content,
            &self.config.personal_info,
            date,
        ))
    }

    /// Cover letter PDF for the current generation, dated `date`.
    pub fn preview_document(&self, date: NaiveDate) -> Result<Vec<u8>> {
        render_pdf(&self.compose_document(date)?)
    }

    pub fn export_document(&self, path: &Path, date: NaiveDate) -> Result<()> {
        let bytes = self.preview_document(date)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, bytes)?;
        info!("Wrote cover letter to {}", path.display());
        Ok(())
    }

    pub fn save_generation(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self.current()?)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Restore a saved generation, e.g. after its cover letter content was edited by hand.
    pub fn load_generation(&mut self, path: &Path) -> Result<&Generation> {
        let content = std::fs::read_to_string(path)?;
        let generation: Generation = serde_json::from_str(&content)?;
        self.notices.clear();
        Ok(self.generation.insert(generation))
    }
}

fn nothing_generated() -> AppError {
    AppError::InvalidInput("Nothing has been generated yet.".to_string())
}

fn record_template_errors(notices: &mut Vec<String>, errors: Vec<AppError>) {
    for e in errors {
        warn!("Template fallback: {}", e);
        notices.push(format!("Template fell back to the built-in message: {}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::CompletionRequest;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct Scripted {
        replies: Mutex<Vec<Result<String>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(mut replies: Vec<Result<String>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionBackend for Scripted {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(AppError::Network("no scripted reply".to_string())))
        }
    }

    const JOB_REPLY: &str = r#"{"company_name": "Acme", "position_title": "Rust Engineer", "hiring_manager_name": "Dana", "specific_work": "build tools", "required_skills": "• Rust<br/>• Tokio", "company_mission": "ship robots", "candidate_matches": "• Rust"}"#;
    const CV_REPLY: &str = "about_me: I write Rust.\nwhy_company: Robots.\nwhy_me:\n• Fast\n• Careful";

    fn session(dir: &TempDir) -> Session {
        let mut session = Session::open(dir.path().join("config.toml")).unwrap();
        session.set_resume_text("Jane Doe, Rust engineer").unwrap();
        session
    }

    #[tokio::test]
    async fn test_generate_produces_all_outputs() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let backend = Scripted::new(vec![Ok(JOB_REPLY.to_string()), Ok(CV_REPLY.to_string())]);

        let generation = session.generate(&backend, "We need a Rust engineer").await.unwrap().clone();
        assert_eq!(generation.job_info.company_name, "Acme");
        assert_eq!(generation.cv_content.why_me, "• Fast\n• Careful");
        assert!(generation.outputs.short_message.chars().count() <= 200);
        assert!(session.notices().is_empty());

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].user.contains("\"company_name\": \"Acme\""));
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_inputs() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::open(dir.path().join("config.toml")).unwrap();
        let backend = Scripted::new(vec![]);

        let err = session.generate(&backend, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        let err = session.generate(&backend, "A job").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_notice() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let backend = Scripted::new(vec![
            Err(AppError::Network("connection refused".to_string())),
            Ok("not the expected format".to_string()),
        ]);

        let generation = session.generate(&backend, "A job").await.unwrap().clone();
        assert_eq!(generation.job_info, crate::processing::records::JobInfo::default());
        assert_eq!(generation.cv_content, CvContent::default());
        assert_eq!(session.notices().len(), 2);
    }

    #[tokio::test]
    async fn test_model_override() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        assert!(session.use_model("not-a-model").is_err());
        session.use_model("gpt-4o-mini").unwrap();

        let backend = Scripted::new(vec![Ok(JOB_REPLY.to_string()), Ok(CV_REPLY.to_string())]);
        session.generate(&backend, "A job").await.unwrap();
        assert!(backend
            .requests
            .lock()
            .unwrap()
            .iter()
            .all(|r| r.model == "gpt-4o-mini"));
        assert_eq!(session.config().model, "gpt-4o");
    }

    #[tokio::test]
    async fn test_edit_then_rerender_and_export() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let backend = Scripted::new(vec![Ok(JOB_REPLY.to_string()), Ok(CV_REPLY.to_string())]);
        session.generate(&backend, "A job").await.unwrap();

        let edited = CvContent {
            about_me: "Edited intro".to_string(),
            ..CvContent::default()
        };
        session.edit_cv_content(edited.clone()).unwrap();

        let mut config = session.config().clone();
        config.templates.linkedin = "Hello {hiring_manager_name}!".to_string();
        session.save_config(config).unwrap();
        assert_eq!(session.rerender_messages().unwrap().short_message, "Hello Dana!");

        let path = dir.path().join("out").join("letter.pdf");
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        session.export_document(&path, date).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
        assert_eq!(session.generation().unwrap().cv_content, edited);
    }

    #[test]
    fn test_save_config_rejects_unknown_placeholder() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let mut config = session.config().clone();
        config.templates.email.subject = "Re: {salary}".to_string();

        assert!(matches!(session.save_config(config), Err(AppError::Template(_))));
        assert_ne!(session.config().templates.email.subject, "Re: {salary}");
    }

    #[test]
    fn test_document_requires_generation() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(session.preview_document(date).is_err());
        assert!(matches!(session.rerender_messages(), Err(AppError::InvalidInput(_))));
        assert!(session.edit_cv_content(CvContent::default()).is_err());
    }

    #[test]
    fn test_unreadable_resume_leaves_config_untouched() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let before = session.config().clone();

        let resume_dir = dir.path().join("resume_is_a_directory");
        std::fs::create_dir(&resume_dir).unwrap();
        let mut config = before.clone();
        config.resume_path = resume_dir;
        config.personal_info.full_name = "Changed".to_string();

        assert!(session.save_config(config).is_err());
        assert_eq!(session.config(), &before);
        assert_eq!(&Config::load_from(session.config_path()).unwrap(), &before);
        assert_eq!(session.resume_text(), Some("Jane Doe, Rust engineer"));
    }

    #[tokio::test]
    async fn test_generation_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let backend = Scripted::new(vec![Ok(JOB_REPLY.to_string()), Ok(CV_REPLY.to_string())]);
        let saved = session.generate(&backend, "A job").await.unwrap().clone();

        let path = dir.path().join("session.json");
        session.save_generation(&path).unwrap();

        let mut reopened = Session::open(dir.path().join("config.toml")).unwrap();
        assert_eq!(reopened.resume_text(), Some("Jane Doe, Rust engineer"));
        assert_eq!(reopened.load_generation(&path).unwrap(), &saved);
    }
}
