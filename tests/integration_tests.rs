//! Integration tests for the application assistant

use application_assistant::config::Config;
use application_assistant::error::{AppError, Result};
use application_assistant::input::resume_store::extract_resume_text;
use application_assistant::llm::client::{CompletionBackend, CompletionRequest, OpenAiClient};
use application_assistant::llm::credentials::{CredentialStore, API_KEY_VAR};
use application_assistant::output::pdf::render_pdf;
use application_assistant::processing::records::{CvContent, JobInfo};
use application_assistant::session::Session;
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Answers requests from a fixed script, in order.
struct ScriptedBackend {
    replies: Mutex<Vec<String>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| AppError::Network("script exhausted".to_string()))
    }
}

const JOB_REPLY: &str = "```json
{
  \"company_name\": \"Northwind Robotics\",
  \"position_title\": \"Senior Rust Engineer\",
  \"hiring_manager_name\": \"Priya Patel\",
  \"specific_work\": \"build the motion planning platform\",
  \"required_skills\": [\"Rust\", \"Tokio\", \"Kubernetes\"],
  \"company_mission\": \"make warehouse work safe and boring\",
  \"candidate_matches\": \"• Rust services<br/>• Tokio routing rewrite\"
}
```";

const CV_REPLY: &str = "about_me:
I am a backend engineer who has spent six years on Rust and Go services.

why_company:
Northwind's focus on safe warehouse automation matches what I care about.

why_me:
• Rewrote a routing service in Rust with Tokio
• Led a migration of 30 services to Kubernetes
• Mentored junior engineers";

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

async fn session_with_resume(dir: &TempDir) -> Session {
    let mut session = Session::open(dir.path().join("config.toml")).unwrap();
    session
        .upload_resume(Path::new("tests/fixtures/sample_resume.txt"))
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let text = extract_resume_text(Path::new("tests/fixtures/sample_resume.txt")).await.unwrap();
    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("Kubernetes"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let text = extract_resume_text(Path::new("tests/fixtures/sample_resume.md")).await.unwrap();
    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let result = extract_resume_text(Path::new("tests/fixtures/unsupported.xyz")).await;
    assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let result = extract_resume_text(Path::new("tests/fixtures/nonexistent.txt")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_full_generation_flow() {
    let dir = TempDir::new().unwrap();
    let mut session = session_with_resume(&dir).await;
    let backend = ScriptedBackend::new(&[JOB_REPLY, CV_REPLY]);
    let job = std::fs::read_to_string("tests/fixtures/job_description.txt").unwrap();

    let generation = session.generate(&backend, &job).await.unwrap().clone();

    assert_eq!(generation.job_info.company_name, "Northwind Robotics");
    assert_eq!(generation.job_info.required_skills, "• Rust<br/>• Tokio<br/>• Kubernetes");
    assert!(generation.cv_content.why_me.starts_with("• Rewrote"));
    assert_eq!(
        generation.outputs.email.subject,
        "Application Follow-Up - Senior Rust Engineer Position"
    );
    assert!(generation.outputs.short_message.chars().count() <= 200);
    assert!(session.notices().is_empty());

    let seen = backend.seen.lock().unwrap();
    assert!(seen[0].user.contains("Northwind Robotics is hiring"));
    assert!(seen[0].user.contains("John Doe"));
    assert!(seen.iter().all(|r| r.model == "gpt-4o" && (r.temperature - 0.7).abs() < f32::EPSILON));

    let letter = session.compose_document(date()).unwrap();
    assert_eq!(
        letter.section_titles(),
        vec!["About Me", "Why Northwind Robotics?", "Why Me?"]
    );
    assert!(session.preview_document(date()).unwrap().starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_short_message_uses_first_skill_and_is_capped() {
    let dir = TempDir::new().unwrap();
    let mut session = session_with_resume(&dir).await;

    let mut config = session.config().clone();
    config.set_value("templates.linkedin", "Hi {hiring_manager_name}, my {required_skills} work fits. ").unwrap();
    session.save_config(config.clone()).unwrap();

    let backend = ScriptedBackend::new(&[JOB_REPLY, CV_REPLY]);
    let generation = session.generate(&backend, "Rust role").await.unwrap().clone();
    assert_eq!(
        generation.outputs.short_message,
        "Hi Priya Patel, my Rust work fits. "
    );

    config.templates.linkedin = "{company_mission} ".repeat(20);
    session.save_config(config).unwrap();
    let message = session.rerender_messages().unwrap().short_message.clone();
    assert_eq!(message.chars().count(), 200);
    assert!(message.ends_with("..."));
}

#[tokio::test]
async fn test_unreachable_endpoint_falls_back() {
    let dir = TempDir::new().unwrap();
    let mut session = session_with_resume(&dir).await;
    let client = OpenAiClient::new("sk-test").unwrap().with_base_url("http://127.0.0.1:9");

    let generation = session.generate(&client, "Rust role").await.unwrap().clone();

    assert_eq!(generation.job_info, JobInfo::default());
    assert_eq!(generation.cv_content, CvContent::default());
    assert_eq!(session.notices().len(), 2);
    assert_eq!(
        generation.outputs.email.subject,
        "Application Follow-Up - Position Title Position"
    );
}

#[test]
fn test_missing_credential_is_reported() {
    if std::env::var(API_KEY_VAR).is_ok() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(dir.path().join(".env"));

    let err = OpenAiClient::from_credentials(&store).err().unwrap();
    assert!(matches!(err, AppError::MissingCredential(_)));

    store.save_api_key("sk-from-file").unwrap();
    assert!(OpenAiClient::from_credentials(&store).is_ok());
}

#[tokio::test]
async fn test_edited_session_file_renders() {
    let dir = TempDir::new().unwrap();
    let mut session = session_with_resume(&dir).await;
    let backend = ScriptedBackend::new(&[JOB_REPLY, CV_REPLY]);
    session.generate(&backend, "Rust role").await.unwrap();

    let path = dir.path().join("session.json");
    session.save_generation(&path).unwrap();

    let mut value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    value["cv_content"]["about_me"] = serde_json::Value::String("Hand-edited intro.".to_string());
    std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();

    let mut reopened = Session::open(dir.path().join("config.toml")).unwrap();
    reopened.load_generation(&path).unwrap();
    let letter = reopened.compose_document(date()).unwrap();
    let texts: Vec<String> = letter.blocks.iter().filter_map(|b| b.plain_text()).collect();
    assert!(texts.contains(&"Hand-edited intro.".to_string()));

    let out = dir.path().join("letter.pdf");
    reopened.export_document(&out, date()).unwrap();
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn test_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::load_from(&path).unwrap();
    assert!(path.exists());
    config.set_value("personal_info.full_name", "John Doe").unwrap();
    config.set_value("model", "gpt-4o-mini").unwrap();
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_default_letter_renders() {
    let letter = application_assistant::output::layout::compose(
        &JobInfo::default(),
        &CvContent::default(),
        &Config::default().personal_info,
        date(),
    );
    let bytes = render_pdf(&letter).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
