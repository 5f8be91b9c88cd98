//! Job facts and cover letter narrative from the completion endpoint
//!
//! Both calls degrade to placeholder values instead of failing: a network,
//! auth or parse problem comes back as a [`Recovered`] with the error attached.

use crate::error::{AppError, Recovered, Result};
use crate::llm::client::{CompletionBackend, CompletionRequest};
use crate::llm::prompts::PromptTemplates;
use crate::processing::records::{CvContent, JobInfo};
use log::{info, warn};

pub const TEMPERATURE: f32 = 0.7;

const ABOUT_ME_MARKER: &str = "about_me";
const WHY_COMPANY_MARKER: &str = "why_company:";
const WHY_ME_MARKER: &str = "why_me:";

pub struct InformationExtractor<'a, B> {
    backend: &'a B,
    prompts: PromptTemplates,
    model: String,
}

impl<'a, B: CompletionBackend> InformationExtractor<'a, B> {
    pub fn new(backend: &'a B, model: impl Into<String>) -> Self {
        Self {
            backend,
            prompts: PromptTemplates::default(),
            model: model.into(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptTemplates) -> Self {
        self.prompts = prompts;
        self
    }

    pub async fn extract_job_info(&self, job_description: &str, resume: &str) -> Recovered<JobInfo> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: self.prompts.job_info_system.clone(),
            user: self.prompts.render_job_info(job_description, resume),
            temperature: TEMPERATURE,
        };

        let parsed = match self.backend.complete(&request).await {
            Ok(reply) => parse_job_info(&reply),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(job_info) => {
                info!(
                    "Extracted job info for {} at {}",
                    job_info.position_title, job_info.company_name
                );
                Recovered::ok(job_info)
            }
            Err(e) => {
                warn!("Job info extraction failed, using placeholders: {}", e);
                Recovered::fallback(JobInfo::default(), e)
            }
        }
    }

    pub async fn generate_cv_content(&self, job_info: &JobInfo, resume: &str) -> Recovered<CvContent> {
        let user = match self.prompts.render_cv_content(job_info, resume) {
            Ok(user) => user,
            Err(e) => return Recovered::fallback(CvContent::default(), e),
        };
        let request = CompletionRequest {
            model: self.model.clone(),
            system: self.prompts.cv_content_system.clone(),
            user,
            temperature: TEMPERATURE,
        };

        let parsed = match self.backend.complete(&request).await {
            Ok(reply) => parse_cv_content(&reply),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(content) => {
                info!("Generated cover letter content");
                Recovered::ok(content)
            }
            Err(e) => {
                warn!("Cover letter content generation failed, using defaults: {}", e);
                Recovered::fallback(CvContent::default(), e)
            }
        }
    }
}

/// Parse the reply as JSON, then without code fences, then as the span from the first `{` to the last `}`.
pub fn parse_job_info(reply: &str) -> Result<JobInfo> {
    let reply = reply.trim();
    if let Ok(job_info) = serde_json::from_str(reply) {
        return Ok(job_info);
    }
    if let Ok(job_info) = serde_json::from_str(strip_json_fences(reply)) {
        return Ok(job_info);
    }

    let span = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if end > start => &reply[start..=end],
        _ => {
            return Err(AppError::ResponseParse(
                "reply contains no JSON object".to_string(),
            ))
        }
    };
    serde_json::from_str(span).map_err(|e| AppError::ResponseParse(format!("invalid job info JSON: {}", e)))
}

/// Strips ```json ... ``` or ``` ... ``` code fences.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}

/// Split a `about_me: … why_company: … why_me: …` reply into its three sections.
///
/// A missing or out-of-order marker, or an empty section, is an error.
pub fn parse_cv_content(reply: &str) -> Result<CvContent> {
    let company_at = reply
        .find(WHY_COMPANY_MARKER)
        .ok_or_else(|| missing_marker(WHY_COMPANY_MARKER))?;
    let company_end = company_at + WHY_COMPANY_MARKER.len();
    let me_at = reply[company_end..]
        .find(WHY_ME_MARKER)
        .map(|offset| company_end + offset)
        .ok_or_else(|| {
            if reply.contains(WHY_ME_MARKER) {
                AppError::ResponseParse(format!(
                    "'{}' appears before '{}'",
                    WHY_ME_MARKER, WHY_COMPANY_MARKER
                ))
            } else {
                missing_marker(WHY_ME_MARKER)
            }
        })?;

    let head = &reply[..company_at];
    let about_me = match head.find(ABOUT_ME_MARKER) {
        Some(at) => {
            let rest = head[at + ABOUT_ME_MARKER.len()..].trim_start();
            rest.strip_prefix(':').unwrap_or(rest)
        }
        None => head,
    };

    let content = CvContent {
        about_me: about_me.trim().to_string(),
        why_company: reply[company_end..me_at].trim().to_string(),
        why_me: reply[me_at + WHY_ME_MARKER.len()..].trim().to_string(),
    };

    for (name, section) in [
        ("about_me", &content.about_me),
        ("why_company", &content.why_company),
        ("why_me", &content.why_me),
    ] {
        if section.is_empty() {
            return Err(AppError::ResponseParse(format!("section '{}' is empty", name)));
        }
    }

    Ok(content)
}

fn missing_marker(marker: &str) -> AppError {
    AppError::ResponseParse(format!("reply has no '{}' section", marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CV_REPLY: &str = "about_me:\nSeasoned Rust engineer.\n\nwhy_company:\nAcme builds robots.\n\nwhy_me:\n• Shipped X\n• Scaled Y\n";

    #[test]
    fn test_parse_job_info_direct() {
        let job = parse_job_info(r#"{"company_name": "Acme", "position_title": "SRE"}"#).unwrap();
        assert_eq!(job.company_name, "Acme");
    }

    #[test]
    fn test_parse_job_info_brace_span_fallback() {
        let reply = "Sure! Here is the data:\n{\"company_name\": \"Initech\", \"hiring_manager_name\": \"Bill\"}\nLet me know.";
        let job = parse_job_info(reply).unwrap();
        assert_eq!(job.company_name, "Initech");
        assert_eq!(job.hiring_manager_name, "Bill");
    }

    #[test]
    fn test_parse_job_info_code_fence() {
        let reply = "```json\n{\"position_title\": \"Platform Engineer\"}\n```";
        assert_eq!(parse_job_info(reply).unwrap().position_title, "Platform Engineer");
    }

    #[test]
    fn test_parse_job_info_keeps_fields_next_to_null() {
        let reply = r#"{"company_name": "Acme", "position_title": "SRE", "hiring_manager_name": null, "required_skills": "• Go<br/>• Rust"}"#;
        let job = parse_job_info(reply).unwrap();
        assert_eq!(job.company_name, "Acme");
        assert_eq!(job.position_title, "SRE");
        assert_eq!(job.hiring_manager_name, "Hiring Manager");
        assert_eq!(job.first_skill(), "Go");
    }

    #[test]
    fn test_parse_job_info_failures() {
        assert!(parse_job_info("no json here").is_err());
        assert!(parse_job_info("} backwards {").is_err());
        assert!(parse_job_info("{\"company_name\": }").is_err());
    }

    #[test]
    fn test_parse_cv_content_sections() {
        let content = parse_cv_content(CV_REPLY).unwrap();
        assert_eq!(content.about_me, "Seasoned Rust engineer.");
        assert_eq!(content.why_company, "Acme builds robots.");
        assert_eq!(content.why_me, "• Shipped X\n• Scaled Y");
    }

    #[test]
    fn test_parse_cv_content_without_about_me_marker() {
        let content = parse_cv_content("Intro text.\nwhy_company: Mission.\nwhy_me: • A").unwrap();
        assert_eq!(content.about_me, "Intro text.");
        assert_eq!(content.why_company, "Mission.");
        assert_eq!(content.why_me, "• A");
    }

    #[test]
    fn test_parse_cv_content_missing_or_reordered_markers() {
        assert!(parse_cv_content("about_me: x\nwhy_me: y").is_err());
        assert!(parse_cv_content("about_me: x\nwhy_company: y").is_err());
        assert!(parse_cv_content("about_me: x\nwhy_me: z\nwhy_company: y").is_err());
        assert!(parse_cv_content("about_me: x\nwhy_company:\nwhy_me: z").is_err());
    }
}
