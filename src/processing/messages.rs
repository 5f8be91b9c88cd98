//! Follow-up email and networking message rendering from user templates

use crate::config::{Config, PersonalInfo, Templates};
use crate::error::{AppError, Recovered};
use crate::processing::records::{EmailContent, JobInfo, RenderedOutputs};
use crate::processing::template::{self, FieldLookup, TemplateError};
use log::warn;

/// LinkedIn connection requests are limited to this many characters.
pub const SHORT_MESSAGE_LIMIT: usize = 200;
const ELLIPSIS: &str = "...";

/// Every placeholder a template may use, with a short description.
pub const PLACEHOLDERS: &[(&str, &str)] = &[
    ("company_name", "Name of the company"),
    ("position_title", "Job title/position"),
    ("hiring_manager_name", "Hiring manager's name (defaults to 'Hiring Manager')"),
    ("specific_work", "Brief job description/responsibilities"),
    ("required_skills", "Required skills (first skill only in the LinkedIn message)"),
    ("company_mission", "Company's mission statement"),
    ("candidate_matches", "Matches between your resume and job requirements"),
    ("full_name", "Your full name"),
    ("location", "Your location"),
    ("phone", "Your phone number"),
    ("email", "Your email address"),
    ("linkedin", "Your LinkedIn URL"),
    ("portfolio", "Your portfolio URL"),
    ("github", "Your GitHub URL"),
];

fn placeholder_names() -> Vec<&'static str> {
    PLACEHOLDERS.iter().map(|(name, _)| *name).collect()
}

/// Job fields and personal fields in one lookup. The two name sets are disjoint.
fn field_lookup<'a>(job_info: &'a JobInfo, personal_info: &'a PersonalInfo) -> FieldLookup<'a> {
    job_info
        .fields()
        .into_iter()
        .chain(personal_info.fields())
        .collect()
}

/// Reject templates that reference placeholders outside [`PLACEHOLDERS`].
pub fn validate_templates(templates: &Templates) -> Result<(), TemplateError> {
    let allowed = placeholder_names();
    template::validate(&templates.email.subject, &allowed)?;
    template::validate(&templates.email.body, &allowed)?;
    template::validate(&templates.linkedin, &allowed)?;
    Ok(())
}

pub fn render_email(job_info: &JobInfo, config: &Config) -> Recovered<EmailContent> {
    let lookup = field_lookup(job_info, &config.personal_info);
    let templates = &config.templates.email;

    let rendered = template::render(&templates.subject, &lookup).and_then(|subject| {
        let body = template::render(&templates.body, &lookup)?;
        Ok(EmailContent { subject, body })
    });

    match rendered {
        Ok(email) => Recovered::ok(email),
        Err(e) => {
            warn!("Email template failed, using fallback: {}", e);
            Recovered::fallback(fallback_email(job_info, &config.personal_info), e.into())
        }
    }
}

fn fallback_email(job_info: &JobInfo, personal_info: &PersonalInfo) -> EmailContent {
    EmailContent {
        subject: format!("Follow-Up on {} Application", job_info.position_title),
        body: format!(
            "Hi {},\n\nFollowing up on my {} application.\n\nBest,\n{}",
            job_info.hiring_manager_name, job_info.position_title, personal_info.full_name
        ),
    }
}

/// Render the networking message; `{required_skills}` resolves to the first skill only.
pub fn render_short_message(job_info: &JobInfo, config: &Config) -> Recovered<String> {
    let mut lookup = field_lookup(job_info, &config.personal_info);
    lookup.insert("required_skills", job_info.first_skill());

    match template::render(&config.templates.linkedin, &lookup) {
        Ok(message) => Recovered::ok(cap_length(&message)),
        Err(e) => {
            warn!("LinkedIn template failed, using fallback: {}", e);
            let fallback = format!(
                "Hi! I'm interested in the {} role at {}. Looking forward to connecting!",
                job_info.position_title, job_info.company_name
            );
            Recovered::fallback(cap_length(&fallback), e.into())
        }
    }
}

/// Keep at most [`SHORT_MESSAGE_LIMIT`] characters, ending in `...` when cut.
pub fn cap_length(message: &str) -> String {
    if message.chars().count() <= SHORT_MESSAGE_LIMIT {
        return message.to_string();
    }
    let kept: String = message
        .chars()
        .take(SHORT_MESSAGE_LIMIT - ELLIPSIS.len())
        .collect();
    format!("{}{}", kept, ELLIPSIS)
}

/// Render both messages, returning any template errors that forced a fallback.
pub fn render_outputs(job_info: &JobInfo, config: &Config) -> (RenderedOutputs, Vec<AppError>) {
    let (email, email_error) = render_email(job_info, config).into_parts();
    let (short_message, message_error) = render_short_message(job_info, config).into_parts();

    let errors = email_error.into_iter().chain(message_error).collect();
    (RenderedOutputs { email, short_message }, errors)
}
