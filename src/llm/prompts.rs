//! Fixed instructions for the two extraction calls

use crate::error::Result;
use crate::processing::records::JobInfo;

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub job_info_system: String,
    pub job_info_user: String,
    pub cv_content_system: String,
    pub cv_content_user: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            job_info_system: JOB_INFO_SYSTEM.to_string(),
            job_info_user: JOB_INFO_USER.to_string(),
            cv_content_system: CV_CONTENT_SYSTEM.to_string(),
            cv_content_user: CV_CONTENT_USER.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn render_job_info(&self, job_description: &str, resume: &str) -> String {
        fill(
            &self.job_info_user,
            &[("{job}", job_description), ("{resume}", resume)],
        )
    }

    pub fn render_cv_content(&self, job_info: &JobInfo, resume: &str) -> Result<String> {
        let job_json = serde_json::to_string_pretty(job_info)?;
        Ok(fill(
            &self.cv_content_user,
            &[("{job_info}", &job_json), ("{resume}", resume)],
        ))
    }
}

/// Substitute every key in one left-to-right pass; inserted values are never rescanned.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((at, key, value)) = values
        .iter()
        .filter_map(|&(key, value)| rest.find(key).map(|at| (at, key, value)))
        .min_by_key(|&(at, _, _)| at)
    {
        output.push_str(&rest[..at]);
        output.push_str(value);
        rest = &rest[at + key.len()..];
    }
    output.push_str(rest);
    output
}

const JOB_INFO_SYSTEM: &str = r#"You are an expert AI career consultant. Your task is to:
1. Analyze the provided job description
2. Review the candidate's resume
3. Identify key matches and alignment between the two

Return a JSON object with the following structure:
{
    "company_name": "Name of the company",
    "position_title": "Title of the position",
    "hiring_manager_name": "Name if available, otherwise 'Hiring Manager'",
    "specific_work": "Brief description of specific work/responsibilities (1 sentence)",
    "required_skills": "Bullet points of 5-7 most important required skills, separated by <br/>",
    "company_mission": "Company mission or focus area from the description",
    "candidate_matches": "5 strongest matches between resume and job requirements, separated by <br/>"
}

Focus on technical skills, quantifiable achievements, and specific experience that directly relates to the role."#;

const JOB_INFO_USER: &str = r#"Job Description:
{job}

Candidate's Resume:
{resume}"#;

const CV_CONTENT_SYSTEM: &str = r#"You are an expert CV writer for tech industry applications.

Generate highly tailored CV content based on the candidate's resume and job details.

Your response must strictly follow this structure with exact section names, so it can be programmatically processed:

about_me:
A powerful opening statement highlighting relevant experience and achievements.
(Write content here)

why_company:
A compelling argument for why the candidate is interested in and suitable for this specific company.
(Write content here)

why_me:
5 specific bullet points showing concrete examples of how the candidate's experience matches the role.
• (Write bullet point 1 here)
• (Write bullet point 2 here)
• (Write bullet point 3 here)
• (Write bullet point 4 here)
• (Write bullet point 5 here)

Guidelines:
- Use active voice and specific metrics.
- Focus on achievements and impact.
- Make direct connections between past experience and job requirements.
- Be specific about technical skills and tools.
- Highlight relevant projects and their outcomes."#;

const CV_CONTENT_USER: &str = r#"Job Information:
{job_info}

Candidate's Resume:
{resume}"#;
