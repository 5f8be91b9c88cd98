//! Per-generation records: extracted job facts, cover letter narrative and rendered messages

use serde::{Deserialize, Serialize};

/// Separator between items of a list-valued field such as `required_skills`.
pub const LIST_DELIMITER: &str = "<br/>";
pub const BULLET: char = '•';

/// Structured facts extracted from a job description.
///
/// Missing or `null` fields in a model reply take the placeholder defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawJobInfo")]
pub struct JobInfo {
    pub company_name: String,
    pub position_title: String,
    pub hiring_manager_name: String,
    pub specific_work: String,
    pub required_skills: String,
    pub company_mission: String,
    pub candidate_matches: String,
}

impl Default for JobInfo {
    fn default() -> Self {
        Self {
            company_name: "Company Name".to_string(),
            position_title: "Position Title".to_string(),
            hiring_manager_name: "Hiring Manager".to_string(),
            specific_work: "contribute to the team's projects".to_string(),
            required_skills: join_bullets(["Required skill 1", "Required skill 2", "Required skill 3"]),
            company_mission: "company mission and values".to_string(),
            candidate_matches: join_bullets(["Match 1", "Match 2", "Match 3", "Match 4", "Match 5"]),
        }
    }
}

impl JobInfo {
    pub const FIELD_NAMES: [&'static str; 7] = [
        "company_name",
        "position_title",
        "hiring_manager_name",
        "specific_work",
        "required_skills",
        "company_mission",
        "candidate_matches",
    ];

    /// Field name/value pairs, named as they appear in templates.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("company_name", self.company_name.as_str()),
            ("position_title", self.position_title.as_str()),
            ("hiring_manager_name", self.hiring_manager_name.as_str()),
            ("specific_work", self.specific_work.as_str()),
            ("required_skills", self.required_skills.as_str()),
            ("company_mission", self.company_mission.as_str()),
            ("candidate_matches", self.candidate_matches.as_str()),
        ]
    }

    /// First entry of `required_skills`, bullet marker removed.
    pub fn first_skill(&self) -> &str {
        first_list_item(&self.required_skills)
    }
}

/// First item of a `"• a<br/>• b"` list with the bullet and surrounding spaces stripped.
pub fn first_list_item(list: &str) -> &str {
    list.split(LIST_DELIMITER)
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| c == BULLET || c == ' ')
}

fn join_bullets<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items
        .into_iter()
        .map(|item| {
            let item = item.trim();
            if item.starts_with(BULLET) {
                item.to_string()
            } else {
                format!("{} {}", BULLET, item)
            }
        })
        .collect::<Vec<_>>()
        .join(LIST_DELIMITER)
}

/// A field as the model may send it: the text we ask for, an array of items, or a bare scalar.
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Text(String),
    List(Vec<FieldValue>),
    Number(serde_json::Number),
    Bool(bool),
}

impl FieldValue {
    fn into_text(self) -> String {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Number(number) => number.to_string(),
            FieldValue::Bool(flag) => flag.to_string(),
            FieldValue::List(items) => {
                let items: Vec<String> = items.into_iter().map(FieldValue::into_text).collect();
                join_bullets(items.iter().map(String::as_str))
            }
        }
    }
}

#[derive(Deserialize)]
struct RawJobInfo {
    company_name: Option<FieldValue>,
    position_title: Option<FieldValue>,
    hiring_manager_name: Option<FieldValue>,
    specific_work: Option<FieldValue>,
    required_skills: Option<FieldValue>,
    company_mission: Option<FieldValue>,
    candidate_matches: Option<FieldValue>,
}

impl From<RawJobInfo> for JobInfo {
    fn from(raw: RawJobInfo) -> Self {
        let defaults = JobInfo::default();
        let or_default =
            |value: Option<FieldValue>, default: String| value.map(FieldValue::into_text).unwrap_or(default);

        Self {
            company_name: or_default(raw.company_name, defaults.company_name),
            position_title: or_default(raw.position_title, defaults.position_title),
            hiring_manager_name: or_default(raw.hiring_manager_name, defaults.hiring_manager_name),
            specific_work: or_default(raw.specific_work, defaults.specific_work),
            required_skills: or_default(raw.required_skills, defaults.required_skills),
            company_mission: or_default(raw.company_mission, defaults.company_mission),
            candidate_matches: or_default(raw.candidate_matches, defaults.candidate_matches),
        }
    }
}

/// Narrative sections of the cover letter. User editable after generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvContent {
    pub about_me: String,
    pub why_company: String,
    /// Newline separated bullet points.
    pub why_me: String,
}

impl Default for CvContent {
    fn default() -> Self {
        Self {
            about_me: "Default about me section".to_string(),
            why_company: "Default why company section".to_string(),
            why_me: (1..=5)
                .map(|n| format!("{} Default bullet point {}", BULLET, n))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedOutputs {
    pub email: EmailContent,
    pub short_message: String,
}

/// Everything produced by one "generate" trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub job_info: JobInfo,
    pub cv_content: CvContent,
    pub outputs: RenderedOutputs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_skill() {
        let job = JobInfo {
            required_skills: "• Go<br/>• Rust<br/>• C++".to_string(),
            ..JobInfo::default()
        };
        assert_eq!(job.first_skill(), "Go");
        assert_eq!(first_list_item("Kubernetes"), "Kubernetes");
        assert_eq!(first_list_item(""), "");
    }

    #[test]
    fn test_job_info_missing_fields_use_placeholders() {
        let job: JobInfo =
            serde_json::from_str(r#"{"company_name": "Acme", "position_title": "SRE"}"#).unwrap();
        assert_eq!(job.company_name, "Acme");
        assert_eq!(job.position_title, "SRE");
        assert_eq!(job.hiring_manager_name, "Hiring Manager");
        assert_eq!(job.required_skills, JobInfo::default().required_skills);
    }

    #[test]
    fn test_job_info_null_and_scalar_fields() {
        let job: JobInfo = serde_json::from_str(
            r#"{"company_name": "Acme", "position_title": "SRE", "hiring_manager_name": null,
                "specific_work": 42, "required_skills": ["Rust", 3], "company_mission": true,
                "candidate_matches": null}"#,
        )
        .unwrap();
        assert_eq!(job.company_name, "Acme");
        assert_eq!(job.position_title, "SRE");
        assert_eq!(job.hiring_manager_name, "Hiring Manager");
        assert_eq!(job.specific_work, "42");
        assert_eq!(job.required_skills, "• Rust<br/>• 3");
        assert_eq!(job.company_mission, "true");
        assert_eq!(job.candidate_matches, JobInfo::default().candidate_matches);
    }

    #[test]
    fn test_job_info_accepts_list_fields() {
        let job: JobInfo = serde_json::from_str(
            r#"{"required_skills": ["Rust", "• Tokio"], "candidate_matches": "• Built things"}"#,
        )
        .unwrap();
        assert_eq!(job.required_skills, "• Rust<br/>• Tokio");
        assert_eq!(job.candidate_matches, "• Built things");
    }

    #[test]
    fn test_default_placeholders() {
        let job = JobInfo::default();
        assert_eq!(
            job.required_skills,
            "• Required skill 1<br/>• Required skill 2<br/>• Required skill 3"
        );
        assert_eq!(job.first_skill(), "Required skill 1");

        let cv = CvContent::default();
        assert_eq!(cv.why_me.lines().count(), 5);
        assert!(cv.why_me.starts_with("• Default bullet point 1"));
    }
}
