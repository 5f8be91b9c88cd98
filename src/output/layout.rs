//! Cover letter layout as an ordered list of blocks
//!
//! Composition is independent of the PDF backend so the structure can be
//! inspected directly; [`crate::output::pdf`] turns it into pages.

use crate::config::PersonalInfo;
use crate::processing::records::{CvContent, JobInfo};
use chrono::NaiveDate;

/// Full month name, zero-padded day, four digit year: `October 05, 2026`.
pub const DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextStyle {
    Title,
    Body,
    Strong,
    SubHeading,
}

impl TextStyle {
    pub fn font_size(self) -> f32 {
        match self {
            TextStyle::Title => 18.0,
            TextStyle::SubHeading => 12.0,
            TextStyle::Body | TextStyle::Strong => 10.0,
        }
    }

    pub fn leading(self) -> f32 {
        match self {
            TextStyle::Title => 22.0,
            TextStyle::SubHeading => 14.4,
            TextStyle::Body | TextStyle::Strong => 12.0,
        }
    }

    /// Extra space above and below the block, in points.
    pub fn spacing(self) -> (f32, f32) {
        match self {
            TextStyle::Title => (0.0, 6.0),
            TextStyle::SubHeading => (12.0, 6.0),
            TextStyle::Body | TextStyle::Strong => (0.0, 0.0),
        }
    }

    pub fn is_bold(self) -> bool {
        !matches!(self, TextStyle::Body)
    }
}

/// A run of text, optionally a hyperlink. A `\n` inside `text` is a hard line break.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub link: Option<String>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
        }
    }

    pub fn link(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: Some(target.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph {
        spans: Vec<Span>,
        style: TextStyle,
        align: Align,
        underline: bool,
    },
    /// Two half-width cells, left cell left-aligned and right cell right-aligned.
    Row { left: String, right: String },
    Spacer(f32),
}

impl Block {
    fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Block::Paragraph {
            spans: vec![Span::plain(text)],
            style,
            align: Align::Left,
            underline: false,
        }
    }

    fn centered(spans: Vec<Span>, style: TextStyle) -> Self {
        Block::Paragraph {
            spans,
            style,
            align: Align::Center,
            underline: false,
        }
    }

    /// Plain text of a paragraph, `None` for rows and spacers.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Block::Paragraph { spans, .. } => Some(spans.iter().map(|s| s.text.as_str()).collect()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverLetter {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl CoverLetter {
    /// Section headings in document order.
    pub fn section_titles(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph {
                    style: TextStyle::SubHeading,
                    ..
                } => block.plain_text(),
                _ => None,
            })
            .collect()
    }

    /// Every hyperlink target in document order.
    pub fn links(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .flat_map(|block| match block {
                Block::Paragraph { spans, .. } => spans.as_slice(),
                _ => &[],
            })
            .filter_map(|span| span.link.as_deref())
            .collect()
    }
}

/// Lay out the cover letter for `date`.
pub fn compose(
    job_info: &JobInfo,
    cv_content: &CvContent,
    personal_info: &PersonalInfo,
    date: NaiveDate,
) -> CoverLetter {
    let mut blocks = vec![
        Block::centered(vec![Span::plain(&personal_info.full_name)], TextStyle::Title),
        Block::centered(vec![Span::plain(&personal_info.location)], TextStyle::Body),
        Block::Spacer(5.0),
        Block::centered(contact_line(personal_info), TextStyle::Body),
        Block::Spacer(30.0),
        Block::Row {
            left: format!("{} Recruitment Team", job_info.company_name),
            right: date.format(DATE_FORMAT).to_string(),
        },
        Block::Spacer(30.0),
        Block::Paragraph {
            spans: vec![Span::plain(format!(
                "Job application for {}",
                job_info.position_title
            ))],
            style: TextStyle::Strong,
            align: Align::Left,
            underline: true,
        },
        Block::Spacer(20.0),
        Block::text(format!("Dear {},", job_info.hiring_manager_name), TextStyle::Body),
        Block::Spacer(5.0),
    ];

    let sections = [
        ("About Me".to_string(), collapse_whitespace(&cv_content.about_me)),
        (
            format!("Why {}?", job_info.company_name),
            collapse_whitespace(&cv_content.why_company),
        ),
        ("Why Me?".to_string(), keep_line_breaks(&cv_content.why_me)),
    ];
    for (title, body) in sections {
        blocks.push(Block::text(title, TextStyle::SubHeading));
        blocks.push(Block::text(body, TextStyle::Body));
        blocks.push(Block::Spacer(10.0));
    }

    blocks.push(Block::Spacer(20.0));
    blocks.push(Block::text("Sincerely,", TextStyle::Body));
    blocks.push(Block::text(&personal_info.full_name, TextStyle::Body));

    CoverLetter {
        title: format!(
            "{} - Cover Letter for {}",
            personal_info.full_name, job_info.position_title
        ),
        blocks,
    }
}

fn contact_line(personal_info: &PersonalInfo) -> Vec<Span> {
    let separator = || Span::plain(" | ");
    vec![
        Span::plain(&personal_info.phone),
        separator(),
        Span::link("LinkedIn", &personal_info.linkedin),
        separator(),
        Span::link("Portfolio", &personal_info.portfolio),
        separator(),
        Span::link("Github", &personal_info.github),
        separator(),
        Span::link(&personal_info.email, format!("mailto:{}", personal_info.email)),
    ]
}

/// Paragraph text flows: runs of whitespace, newlines included, become one space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn keep_line_breaks(text: &str) -> String {
    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
