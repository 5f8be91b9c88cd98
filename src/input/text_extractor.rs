//! Text extraction from uploaded resume files

use crate::error::{AppError, Result};
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Text of each page, in page order.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| AppError::PdfExtraction(e.to_string()))
}

/// Page texts concatenated, each followed by a line break.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let mut text = String::new();
    for page in extract_pdf_pages(bytes)? {
        text.push_str(&page);
        text.push('\n');
    }
    Ok(text)
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        extract_pdf_text(&bytes).map_err(|e| {
            AppError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
        })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        markdown_to_text(&markdown_content)
    }
}

/// Render markdown to HTML and strip the tags, one non-empty line per block.
pub fn markdown_to_text(markdown: &str) -> Result<String> {
    let parser = Parser::new(markdown);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    let text = html_output
        .replace("<br>", "\n")
        .replace("<br />", "\n")
        .replace("</p>", "\n\n")
        .replace("</li>", "\n")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let tags = Regex::new(r"<[^>]*>")
        .map_err(|e| AppError::InvalidInput(format!("Bad tag pattern: {}", e)))?;
    let clean_text = tags.replace_all(&text, "").replace("&amp;", "&");

    let lines: Vec<&str> = clean_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_text_strips_formatting() {
        let text = markdown_to_text("# Jane Doe\n\n**Rust** engineer & mentor\n\n- Tokio\n- Axum\n").unwrap();
        assert_eq!(text, "Jane Doe\nRust engineer & mentor\nTokio\nAxum");
    }

    #[test]
    fn test_pdf_pages_each_end_with_line_break() {
        use crate::config::PersonalInfo;
        use crate::output::layout::compose;
        use crate::output::pdf::PdfRenderer;
        use crate::processing::records::{CvContent, JobInfo};

        let cv = CvContent {
            why_me: (0..120).map(|n| format!("marker{:03}", n)).collect::<Vec<_>>().join("\n"),
            ..CvContent::default()
        };
        let letter = compose(
            &JobInfo::default(),
            &cv,
            &PersonalInfo::default(),
            chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        );
        let renderer = PdfRenderer::default();
        let page_count = renderer.paginate(&letter).len();
        assert!(page_count >= 2);
        let bytes = renderer.render(&letter).unwrap();

        let pages = extract_pdf_pages(&bytes).unwrap();
        assert_eq!(pages.len(), page_count);
        assert!(pages[0].contains("marker000"));
        assert!(pages[page_count - 1].contains("marker119"));

        let text = extract_pdf_text(&bytes).unwrap();
        let expected: String = pages.iter().map(|page| format!("{}\n", page)).collect();
        assert_eq!(text, expected);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_invalid_pdf_bytes_are_an_error() {
        let err = extract_pdf_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, AppError::PdfExtraction(_)));
    }
}
