//! `{field}` placeholder substitution with a fixed set of allowed names
//!
//! `{{` and `}}` produce literal braces. Any placeholder whose name is not in
//! the lookup is rejected, as are unbalanced braces.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("empty placeholder {{}} at byte {0}")]
    EmptyPlaceholder(usize),

    #[error("unclosed '{{' at byte {0}")]
    UnclosedBrace(usize),

    #[error("unmatched '}}' at byte {0}")]
    UnmatchedClosingBrace(usize),
}

/// Values available to a template, keyed by placeholder name.
pub type FieldLookup<'a> = HashMap<&'static str, &'a str>;

#[derive(Debug, PartialEq)]
enum Piece<'t> {
    Literal(&'t str),
    Field(&'t str),
}

fn parse(template: &str) -> Result<Vec<Piece<'_>>, TemplateError> {
    let mut pieces = Vec::new();
    let bytes = template.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                pieces.push(Piece::Literal(&template[literal_start..=i]));
                i += 2;
                literal_start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                pieces.push(Piece::Literal(&template[literal_start..=i]));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let close = template[i + 1..]
                    .find(|c: char| c == '}' || c == '{')
                    .map(|offset| i + 1 + offset)
                    .filter(|&end| bytes[end] == b'}')
                    .ok_or(TemplateError::UnclosedBrace(i))?;
                let name = &template[i + 1..close];
                if name.is_empty() {
                    return Err(TemplateError::EmptyPlaceholder(i));
                }
                pieces.push(Piece::Literal(&template[literal_start..i]));
                pieces.push(Piece::Field(name));
                i = close + 1;
                literal_start = i;
            }
            b'}' => return Err(TemplateError::UnmatchedClosingBrace(i)),
            _ => i += 1,
        }
    }
    pieces.push(Piece::Literal(&template[literal_start..]));
    pieces.retain(|piece| !matches!(piece, Piece::Literal("")));

    Ok(pieces)
}

/// Placeholder names referenced by `template`, in order of appearance.
pub fn placeholders(template: &str) -> Result<Vec<&str>, TemplateError> {
    Ok(parse(template)?
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Field(name) => Some(name),
            Piece::Literal(_) => None,
        })
        .collect())
}

/// Check every placeholder of `template` against `allowed`.
pub fn validate(template: &str, allowed: &[&str]) -> Result<(), TemplateError> {
    for name in placeholders(template)? {
        if !allowed.contains(&name) {
            return Err(TemplateError::UnknownPlaceholder(name.to_string()));
        }
    }
    Ok(())
}

/// Substitute every placeholder of `template` from `lookup`.
pub fn render(template: &str, lookup: &FieldLookup<'_>) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    for piece in parse(template)? {
        match piece {
            Piece::Literal(text) => output.push_str(text),
            Piece::Field(name) => {
                let value = lookup
                    .get(name)
                    .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
                output.push_str(value);
            }
        }
    }
    Ok(output)
}
