//! PDF rendering of a [`CoverLetter`] with printpdf
//!
//! Layout happens in points on a US-letter page with PDF's bottom-left
//! origin. [`PdfRenderer::paginate`] places every word; [`PdfRenderer::render`]
//! draws the placed words with the builtin Helvetica faces.

use crate::error::{AppError, Result};
use crate::output::font_metrics::Face;
use crate::output::layout::{Align, Block, CoverLetter, Span, TextStyle};
use log::debug;
use printpdf::{
    Actions, BuiltinFont, Color, IndirectFontRef, Line, LinkAnnotation, Mm, PdfDocument,
    PdfLayerReference, Point, Rect, Rgb,
};

pub const LETTER_WIDTH: f32 = 612.0;
pub const LETTER_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 50.0;

const UNDERLINE_OFFSET: f32 = 1.5;
const UNDERLINE_THICKNESS: f32 = 0.5;

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

/// One word at its final position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub x: f32,
    /// Baseline.
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub face: Face,
    pub link: Option<String>,
    pub underline: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub words: Vec<PlacedWord>,
}

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    page_width: f32,
    page_height: f32,
    margin: f32,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self {
            page_width: LETTER_WIDTH,
            page_height: LETTER_HEIGHT,
            margin: MARGIN,
        }
    }
}

#[derive(Debug, Clone)]
enum Token {
    Word { text: String, link: Option<String> },
    Break,
}

#[derive(Debug, Clone)]
struct LineWord {
    text: String,
    width: f32,
    link: Option<String>,
}

/// Cursor over the pages being filled.
struct PageCursor<'a> {
    renderer: &'a PdfRenderer,
    pages: Vec<PageLayout>,
    y: f32,
}

impl<'a> PageCursor<'a> {
    fn new(renderer: &'a PdfRenderer) -> Self {
        Self {
            renderer,
            pages: vec![PageLayout::default()],
            y: renderer.top(),
        }
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.y = self.renderer.top();
    }

    /// Reserve `height` points, breaking the page when they do not fit.
    fn reserve(&mut self, height: f32) -> f32 {
        if self.y - height < self.renderer.margin && self.y < self.renderer.top() {
            self.new_page();
        }
        let top = self.y;
        self.y -= height;
        top
    }

    fn skip(&mut self, height: f32) {
        self.y -= height;
        if self.y < self.renderer.margin {
            self.new_page();
        }
    }

    fn place(&mut self, word: PlacedWord) {
        if let Some(page) = self.pages.last_mut() {
            page.words.push(word);
        }
    }
}

impl PdfRenderer {
    pub fn new(page_width: f32, page_height: f32, margin: f32) -> Self {
        Self {
            page_width,
            page_height,
            margin,
        }
    }

    fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Place every word of `letter` on as many pages as it needs.
    pub fn paginate(&self, letter: &CoverLetter) -> Vec<PageLayout> {
        let mut cursor = PageCursor::new(self);

        for block in &letter.blocks {
            match block {
                Block::Spacer(height) => cursor.skip(*height),
                Block::Row { left, right } => {
                    let style = TextStyle::Body;
                    let top = cursor.reserve(style.leading());
                    let baseline = top - style.font_size();
                    let left = to_builtin_charset(left);
                    let right = to_builtin_charset(right);
                    let right_width = Face::Regular.text_width(&right, style.font_size());

                    for (text, x) in [
                        (left, self.margin),
                        (right, self.page_width - self.margin - right_width),
                    ] {
                        cursor.place(PlacedWord {
                            width: Face::Regular.text_width(&text, style.font_size()),
                            text,
                            x,
                            y: baseline,
                            font_size: style.font_size(),
                            face: Face::Regular,
                            link: None,
                            underline: false,
                        });
                    }
                }
                Block::Paragraph {
                    spans,
                    style,
                    align,
                    underline,
                } => self.place_paragraph(&mut cursor, spans, *style, *align, *underline),
            }
        }

        cursor.pages
    }

    fn place_paragraph(
        &self,
        cursor: &mut PageCursor<'_>,
        spans: &[Span],
        style: TextStyle,
        align: Align,
        underline: bool,
    ) {
        let face = if style.is_bold() { Face::Bold } else { Face::Regular };
        let size = style.font_size();
        let space = face.text_width(" ", size);
        let (space_before, space_after) = style.spacing();

        cursor.skip(space_before);
        for line in self.wrap(&tokenize(spans), face, size) {
            let top = cursor.reserve(style.leading());
            let baseline = top - size;
            let line_width: f32 =
                line.iter().map(|w| w.width).sum::<f32>() + space * line.len().saturating_sub(1) as f32;
            let mut x = match align {
                Align::Left => self.margin,
                Align::Center => self.margin + (self.content_width() - line_width).max(0.0) / 2.0,
            };

            for word in line {
                let advance = word.width + space;
                cursor.place(PlacedWord {
                    underline: underline || word.link.is_some(),
                    text: word.text,
                    x,
                    y: baseline,
                    width: word.width,
                    font_size: size,
                    face,
                    link: word.link,
                });
                x += advance;
            }
        }
        cursor.skip(space_after);
    }

    /// Greedy word wrap; a word wider than the line is split across lines.
    fn wrap(&self, tokens: &[Token], face: Face, size: f32) -> Vec<Vec<LineWord>> {
        let max_width = self.content_width();
        let space = face.text_width(" ", size);
        let mut lines = Vec::new();
        let mut current: Vec<LineWord> = Vec::new();
        let mut current_width = 0.0;

        for token in tokens {
            let (text, link) = match token {
                Token::Break => {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                    continue;
                }
                Token::Word { text, link } => (text, link),
            };

            for piece in split_to_width(text, face, size, max_width) {
                let width = face.text_width(&piece, size);
                let needed = if current.is_empty() { width } else { current_width + space + width };
                if needed > max_width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = width;
                } else {
                    current_width = needed;
                }
                current.push(LineWord {
                    text: piece,
                    width,
                    link: link.clone(),
                });
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Render `letter` to PDF bytes.
    pub fn render(&self, letter: &CoverLetter) -> Result<Vec<u8>> {
        let pages = self.paginate(letter);
        debug!("Rendering cover letter on {} page(s)", pages.len());

        let (doc, first_page, first_layer) = PdfDocument::new(
            to_builtin_charset(&letter.title),
            mm(self.page_width),
            mm(self.page_height),
            "Page 1",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::DocumentRender(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::DocumentRender(e.to_string()))?;

        for (index, page) in pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let name = format!("Page {}", index + 1);
                let (page_index, layer_index) =
                    doc.add_page(mm(self.page_width), mm(self.page_height), name);
                doc.get_page(page_index).get_layer(layer_index)
            };

            for word in &page.words {
                let font = match word.face {
                    Face::Regular => &regular,
                    Face::Bold => &bold,
                };
                draw_word(&layer, word, font);
            }
        }

        doc.save_to_bytes()
            .map_err(|e| AppError::DocumentRender(e.to_string()))
    }
}

/// Render `letter` on US-letter pages with the default margins.
pub fn render_pdf(letter: &CoverLetter) -> Result<Vec<u8>> {
    PdfRenderer::default().render(letter)
}

fn draw_word(layer: &PdfLayerReference, word: &PlacedWord, font: &IndirectFontRef) {
    let color = if word.link.is_some() {
        Color::Rgb(Rgb::new(0.0, 0.0, 1.0, None))
    } else {
        Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
    };

    layer.set_fill_color(color.clone());
    layer.use_text(word.text.clone(), word.font_size, mm(word.x), mm(word.y), font);

    if word.underline {
        let y = word.y - UNDERLINE_OFFSET;
        layer.set_outline_color(color);
        layer.set_outline_thickness(UNDERLINE_THICKNESS);
        layer.add_line(Line {
            points: vec![
                (Point::new(mm(word.x), mm(y)), false),
                (Point::new(mm(word.x + word.width), mm(y)), false),
            ],
            is_closed: false,
        });
    }

    if let Some(target) = &word.link {
        let rect = Rect::new(
            mm(word.x),
            mm(word.y - UNDERLINE_OFFSET * 2.0),
            mm(word.x + word.width),
            mm(word.y + word.font_size),
        );
        layer.add_link_annotation(LinkAnnotation::new(
            rect,
            None,
            None,
            Actions::uri(target.clone()),
            None,
        ));
    }
}

fn tokenize(spans: &[Span]) -> Vec<Token> {
    let mut tokens = Vec::new();
    for span in spans {
        for (index, segment) in span.text.split('\n').enumerate() {
            if index > 0 {
                tokens.push(Token::Break);
            }
            tokens.extend(segment.split_whitespace().map(|word| Token::Word {
                text: to_builtin_charset(word),
                link: span.link.clone(),
            }));
        }
    }
    tokens
}

fn split_to_width(word: &str, face: Face, size: f32, max_width: f32) -> Vec<String> {
    if face.text_width(word, size) <= max_width {
        return vec![word.to_string()];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        piece.push(c);
        if face.text_width(&piece, size) > max_width && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Map text onto the ASCII range the builtin fonts render reliably.
pub fn to_builtin_charset(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c),
            '\t' | '\u{a0}' | '\u{2002}'..='\u{200a}' => out.push(' '),
            '•' | '‣' | '◦' | '▪' | '–' | '—' | '‐' | '‑' | '−' => out.push('-'),
            '‘' | '’' | '‚' | '′' => out.push('\''),
            '“' | '”' | '„' | '″' => out.push('"'),
            '…' => out.push_str("..."),
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => out.push('a'),
            'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => out.push('A'),
            'ç' => out.push('c'),
            'Ç' => out.push('C'),
            'è' | 'é' | 'ê' | 'ë' => out.push('e'),
            'È' | 'É' | 'Ê' | 'Ë' => out.push('E'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'Ì' | 'Í' | 'Î' | 'Ï' => out.push('I'),
            'ñ' => out.push('n'),
            'Ñ' => out.push('N'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => out.push('o'),
            'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => out.push('O'),
            'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
            'Ù' | 'Ú' | 'Û' | 'Ü' => out.push('U'),
            'ý' | 'ÿ' => out.push('y'),
            'Ý' => out.push('Y'),
            'ß' => out.push_str("ss"),
            c if c.is_control() => {}
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PersonalInfo;
    use crate::output::layout::compose;
    use crate::processing::records::{CvContent, JobInfo};
    use chrono::NaiveDate;

    fn letter(cv: CvContent) -> CoverLetter {
        compose(
            &JobInfo::default(),
            &cv,
            &PersonalInfo::default(),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        )
    }

    #[test]
    fn test_words_stay_inside_margins() {
        let cv = CvContent {
            about_me: "word ".repeat(400),
            ..CvContent::default()
        };
        let renderer = PdfRenderer::default();
        for page in renderer.paginate(&letter(cv)) {
            for word in &page.words {
                assert!(word.x >= MARGIN - 0.01, "{:?}", word);
                assert!(word.x + word.width <= LETTER_WIDTH - MARGIN + 0.01, "{:?}", word);
                assert!(word.y >= MARGIN - 0.01, "{:?}", word);
                assert!(word.y <= LETTER_HEIGHT - MARGIN, "{:?}", word);
            }
        }
    }

    #[test]
    fn test_long_content_spills_onto_more_pages() {
        let short = PdfRenderer::default().paginate(&letter(CvContent::default()));
        assert_eq!(short.len(), 1);

        let cv = CvContent {
            why_me: (0..120).map(|n| format!("• Bullet {}", n)).collect::<Vec<_>>().join("\n"),
            ..CvContent::default()
        };
        let long = PdfRenderer::default().paginate(&letter(cv));
        assert!(long.len() >= 2);
    }

    #[test]
    fn test_date_is_right_aligned() {
        let pages = PdfRenderer::default().paginate(&letter(CvContent::default()));
        let date = pages[0]
            .words
            .iter()
            .find(|w| w.text == "October 18, 2026")
            .unwrap();
        assert!((date.x + date.width - (LETTER_WIDTH - MARGIN)).abs() < 0.01);
    }

    #[test]
    fn test_links_are_underlined() {
        let pages = PdfRenderer::default().paginate(&letter(CvContent::default()));
        let linked: Vec<&PlacedWord> = pages[0].words.iter().filter(|w| w.link.is_some()).collect();
        assert_eq!(linked.len(), 4);
        assert!(linked.iter().all(|w| w.underline));
        assert_eq!(linked[3].link.as_deref(), Some("mailto:email@example.com"));
    }

    #[test]
    fn test_overlong_word_is_split() {
        let renderer = PdfRenderer::default();
        let tokens = vec![Token::Word {
            text: "x".repeat(500),
            link: None,
        }];
        let lines = renderer.wrap(&tokens, Face::Regular, 10.0);
        assert!(lines.len() > 1);
        for line in lines {
            assert!(line[0].width <= renderer.content_width());
        }
    }

    #[test]
    fn test_builtin_charset() {
        assert_eq!(to_builtin_charset("• José’s “CV” — 2026…"), "- Jose's \"CV\" - 2026...");
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = PdfRenderer::default().render(&letter(CvContent::default())).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
