//! Page layout for rendered documents
//!
//! Turns an extraction record into word-wrapped lines placed on A4 pages.
//! Coordinates are in millimetres from the bottom-left corner, as PDF
//! expects. Glyph widths are estimated from an average Helvetica advance,
//! which is close enough for wrapping.

use crate::extract::ExtractionRecord;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;

const PT_TO_MM: f32 = 0.3528;
const AVG_GLYPH_EM: f32 = 0.5;
const LINE_SPACING: f32 = 1.25;

pub const DOCUMENT_TITLE: &str = "Extracted Data";
pub const URL_HEADING: &str = "URL:";
pub const HEADERS_HEADING: &str = "Headers:";
pub const PARAGRAPHS_HEADING: &str = "Paragraphs:";
pub const PAYLOAD_HEADING: &str = "Crawled Data:";
pub const BLOCK_TEXTS_HEADING: &str = "Div Texts:";
pub const INLINE_TEXTS_HEADING: &str = "Span Texts:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Heading,
    Body,
}

impl TextStyle {
    pub fn font_size(&self) -> f32 {
        match self {
            Self::Title => 20.0,
            Self::Heading => 16.0,
            Self::Body => 12.0,
        }
    }

    fn line_height_mm(&self) -> f32 {
        self.font_size() * PT_TO_MM * LINE_SPACING
    }

    fn glyph_width_mm(&self) -> f32 {
        self.font_size() * PT_TO_MM * AVG_GLYPH_EM
    }

    /// Characters that fit on one line of the printable width
    fn max_chars(&self) -> usize {
        let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        ((usable / self.glyph_width_mm()) as usize).max(1)
    }
}

/// One line of text at a fixed position
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub style: TextStyle,
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All line texts in reading order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|page| page.lines.iter())
            .map(|line| line.text.as_str())
    }

    /// Returns true if some line is exactly `text`
    pub fn has_line(&self, text: &str) -> bool {
        self.texts().any(|line| line == text)
    }
}

/// A titled list of entries
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: &'static str,
    pub items: Vec<String>,
}

/// Builds the document sections in their fixed order
///
/// The URL section is always present; every other section appears only when
/// it has at least one item.
pub fn sections(record: &ExtractionRecord) -> Vec<Section> {
    let mut sections = vec![Section {
        heading: URL_HEADING,
        items: vec![record.source_url.to_string()],
    }];

    push_non_empty(&mut sections, HEADERS_HEADING, &record.headers);
    push_non_empty(&mut sections, PARAGRAPHS_HEADING, &record.paragraphs);

    if !record.structured_payload.is_empty() {
        // Serializing a Vec<Value> cannot fail
        let payload = serde_json::to_string(&record.structured_payload).unwrap_or_default();
        sections.push(Section {
            heading: PAYLOAD_HEADING,
            items: vec![payload],
        });
    }

    push_non_empty(&mut sections, BLOCK_TEXTS_HEADING, &record.block_texts);
    push_non_empty(&mut sections, INLINE_TEXTS_HEADING, &record.inline_texts);

    sections
}

fn push_non_empty(sections: &mut Vec<Section>, heading: &'static str, items: &[String]) {
    if !items.is_empty() {
        sections.push(Section {
            heading,
            items: items.to_vec(),
        });
    }
}

/// Lays the record out on pages
pub fn layout(record: &ExtractionRecord) -> DocumentLayout {
    let mut cursor = Cursor::new();

    let title_width = DOCUMENT_TITLE.chars().count() as f32 * TextStyle::Title.glyph_width_mm();
    cursor.place(
        TextStyle::Title,
        DOCUMENT_TITLE.to_string(),
        ((PAGE_WIDTH_MM - title_width) / 2.0).max(MARGIN_MM),
    );
    cursor.gap();

    for section in sections(record) {
        cursor.place(TextStyle::Heading, section.heading.to_string(), MARGIN_MM);
        for item in &section.items {
            for line in wrap(item, TextStyle::Body.max_chars()) {
                cursor.place(TextStyle::Body, line, MARGIN_MM);
            }
        }
        cursor.gap();
    }

    cursor.finish()
}

/// Tracks the write position and starts new pages on overflow
struct Cursor {
    pages: Vec<PageLayout>,
    current: PageLayout,
    y_mm: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: PageLayout::default(),
            y_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    fn place(&mut self, style: TextStyle, text: String, x_mm: f32) {
        let height = style.line_height_mm();
        if self.y_mm - height < MARGIN_MM && !self.current.lines.is_empty() {
            self.break_page();
        }
        self.y_mm -= height;
        self.current.lines.push(PlacedLine {
            style,
            text,
            x_mm,
            y_mm: self.y_mm,
        });
    }

    /// Blank line between sections
    fn gap(&mut self) {
        self.y_mm -= TextStyle::Body.line_height_mm();
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y_mm = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn finish(mut self) -> DocumentLayout {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        DocumentLayout { pages: self.pages }
    }
}

/// Greedy word wrap; words longer than a line are split
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
        if needed > max_chars {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.extend(word.iter());
        line_len += word.len();
    }

    if line_len > 0 {
        lines.push(line);
    }
    lines
}
