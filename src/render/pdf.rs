//! PDF painter
//!
//! Writes a `DocumentLayout` into a PDF with the built-in Helvetica faces,
//! so no font files are needed at runtime.

use crate::render::layout::{DocumentLayout, TextStyle, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

const LAYER_NAME: &str = "Text";

/// Paints `layout` and returns the serialized PDF
pub fn paint(title: &str, layout: &DocumentLayout) -> Result<Vec<u8>, String> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| e.to_string())?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| e.to_string())?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            let font: &IndirectFontRef = match line.style {
                TextStyle::Title | TextStyle::Heading => &bold,
                TextStyle::Body => &regular,
            };
            layer.use_text(
                to_win_ansi(&line.text),
                line.style.font_size(),
                Mm(line.x_mm),
                Mm(line.y_mm),
                font,
            );
        }
    }

    doc.save_to_bytes().map_err(|e| e.to_string())
}

/// Characters WinAnsiEncoding places in 0x80..=0x9F
const WIN_ANSI_EXTRAS: &[char] = &[
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•',
    '–', '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// Replaces characters the built-in fonts cannot encode with `?`
///
/// Printable ASCII, Latin-1 (U+00A0 to U+00FF) and the WinAnsi extras pass
/// through unchanged.
fn to_win_ansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{00A0}'..='\u{00FF}' => c,
            c if WIN_ANSI_EXTRAS.contains(&c) => c,
            _ => '?',
        })
        .collect()
}
