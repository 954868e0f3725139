use std::io::Cursor;

use anyhow::Context;
use printpdf::{
    image_crate::codecs::{jpeg::JpegDecoder, png::PngDecoder},
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use tracing::{debug, warn};

use super::{wrap_text, ExportDocument, PhotoFormat, PhotoInfo};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const PT_TO_MM: f32 = 0.352_8;
/// Helvetica averages roughly half an em per glyph.
const AVG_CHAR_EM: f32 = 0.5;

const TITLE_PT: f32 = 20.0;
const HEADING_PT: f32 = 13.0;
const BODY_PT: f32 = 10.5;
const LINE_SPACING: f32 = 1.4;
const PHOTO_WIDTH_MM: f32 = 35.0;

fn line_height_mm(size_pt: f32) -> f32 {
    size_pt * LINE_SPACING * PT_TO_MM
}

/// Characters that fit on one line at `size_pt`.
fn char_budget(width_mm: f32, size_pt: f32) -> usize {
    (width_mm / (size_pt * PT_TO_MM) / AVG_CHAR_EM).floor() as usize
}

/// Builtin fonts only cover WinAnsi; other characters become `?`.
fn to_win_ansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if (' '..='~').contains(&c) || ('\u{a0}'..='\u{ff}').contains(&c) => c,
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            _ => '?',
        })
        .collect()
}

/// Top-down writer that starts a new page when the current one is full.
struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PageCursor {
    fn new(title: &str) -> anyhow::Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            to_win_ansi(title),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1".to_string(),
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow::anyhow!("{:?}", e))
            .context("load Helvetica")?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow::anyhow!("{:?}", e))
            .context("load Helvetica-Bold")?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        })
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height >= MARGIN_MM {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn write_lines(&mut self, text: &str, size_pt: f32, bold: bool, width_mm: f32) {
        let height = line_height_mm(size_pt);
        for line in wrap_text(&to_win_ansi(text), char_budget(width_mm, size_pt)) {
            self.ensure_space(height);
            self.y -= height;
            let font = if bold { &self.bold } else { &self.regular };
            self.layer
                .use_text(line, size_pt, Mm(MARGIN_MM), Mm(self.y), font);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    /// Places the photo in the top-right corner of the first page.
    fn place_photo(&mut self, bytes: &[u8], info: PhotoInfo) -> anyhow::Result<f32> {
        let image = match info.format {
            PhotoFormat::Jpeg => Image::try_from(JpegDecoder::new(Cursor::new(bytes))?)?,
            PhotoFormat::Png => Image::try_from(PngDecoder::new(Cursor::new(bytes))?)?,
        };
        let height_mm = PHOTO_WIDTH_MM * info.height as f32 / info.width as f32;
        // At this dpi the image renders exactly PHOTO_WIDTH_MM wide.
        let dpi = info.width as f32 * 25.4 / PHOTO_WIDTH_MM;
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(PAGE_WIDTH_MM - MARGIN_MM - PHOTO_WIDTH_MM)),
                translate_y: Some(Mm(PAGE_HEIGHT_MM - MARGIN_MM - height_mm)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(height_mm)
    }

    fn finish(self) -> anyhow::Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| anyhow::anyhow!("{:?}", e))
            .context("serialize pdf")
    }
}

/// A4 PDF: title, optional photo, then every section label and its content.
pub fn render_pdf(doc: &ExportDocument) -> anyhow::Result<Vec<u8>> {
    let mut cursor = PageCursor::new(&doc.title)?;
    let full_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

    let mut text_width = full_width;
    let mut photo_bottom = None;
    if let Some((bytes, info)) = doc.embeddable_photo() {
        match cursor.place_photo(bytes, info) {
            Ok(height) => {
                text_width = full_width - PHOTO_WIDTH_MM - 5.0;
                photo_bottom = Some(PAGE_HEIGHT_MM - MARGIN_MM - height);
            }
            Err(e) => warn!(error = %e, "photo could not be embedded, skipping"),
        }
    }

    cursor.write_lines(&doc.title, TITLE_PT, true, text_width);
    cursor.gap(4.0);

    for section in &doc.sections {
        // Text only runs beside the photo until it clears it.
        let width = match photo_bottom {
            Some(bottom) if cursor.pages == 1 && cursor.y > bottom => text_width,
            _ => full_width,
        };
        cursor.ensure_space(line_height_mm(HEADING_PT) + line_height_mm(BODY_PT));
        cursor.write_lines(&section.label, HEADING_PT, true, width);
        cursor.gap(1.0);
        if !section.content.trim().is_empty() {
            cursor.write_lines(&section.content, BODY_PT, false, width);
        }
        cursor.gap(4.0);
    }

    debug!(pages = cursor.pages, sections = doc.sections.len(), "pdf rendered");
    cursor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::{sample, tiny_png};

    #[test]
    fn renders_pdf_bytes() {
        let bytes = render_pdf(&sample("T", "C")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_content_spills_onto_more_pages() {
        let long = "Shipped things. ".repeat(2_000);
        let short = render_pdf(&sample("T", "C")).unwrap();
        let paged = render_pdf(&sample("T", &long)).unwrap();
        assert!(paged.starts_with(b"%PDF"));
        assert!(paged.len() > short.len());
    }

    #[test]
    fn photo_is_embedded_and_garbage_photo_is_skipped() {
        let mut with_photo = sample("T", "C");
        with_photo.photo = Some(tiny_png(8, 10).into());
        assert!(render_pdf(&with_photo).unwrap().starts_with(b"%PDF"));

        let mut broken = sample("T", "C");
        broken.photo = Some(bytes::Bytes::from_static(b"not an image"));
        assert!(render_pdf(&broken).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn win_ansi_keeps_latin1_and_replaces_the_rest() {
        assert_eq!(to_win_ansi("Zoë – “CV” Ж"), "Zoë - \"CV\" ?");
        assert_eq!(char_budget(170.0, BODY_PT), 91);
    }
}
