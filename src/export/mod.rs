//! PDF and DOCX renditions of a resume.

use std::io::Cursor;

use bytes::Bytes;
use printpdf::image_crate::{
    codecs::{jpeg::JpegDecoder, png::PngDecoder},
    ImageDecoder,
};

use crate::sections::ResumeSection;

pub mod docx;
pub mod handlers;
pub mod pdf;

use crate::state::AppState;
use axum::Router;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub fn router() -> Router<AppState> {
    handlers::export_routes()
}

/// Everything a renderer needs, with sections already in display order.
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub title: String,
    pub photo: Option<Bytes>,
    pub sections: Vec<ExportSection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSection {
    pub label: String,
    pub content: String,
}

impl ExportDocument {
    pub fn new(title: &str, photo: Option<Bytes>, sections: &[ResumeSection]) -> Self {
        let mut ordered: Vec<&ResumeSection> = sections.iter().collect();
        ordered.sort_by_key(|s| s.order);
        Self {
            title: title.to_string(),
            photo,
            sections: ordered
                .into_iter()
                .map(|s| ExportSection {
                    label: s.label().to_string(),
                    content: s.content.clone(),
                })
                .collect(),
        }
    }

    /// The photo, when it is a JPEG or PNG that actually decodes.
    pub fn embeddable_photo(&self) -> Option<(&[u8], PhotoInfo)> {
        let bytes = self.photo.as_deref()?;
        inspect_photo(bytes).map(|info| (bytes, info))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFormat {
    Jpeg,
    Png,
}

impl PhotoFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PhotoFormat::Jpeg => "jpg",
            PhotoFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoInfo {
    pub format: PhotoFormat,
    pub width: u32,
    pub height: u32,
}

/// Reads format and pixel size from the header. WebP and anything else
/// unreadable yields `None`.
pub fn inspect_photo(bytes: &[u8]) -> Option<PhotoInfo> {
    let (format, (width, height)) = if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        let decoder = JpegDecoder::new(Cursor::new(bytes)).ok()?;
        (PhotoFormat::Jpeg, decoder.dimensions())
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        let decoder = PngDecoder::new(Cursor::new(bytes)).ok()?;
        (PhotoFormat::Png, decoder.dimensions())
    } else {
        return None;
    };
    if width == 0 || height == 0 {
        return None;
    }
    Some(PhotoInfo {
        format,
        width,
        height,
    })
}

/// Download name: lowercase ASCII words joined by `-`, never empty.
pub fn filename_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.chars().take(60).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "resume".to_string()
    } else {
        slug.to_string()
    }
}

/// Greedy word wrap to at most `budget` characters per line. Explicit line
/// breaks are kept and words longer than a line are split.
pub fn wrap_text(text: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        let mut len = 0usize;
        for word in raw.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > budget {
                if len > 0 {
                    lines.push(std::mem::take(&mut current));
                    len = 0;
                }
                let rest = word.split_off(budget);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }
            let needed = if len == 0 { word.len() } else { len + 1 + word.len() };
            if needed > budget {
                lines.push(std::mem::take(&mut current));
                len = 0;
            }
            if len > 0 {
                current.push(' ');
                len += 1;
            }
            current.extend(word.iter());
            len += word.len();
        }
        lines.push(current);
    }
    lines
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use printpdf::image_crate::{codecs::png::PngEncoder, ColorType, ImageEncoder};
    use uuid::Uuid;

    pub(crate) fn tiny_png(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![200u8; (width * height * 3) as usize];
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&pixels, width, height, ColorType::Rgb8)
            .unwrap();
        out
    }

    pub(crate) fn sample(title: &str, personal: &str) -> ExportDocument {
        let sections = vec![
            ResumeSection {
                id: Uuid::new_v4(),
                resume_id: Uuid::nil(),
                section_type: "skills".into(),
                content: "Rust, SQL".into(),
                order: 3,
            },
            ResumeSection {
                id: Uuid::new_v4(),
                resume_id: Uuid::nil(),
                section_type: "personal".into(),
                content: personal.into(),
                order: 0,
            },
        ];
        ExportDocument::new(title, None, &sections)
    }

    #[test]
    fn document_sections_follow_order() {
        let doc = sample("T", "C");
        let labels: Vec<_> = doc.sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Personal Information", "Skills"]);
    }

    #[test]
    fn slug_is_ascii_and_never_empty() {
        assert_eq!(filename_slug("Senior Rust Engineer (2024)"), "senior-rust-engineer-2024");
        assert_eq!(filename_slug("  --  "), "resume");
        assert_eq!(filename_slug("Jürgen's CV"), "j-rgen-s-cv");
        assert!(filename_slug(&"a".repeat(200)).len() <= 60);
    }

    #[test]
    fn wrap_respects_budget_and_line_breaks() {
        let lines = wrap_text("one two three four\n\nfive", 9);
        assert_eq!(lines, vec!["one two", "three", "four", "", "five"]);

        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn inspect_photo_reads_png_and_rejects_garbage() {
        let png = tiny_png(4, 2);
        assert_eq!(
            inspect_photo(&png),
            Some(PhotoInfo { format: PhotoFormat::Png, width: 4, height: 2 })
        );
        assert_eq!(inspect_photo(b"RIFF....WEBPVP8 "), None);
        assert_eq!(inspect_photo(&[0xFF, 0xD8, 0xFF, 0x00]), None);
    }
}
