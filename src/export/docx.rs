use std::io::{Cursor, Write};

use anyhow::Context;
use tracing::debug;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use super::{ExportDocument, PhotoInfo};

const PHOTO_REL_ID: &str = "rIdPhoto";
/// 1.5 inch.
const PHOTO_WIDTH_EMU: u64 = 1_371_600;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:b/><w:sz w:val="48"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style>
</w:styles>"#;

/// Escapes markup and drops characters XML 1.0 does not allow.
fn xml_escape(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect::<String>()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn paragraph(style: Option<&str>, text: &str) -> String {
    let props = style
        .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
        .unwrap_or_default();
    format!(
        r#"<w:p>{props}<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        xml_escape(text)
    )
}

fn photo_paragraph(info: PhotoInfo) -> String {
    let cx = PHOTO_WIDTH_EMU;
    let cy = PHOTO_WIDTH_EMU * u64::from(info.height) / u64::from(info.width);
    let name = format!("photo.{}", info.format.extension());
    format!(
        concat!(
            r#"<w:p><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="1" name="Photo"/>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="1" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
        ),
        cx = cx,
        cy = cy,
        name = name,
        rel = PHOTO_REL_ID,
    )
}

fn document_xml(doc: &ExportDocument, photo: Option<PhotoInfo>) -> String {
    let mut body = String::new();
    body.push_str(&paragraph(Some("Title"), &doc.title));
    if let Some(info) = photo {
        body.push_str(&photo_paragraph(info));
    }
    for section in &doc.sections {
        body.push_str(&paragraph(Some("Heading1"), &section.label));
        for line in section.content.lines() {
            body.push_str(&paragraph(None, line));
        }
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
            r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
            r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
            r#" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
            r#" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            "<w:body>{body}",
            r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
            r#"<w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="709" w:footer="709" w:gutter="0"/>"#,
            "</w:sectPr></w:body></w:document>"
        ),
        body = body
    )
}

fn content_types_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="jpg" ContentType="image/jpeg"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#
}

fn document_rels_xml(photo: Option<PhotoInfo>) -> String {
    let mut rels = String::from(
        r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    );
    if let Some(info) = photo {
        rels.push_str(&format!(
            r#"<Relationship Id="{PHOTO_REL_ID}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/photo.{}"/>"#,
            info.format.extension()
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
    )
}

/// WordprocessingML package: title, optional inline photo, a Heading 1 per
/// section and one paragraph per content line.
pub fn render_docx(doc: &ExportDocument) -> anyhow::Result<Vec<u8>> {
    let photo = doc.embeddable_photo();
    let info = photo.map(|(_, info)| info);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, String); 5] = [
        ("[Content_Types].xml", content_types_xml().to_string()),
        ("_rels/.rels", RELS.to_string()),
        ("word/document.xml", document_xml(doc, info)),
        ("word/_rels/document.xml.rels", document_rels_xml(info)),
        ("word/styles.xml", STYLES.to_string()),
    ];
    for (name, xml) in parts {
        zip.start_file(name, opts).with_context(|| format!("start {name}"))?;
        zip.write_all(xml.as_bytes())
            .with_context(|| format!("write {name}"))?;
    }
    if let Some((bytes, info)) = photo {
        let name = format!("word/media/photo.{}", info.format.extension());
        zip.start_file(name.as_str(), FileOptions::default().compression_method(CompressionMethod::Stored))
            .context("start photo")?;
        zip.write_all(bytes).context("write photo")?;
    }

    let out = zip.finish().context("finish docx")?.into_inner();
    debug!(bytes = out.len(), photo = info.is_some(), "docx rendered");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::{sample, tiny_png};
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> Option<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).ok()?;
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        Some(out)
    }

    #[test]
    fn document_contains_title_and_section_content() {
        let bytes = render_docx(&sample("T", "C")).unwrap();
        let document = read_part(&bytes, "word/document.xml").unwrap();
        assert!(document.contains(">T</w:t>"));
        assert!(document.contains(">C</w:t>"));
        assert!(document.contains("Personal Information"));
        assert!(document.find("Personal Information") < document.find("Skills"));

        let types = read_part(&bytes, "[Content_Types].xml").unwrap();
        assert!(types.contains("wordprocessingml.document.main+xml"));
        assert!(read_part(&bytes, "word/media/photo.png").is_none());
    }

    #[test]
    fn text_is_escaped_and_lines_become_paragraphs() {
        let bytes = render_docx(&sample("R&D <lead>", "line one\nline two")).unwrap();
        let document = read_part(&bytes, "word/document.xml").unwrap();
        assert!(document.contains("R&amp;D &lt;lead&gt;"));
        assert!(document.contains(">line one</w:t>"));
        assert!(document.contains(">line two</w:t>"));
    }

    #[test]
    fn control_characters_are_dropped() {
        let bytes = render_docx(&sample("T\u{7}itle", "a\u{1}b\u{c}c\td")).unwrap();
        let document = read_part(&bytes, "word/document.xml").unwrap();
        assert!(!document.chars().any(|c| matches!(c, '\u{1}' | '\u{7}' | '\u{c}')));
        assert!(document.contains(">Title</w:t>"));
        assert!(document.contains(">abc\td</w:t>"));
    }

    #[test]
    fn photo_is_packaged_with_relationship() {
        let mut doc = sample("T", "C");
        doc.photo = Some(tiny_png(20, 40).into());
        let bytes = render_docx(&doc).unwrap();

        let rels = read_part(&bytes, "word/_rels/document.xml.rels").unwrap();
        assert!(rels.contains("media/photo.png"));
        let document = read_part(&bytes, "word/document.xml").unwrap();
        assert!(document.contains(r#"cy="2743200""#));
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert!(archive.by_name("word/media/photo.png").is_ok());
    }
}
