//! HTML preview of a resume.
//!
//! Templates use `{{ title }}`, `{{ photo_url }}`, `{{ sections }}` and
//! `{{ section.<type> }}` placeholders. Every substituted value is escaped and
//! substitution happens in a single pass, so user text is never re-expanded.

use std::collections::HashMap;

use crate::sections::ResumeSection;

const DEFAULT_LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
<style>
body { font-family: Helvetica, Arial, sans-serif; max-width: 800px; margin: 2rem auto; color: #222; }
h1 { border-bottom: 2px solid #333; padding-bottom: .3rem; }
.photo { float: right; max-width: 140px; border-radius: 4px; }
.resume-section h2 { font-size: 1.1rem; text-transform: uppercase; color: #555; }
</style>
</head>
<body>
{{ photo }}
<h1>{{ title }}</h1>
{{ sections }}
</body>
</html>
"#;

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escaped content with line breaks kept.
fn content_html(content: &str) -> String {
    html_escape(content).replace('\n', "<br>\n")
}

fn render_section(section: &ResumeSection) -> String {
    format!(
        r#"<section class="resume-section section-{}">
<h2>{}</h2>
<div class="content">{}</div>
</section>"#,
        html_escape(&section.section_type),
        html_escape(section.label()),
        content_html(&section.content)
    )
}

/// Replaces every known `{{ key }}` in one pass; unknown placeholders stay.
fn substitute(template: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match values.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders `sections` (already in display order) into `template`, or into a
/// built-in layout when the resume has no template.
pub fn render_preview(
    title: &str,
    photo_url: Option<&str>,
    sections: &[ResumeSection],
    template: Option<&str>,
) -> String {
    let mut values = HashMap::new();
    values.insert("title".to_string(), html_escape(title));
    values.insert(
        "photo_url".to_string(),
        photo_url.map(html_escape).unwrap_or_default(),
    );
    values.insert(
        "photo".to_string(),
        photo_url
            .map(|url| format!(r#"<img class="photo" src="{}" alt="">"#, html_escape(url)))
            .unwrap_or_default(),
    );
    values.insert(
        "sections".to_string(),
        sections
            .iter()
            .map(render_section)
            .collect::<Vec<_>>()
            .join("\n"),
    );
    for section in sections {
        values.insert(
            format!("section.{}", section.section_type),
            content_html(&section.content),
        );
    }

    substitute(template.unwrap_or(DEFAULT_LAYOUT), &values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn section(kind: &str, content: &str, order: i32) -> ResumeSection {
        ResumeSection {
            id: Uuid::new_v4(),
            resume_id: Uuid::nil(),
            section_type: kind.into(),
            content: content.into(),
            order,
        }
    }

    #[test]
    fn default_layout_lists_sections_in_given_order() {
        let sections = vec![section("personal", "Jane Doe", 0), section("skills", "Rust", 1)];
        let html = render_preview("My CV", None, &sections, None);

        assert!(html.contains("<title>My CV</title>"));
        let personal = html.find("Personal Information").unwrap();
        let skills = html.find("Skills").unwrap();
        assert!(personal < skills);
        assert!(!html.contains("<img"));
    }

    #[test]
    fn values_are_escaped_and_not_re_expanded() {
        let sections = vec![section("other", "<script>{{ title }}</script>", 0)];
        let html = render_preview("A & B", None, &sections, Some("{{title}}|{{ section.other }}"));
        assert_eq!(html, "A &amp; B|&lt;script&gt;{{ title }}&lt;/script&gt;");
    }

    #[test]
    fn custom_template_gets_photo_and_keeps_unknown_placeholders() {
        let html = render_preview(
            "CV",
            Some("https://cdn.local/p.jpg?a=1&b=2"),
            &[],
            Some(r#"<img src="{{ photo_url }}">{{ unknown }}{{"#),
        );
        assert_eq!(html, r#"<img src="https://cdn.local/p.jpg?a=1&amp;b=2">{{ unknown }}{{"#);
    }

    #[test]
    fn multiline_content_keeps_line_breaks() {
        let sections = vec![section("experience", "ACME\nEngineer", 0)];
        let html = render_preview("CV", None, &sections, Some("{{ section.experience }}"));
        assert_eq!(html, "ACME<br>\nEngineer");
    }
}
