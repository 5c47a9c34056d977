//! Assembly of the complete HTML document handed to the renderer.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::front_matter::FrontMatter;
use crate::logo::{Logo, LogoPlacement, placement_styles};
use crate::theme::Theme;

/// PDF document properties supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
}

impl DocumentMetadata {
    pub fn is_empty(&self) -> bool {
        self.author.is_none() && self.subject.is_none() && self.keywords.is_none()
    }
}

/// Everything the assembler combines into one document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentParts<'a> {
    /// HTML body produced by the Markdown parser.
    pub body: &'a str,
    pub front_matter: &'a FrontMatter,
    /// Input file stem, used for the title when the document has no H1.
    pub file_stem: &'a str,
    pub theme: Theme,
    pub logo: Option<&'a Logo>,
    pub placements: &'a [LogoPlacement],
    pub custom_css: Option<&'a str>,
    pub metadata: &'a DocumentMetadata,
    pub toc: Option<&'a str>,
}

/// The document title: the extracted H1, or a readable form of the file name.
pub fn resolve_title(front_matter: &FrontMatter, file_stem: &str) -> String {
    match &front_matter.title {
        Some(title) => title.clone(),
        None => title_from_stem(file_stem),
    }
}

/// `quarterly_report-final` → `Quarterly Report Final`.
pub fn title_from_stem(stem: &str) -> String {
    let spaced = stem.replace(['_', '-'], " ");
    let mut title = String::with_capacity(spaced.len());
    let mut previous_alphabetic = false;
    for c in spaced.chars() {
        if c.is_alphabetic() {
            if previous_alphabetic {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            title.push(c);
            previous_alphabetic = false;
        }
    }
    title
}

/// Build the complete HTML document.
///
/// Pure: the output depends only on `parts`.
pub fn assemble(parts: &DocumentParts) -> String {
    let title = resolve_title(parts.front_matter, parts.file_stem);
    let title_html = encode_text(&title);

    let logo_fragments = match parts.logo {
        Some(logo) => placement_styles(&logo.data_uri, parts.placements),
        None => Vec::new(),
    };
    let title_logo = parts.logo.filter(|_| {
        parts
            .placements
            .iter()
            .any(|p| p.position.includes_title())
    });
    let watermark = parts.logo.filter(|_| {
        parts
            .placements
            .iter()
            .any(|p| p.position.includes_watermark())
    });

    let mut out = String::with_capacity(parts.body.len() + 32 * 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    out.push_str(&format!("<title>{}</title>\n", title_html));
    out.push_str(&meta_tags(parts.metadata));

    // Theme, then logo placements, then custom CSS: later rules win.
    out.push_str("<style>\n");
    out.push_str(parts.theme.style().css);
    for fragment in &logo_fragments {
        out.push_str(fragment);
    }
    out.push_str("</style>\n");
    if let Some(css) = parts.custom_css {
        out.push_str("<style>\n");
        out.push_str(css);
        out.push_str("\n</style>\n");
    }
    out.push_str("</head>\n<body>\n");

    if let Some(logo) = watermark {
        out.push_str(&format!(
            "<div class=\"watermark\"><img src=\"{}\" alt=\"\"></div>\n",
            logo.data_uri
        ));
    }

    out.push_str("<div class=\"title-page\">\n");
    if let Some(logo) = title_logo {
        out.push_str(&format!(
            "<img src=\"{}\" class=\"title-logo\" alt=\"Logo\">\n",
            logo.data_uri
        ));
    }
    out.push_str(&format!("<h1>{}</h1>\n", title_html));
    if let Some(subtitle) = &parts.front_matter.subtitle {
        out.push_str(&format!("<h2>{}</h2>\n", encode_text(subtitle)));
    }
    if let Some(sub_subtitle) = &parts.front_matter.sub_subtitle {
        out.push_str(&format!("<h3>{}</h3>\n", encode_text(sub_subtitle)));
    }
    if !parts.front_matter.metadata.is_empty() {
        out.push_str("<div class=\"meta-info\">\n");
        for entry in &parts.front_matter.metadata {
            out.push_str(&format!(
                "<p><span class=\"meta-key\">{}:</span> {}</p>\n",
                encode_text(&entry.key),
                encode_text(&entry.value)
            ));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");

    if let Some(toc) = parts.toc {
        out.push_str("<div class=\"toc\">\n<div class=\"toc-title\">Table of Contents</div>\n");
        out.push_str(toc);
        out.push_str("</div>\n");
    }

    out.push_str(parts.body);
    out.push_str("\n</body>\n</html>\n");
    out
}

fn meta_tags(metadata: &DocumentMetadata) -> String {
    let mut tags = String::new();
    let mut push = |name: &str, value: &str| {
        tags.push_str(&format!(
            "<meta name=\"{}\" content=\"{}\">\n",
            name,
            encode_double_quoted_attribute(value)
        ));
    };

    if let Some(author) = &metadata.author {
        push("author", author);
    }
    if let Some(subject) = &metadata.subject {
        push("subject", subject);
        // WeasyPrint fills the PDF Subject field from `description`
        push("description", subject);
    }
    if let Some(keywords) = &metadata.keywords {
        push("keywords", keywords);
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front_matter::MetadataEntry;
    use crate::logo::{LogoPosition, LogoSize};
    use std::path::PathBuf;

    fn logo() -> Logo {
        Logo {
            path: PathBuf::from("logo.png"),
            mime_type: "image/png",
            data_uri: "data:image/png;base64,QUJD".to_string(),
        }
    }

    fn parts<'a>(front_matter: &'a FrontMatter, metadata: &'a DocumentMetadata) -> DocumentParts<'a> {
        DocumentParts {
            body: "<p>Hello</p>\n",
            front_matter,
            file_stem: "notes",
            theme: Theme::Default,
            logo: None,
            placements: &[],
            custom_css: None,
            metadata,
            toc: None,
        }
    }

    #[test]
    fn title_from_stem_cases() {
        assert_eq!(title_from_stem("quarterly_report-final"), "Quarterly Report Final");
        assert_eq!(title_from_stem("README"), "Readme");
        assert_eq!(title_from_stem("v2_release-notes"), "V2 Release Notes");
    }

    #[test]
    fn extracted_title_wins() {
        let fm = FrontMatter {
            title: Some("Handbook".into()),
            ..FrontMatter::default()
        };
        assert_eq!(resolve_title(&fm, "ignored_name"), "Handbook");
        assert_eq!(resolve_title(&FrontMatter::default(), "team_handbook"), "Team Handbook");
    }

    #[test]
    fn minimal_document() {
        let fm = FrontMatter {
            title: Some("Title".into()),
            ..FrontMatter::default()
        };
        let metadata = DocumentMetadata::default();
        let html = assemble(&parts(&fm, &metadata));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("class=\"title-page\"").count(), 1);
        assert_eq!(html.matches("<h1>Title</h1>").count(), 1);
        assert!(html.contains("<title>Title</title>"));
        assert!(html.contains("<p>Hello</p>"));
        assert!(html.contains(Theme::Default.style().css));
        assert!(!html.contains("<meta name=\"author\""));
        assert!(!html.contains("class=\"toc\""));
        assert!(!html.contains("class=\"watermark\""));
        assert!(!html.contains("class=\"meta-info\""));
    }

    #[test]
    fn filename_title_when_no_h1() {
        let fm = FrontMatter::default();
        let metadata = DocumentMetadata::default();
        let mut p = parts(&fm, &metadata);
        p.file_stem = "design-review_notes";
        assert!(assemble(&p).contains("<h1>Design Review Notes</h1>"));
    }

    #[test]
    fn title_page_layout() {
        let fm = FrontMatter {
            title: Some("Plan".into()),
            subtitle: Some("Phase <1>".into()),
            sub_subtitle: Some("Draft".into()),
            metadata: vec![
                MetadataEntry {
                    key: "Author".into(),
                    value: "Ada".into(),
                },
                MetadataEntry {
                    key: "Date".into(),
                    value: "May".into(),
                },
            ],
        };
        let metadata = DocumentMetadata::default();
        let html = assemble(&parts(&fm, &metadata));

        let h1 = html.find("<h1>Plan</h1>").unwrap();
        let h2 = html.find("<h2>Phase &lt;1&gt;</h2>").unwrap();
        let h3 = html.find("<h3>Draft</h3>").unwrap();
        let meta = html.find("<div class=\"meta-info\">").unwrap();
        assert!(h1 < h2 && h2 < h3 && h3 < meta);
        assert!(html.contains("<p><span class=\"meta-key\">Author:</span> Ada</p>"));
        assert!(html.contains("<p><span class=\"meta-key\">Date:</span> May</p>"));
    }

    #[test]
    fn metadata_tags_only_for_present_fields() {
        let fm = FrontMatter::default();
        let metadata = DocumentMetadata {
            author: Some("Jane \"JD\" Doe".into()),
            subject: None,
            keywords: Some("a, b".into()),
        };
        let html = assemble(&parts(&fm, &metadata));
        assert!(html.contains("<meta name=\"author\" content=\"Jane &quot;JD&quot; Doe\">"));
        assert!(html.contains("<meta name=\"keywords\" content=\"a, b\">"));
        assert!(!html.contains("name=\"subject\""));
        assert!(!html.contains("name=\"description\""));
    }

    #[test]
    fn subject_tags() {
        let fm = FrontMatter::default();
        let metadata = DocumentMetadata {
            subject: Some("Budget".into()),
            ..DocumentMetadata::default()
        };
        let html = assemble(&parts(&fm, &metadata));
        assert!(html.contains("<meta name=\"subject\" content=\"Budget\">"));
        assert!(html.contains("<meta name=\"description\" content=\"Budget\">"));
    }

    #[test]
    fn custom_css_comes_last() {
        let fm = FrontMatter::default();
        let metadata = DocumentMetadata::default();
        let logo = logo();
        let placements = [LogoPlacement::new(LogoPosition::Header, LogoSize::Small)];
        let mut p = parts(&fm, &metadata);
        p.logo = Some(&logo);
        p.placements = &placements;
        p.custom_css = Some("body { color: red; }");
        let html = assemble(&p);

        let theme = html.find("counter(page)").unwrap();
        let logo_css = html.find("background-position: left center;").unwrap();
        let custom = html.find("body { color: red; }").unwrap();
        assert!(theme < logo_css && logo_css < custom);
        assert!(custom < html.find("</head>").unwrap());
    }

    #[test]
    fn header_and_footer_without_title_image() {
        let fm = FrontMatter::default();
        let metadata = DocumentMetadata::default();
        let logo = logo();
        let placements = [
            LogoPlacement::new(LogoPosition::Header, LogoSize::Small),
            LogoPlacement::new(LogoPosition::Footer, LogoSize::Small),
        ];
        let mut p = parts(&fm, &metadata);
        p.logo = Some(&logo);
        p.placements = &placements;
        let html = assemble(&p);

        assert!(html.contains("background-position: left center;"));
        assert!(html.contains("background-position: right center;"));
        assert!(!html.contains("class=\"title-logo\""));
        assert!(!html.contains("class=\"watermark\""));
    }

    #[test]
    fn all_placement_adds_title_image_and_watermark() {
        let fm = FrontMatter::default();
        let metadata = DocumentMetadata::default();
        let logo = logo();
        let placements = [LogoPlacement::new(LogoPosition::All, LogoSize::Medium)];
        let mut p = parts(&fm, &metadata);
        p.logo = Some(&logo);
        p.placements = &placements;
        let html = assemble(&p);

        let watermark = html.find("<div class=\"watermark\">").unwrap();
        let title_page = html.find("<div class=\"title-page\">").unwrap();
        let title_logo = html
            .find("<img src=\"data:image/png;base64,QUJD\" class=\"title-logo\"")
            .unwrap();
        let h1 = html.find("<h1>").unwrap();
        assert!(watermark < title_page && title_page < title_logo && title_logo < h1);
    }

    #[test]
    fn placements_without_logo_emit_nothing() {
        let fm = FrontMatter::default();
        let metadata = DocumentMetadata::default();
        let placements = [LogoPlacement::new(LogoPosition::All, LogoSize::Medium)];
        let mut p = parts(&fm, &metadata);
        p.placements = &placements;
        let html = assemble(&p);
        assert!(!html.contains("title-logo"));
        assert!(!html.contains("watermark"));
    }

    #[test]
    fn toc_between_title_page_and_body() {
        let fm = FrontMatter::default();
        let metadata = DocumentMetadata::default();
        let mut p = parts(&fm, &metadata);
        p.toc = Some("<ul>\n<li><a href=\"#a\">A</a></li>\n</ul>\n");
        let html = assemble(&p);

        let title_page = html.find("<div class=\"title-page\">").unwrap();
        let toc = html.find("<div class=\"toc\">").unwrap();
        let body = html.find("<p>Hello</p>").unwrap();
        assert!(title_page < toc && toc < body);
        assert!(html.contains("<div class=\"toc-title\">Table of Contents</div>"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let fm = FrontMatter {
            title: Some("Same".into()),
            ..FrontMatter::default()
        };
        let metadata = DocumentMetadata {
            author: Some("A".into()),
            ..DocumentMetadata::default()
        };
        let logo = logo();
        let placements = [LogoPlacement::new(LogoPosition::Both, LogoSize::Large)];
        let mut p = parts(&fm, &metadata);
        p.logo = Some(&logo);
        p.placements = &placements;
        assert_eq!(assemble(&p), assemble(&p));
    }
}
