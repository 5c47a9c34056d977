use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use std::collections::HashSet;

use crate::config::MarkdownConfig;
use crate::highlight;

/// HTML produced from a Markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMarkdown {
    pub body: String,
    /// Nested `<ul>` of heading links, present when a TOC was requested
    /// and the document has headings in range.
    pub toc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub toc: bool,
    /// Inclusive range of heading levels listed in the TOC.
    pub toc_levels: (u8, u8),
    /// syntect theme for fenced code, or `None` to leave code unstyled.
    pub highlight_theme: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from_config(&MarkdownConfig::default(), false)
    }
}

impl ParseOptions {
    pub fn from_config(config: &MarkdownConfig, toc: bool) -> Self {
        Self {
            toc,
            toc_levels: config.toc_levels(),
            highlight_theme: config
                .highlight
                .then(|| config.highlight_theme.clone()),
        }
    }
}

/// A heading seen in the document, after its anchor was assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Heading {
    level: u8,
    id: String,
    text: String,
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Parse markdown into an HTML body and, optionally, a table of contents.
pub fn parse(markdown: &str, options: &ParseOptions) -> ParsedMarkdown {
    let mut events: Vec<Event> = Parser::new_ext(markdown, markdown_options()).collect();
    let headings = assign_heading_ids(&mut events);

    let toc = if options.toc {
        let (min, max) = options.toc_levels;
        Some(toc_html(&headings, min, max)).filter(|toc| !toc.is_empty())
    } else {
        None
    };

    if let Some(theme) = &options.highlight_theme {
        events = highlight::highlight_code_blocks(events, theme);
    }

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, events.into_iter());

    ParsedMarkdown { body, toc }
}

/// Give every heading an anchor id so TOC entries and `#links` resolve.
///
/// Explicit `{#id}` attributes are kept; others get a slug of the heading
/// text, suffixed `_1`, `_2`, ... when already taken.
fn assign_heading_ids(events: &mut [Event]) -> Vec<Heading> {
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();

    let mut headings = Vec::new();
    let mut i = 0;
    while i < events.len() {
        let Event::Start(Tag::Heading { level, id, .. }) = &events[i] else {
            i += 1;
            continue;
        };
        let level = heading_level_to_u8(*level);
        let explicit = id.as_ref().map(|id| id.to_string());

        let mut text = String::new();
        let mut end = i + 1;
        while end < events.len() {
            match &events[end] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
            end += 1;
        }

        let id = match explicit {
            Some(id) => id,
            None => {
                let id = unique_slug(&slugify(&text), &mut used);
                if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
                    *slot = Some(CowStr::from(id.clone()));
                }
                id
            }
        };

        headings.push(Heading {
            level,
            id,
            text: text.trim().to_string(),
        });
        i = end + 1;
    }
    headings
}

fn slugify(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();
    let slug = cleaned
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

fn unique_slug(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 1;
    while used.contains(&candidate) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Nested list of links for headings with `min <= level <= max`.
fn toc_html(headings: &[Heading], min: u8, max: u8) -> String {
    let mut out = String::new();
    // Levels of the currently open lists, innermost last
    let mut open: Vec<u8> = Vec::new();

    for heading in headings.iter().filter(|h| (min..=max).contains(&h.level)) {
        match open.last() {
            None => {
                out.push_str("<ul>\n");
                open.push(heading.level);
            }
            Some(&current) if heading.level > current => {
                out.push_str("\n<ul>\n");
                open.push(heading.level);
            }
            Some(_) => {
                out.push_str("</li>\n");
                // Close nested lists until the entry owning the innermost
                // list is shallower than this heading.
                while open.len() > 1 && heading.level <= open[open.len() - 2] {
                    out.push_str("</ul>\n</li>\n");
                    open.pop();
                }
                if let Some(innermost) = open.last_mut() {
                    *innermost = (*innermost).min(heading.level);
                }
            }
        }
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            html_escape::encode_double_quoted_attribute(&heading.id),
            html_escape::encode_text(&heading.text)
        ));
    }

    if !open.is_empty() {
        out.push_str("</li>\n");
    }
    while open.pop().is_some() {
        out.push_str("</ul>\n");
        if !open.is_empty() {
            out.push_str("</li>\n");
        }
    }
    out
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
