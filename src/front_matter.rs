//! Title page information inferred from the opening lines of a document.
//!
//! Nothing here parses Markdown properly. The rules are line heuristics:
//! the first `# ` heading is the title, a `## ` and `### ` directly under it
//! (before any body text) are the subtitle and sub-subtitle, and bold
//! `**Key:** Value` lines near the top become title page metadata.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lines after the title searched for a subtitle.
const SUBTITLE_WINDOW: usize = 20;
/// Lines after the subtitle searched for a sub-subtitle.
const SUB_SUBTITLE_WINDOW: usize = 5;
/// Lines from the top of the document searched for metadata.
const METADATA_WINDOW: usize = 50;

static METADATA_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*\*([^*]+?)(?::\*\*|\*\*:)\s*(.+)$").expect("metadata pattern is valid")
});

/// A bold `Key: Value` pair found near the top of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub sub_subtitle: Option<String>,
    pub metadata: Vec<MetadataEntry>,
}

impl FrontMatter {
    /// Extract the front matter of a raw Markdown document.
    pub fn extract(markdown: &str) -> Self {
        let lines: Vec<&str> = markdown.lines().map(str::trim).collect();
        let mut front_matter = FrontMatter::default();

        if let Some(TitleLine { text, line, next }) = find_title(&lines) {
            front_matter.title = Some(text);

            let (subtitle, after_subtitle) = scan_subtitles(&lines, next);
            front_matter.subtitle = subtitle;
            if let Some(cursor) = after_subtitle {
                front_matter.sub_subtitle = scan_sub_subtitle(&lines, cursor);
            }
            front_matter.metadata = scan_metadata(&lines, Some(line));
        } else {
            front_matter.metadata = scan_metadata(&lines, None);
        }

        front_matter
    }
}

#[derive(Debug)]
struct TitleLine {
    text: String,
    /// Index of the heading line itself.
    line: usize,
    /// Index of the first line after the heading.
    next: usize,
}

fn find_title(lines: &[&str]) -> Option<TitleLine> {
    if let Some((line, text)) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| heading_text(line, 1).map(|text| (i, text)))
    {
        return Some(TitleLine {
            text: text.to_string(),
            line,
            next: line + 1,
        });
    }

    // Setext form: a line of text underlined with `=`
    lines.windows(2).enumerate().find_map(|(i, pair)| {
        let (text, underline) = (pair[0], pair[1]);
        let is_underline = !underline.is_empty() && underline.chars().all(|c| c == '=');
        if is_underline && !text.is_empty() && !text.starts_with('#') {
            Some(TitleLine {
                text: text.to_string(),
                line: i,
                next: i + 2,
            })
        } else {
            None
        }
    })
}

/// Look for a `## ` heading directly under the title.
///
/// Returns the subtitle and, when one was found before any body text, the
/// line to resume from when looking for a sub-subtitle.
fn scan_subtitles(lines: &[&str], start: usize) -> (Option<String>, Option<usize>) {
    let end = lines.len().min(start + SUBTITLE_WINDOW);
    for (i, line) in lines.iter().enumerate().take(end).skip(start) {
        if let Some(text) = heading_text(line, 2) {
            return (Some(text.to_string()), Some(i + 1));
        }
        if heading_text(line, 1).is_some() || starts_content(line) {
            break;
        }
    }
    (None, None)
}

fn scan_sub_subtitle(lines: &[&str], start: usize) -> Option<String> {
    let end = lines.len().min(start + SUB_SUBTITLE_WINDOW);
    for line in lines.iter().take(end).skip(start) {
        if let Some(text) = heading_text(line, 3) {
            return Some(text.to_string());
        }
        if heading_text(line, 1).is_some()
            || heading_text(line, 2).is_some()
            || starts_content(line)
        {
            break;
        }
    }
    None
}

/// Collect `**Key:** Value` lines from the top of the document.
///
/// Runs over its own cursor, so a metadata line may sit among the subtitle
/// headings. Stops at the first rule or at a top-level heading other than
/// the title.
fn scan_metadata(lines: &[&str], title_line: Option<usize>) -> Vec<MetadataEntry> {
    let mut entries = Vec::new();
    for (i, line) in lines.iter().enumerate().take(METADATA_WINDOW) {
        if Some(i) == title_line {
            continue;
        }
        if is_rule(line) || heading_text(line, 1).is_some() {
            break;
        }
        if let Some(caps) = METADATA_LINE.captures(line) {
            let key = caps[1].trim();
            let value = caps[2].trim();
            if !key.is_empty() && !value.is_empty() {
                entries.push(MetadataEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }
    entries
}

/// Text of an ATX heading of exactly `level`, e.g. `## Text` for level 2.
fn heading_text(line: &str, level: usize) -> Option<&str> {
    let rest = line.strip_prefix(&"#".repeat(level)[..])?;
    if !rest.starts_with(' ') {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some(text)
}

/// Whether a non-blank line ends the title block.
fn starts_content(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#') && !line.starts_with("**") && !is_rule(line)
}

/// Horizontal rule: `---`, `***`, `___` (spaces allowed) or any `---` prefix.
fn is_rule(line: &str) -> bool {
    if line.starts_with("---") {
        return true;
    }
    let marks: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    marks.len() >= 3
        && matches!(marks[0], '-' | '*' | '_')
        && marks.iter().all(|c| *c == marks[0])
}
