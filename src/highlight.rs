use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use tracing::{debug, warn};

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// Replace fenced code blocks that name a known language with
/// inline-styled HTML. Anything else passes through untouched.
pub fn highlight_code_blocks<'a>(events: Vec<Event<'a>>, theme_name: &str) -> Vec<Event<'a>> {
    let Some(theme) = THEMES.themes.get(theme_name) else {
        warn!(
            "Unknown highlight theme '{}', code blocks left unstyled",
            theme_name
        );
        return events;
    };

    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();
    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) if !info.is_empty() => {
                let mut code = String::new();
                for inner in iter.by_ref() {
                    match inner {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => code.push_str(&text),
                        _ => {}
                    }
                }

                match highlight(&code, &info, theme) {
                    Some(html) => out.push(Event::Html(html.into())),
                    None => {
                        out.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))));
                        out.push(Event::Text(code.into()));
                        out.push(Event::End(TagEnd::CodeBlock));
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn highlight(code: &str, info: &str, theme: &Theme) -> Option<String> {
    let token = info
        .split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or_default();
    let syntax = SYNTAXES.find_syntax_by_token(token)?;

    match highlighted_html_for_string(code, &SYNTAXES, syntax, theme) {
        Ok(html) => Some(html),
        Err(e) => {
            debug!("Highlighting '{}' block failed: {}", token, e);
            None
        }
    }
}
