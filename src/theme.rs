use std::fmt;

static DEFAULT_CSS: &str = include_str!("themes/default.css");
static WARM_CSS: &str = include_str!("themes/warm.css");
static RUSTIC_CSS: &str = include_str!("themes/rustic.css");

/// Named visual styles applied to the whole document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    /// Clean white paper with neutral colors
    Default,
    /// Warm neutral tones with vintage typography
    #[default]
    Warm,
    /// Aged paper with coffee browns and ornaments
    Rustic,
}

/// A complete style sheet for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleBundle {
    pub theme: Theme,
    pub css: &'static str,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Default, Theme::Warm, Theme::Rustic];

    /// Look up a theme by name. Unknown names fall back to [`Theme::Warm`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Theme::Default,
            "warm" => Theme::Warm,
            "rustic" => Theme::Rustic,
            _ => Theme::default(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Warm => "warm",
            Theme::Rustic => "rustic",
        }
    }

    pub fn style(self) -> StyleBundle {
        let css = match self {
            Theme::Default => DEFAULT_CSS,
            Theme::Warm => WARM_CSS,
            Theme::Rustic => RUSTIC_CSS,
        };
        StyleBundle { theme: self, css }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
