use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

use crate::theme::Theme;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme used when the command line does not pick one.
    pub theme: String,
    pub markdown: MarkdownConfig,
    pub renderer: RendererConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default().name().to_string(),
            markdown: MarkdownConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub toc_min_level: u8,
    pub toc_max_level: u8,
    pub highlight: bool,
    pub highlight_theme: String,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            toc_min_level: 2,
            toc_max_level: 3,
            highlight: true,
            highlight_theme: "InspiredGitHub".to_string(),
        }
    }
}

impl MarkdownConfig {
    /// Heading levels listed in the table of contents, clamped to 1..=6.
    pub fn toc_levels(&self) -> (u8, u8) {
        let min = self.toc_min_level.clamp(1, 6);
        let max = self.toc_max_level.clamp(min, 6);
        (min, max)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// HTML-to-PDF executable, looked up on `PATH` when not absolute.
    pub program: String,
    /// Extra arguments placed before the input and output operands.
    pub args: Vec<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: "weasyprint".to_string(),
            args: Vec::new(),
        }
    }
}

impl Config {
    /// Load the compiled-in default config (validated at build time).
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return defaults if not found.
    ///
    /// Keys missing from the file keep their compiled-in values. A file that
    /// fails to parse is reported and ignored.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring invalid config {}: {}", path.display(), e);
                    Self::compiled_default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Self::compiled_default(),
            Err(e) => {
                warn!("Could not read config {}: {}", path.display(), e);
                Self::compiled_default()
            }
        }
    }

    /// Parse a TOML document layered over the compiled-in defaults.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let mut merged: toml::Table = toml::from_str(DEFAULT_CONFIG).unwrap_or_default();
        let overrides: toml::Table = toml::from_str(content)?;
        merge_tables(&mut merged, overrides);
        toml::Value::Table(merged).try_into()
    }

    /// The configured default theme, falling back to warm for unknown names.
    pub fn default_theme(&self) -> Theme {
        Theme::from_name(&self.theme)
    }
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
