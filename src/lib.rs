//! Markdown to styled PDF.
//!
//! The front matter of a Markdown file (title, subtitles, bold `key: value`
//! lines) becomes a title page, the body is rendered to HTML with
//! pulldown-cmark, and the themed document is handed to an HTML-to-PDF
//! engine through a [`Renderer`].
//!
//! ```no_run
//! use klasiko::{Config, ConversionRequest, Converter, Theme};
//!
//! let request = ConversionRequest {
//!     theme: Theme::Rustic,
//!     toc: true,
//!     ..ConversionRequest::new("notes.md")
//! };
//! let report = Converter::new(Config::compiled_default()).convert(&request)?;
//! println!("wrote {}", report.output.display());
//! # Ok::<(), klasiko::ConvertError>(())
//! ```

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod front_matter;
mod highlight;
pub mod logo;
pub mod parser;
pub mod progress;
pub mod render;
pub mod theme;

pub use config::Config;
pub use convert::{ConversionReport, ConversionRequest, Converter};
pub use document::{DocumentMetadata, DocumentParts, assemble, title_from_stem};
pub use error::{ConversionWarning, ConvertError};
pub use front_matter::{FrontMatter, MetadataEntry};
pub use logo::{Logo, LogoPlacement, LogoPosition, LogoSize, PlacementError};
pub use parser::{ParseOptions, ParsedMarkdown, parse};
pub use progress::{ConversionProgress, NoopProgress, Stage};
pub use render::{CommandRenderer, RenderError, Renderer};
pub use theme::Theme;
