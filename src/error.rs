//! Error and warning types for the klasiko library.
//!
//! * [`ConvertError`]: **Fatal**. The conversion stops and no PDF is
//!   promised. Returned as `Err` from [`crate::Converter::convert`].
//!
//! * [`ConversionWarning`]: **Non-fatal**. Something was skipped or degraded
//!   (custom CSS could not be read, the input was not UTF-8) but the PDF was
//!   still produced. Collected in [`crate::ConversionReport::warnings`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::render::RenderError;

/// All fatal errors returned by a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'")]
    InputNotFound { path: PathBuf },

    /// The input exists but could not be read.
    #[error("Could not read input file '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither UTF-8 nor the Windows-1252 fallback could decode the input.
    #[error(
        "Could not decode '{path}'. Please ensure it is UTF-8 or Windows-1252 (Latin-1) encoded."
    )]
    EncodingUnreadable { path: PathBuf },

    // ── Logo errors ───────────────────────────────────────────────────────
    #[error("Logo file not found: '{path}'")]
    LogoNotFound { path: PathBuf },

    #[error("Unsupported logo format '.{extension}' for '{path}'. Supported formats: {supported}")]
    LogoUnsupportedFormat {
        path: PathBuf,
        extension: String,
        supported: String,
    },

    /// Unexpected I/O failure while loading the logo.
    #[error("Unexpected error loading logo '{path}': {source}")]
    LogoUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Rendering ─────────────────────────────────────────────────────────
    #[error("PDF rendering failed: {0}")]
    Rendering(#[from] RenderError),
}

/// A degraded-but-successful condition met during a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    /// The custom CSS file could not be loaded; conversion continued without it.
    CustomCssUnreadable { path: PathBuf, reason: String },
    /// The input was not valid UTF-8 and was decoded as Windows-1252, the
    /// Latin-1 superset that also maps 0x80-0x9F to printable characters.
    Latin1Fallback { path: PathBuf },
    /// The input file is large enough to slow down rendering.
    LargeInput { path: PathBuf, bytes: u64 },
    /// The logo file is large enough to bloat the PDF.
    LargeLogo { path: PathBuf, bytes: u64 },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::CustomCssUnreadable { path, reason } => write!(
                f,
                "Could not load custom CSS file '{}': {}",
                path.display(),
                reason
            ),
            ConversionWarning::Latin1Fallback { path } => write!(
                f,
                "'{}' is not valid UTF-8; decoded as Windows-1252 (Latin-1 superset)",
                path.display()
            ),
            ConversionWarning::LargeInput { path, bytes } => write!(
                f,
                "Large file detected: '{}' ({:.1}MB). Conversion may take a while",
                path.display(),
                megabytes(*bytes)
            ),
            ConversionWarning::LargeLogo { path, bytes } => write!(
                f,
                "Large logo file '{}' ({:.1}MB). Consider optimizing it",
                path.display(),
                megabytes(*bytes)
            ),
        }
    }
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_not_found_display() {
        let e = ConvertError::InputNotFound {
            path: PathBuf::from("notes.md"),
        };
        assert!(e.to_string().contains("notes.md"), "got: {e}");
    }

    #[test]
    fn unsupported_format_lists_supported() {
        let e = ConvertError::LogoUnsupportedFormat {
            path: PathBuf::from("logo.gif"),
            extension: "gif".into(),
            supported: "png, jpg, jpeg, svg".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains(".gif"), "got: {msg}");
        assert!(msg.contains("svg"), "got: {msg}");
    }

    #[test]
    fn rendering_wraps_render_error() {
        let e: ConvertError = RenderError::Failed {
            program: "weasyprint".into(),
            status: "exit status: 1".into(),
            stderr: "boom".into(),
        }
        .into();
        assert!(e.to_string().contains("boom"), "got: {e}");
    }

    #[test]
    fn fallback_names_its_encoding() {
        let w = ConversionWarning::Latin1Fallback {
            path: PathBuf::from("old.md"),
        };
        assert!(w.to_string().contains("Windows-1252"), "got: {w}");
    }

    #[test]
    fn warning_display() {
        let w = ConversionWarning::LargeInput {
            path: PathBuf::from("big.md"),
            bytes: 12 * 1024 * 1024,
        };
        assert!(w.to_string().contains("12.0MB"), "got: {w}");
    }
}
