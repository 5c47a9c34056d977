//! Logo branding: validation, data-URI encoding and placement styles.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::error::{ConversionWarning, ConvertError};

/// Logos above this size are embedded but reported.
pub const LARGE_LOGO_BYTES: u64 = 512 * 1024;

const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "svg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogoPosition {
    Title,
    Header,
    Footer,
    /// Header and footer
    Both,
    Watermark,
    /// Every position
    All,
}

impl LogoPosition {
    pub fn name(self) -> &'static str {
        match self {
            LogoPosition::Title => "title",
            LogoPosition::Header => "header",
            LogoPosition::Footer => "footer",
            LogoPosition::Both => "both",
            LogoPosition::Watermark => "watermark",
            LogoPosition::All => "all",
        }
    }

    fn includes_header(self) -> bool {
        matches!(
            self,
            LogoPosition::Header | LogoPosition::Both | LogoPosition::All
        )
    }

    fn includes_footer(self) -> bool {
        matches!(
            self,
            LogoPosition::Footer | LogoPosition::Both | LogoPosition::All
        )
    }

    pub fn includes_title(self) -> bool {
        matches!(self, LogoPosition::Title | LogoPosition::All)
    }

    pub fn includes_watermark(self) -> bool {
        matches!(self, LogoPosition::Watermark | LogoPosition::All)
    }
}

impl FromStr for LogoPosition {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(LogoPosition::Title),
            "header" => Ok(LogoPosition::Header),
            "footer" => Ok(LogoPosition::Footer),
            "both" => Ok(LogoPosition::Both),
            "watermark" => Ok(LogoPosition::Watermark),
            "all" => Ok(LogoPosition::All),
            _ => Err(PlacementError::UnknownPosition(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogoSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl LogoSize {
    /// Unknown names fall back to [`LogoSize::Medium`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "small" => LogoSize::Small,
            "medium" => LogoSize::Medium,
            "large" => LogoSize::Large,
            other => {
                debug!("Unknown logo size '{}', using medium", other);
                LogoSize::Medium
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LogoSize::Small => "small",
            LogoSize::Medium => "medium",
            LogoSize::Large => "large",
        }
    }

    fn dimensions(self) -> Dimensions {
        match self {
            LogoSize::Small => Dimensions {
                header: "1cm",
                footer: "0.8cm",
                title: "4cm",
                watermark: "30%",
            },
            LogoSize::Medium => Dimensions {
                header: "1.5cm",
                footer: "1cm",
                title: "6cm",
                watermark: "40%",
            },
            LogoSize::Large => Dimensions {
                header: "2cm",
                footer: "1.2cm",
                title: "8cm",
                watermark: "50%",
            },
        }
    }
}

/// Physical sizes for each kind of placement.
struct Dimensions {
    header: &'static str,
    footer: &'static str,
    title: &'static str,
    watermark: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogoPlacement {
    pub position: LogoPosition,
    pub size: LogoSize,
}

impl LogoPlacement {
    pub fn new(position: LogoPosition, size: LogoSize) -> Self {
        Self { position, size }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("Invalid logo placement format: '{0}'. Use 'position:size'")]
    Malformed(String),

    #[error(
        "Unknown logo position '{0}'. Expected one of: title, header, footer, both, watermark, all"
    )]
    UnknownPosition(String),
}

impl FromStr for LogoPlacement {
    type Err = PlacementError;

    /// Parse `position:size`, e.g. `header:small`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (position, size) = s
            .split_once(':')
            .ok_or_else(|| PlacementError::Malformed(s.to_string()))?;
        Ok(Self {
            position: position.parse()?,
            size: LogoSize::from_name(size),
        })
    }
}

impl fmt::Display for LogoPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.position.name(), self.size.name())
    }
}

/// A validated logo, ready to embed as a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    pub path: PathBuf,
    pub mime_type: &'static str,
    pub data_uri: String,
}

impl Logo {
    /// Validate and encode a logo file.
    ///
    /// The extension is checked before the file is touched, so an
    /// unsupported format is reported even when the file does not exist.
    pub fn load(path: &Path) -> Result<(Self, Vec<ConversionWarning>), ConvertError> {
        let mime_type = mime_type_for(path)?;

        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConvertError::LogoNotFound {
                path: path.to_path_buf(),
            },
            _ => ConvertError::LogoUnreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        if !metadata.is_file() {
            return Err(ConvertError::LogoNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut warnings = Vec::new();
        if metadata.len() > LARGE_LOGO_BYTES {
            debug!(
                "Large logo file ({:.1}MB). Consider optimizing for faster PDF generation.",
                metadata.len() as f64 / (1024.0 * 1024.0)
            );
            warnings.push(ConversionWarning::LargeLogo {
                path: path.to_path_buf(),
                bytes: metadata.len(),
            });
        }

        let bytes = fs::read(path).map_err(|e| ConvertError::LogoUnreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        let data_uri = format!("data:{};base64,{}", mime_type, STANDARD.encode(&bytes));
        debug!(
            "Encoded logo {} → {} bytes base64",
            path.display(),
            data_uri.len()
        );

        Ok((
            Self {
                path: path.to_path_buf(),
                mime_type,
                data_uri,
            },
            warnings,
        ))
    }
}

fn mime_type_for(path: &Path) -> Result<&'static str, ConvertError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "svg" => Ok("image/svg+xml"),
        _ => Err(ConvertError::LogoUnsupportedFormat {
            path: path.to_path_buf(),
            extension,
            supported: SUPPORTED_EXTENSIONS.join(", "),
        }),
    }
}

/// One style fragment per placement, in request order.
///
/// Overlapping placements (`both` plus `footer`, say) each emit their own
/// rules; nothing is deduplicated.
pub fn placement_styles(data_uri: &str, placements: &[LogoPlacement]) -> Vec<String> {
    placements
        .iter()
        .map(|placement| placement_css(data_uri, *placement))
        .collect()
}

/// Style rules for a single placement.
pub fn placement_css(data_uri: &str, placement: LogoPlacement) -> String {
    let size = placement.size.dimensions();
    let position = placement.position;
    let mut css = String::new();

    if position.includes_header() {
        css.push_str(&format!(
            r#"
@page {{
    @top-left {{
        content: " ";
        background-image: url('{data_uri}');
        background-size: contain;
        background-repeat: no-repeat;
        background-position: left center;
        height: {height};
        width: 3cm;
    }}
}}

@page :first {{
    @top-left {{
        content: none;
    }}
}}
"#,
            height = size.header
        ));
    }

    if position.includes_footer() {
        css.push_str(&format!(
            r#"
@page {{
    @bottom-right {{
        content: " ";
        background-image: url('{data_uri}');
        background-size: contain;
        background-repeat: no-repeat;
        background-position: right center;
        height: {height};
        width: 2.5cm;
    }}
}}
"#,
            height = size.footer
        ));
    }

    if position.includes_title() {
        css.push_str(&format!(
            r#"
.title-logo {{
    display: block;
    margin: 0 auto 2em auto;
    max-height: {max_height};
    width: auto;
    break-after: avoid;
}}
"#,
            max_height = size.title
        ));
    }

    if position.includes_watermark() {
        css.push_str(&format!(
            r#"
.watermark {{
    position: fixed;
    top: 50%;
    left: 50%;
    transform: translate(-50%, -50%);
    opacity: 0.08;
    z-index: -1;
    width: {width};
    pointer-events: none;
}}

.watermark img {{
    width: 100%;
    height: auto;
}}
"#,
            width = size.watermark
        ));
    }

    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const URI: &str = "data:image/png;base64,AAAA";

    #[test]
    fn parse_placement() {
        let placement: LogoPlacement = "header:small".parse().unwrap();
        assert_eq!(
            placement,
            LogoPlacement::new(LogoPosition::Header, LogoSize::Small)
        );

        let spaced: LogoPlacement = " Title : LARGE ".parse().unwrap();
        assert_eq!(
            spaced,
            LogoPlacement::new(LogoPosition::Title, LogoSize::Large)
        );
    }

    #[test]
    fn parse_placement_errors() {
        assert_eq!(
            "title".parse::<LogoPlacement>(),
            Err(PlacementError::Malformed("title".to_string()))
        );
        assert_eq!(
            "nowhere:large".parse::<LogoPlacement>(),
            Err(PlacementError::UnknownPosition("nowhere".to_string()))
        );
    }

    #[test]
    fn unknown_size_is_medium() {
        let placement: LogoPlacement = "footer:huge".parse().unwrap();
        assert_eq!(placement.size, LogoSize::Medium);
    }

    #[test]
    fn header_suppressed_on_first_page() {
        let css = placement_css(URI, LogoPlacement::new(LogoPosition::Header, LogoSize::Small));
        assert!(css.contains("@top-left"));
        assert!(css.contains("@page :first"));
        assert!(css.contains("height: 1cm;"));
        assert!(css.contains(URI));
        assert!(!css.contains("@bottom-right"));
        assert!(!css.contains(".title-logo"));
    }

    #[test]
    fn footer_sizes() {
        let large = placement_css(URI, LogoPlacement::new(LogoPosition::Footer, LogoSize::Large));
        assert!(large.contains("@bottom-right"));
        assert!(large.contains("height: 1.2cm;"));
        assert!(!large.contains("@top-left"));
    }

    #[test]
    fn both_is_header_and_footer() {
        let css = placement_css(URI, LogoPlacement::new(LogoPosition::Both, LogoSize::Medium));
        assert!(css.contains("@top-left"));
        assert!(css.contains("@bottom-right"));
        assert!(!css.contains(".watermark"));
        assert!(!css.contains(".title-logo"));
    }

    #[test]
    fn all_covers_every_position() {
        let css = placement_css(URI, LogoPlacement::new(LogoPosition::All, LogoSize::Large));
        assert!(css.contains("@top-left"));
        assert!(css.contains("@bottom-right"));
        assert!(css.contains("max-height: 8cm;"));
        assert!(css.contains("width: 50%;"));
        assert!(css.contains("opacity: 0.08"));
    }

    #[test]
    fn overlapping_placements_are_not_deduplicated() {
        let placements = [
            LogoPlacement::new(LogoPosition::Both, LogoSize::Small),
            LogoPlacement::new(LogoPosition::Footer, LogoSize::Small),
        ];
        let fragments = placement_styles(URI, &placements);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments.concat().matches("@bottom-right").count(), 2);
    }

    #[test]
    fn unsupported_extension_wins_over_missing_file() {
        let err = Logo::load(Path::new("/definitely/missing/logo.gif")).unwrap_err();
        assert!(matches!(err, ConvertError::LogoUnsupportedFormat { .. }));

        let err = Logo::load(Path::new("/definitely/missing/logo")).unwrap_err();
        assert!(matches!(err, ConvertError::LogoUnsupportedFormat { .. }));
    }

    #[test]
    fn unsupported_extension_on_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.gif");
        fs::write(&path, b"GIF89a").unwrap();

        let err = Logo::load(&path).unwrap_err();
        match err {
            ConvertError::LogoUnsupportedFormat { extension, .. } => assert_eq!(extension, "gif"),
            other => panic!("expected LogoUnsupportedFormat, got: {other:?}"),
        }
    }

    #[test]
    fn missing_logo() {
        let err = Logo::load(Path::new("/definitely/missing/logo.png")).unwrap_err();
        assert!(matches!(err, ConvertError::LogoNotFound { .. }));
    }

    #[test]
    fn encodes_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Brand.SVG");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"<svg/>").unwrap();

        let (logo, warnings) = Logo::load(&path).unwrap();
        assert_eq!(logo.mime_type, "image/svg+xml");
        assert_eq!(logo.data_uri, "data:image/svg+xml;base64,PHN2Zy8+");
        assert!(warnings.is_empty());
    }

    #[test]
    fn large_logo_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        fs::write(&path, vec![0u8; LARGE_LOGO_BYTES as usize + 1]).unwrap();

        let (logo, warnings) = Logo::load(&path).unwrap();
        assert!(logo.data_uri.starts_with("data:image/png;base64,"));
        assert!(matches!(
            warnings.as_slice(),
            [ConversionWarning::LargeLogo { .. }]
        ));
    }
}
