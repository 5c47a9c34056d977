//! The conversion pipeline: Read → Extract → Assemble → Render → Finalize.

use encoding_rs::WINDOWS_1252;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::document::{DocumentMetadata, DocumentParts, assemble};
use crate::error::{ConversionWarning, ConvertError};
use crate::front_matter::FrontMatter;
use crate::logo::{Logo, LogoPlacement};
use crate::parser::{ParseOptions, parse};
use crate::progress::{ConversionProgress, NoopProgress, Stage};
use crate::render::{CommandRenderer, Renderer};
use crate::theme::Theme;

/// Inputs above this size are converted but reported.
pub const LARGE_INPUT_BYTES: u64 = 10 * 1024 * 1024;

/// One Markdown file to turn into a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    /// Defaults to the input path with a `.pdf` extension.
    pub output: Option<PathBuf>,
    pub theme: Theme,
    pub toc: bool,
    /// Path to a style sheet, or literal CSS.
    pub custom_css: Option<String>,
    pub metadata: DocumentMetadata,
    pub logo: Option<PathBuf>,
    pub placements: Vec<LogoPlacement>,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            theme: Theme::default(),
            toc: false,
            custom_css: None,
            metadata: DocumentMetadata::default(),
            logo: None,
            placements: Vec::new(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("pdf"))
    }
}

/// What a successful conversion produced.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub output: PathBuf,
    /// Size of the written PDF; 0 when it could not be measured.
    pub output_bytes: u64,
    pub elapsed: Duration,
    pub stage_timings: Vec<(Stage, Duration)>,
    pub theme: Theme,
    pub placements: Vec<LogoPlacement>,
    pub warnings: Vec<ConversionWarning>,
}

pub struct Converter {
    config: Config,
    renderer: Box<dyn Renderer>,
    progress: Box<dyn ConversionProgress>,
}

impl Converter {
    /// A converter using the renderer named in `config`.
    pub fn new(config: Config) -> Self {
        let renderer = CommandRenderer::from(&config.renderer);
        Self {
            config,
            renderer: Box::new(renderer),
            progress: Box::new(NoopProgress),
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn ConversionProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionReport, ConvertError> {
        let started = Instant::now();
        let output = request.output_path();
        let mut warnings = Vec::new();
        let mut timings = Vec::with_capacity(Stage::count());

        info!(
            "Converting {} → {} (theme: {})",
            request.input.display(),
            output.display(),
            request.theme
        );

        // A bad logo aborts before any other work.
        let logo = match &request.logo {
            Some(path) => {
                let (logo, logo_warnings) = Logo::load(path)?;
                for warning in &logo_warnings {
                    self.progress.on_warning(warning);
                }
                warnings.extend(logo_warnings);
                Some(logo)
            }
            None => None,
        };

        let markdown = self.stage(Stage::Read, &mut timings, || {
            read_input(&request.input, &mut warnings, self.progress.as_ref())
        })?;

        let (front_matter, parsed) = self.stage(Stage::Extract, &mut timings, || {
            let front_matter = FrontMatter::extract(&markdown);
            let options = ParseOptions::from_config(&self.config.markdown, request.toc);
            Ok((front_matter, parse(&markdown, &options)))
        })?;
        debug!(
            "Front matter: title={:?}, {} metadata entries",
            front_matter.title,
            front_matter.metadata.len()
        );

        let html = self.stage(Stage::Assemble, &mut timings, || {
            let custom_css = request.custom_css.as_deref().and_then(|css| {
                resolve_custom_css(css, &mut warnings, self.progress.as_ref())
            });
            let file_stem = request
                .input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let toc = if request.toc {
                parsed.toc.as_deref()
            } else {
                None
            };

            Ok(assemble(&DocumentParts {
                body: &parsed.body,
                front_matter: &front_matter,
                file_stem: &file_stem,
                theme: request.theme,
                logo: logo.as_ref(),
                placements: &request.placements,
                custom_css: custom_css.as_deref(),
                metadata: &request.metadata,
                toc,
            }))
        })?;

        self.stage(Stage::Render, &mut timings, || {
            let base_dir = base_dir(&request.input);
            self.renderer
                .render(&html, base_dir.as_deref(), &output)
                .map_err(|e| {
                    warn!("Rendering failed: {}", e);
                    ConvertError::from(e)
                })
        })?;

        let output_bytes = self.stage(Stage::Finalize, &mut timings, || {
            Ok(match fs::metadata(&output) {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    warn!("Could not measure {}: {}", output.display(), e);
                    0
                }
            })
        })?;

        let elapsed = started.elapsed();
        info!(
            "Wrote {} ({} bytes) in {:.2}s",
            output.display(),
            output_bytes,
            elapsed.as_secs_f64()
        );

        Ok(ConversionReport {
            output,
            output_bytes,
            elapsed,
            stage_timings: timings,
            theme: request.theme,
            placements: request.placements.clone(),
            warnings,
        })
    }

    /// Run one stage, reporting it to the progress callback and timing it.
    fn stage<T>(
        &self,
        stage: Stage,
        timings: &mut Vec<(Stage, Duration)>,
        run: impl FnOnce() -> Result<T, ConvertError>,
    ) -> Result<T, ConvertError> {
        self.progress.on_stage_start(stage);
        let started = Instant::now();
        match run() {
            Ok(value) => {
                let elapsed = started.elapsed();
                debug!("[{}/{}] {} took {:?}", stage.index(), Stage::count(), stage, elapsed);
                timings.push((stage, elapsed));
                self.progress.on_stage_complete(stage, elapsed);
                Ok(value)
            }
            Err(e) => {
                self.progress.on_stage_error(stage, &e.to_string());
                Err(e)
            }
        }
    }
}

fn record(
    warning: ConversionWarning,
    warnings: &mut Vec<ConversionWarning>,
    progress: &dyn ConversionProgress,
) {
    // Surfaced through the report and the progress callback
    debug!("{}", warning);
    progress.on_warning(&warning);
    warnings.push(warning);
}

/// Load the input as UTF-8, falling back to Windows-1252 (a Latin-1 superset).
fn read_input(
    path: &Path,
    warnings: &mut Vec<ConversionWarning>,
    progress: &dyn ConversionProgress,
) -> Result<String, ConvertError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConvertError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => ConvertError::InputUnreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let size = bytes.len() as u64;
    if size > LARGE_INPUT_BYTES {
        record(
            ConversionWarning::LargeInput {
                path: path.to_path_buf(),
                bytes: size,
            },
            warnings,
            progress,
        );
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            let bytes = e.into_bytes();
            let (text, had_errors) = WINDOWS_1252.decode_without_bom_handling(&bytes);
            if had_errors {
                return Err(ConvertError::EncodingUnreadable {
                    path: path.to_path_buf(),
                });
            }
            record(
                ConversionWarning::Latin1Fallback {
                    path: path.to_path_buf(),
                },
                warnings,
                progress,
            );
            Ok(text.into_owned())
        }
    }
}

/// Interpret the `--css` value: an existing file is read, anything that
/// looks like a style sheet name but is missing is reported, the rest is
/// used as literal CSS.
fn resolve_custom_css(
    value: &str,
    warnings: &mut Vec<ConversionWarning>,
    progress: &dyn ConversionProgress,
) -> Option<String> {
    let path = Path::new(value);
    if path.is_file() {
        return match fs::read_to_string(path) {
            Ok(css) => {
                debug!("Loaded custom CSS from {}", path.display());
                Some(css)
            }
            Err(e) => {
                record(
                    ConversionWarning::CustomCssUnreadable {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    },
                    warnings,
                    progress,
                );
                None
            }
        };
    }

    if value.trim_end().ends_with(".css") && !value.contains('{') {
        record(
            ConversionWarning::CustomCssUnreadable {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            },
            warnings,
            progress,
        );
        return None;
    }

    Some(value.to_string())
}

/// Directory relative URLs in the document resolve against.
fn base_dir(input: &Path) -> Option<PathBuf> {
    let dir = match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::path::absolute(dir).ok()
}
