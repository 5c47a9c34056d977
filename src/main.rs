use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use klasiko::{
    Config, ConversionProgress, ConversionReport, ConversionRequest, ConversionWarning, Converter,
    DocumentMetadata, LogoPlacement, LogoPosition, LogoSize, Stage, Theme,
};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  klasiko notes.md
  klasiko notes.md -o handout.pdf --theme rustic --toc
  klasiko report.md --logo brand.png --logo-placement title:large --logo-placement footer:small
  klasiko report.md --css "h1 { color: navy; }" --author "Jane Doe"

LOGO PLACEMENT:
  position: title, header, footer, both (header + footer), watermark, all
  size:     small, medium, large
"#;

#[derive(Parser)]
#[command(name = "klasiko", version)]
#[command(about = "Convert Markdown files to styled PDF")]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// Output PDF file (defaults to input name with .pdf extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Add a table of contents after the title page
    #[arg(long)]
    toc: bool,

    /// Extra CSS: a path to a .css file or a literal style sheet
    #[arg(long, value_name = "PATH_OR_CSS")]
    css: Option<String>,

    /// Visual theme (defaults to the config file's theme, then warm)
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// PDF author
    #[arg(long)]
    author: Option<String>,

    /// PDF subject
    #[arg(long)]
    subject: Option<String>,

    /// PDF keywords, comma separated
    #[arg(long)]
    keywords: Option<String>,

    /// Logo image (png, jpg, jpeg or svg)
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Logo placement as position:size, repeatable
    #[arg(long = "logo-placement", value_name = "POSITION:SIZE")]
    logo_placements: Vec<String>,

    /// Deprecated: use --logo-placement
    #[arg(long, hide = true)]
    logo_position: Option<String>,

    /// Deprecated: use --logo-placement
    #[arg(long, hide = true)]
    logo_size: Option<String>,

    /// Configuration file
    #[arg(long, default_value = "klasiko.toml", env = "KLASIKO_CONFIG")]
    config: PathBuf,

    /// HTML-to-PDF program, overriding the config file
    #[arg(long)]
    renderer: Option<String>,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,

    /// Disable the progress display
    #[arg(long)]
    no_progress: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Default,
    Warm,
    Rustic,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Default => Theme::Default,
            ThemeArg::Warm => Theme::Warm,
            ThemeArg::Rustic => Theme::Rustic,
        }
    }
}

/// Prints one line per finished stage above a spinner, and every warning
/// as it is found.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(show_stages: bool) -> Self {
        if !show_stages {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl ConversionProgress for CliProgress {
    fn on_stage_start(&self, stage: Stage) {
        self.bar
            .set_message(format!("[{}/{}] {}...", stage.index(), Stage::count(), stage));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed: Duration) {
        self.bar.println(format!(
            "[{}/{}] {}... ✓ ({:.2}s)",
            stage.index(),
            Stage::count(),
            stage,
            elapsed.as_secs_f64()
        ));
        if stage == Stage::Finalize {
            self.bar.finish_and_clear();
        }
    }

    fn on_stage_error(&self, stage: Stage, _error: &str) {
        self.bar.println(format!(
            "[{}/{}] {}... ✗",
            stage.index(),
            Stage::count(),
            stage
        ));
        self.bar.finish_and_clear();
    }

    fn on_warning(&self, warning: &ConversionWarning) {
        let line = warning_line(warning);
        // A hidden bar (no terminal, or --no-progress) drops println output
        if self.bar.is_hidden() {
            eprintln!("{}", line);
        } else {
            self.bar.println(line);
        }
    }
}

fn warning_line(warning: &ConversionWarning) -> String {
    format!("Warning: {}", warning)
}

fn main() {
    let cli = Cli::parse();

    let show_progress = !cli.quiet && !cli.no_progress;
    // The progress display and summary carry the feedback; keep library
    // logs to errors unless asked.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli, show_progress) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, show_progress: bool) -> Result<()> {
    let mut config = Config::load(&cli.config);
    if let Some(program) = &cli.renderer {
        config.renderer.program = program.clone();
    }

    let theme = cli
        .theme
        .map(Theme::from)
        .unwrap_or_else(|| config.default_theme());
    let placements = if cli.logo.is_some() {
        logo_placements(&cli)
    } else {
        Vec::new()
    };

    let request = ConversionRequest {
        output: cli.output.clone(),
        theme,
        toc: cli.toc,
        custom_css: cli.css.clone(),
        metadata: DocumentMetadata {
            author: cli.author.clone(),
            subject: cli.subject.clone(),
            keywords: cli.keywords.clone(),
        },
        logo: cli.logo.clone(),
        placements,
        ..ConversionRequest::new(cli.input.clone())
    };

    let mut converter = Converter::new(config);
    if !cli.quiet {
        converter = converter.with_progress(Box::new(CliProgress::new(show_progress)));
    }

    let report = converter.convert(&request)?;
    if !cli.quiet {
        print_summary(&report, request.logo.is_some());
    }
    Ok(())
}

/// Placements from `--logo-placement`, or from the deprecated singular
/// flags when none were given. Bad entries are skipped.
fn logo_placements(cli: &Cli) -> Vec<LogoPlacement> {
    if !cli.logo_placements.is_empty() {
        return cli
            .logo_placements
            .iter()
            .filter_map(|raw| match raw.parse::<LogoPlacement>() {
                Ok(placement) => Some(placement),
                Err(e) => {
                    eprintln!("Warning: {}, skipping", e);
                    None
                }
            })
            .collect();
    }

    let position = cli.logo_position.as_deref().unwrap_or("header");
    let size = LogoSize::from_name(cli.logo_size.as_deref().unwrap_or("medium"));
    match position.parse::<LogoPosition>() {
        Ok(position) => vec![LogoPlacement::new(position, size)],
        Err(e) => {
            eprintln!("Warning: {}, skipping", e);
            Vec::new()
        }
    }
}

fn print_summary(report: &ConversionReport, has_logo: bool) {
    println!("✓ PDF created: {}", report.output.display());
    println!("  Size:  {}", human_size(report.output_bytes));
    println!("  Theme: {}", report.theme);
    if has_logo && !report.placements.is_empty() {
        let placements: Vec<String> = report.placements.iter().map(|p| p.to_string()).collect();
        println!("  Logo:  {}", placements.join(", "));
    }
    println!("  Time:  {:.2}s", report.elapsed.as_secs_f64());
    if !report.warnings.is_empty() {
        println!("  Warnings: {}", report.warnings.len());
    }
}

fn human_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}
