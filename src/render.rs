//! HTML-to-PDF rendering through an external engine.
//!
//! The default engine is the `weasyprint` executable: the assembled document
//! is piped to its stdin and it writes the PDF straight to the output path.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RendererConfig;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(
        "could not start '{program}': {source}\n\
         Install WeasyPrint (pip install weasyprint) or set [renderer] program in klasiko.toml."
    )]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error talking to '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Turns a complete HTML document into a PDF file.
pub trait Renderer {
    /// Render `html` into a PDF written at `output`.
    ///
    /// `base_dir` is where relative URLs in the document (images, links)
    /// resolve from, normally the directory of the Markdown input.
    fn render(&self, html: &str, base_dir: Option<&Path>, output: &Path)
    -> Result<(), RenderError>;
}

/// Renders by running an external program.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list: extra args, base URL, stdin marker, output path.
    fn command_args(&self, base_dir: Option<&Path>, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        if let Some(dir) = base_dir {
            args.push("--base-url".into());
            args.push(dir.as_os_str().to_owned());
        }
        args.push("-".into());
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl From<&RendererConfig> for CommandRenderer {
    fn from(config: &RendererConfig) -> Self {
        CommandRenderer::new(config.program.clone()).with_args(config.args.iter().cloned())
    }
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self::from(&RendererConfig::default())
    }
}

impl Renderer for CommandRenderer {
    fn render(
        &self,
        html: &str,
        base_dir: Option<&Path>,
        output: &Path,
    ) -> Result<(), RenderError> {
        let args = self.command_args(base_dir, output);
        debug!("Running {} {:?}", self.program, args);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Stdin is fed from its own thread while stderr drains here, so
        // neither pipe can fill up and stall the child. The pipe closes
        // when the writer returns.
        let stdin = child.stdin.take();
        let (written, result) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(html.as_bytes()),
                None => Ok(()),
            });
            let result = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (written, result)
        });

        let result = result.map_err(|source| RenderError::Io {
            program: self.program.clone(),
            source,
        })?;

        if !result.status.success() {
            return Err(RenderError::Failed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        // Exit 0 with input left unread means the PDF came from truncated HTML.
        written.map_err(|source| RenderError::Io {
            program: self.program.clone(),
            source,
        })?;

        info!("Rendered {}", output.display());
        Ok(())
    }
}
