//! Stage progress callbacks for conversions.
//!
//! A [`Converter`](crate::Converter) reports each of its five stages through
//! a [`ConversionProgress`] implementation. Every method has a no-op default,
//! so implementors only override what they display.

use std::fmt;
use std::time::Duration;

use crate::error::ConversionWarning;

/// The steps of a conversion, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Read,
    Extract,
    Assemble,
    Render,
    Finalize,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Read,
        Stage::Extract,
        Stage::Assemble,
        Stage::Render,
        Stage::Finalize,
    ];

    /// 1-based position of the stage.
    pub fn index(self) -> usize {
        match self {
            Stage::Read => 1,
            Stage::Extract => 2,
            Stage::Assemble => 3,
            Stage::Render => 4,
            Stage::Finalize => 5,
        }
    }

    pub fn count() -> usize {
        Self::ALL.len()
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::Read => "Reading markdown",
            Stage::Extract => "Parsing markdown",
            Stage::Assemble => "Building document",
            Stage::Render => "Rendering PDF",
            Stage::Finalize => "Finalizing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

pub trait ConversionProgress {
    /// Called just before `stage` runs.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when `stage` finished successfully.
    fn on_stage_complete(&self, stage: Stage, elapsed: Duration) {
        let _ = (stage, elapsed);
    }

    /// Called when `stage` failed; no further stages run.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called for each non-fatal problem as it is found.
    fn on_warning(&self, warning: &ConversionWarning) {
        let _ = warning;
    }
}

/// Used when no progress display is attached.
pub struct NoopProgress;

impl ConversionProgress for NoopProgress {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_numbered_in_order() {
        let indexes: Vec<usize> = Stage::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4, 5]);
        assert_eq!(Stage::count(), 5);
    }

    #[test]
    fn display_uses_description() {
        assert_eq!(Stage::Render.to_string(), "Rendering PDF");
    }

    #[test]
    fn noop_accepts_everything() {
        let p = NoopProgress;
        p.on_stage_start(Stage::Read);
        p.on_stage_complete(Stage::Read, Duration::from_millis(3));
        p.on_stage_error(Stage::Render, "boom");
        p.on_warning(&ConversionWarning::Latin1Fallback {
            path: "a.md".into(),
        });
    }
}
