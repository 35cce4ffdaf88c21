//! Output formatters for evaluation reports

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::diagnostic::Violation;
use crate::engine::Evaluation;
use std::path::PathBuf;

/// Evaluation of one input tree
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub evaluation: Evaluation,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>, evaluation: Evaluation) -> Self {
        Self {
            path: path.into(),
            evaluation,
        }
    }
}

/// Output formatter trait
pub trait OutputFormatter: Send + Sync {
    /// Format every report
    fn format(&self, reports: &[FileReport]) -> String;

    /// Format a single violation
    fn format_violation(&self, violation: &Violation) -> String;
}

/// Pick a formatter by name
pub fn formatter(name: &str, colored: bool) -> Option<Box<dyn OutputFormatter>> {
    match name {
        "text" => Some(Box::new(if colored {
            TextFormatter::new()
        } else {
            TextFormatter::new().without_color()
        })),
        "json" => Some(Box::new(JsonFormatter::new().pretty())),
        _ => None,
    }
}
