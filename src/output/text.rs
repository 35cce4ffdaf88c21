//! Human-readable text output formatter

use super::{FileReport, OutputFormatter};
use crate::diagnostic::{Severity, Violation};
use colored::*;
use std::time::Duration;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show the source element when attached
    pub show_source: bool,

    /// Show statistics
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_source: true,
            show_stats: true,
        }
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn severity_str(&self, severity: Severity) -> ColoredString {
        let s = format!("{}", severity);
        if !self.colored {
            return s.normal();
        }
        match severity {
            Severity::Error => s.red().bold(),
            Severity::Warning => s.yellow().bold(),
            Severity::Info => s.blue(),
        }
    }

    fn paint(&self, s: String, color: Color) -> String {
        if self.colored {
            s.color(color).to_string()
        } else {
            s
        }
    }

    fn plural(count: usize, one: &str, many: &str) -> String {
        format!("{} {}", count, if count == 1 { one } else { many })
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, reports: &[FileReport]) -> String {
        let mut output = String::new();
        let (mut errors, mut warnings, mut infos, mut suppressed) = (0, 0, 0, 0);
        let mut duration = Duration::ZERO;

        for report in reports {
            let eval = &report.evaluation;
            errors += eval.error_count();
            warnings += eval.warning_count();
            infos += eval.info_count();
            suppressed += eval.suppressed.len();
            duration += eval.duration;

            if eval.violations.is_empty() {
                continue;
            }

            let path = report.path.display().to_string();
            if self.colored {
                output.push_str(&format!("{}\n", path.underline()));
            } else {
                output.push_str(&format!("{}\n", path));
            }

            for violation in &eval.violations {
                output.push_str(&self.format_violation(violation));
                output.push('\n');
            }
            output.push('\n');
        }

        if self.show_stats {
            output.push_str(&format!(
                "\n{} checked",
                Self::plural(reports.len(), "tree", "trees")
            ));

            let mut counts = Vec::new();
            if errors > 0 {
                counts.push(self.paint(Self::plural(errors, "error", "errors"), Color::Red));
            }
            if warnings > 0 {
                counts.push(self.paint(Self::plural(warnings, "warning", "warnings"), Color::Yellow));
            }
            if infos > 0 {
                counts.push(self.paint(Self::plural(infos, "info", "infos"), Color::Blue));
            }
            if suppressed > 0 {
                counts.push(format!("{} suppressed", suppressed));
            }

            if !counts.is_empty() {
                output.push_str(&format!(": {}", counts.join(", ")));
            }
            output.push('\n');

            output.push_str(&format!("Finished in {:.2}s\n", duration.as_secs_f64()));
        }

        output
    }

    fn format_violation(&self, violation: &Violation) -> String {
        let mut output = String::new();

        let element = match &violation.element_id {
            Some(id) => format!("<{}#{}>", violation.tag, id),
            None => format!("<{}>", violation.tag),
        };

        output.push_str(&format!(
            "{}: {}[{}]: {}\n",
            self.paint(element, Color::BrightBlack),
            self.severity_str(violation.severity),
            self.paint(violation.rule_id.clone(), Color::Cyan),
            violation.message
        ));

        if self.show_source {
            if let Some(source) = &violation.source {
                output.push_str(&format!(
                    "   {} {}\n",
                    self.paint("|".to_string(), Color::Blue),
                    source
                ));
            }
        }

        output
    }
}
