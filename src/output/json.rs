//! JSON output formatter

use super::{FileReport, OutputFormatter};
use crate::diagnostic::{Severity, Violation};
use crate::engine::SuppressReason;
use serde::Serialize;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty print with indentation
    pub pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    files: Vec<JsonFile<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    path: String,
    violations: Vec<JsonViolation<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suppressed: Vec<JsonSuppressed<'a>>,
}

#[derive(Serialize)]
struct JsonViolation<'a> {
    rule_id: &'a str,
    severity: &'a str,
    message: &'a str,
    tag: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    element_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

#[derive(Serialize)]
struct JsonSuppressed<'a> {
    rule_id: &'a str,
    reason: &'a str,
}

#[derive(Serialize)]
struct JsonSummary {
    trees_checked: usize,
    elements_checked: usize,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
    suppressed_count: usize,
    duration_ms: u128,
}

fn severity_str(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    }
}

fn json_violation(v: &Violation) -> JsonViolation<'_> {
    JsonViolation {
        rule_id: &v.rule_id,
        severity: severity_str(v.severity),
        message: &v.message,
        tag: &v.tag,
        element_id: v.element_id.as_deref(),
        source: v.source.as_ref().map(|s| s.to_string()),
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, reports: &[FileReport]) -> String {
        let mut summary = JsonSummary {
            trees_checked: reports.len(),
            elements_checked: 0,
            error_count: 0,
            warning_count: 0,
            info_count: 0,
            suppressed_count: 0,
            duration_ms: 0,
        };

        let files = reports
            .iter()
            .map(|report| {
                let eval = &report.evaluation;
                summary.elements_checked += eval.elements_checked;
                summary.error_count += eval.error_count();
                summary.warning_count += eval.warning_count();
                summary.info_count += eval.info_count();
                summary.suppressed_count += eval.suppressed.len();
                summary.duration_ms += eval.duration.as_millis();

                JsonFile {
                    path: report.path.display().to_string(),
                    violations: eval.violations.iter().map(json_violation).collect(),
                    suppressed: eval
                        .suppressed
                        .iter()
                        .map(|s| JsonSuppressed {
                            rule_id: &s.violation.rule_id,
                            reason: match s.reason {
                                SuppressReason::Excluded => "excluded",
                                SuppressReason::Filtered => "filtered",
                            },
                        })
                        .collect(),
                }
            })
            .collect();

        self.render(&JsonOutput { files, summary })
    }

    fn format_violation(&self, violation: &Violation) -> String {
        self.render(&json_violation(violation))
    }
}
