//! a11y-lint CLI - accessibility checks for element tree files
//!
//! Reads tree documents (JSON or YAML), runs construction and mount checks
//! over each, and prints the violations.

use a11y_lint::config::{Config, Device};
use a11y_lint::engine::Evaluator;
use a11y_lint::output::{self, FileReport};
use a11y_lint::registry::RuleRegistry;
use a11y_lint::rule::{Rule, RuleScope};
use a11y_lint::{Severity, TreeDocument};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "a11y-lint",
    version,
    about = "Accessibility linter for virtual UI element trees",
    long_about = "Checks element trees for missing labels, keyboard handlers, alt text and aria-* misuse."
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check tree documents
    Check {
        /// Tree files (.json, .yaml, .yml)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,

        /// Rule ids to suppress (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// Target devices (comma-separated: desktop, mobile)
        #[arg(long, value_delimiter = ',')]
        device: Option<Vec<Device>>,

        /// Prefix for every message
        #[arg(long)]
        prefix: Option<String>,

        /// Attach the source element markup to each violation
        #[arg(long)]
        include_source: bool,

        /// Skip mount-time label checks
        #[arg(long)]
        no_label_resolution: bool,

        /// Exit with 0 even if violations are found
        #[arg(long)]
        exit_zero: bool,
    },
    /// List available rules
    Rules {
        /// Only rules of this scope (tag, prop-combination, subtree-label)
        #[arg(long)]
        scope: Option<RuleScope>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show detailed information about a rule
    Explain {
        /// Rule ID to explain
        rule_id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl Format {
    fn name(self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Json => "json",
        }
    }
}

fn severity_str(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "error".red(),
        Severity::Warning => "warning".yellow(),
        Severity::Info => "info".blue(),
    }
}

/// Print a rule in a consistent format
fn print_rule(rule: &Rule) {
    let platform = if rule.desktop_only {
        " [desktop]".yellow()
    } else {
        "".normal()
    };

    println!(
        "    {} [{}] ({}){}",
        rule.id.cyan(),
        severity_str(rule.severity),
        rule.scope,
        platform
    );
    if let Some(desc) = &rule.description {
        println!("      {}", desc);
    }
    if !rule.tags.is_empty() {
        println!("      Tags: {}", rule.tags.join(", "));
    }
}

/// Print detailed rule explanation
fn explain_rule(rule: &Rule) {
    println!("{}", "Rule Details".bold());
    println!();
    println!("  {}: {}", "ID".bold(), rule.id.cyan());
    println!("  {}: {}", "Severity".bold(), severity_str(rule.severity));
    println!("  {}: {}", "Scope".bold(), rule.scope);

    if !rule.target.is_empty() {
        println!("  {}: {}", "Elements".bold(), rule.target.join(", "));
    }
    if rule.desktop_only {
        println!("  {}: desktop only", "Devices".bold());
    }

    println!();
    println!("  {}", "Message".bold());
    println!("  {}", rule.message);

    if let Some(desc) = &rule.description {
        println!();
        println!("  {}", "Description".bold());
        println!("  {}", desc);
    }

    if let Some(docs) = &rule.docs {
        println!();
        println!("  {}: {}", "Documentation".bold(), docs.blue());
    }

    if !rule.tags.is_empty() {
        println!();
        println!("  {}: {}", "Tags".bold(), rule.tags.join(", "));
    }
}

fn handle_rules(scope: Option<RuleScope>, json: bool) -> anyhow::Result<i32> {
    let registry = RuleRegistry::builtin();
    let rules: Vec<&Rule> = registry
        .rules()
        .iter()
        .filter(|r| scope.map_or(true, |s| r.scope == s))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(0);
    }

    println!("{} ({})", "Rules".bold(), rules.len());
    for rule in rules {
        print_rule(rule);
    }
    Ok(0)
}

fn handle_explain(rule_id: &str) -> anyhow::Result<i32> {
    let registry = RuleRegistry::builtin();
    match registry.get(rule_id) {
        Some(rule) => {
            explain_rule(rule);
            Ok(0)
        }
        None => {
            eprintln!("{}: Rule '{}' not found", "error".red().bold(), rule_id);
            eprintln!();
            eprintln!("Use {} to see all available rules", "a11y-lint rules".cyan());
            Ok(1)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_check(
    files: &[PathBuf],
    config_path: Option<&PathBuf>,
    format: Format,
    exclude: Option<Vec<String>>,
    device: Option<Vec<Device>>,
    prefix: Option<String>,
    include_source: bool,
    no_label_resolution: bool,
    colored: bool,
) -> anyhow::Result<i32> {
    let mut config = match config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_default().unwrap_or_else(|e| {
            log::warn!("ignoring default configuration: {}", e);
            Config::default()
        }),
    };
    config.merge_cli(exclude, device, include_source, prefix);
    if no_label_resolution {
        config.label_resolution = false;
    }

    let registry = RuleRegistry::builtin();
    for id in &config.exclude {
        if registry.get(id).is_none() {
            log::warn!("excluded rule `{}` does not exist", id);
        }
    }

    let prefix = config.warning_prefix.clone();
    let evaluator = Evaluator::new(Arc::new(registry), Arc::new(config));

    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        let doc = TreeDocument::load(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut evaluation = evaluator
            .lint(&doc.tree, &doc.components)
            .with_context(|| format!("Failed to check {}", path.display()))?;

        if !prefix.is_empty() {
            for violation in &mut evaluation.violations {
                violation.message = format!("{}{}", prefix, violation.message);
            }
        }
        log::info!(
            "{}: {} elements, {} violations",
            path.display(),
            evaluation.elements_checked,
            evaluation.violations.len()
        );
        reports.push(FileReport::new(path, evaluation));
    }

    let Some(formatter) = output::formatter(format.name(), colored) else {
        bail!("unsupported output format {}", format.name());
    };
    print!("{}", formatter.format(&reports));

    Ok(reports
        .iter()
        .map(|r| r.evaluation.exit_code())
        .max()
        .unwrap_or(0))
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let colored = !cli.no_color;
    match cli.command {
        Commands::Check {
            files,
            config,
            format,
            exclude,
            device,
            prefix,
            include_source,
            no_label_resolution,
            exit_zero,
        } => {
            let code = handle_check(
                &files,
                config.as_ref(),
                format,
                exclude,
                device,
                prefix,
                include_source,
                no_label_resolution,
                colored,
            )?;
            Ok(if exit_zero { 0 } else { code })
        }
        Commands::Rules { scope, json } => handle_rules(scope, json),
        Commands::Explain { rule_id } => handle_explain(&rule_id),
    }
}

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Handle --no-color
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            std::process::exit(2);
        }
    }
}
