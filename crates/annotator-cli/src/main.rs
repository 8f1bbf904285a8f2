//! regex-annotate CLI
//!
//! Runs regex annotation rules over files and prints the resulting problems list.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use serde::Serialize;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use annotator_core::{
    CompileOptions, DEFAULT_BACKTRACK_LIMIT, Diagnostic, DiagnosticSeverity, Position, Session,
};
use annotator_rules::{RuleSet, language_id_for_path};

/// regex-annotate - regex-driven annotations for source files
#[derive(Parser)]
#[command(name = "regex-annotate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rules file (a JSON array of rules, or an object with a "rules" array)
    #[arg(short, long)]
    rules: PathBuf,

    /// Language id for every input file (default: inferred from the file extension)
    #[arg(short, long)]
    language: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Backtracking limit for rule patterns
    #[arg(long, default_value_t = DEFAULT_BACKTRACK_LIMIT)]
    backtrack_limit: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Files to annotate
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One `path:line:col: severity[code] message` line per problem
    Text,
    /// A JSON array of problems
    Json,
}

/// One diagnostic as printed by the JSON output format (zero-based positions).
#[derive(Debug, Serialize)]
struct Problem<'a> {
    path: &'a str,
    code: &'a str,
    severity: &'static str,
    message: &'a str,
    range: ProblemRange,
}

#[derive(Debug, Serialize)]
struct ProblemRange {
    start: ProblemPosition,
    end: ProblemPosition,
}

#[derive(Debug, Serialize)]
struct ProblemPosition {
    line: usize,
    column: usize,
}

impl From<Position> for ProblemPosition {
    fn from(position: Position) -> Self {
        Self {
            line: position.line,
            column: position.column,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let rule_set = RuleSet::from_file(&cli.rules)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to load rules from {}", cli.rules.display()))?;
    for skipped in &rule_set.skipped {
        warn!("Skipping rule #{}: {}", skipped.index, skipped.error);
    }

    let mut session = Session::new()
        .with_options(CompileOptions {
            backtrack_limit: cli.backtrack_limit,
        })
        .with_diagnostic_source("regex-annotate");
    let report = session.activate(&rule_set.rules);
    debug!("Loaded {} rules", report.loaded.len());

    let mut uris = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let uri = open_file(&mut session, path, cli.language.as_deref())?;
        uris.push(uri);
    }

    let mut problems = Vec::new();
    for uri in &uris {
        let mut diagnostics = session.sink().diagnostics_for_uri(uri);
        diagnostics.sort_by_key(|d| d.range.start);
        problems.extend(diagnostics.into_iter().map(|d| (uri.as_str(), d)));
    }

    let has_errors = problems
        .iter()
        .any(|(_, d)| d.severity == DiagnosticSeverity::Error);

    match cli.format {
        OutputFormat::Json => print_json(&problems)?,
        OutputFormat::Text => print_text(&problems, uris.len()),
    }

    Ok(has_errors)
}

/// Open `path` as a document with an editor, and make that editor active so every rule
/// refreshes it.
fn open_file(session: &mut Session, path: &Path, language: Option<&str>) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let uri = path.display().to_string();
    let language_id = language.unwrap_or_else(|| language_id_for_path(path));
    debug!("Opening {} as {}", uri, language_id);

    let document = session
        .open_document(uri.clone(), language_id, &text)
        .into_diagnostic()?;
    let editor = session.open_editor(document).into_diagnostic()?;
    if session.workspace().active_editor() != Some(editor) {
        session.set_active_editor(Some(editor)).into_diagnostic()?;
    }
    Ok(uri)
}

fn print_text(problems: &[(&str, &Diagnostic)], file_count: usize) {
    for (path, diagnostic) in problems {
        let start = diagnostic.range.start;
        println!(
            "{}:{}:{}: {}[{}] {}",
            path,
            start.line + 1,
            start.column + 1,
            severity_label(diagnostic.severity),
            diagnostic.code,
            diagnostic.message
        );
    }

    let errors = problems
        .iter()
        .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
        .count();
    println!(
        "Checked {} files, found {} problems ({} errors)",
        file_count,
        problems.len(),
        errors
    );
}

fn print_json(problems: &[(&str, &Diagnostic)]) -> Result<()> {
    let output: Vec<Problem<'_>> = problems
        .iter()
        .map(|(path, diagnostic)| Problem {
            path: *path,
            code: diagnostic.code.as_str(),
            severity: diagnostic.severity.name(),
            message: diagnostic.message.as_str(),
            range: ProblemRange {
                start: diagnostic.range.start.into(),
                end: diagnostic.range.end.into(),
            },
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}

fn severity_label(severity: DiagnosticSeverity) -> &'static str {
    match severity {
        DiagnosticSeverity::Error => "error",
        DiagnosticSeverity::Warning => "warning",
        DiagnosticSeverity::Information => "info",
        DiagnosticSeverity::Hint => "hint",
    }
}
