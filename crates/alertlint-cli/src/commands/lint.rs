use std::path::PathBuf;

use alertlint_lib::{Check, Diagnostic, Diagnostics, Severity, TemplateCheck};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::rule_loader::{RuleFile, load_rule_files};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LintConfig {
    pub format: OutputFormat,
    /// Lowest severity that makes the run fail.
    pub fail_on: Severity,
}

pub struct LintArgs {
    pub paths: Vec<PathBuf>,
    pub config: LintConfig,
    pub color: bool,
}

/// Outcome of checking one rule file.
#[derive(Debug)]
pub struct FileReport {
    pub file: RuleFile,
    pub result: Result<Diagnostics, String>,
}

impl FileReport {
    pub fn fails(&self, threshold: Severity) -> bool {
        match &self.result {
            Ok(diagnostics) => diagnostics.at_least(threshold),
            Err(_) => true,
        }
    }
}

pub fn run(args: LintArgs) {
    let files = match load_rule_files(&args.paths) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let checks: Vec<Box<dyn Check>> = vec![Box::new(TemplateCheck::new())];
    let reports: Vec<FileReport> = files
        .into_iter()
        .map(|file| {
            let result = lint_source(&file.source, &checks);
            FileReport { file, result }
        })
        .collect();

    match args.config.format {
        OutputFormat::Text => {
            print!("{}", render_text(&reports, args.color));
            if let Some(line) = summary(&reports) {
                eprintln!("{}", line);
            }
        }
        OutputFormat::Json => match render_json(&reports) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        },
    }

    if reports.iter().any(|r| r.fails(args.config.fail_on)) {
        std::process::exit(1);
    }
}

/// Runs every check over every rule in `source`.
///
/// Rules are checked in parallel; the merged result is ordered by line.
pub fn lint_source(source: &str, checks: &[Box<dyn Check>]) -> Result<Diagnostics, String> {
    let rules = alertlint_core::read_rules(source).map_err(|e| e.to_string())?;
    info!(rules = rules.len(), "checking rules");

    let found: Vec<Diagnostics> = rules
        .par_iter()
        .flat_map_iter(move |rule| {
            checks.iter().map(move |check| {
                debug!(rule = rule.name(), check = check.reporter(), "running check");
                check.check(rule)
            })
        })
        .collect();

    let mut diagnostics = Diagnostics::new();
    for d in found {
        diagnostics.extend(d);
    }
    diagnostics.sort_by_line();
    Ok(diagnostics)
}

pub fn render_text(reports: &[FileReport], colored: bool) -> String {
    let mut out = String::new();
    for report in reports {
        match &report.result {
            Ok(diagnostics) if diagnostics.is_empty() => {}
            Ok(diagnostics) => {
                out.push_str(
                    &diagnostics
                        .printer()
                        .source(&report.file.source)
                        .path(&report.file.path)
                        .colored(colored)
                        .render(),
                );
                out.push('\n');
            }
            Err(msg) => {
                out.push_str(&format!("error: {}: {}\n", report.file.path, msg));
            }
        }
    }
    out
}

/// `2 fatal, 1 bug in 3 files`, or `None` when nothing was reported.
pub fn summary(reports: &[FileReport]) -> Option<String> {
    let (mut fatal, mut bugs, mut failed) = (0, 0, 0);
    for report in reports {
        match &report.result {
            Ok(diagnostics) => {
                fatal += diagnostics.fatal_count();
                bugs += diagnostics.bug_count();
            }
            Err(_) => failed += 1,
        }
    }
    if fatal + bugs + failed == 0 {
        return None;
    }

    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("{} {}", n, word)
        } else {
            format!("{} {}s", n, word)
        }
    };
    let mut line = format!(
        "{} fatal, {} in {}",
        fatal,
        plural(bugs, "bug"),
        plural(reports.len(), "file")
    );
    if failed > 0 {
        line.push_str(&format!(" ({} unreadable)", failed));
    }
    Some(line)
}

#[derive(Serialize)]
struct JsonFile<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    diagnostics: &'a [Diagnostic],
}

pub fn render_json(reports: &[FileReport]) -> serde_json::Result<String> {
    let files: Vec<JsonFile<'_>> = reports
        .iter()
        .map(|report| match &report.result {
            Ok(diagnostics) => JsonFile {
                path: &report.file.path,
                error: None,
                diagnostics: diagnostics.as_slice(),
            },
            Err(msg) => JsonFile {
                path: &report.file.path,
                error: Some(msg),
                diagnostics: &[],
            },
        })
        .collect();
    serde_json::to_string_pretty(&files)
}
