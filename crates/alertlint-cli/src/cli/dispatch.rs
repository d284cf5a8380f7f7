//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! This module contains:
//! - `*Params` structs populated from clap
//! - `from_matches()` extractors
//! - `Into<*Args>` impls to bridge dispatch → command handlers

use std::path::PathBuf;

use alertlint_lib::Severity;
use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::labels::LabelsArgs;
use crate::commands::lint::{LintArgs, LintConfig, OutputFormat};
use crate::commands::template::TemplateArgs;

pub struct LintParams {
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub fail_on: Severity,
    pub color: ColorChoice,
}

impl LintParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            paths: m
                .get_many::<PathBuf>("paths")
                .map(|paths| paths.cloned().collect())
                .unwrap_or_default(),
            format: parse_format(m),
            fail_on: parse_fail_on(m),
            color: parse_color(m),
        }
    }
}

impl From<LintParams> for LintArgs {
    fn from(p: LintParams) -> Self {
        Self {
            paths: p.paths,
            config: LintConfig {
                format: p.format,
                fail_on: p.fail_on,
            },
            color: p.color.should_colorize(),
        }
    }
}

pub struct TemplateParams {
    pub text: String,
    pub label: bool,
}

impl TemplateParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            text: m
                .get_one::<String>("template_text")
                .cloned()
                .unwrap_or_default(),
            label: m.get_flag("label"),
        }
    }
}

impl From<TemplateParams> for TemplateArgs {
    fn from(p: TemplateParams) -> Self {
        Self {
            text: p.text,
            label: p.label,
        }
    }
}

pub struct LabelsParams {
    pub query: String,
}

impl LabelsParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            query: m
                .get_one::<String>("query_text")
                .cloned()
                .unwrap_or_default(),
        }
    }
}

impl From<LabelsParams> for LabelsArgs {
    fn from(p: LabelsParams) -> Self {
        Self { query: p.query }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn parse_format(m: &ArgMatches) -> OutputFormat {
    match m.get_one::<String>("format").map(|s| s.as_str()) {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Text,
    }
}

fn parse_fail_on(m: &ArgMatches) -> Severity {
    match m.get_one::<String>("fail_on").map(|s| s.as_str()) {
        Some("fatal") => Severity::Fatal,
        _ => Severity::Bug,
    }
}
