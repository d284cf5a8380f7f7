//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Rule files or directories (positional, repeatable).
pub fn paths_arg() -> Arg {
    Arg::new("paths")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .num_args(1..)
        .required(true)
        .help("Rule files or directories to check (use \"-\" for stdin)")
}

/// Report format (--format).
pub fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_name("FORMAT")
        .default_value("text")
        .value_parser(["text", "json"])
        .help("Report format")
}

/// Failure threshold (--fail-on).
pub fn fail_on_arg() -> Arg {
    Arg::new("fail_on")
        .long("fail-on")
        .value_name("SEVERITY")
        .default_value("bug")
        .value_parser(["bug", "fatal"])
        .help("Exit with status 1 when a problem of at least this severity is found")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Inline template text (-t/--text).
pub fn template_text_arg() -> Arg {
    Arg::new("template_text")
        .short('t')
        .long("text")
        .value_name("TEXT")
        .required(true)
        .help("Template text")
}

/// Treat the template as a label (--label).
pub fn label_arg() -> Arg {
    Arg::new("label")
        .long("label")
        .action(ArgAction::SetTrue)
        .help("Check the template as a label, where $value is not allowed")
}

/// Inline PromQL query (-q/--query).
pub fn query_text_arg() -> Arg {
    Arg::new("query_text")
        .short('q')
        .long("query")
        .value_name("QUERY")
        .required(true)
        .help("PromQL expression")
}

/// Log verbosity (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .global(true)
        .help("More logging on stderr (-v debug, -vv trace)")
}
