//! Command builders for the CLI.
//!
//! Each command is built using the shared arg builders from `args.rs`.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("alertlint")
        .about("Template checks for Prometheus alerting rules")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(lint_command())
        .subcommand(template_command())
        .subcommand(labels_command())
}

/// Check rule files.
pub fn lint_command() -> Command {
    Command::new("lint")
        .about("Check alerting rule templates against their queries")
        .after_help(
            r#"EXAMPLES:
  alertlint lint rules.yml                # single file
  alertlint lint rules/                   # every *.yml / *.yaml below rules/
  alertlint lint - < rules.yml            # stdin
  alertlint lint rules/ --format json     # machine-readable report
  alertlint lint rules/ --fail-on fatal   # only parse errors fail the run"#,
        )
        .arg(paths_arg())
        .arg(format_arg())
        .arg(fail_on_arg())
        .arg(color_arg())
}

/// Show what a template reads.
pub fn template_command() -> Command {
    Command::new("template")
        .about("Show label accesses, value references and function calls of a template")
        .after_help(
            r#"EXAMPLES:
  alertlint template -t '{{ $labels.job }} is {{ $value | humanize }}'
  alertlint template -t '{{ $foo := $value }}{{ $foo }}' --label"#,
        )
        .arg(template_text_arg())
        .arg(label_arg())
}

/// Show which labels a query keeps.
pub fn labels_command() -> Command {
    Command::new("labels")
        .about("Show which labels survive a PromQL expression")
        .after_help(
            r#"EXAMPLES:
  alertlint labels -q 'sum(rate(errors[5m])) by (job)'
  alertlint labels -q 'absent(up{job="api"})'"#,
        )
        .arg(query_text_arg())
}
