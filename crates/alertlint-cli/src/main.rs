mod cli;
mod commands;

use std::io;

use tracing_subscriber::EnvFilter;

use cli::{LabelsParams, LintParams, TemplateParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("lint", m)) => {
            let params = LintParams::from_matches(m);
            commands::lint::run(params.into());
        }
        Some(("template", m)) => {
            let params = TemplateParams::from_matches(m);
            commands::template::run(params.into());
        }
        Some(("labels", m)) => {
            let params = LabelsParams::from_matches(m);
            commands::labels::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
