mod cli;
mod commands;
mod render;

use std::process::ExitCode;

use clap::Parser;

use labledger_infra::{LabWorkspace, LedgerConfig, ServiceError};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match LedgerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };
    if let Some(dir) = cli.data_dir.clone() {
        config = config.with_data_dir(dir);
    }
    if let Some(format) = cli.log_format {
        config = config.with_log_format(format);
    }

    match cli.verbose {
        0 => labledger_observability::init(config.log_format),
        1 => labledger_observability::init_with_filter(config.log_format, "debug"),
        _ => labledger_observability::init_with_filter(config.log_format, "trace"),
    }

    let workspace = LabWorkspace::open(&config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match commands::run(cli.command, &workspace, cli.json, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            // Storage and IO failures exit 2; rejected requests exit 1.
            let environment = err
                .downcast_ref::<ServiceError>()
                .is_some_and(|e| e.domain().is_none())
                || err.downcast_ref::<std::io::Error>().is_some();
            if environment {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}
