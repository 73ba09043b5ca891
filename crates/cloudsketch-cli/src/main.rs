//! Cloudsketch CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{Level, LevelFilter, debug, error, info, log_enabled};

use cloudsketch_cli::{Args, error_adapter::render_report};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Cloudsketch");
    debug!(args:?; "Parsed arguments");

    match cloudsketch_cli::run(&args) {
        Ok(written) => {
            println!("Architecture diagrams generated:");
            for path in &written {
                println!("  - {}", path.display());
            }
            info!(files = written.len(); "Completed successfully");
        }
        Err(err) => {
            let report = render_report(&err);

            // With logging off the report still has to reach the user
            if log_enabled!(Level::Error) {
                error!("{report}");
            } else {
                eprintln!("{report}");
            }
            process::exit(1);
        }
    }
}
