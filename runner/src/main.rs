use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use processor::{format_report, OsProcessor, SignalListener};
use scheduler::{engine, notification};

mod args;
mod input;

use args::{usage, Config};
use input::read_table;

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("runner");

    let config = match Config::parse(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", usage(program));
            return ExitCode::from(1);
        }
    };

    match run(&config) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<String> {
    let mut table = read_table(&config.input)?;

    let (sender, notifications) = notification::channel();
    let _listener = SignalListener::install(sender).context("failed to watch child signals")?;

    let mut processor = OsProcessor::new();
    let stats = engine::run(config.policy, &mut table, &mut processor, &notifications)?;

    Ok(format_report(&table, &stats))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests;
