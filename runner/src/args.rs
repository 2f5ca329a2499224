use std::path::PathBuf;

use scheduler::Policy;
use thiserror::Error;

/// What the command line asked for.
#[derive(Debug, PartialEq)]
pub struct Config {
    pub policy: Policy,
    pub input: PathBuf,
}

/// A command line that cannot be run. Nothing is launched.
#[derive(Debug, PartialEq, Error)]
pub enum UsageError {
    #[error("missing arguments")]
    MissingArguments,

    #[error("RR needs a quantum before the input file")]
    MissingQuantum,

    #[error("invalid quantum `{0}`: expected milliseconds")]
    InvalidQuantum(String),

    #[error("invalid scheduling policy `{0}`")]
    InvalidPolicy(String),
}

impl Config {
    /// Parses `<program> <policy> [<quantum>] <input_filename>`.
    pub fn parse(args: &[String]) -> Result<Config, UsageError> {
        if args.len() < 3 {
            return Err(UsageError::MissingArguments);
        }

        match args[1].as_str() {
            "FCFS" => Ok(Config {
                policy: Policy::Fcfs,
                input: PathBuf::from(&args[2]),
            }),
            "RR" => {
                if args.len() < 4 {
                    return Err(UsageError::MissingQuantum);
                }
                let quantum = args[2]
                    .parse::<i64>()
                    .map_err(|_| UsageError::InvalidQuantum(args[2].clone()))?;
                Ok(Config {
                    policy: Policy::round_robin_millis(quantum),
                    input: PathBuf::from(&args[3]),
                })
            }
            other => Err(UsageError::InvalidPolicy(other.to_string())),
        }
    }
}

pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <policy> [<quantum>] <input_filename>\n\
         \x20 policy   FCFS or RR\n\
         \x20 quantum  RR time slice in milliseconds"
    )
}
