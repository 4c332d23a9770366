//! QC Sentinel replay binary.
//!
//! A development harness over the in-memory store: loads a scenario file
//! (stream configs, priors, records), runs each record through the decision
//! pipeline, and prints one JSON verdict per line on stdout. All logging
//! goes to stderr so stdout can be piped.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use qc_common::{Error, Result};
use qc_core::ingest::ingest_record;
use qc_core::logging::{init_logging, LogConfig};
use qc_core::scenario::Scenario;

#[derive(Parser)]
#[command(
    name = "qc-core",
    version,
    about = "Replay QC scenarios through the decision engine"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "QC_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every record in a scenario file through the decision pipeline.
    Replay {
        /// Scenario JSON file carrying stream configs, priors, and records.
        file: PathBuf,

        /// Pretty-print a single JSON array instead of JSONL.
        #[arg(long)]
        pretty: bool,

        /// Actor recorded in the audit trail.
        #[arg(long, default_value = "replay")]
        actor: String,
    },
    /// Validate a scenario file's configuration without replaying.
    Check {
        /// Scenario JSON file.
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env(cli.log_level.as_deref()));

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.code(), category = %e.category(), "{e}");
            eprintln!("{}", e.to_structured_json());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Check { file } => {
            let scenario = Scenario::load(&file)?;
            let problems = scenario.validate();
            if problems.is_empty() {
                info!(
                    stream_configs = scenario.stream_configs.len(),
                    priors = scenario.priors.len(),
                    records = scenario.records.len(),
                    "scenario is valid"
                );
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": true,
                        "stream_configs": scenario.stream_configs.len(),
                        "priors": scenario.priors.len(),
                        "records": scenario.records.len(),
                    })
                );
                Ok(())
            } else {
                println!(
                    "{}",
                    serde_json::json!({ "valid": false, "problems": problems })
                );
                Err(Error::Config(format!(
                    "{} validation problem(s)",
                    problems.len()
                )))
            }
        }
        Command::Replay {
            file,
            pretty,
            actor,
        } => {
            let scenario = Scenario::load(&file)?;
            let problems = scenario.validate();
            if !problems.is_empty() {
                return Err(Error::Config(format!(
                    "scenario failed validation: {}",
                    problems.join("; ")
                )));
            }

            let (store, records) = scenario.into_store()?;

            let mut outcomes = Vec::new();
            for record in records {
                let outcome = ingest_record(&store, &actor, record)?;
                if pretty {
                    outcomes.push(outcome);
                } else {
                    println!("{}", serde_json::to_string(&outcome)?);
                }
            }
            if pretty {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            }
            Ok(())
        }
    }
}
