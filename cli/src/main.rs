#![deny(clippy::pedantic)]
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use clap_derive::Args;
use fixture_cli::runner::{bundled_engine, dump_call_tape, load_config, summarize};
use fixture_runner::harness::{extract_test_cases, invoke_specified, run_all, run_contract};
use fixture_sdk::Address;
use log::debug;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[clap(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
    #[command(subcommand)]
    command: Command,
    /// Account deploying the contracts and handed to them in the test
    /// context
    #[arg(long, global = true, env = "FIXTURE_ADMIN")]
    admin: Option<Address>,
    /// Deepest allowed nesting of contract calls
    #[arg(long, global = true, env = "FIXTURE_MAX_CALL_DEPTH")]
    max_call_depth: Option<usize>,
}

#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    /// Only run the descriptor of this contract, e.g. `test2.avm`
    #[arg(long)]
    contract: Option<String>,
    /// Write the recorded cross-contract calls here as JSON
    #[arg(long)]
    dump_tape: Option<PathBuf>,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run the test descriptors of the bundled contracts
    Run(RunArgs),
    /// Invoke a contract once, e.g. `invoke test2.avm "[string:ownerOf,int:2]"`
    Invoke {
        file: String,
        params: String,
        /// Address that signs the invocation; may be repeated
        #[arg(long = "witness")]
        witnesses: Vec<Address>,
    },
    /// Print the test descriptor a contract carries
    Testcase { file: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();
    let config = load_config(cli.admin, cli.max_call_depth);
    debug!("{config:?}");
    let mut engine = bundled_engine(config)?;
    match cli.command {
        Command::Run(RunArgs {
            contract,
            dump_tape,
        }) => {
            let report = match contract {
                Some(file) => run_contract(&mut engine, &file)?,
                None => run_all(&mut engine)?,
            };
            if let Some(path) = dump_tape {
                dump_call_tape(&engine, &path)?;
            }
            println!("{}", summarize(&report));
            if !report.is_success() {
                bail!("{} test case(s) failed", report.failures.len());
            }
        }
        Command::Invoke {
            file,
            params,
            witnesses,
        } => {
            let result = invoke_specified(&mut engine, &file, &params, &witnesses)?;
            println!("{result}");
        }
        Command::Testcase { file } => {
            let groups = extract_test_cases(&mut engine, &file)?;
            println!("{}", serde_json::to_string_pretty(&groups)?);
        }
    }
    Ok(())
}
