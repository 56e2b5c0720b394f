//! Utility functions that help the CLI set up the
//! [fixture runner](fixture_runner) with the bundled contracts.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use fixture_runner::config::{Config, DEFAULT_MAX_CALL_DEPTH};
use fixture_runner::engine::Engine;
use fixture_runner::harness::Report;
use fixture_sdk::Address;
use chain_env_core_logic::ChainEnv;
use itertools::Itertools;
use log::debug;
use mint_token_core_logic::MintTokenContract;
use token_registry_core_logic::TokenRegistry;

/// Builds the runner config from command line settings, falling back to
/// the defaults for anything not given.
#[must_use]
pub fn load_config(admin: Option<Address>, max_call_depth: Option<usize>) -> Config {
    let defaults = Config::default();
    Config {
        admin: admin.unwrap_or(defaults.admin),
        max_call_depth: max_call_depth.unwrap_or(DEFAULT_MAX_CALL_DEPTH),
    }
}

/// An engine with every bundled fixture deployed under its file name.
///
/// # Errors
///
/// Errors if a deployment fails.
pub fn bundled_engine(config: Config) -> Result<Engine> {
    let mut engine = Engine::new(config);
    engine.deploy(chain_env_core_logic::CONTRACT_FILE, ChainEnv)?;
    engine.deploy(mint_token_core_logic::CONTRACT_FILE, MintTokenContract)?;
    engine.deploy(
        token_registry_core_logic::CONTRACT_FILE,
        TokenRegistry::default(),
    )?;
    debug!(
        "deployed {}",
        engine
            .ledger()
            .deployments()
            .map(|deployment| format!("{} at {}", deployment.file, deployment.address))
            .join(", ")
    );
    Ok(engine)
}

/// Writes every cross-contract call recorded so far as JSON.
///
/// # Errors
///
/// Errors if the file cannot be written.
pub fn dump_call_tape(engine: &Engine, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, engine.call_tape())?;
    writer.flush()?;
    debug!(
        "wrote {} calls to {}",
        engine.call_tape().len(),
        path.display()
    );
    Ok(())
}

/// One line per failed case, suitable for printing.
#[must_use]
pub fn summarize(report: &Report) -> String {
    let mut lines = vec![format!(
        "{} passed, {} failed",
        report.passed,
        report.failures.len()
    )];
    lines.extend(report.failures.iter().map(|failure| {
        format!(
            "  {} [{}:{}] {}: {}",
            failure.file, failure.group, failure.index, failure.method, failure.reason
        )
    }));
    lines.join("\n")
}
