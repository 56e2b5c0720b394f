//! Batch mode: pull each contract's test descriptor out of the contract
//! itself, run every case and check the results.
use anyhow::{anyhow, bail, ensure, Context, Result};
use fixture_sdk::common::params::parse_params;
use fixture_sdk::common::testcase::{parse_test_groups, TestCase, TestGroups};
use fixture_sdk::{Address, Value};
use log::{info, warn};

use crate::context::TestContext;
use crate::engine::{Engine, Outcome};
use crate::ledger::Ledger;

/// Operation every fixture answers with its test descriptor.
pub const TESTCASE_METHOD: &str = "testcase";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseFailure {
    pub file: String,
    pub group: usize,
    pub index: usize,
    pub method: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub passed: usize,
    pub failures: Vec<CaseFailure>,
}

impl Report {
    #[must_use]
    pub fn is_success(&self) -> bool { self.failures.is_empty() }

    fn merge(&mut self, other: Report) {
        self.passed += other.passed;
        self.failures.extend(other.failures);
    }
}

/// Chain environment a test case executes in. Methods reporting on it are
/// checked against it rather than against `expected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecEnv {
    pub contract: Address,
    pub time: u64,
    pub height: u32,
    pub block_hash: [u8; 32],
}

impl ExecEnv {
    /// The environment of the block following the ledger's head, invoking
    /// `contract`.
    #[must_use]
    pub fn next_block(ledger: &Ledger, contract: Address) -> Self {
        let head = ledger.head();
        Self {
            contract,
            time: head.timestamp + 1,
            height: head.height + 1,
            block_hash: head.hash,
        }
    }

    /// What a method reporting on the environment must return, if `method`
    /// is one.
    #[must_use]
    pub fn expected_for(&self, method: &str) -> Option<Value> {
        match method {
            "timestamp" => Some(Value::ByteArray(self.time.to_le_bytes().to_vec())),
            "block_height" => Some(Value::ByteArray(self.height.to_le_bytes().to_vec())),
            "self_address" | "entry_address" => Some(Value::Address(self.contract)),
            // A transaction has no calling contract.
            "caller_address" => Some(Value::Address(Address::default())),
            "current_blockhash" => Some(Value::ByteArray(self.block_hash.to_vec())),
            _ => None,
        }
    }
}

fn deployed(engine: &Engine, file: &str) -> Result<Address> {
    engine
        .ledger()
        .address_of(file)
        .ok_or_else(|| anyhow!("Contract {file} not exist."))
}

/// Asks the contract for its descriptor. `Main` takes an argument list, so
/// a dummy one is passed along.
///
/// # Errors
///
/// Errors if the contract is unknown, aborts, returns something other
/// than a non-empty string or the string is not a descriptor.
pub fn extract_test_cases(engine: &mut Engine, file: &str) -> Result<TestGroups> {
    let address = deployed(engine, file)?;
    let outcome = engine.execute(&address, TESTCASE_METHOD, vec![Value::Int(1)], &[]);
    let result = outcome
        .result
        .with_context(|| format!("extracting testcase from {file}"))?;
    let json = result
        .as_str()
        .filter(|json| !json.trim().is_empty())
        .ok_or_else(|| anyhow!("failed to get testcase data from contract {file}"))?;
    parse_test_groups(json).with_context(|| format!("parsing testcase data of {file}"))
}

/// Checks an invocation's outcome against the case's expectations, or
/// against `env` for methods that report on it.
///
/// # Errors
///
/// Errors describing the first expectation that does not hold.
pub fn check_exec_result(case: &TestCase, outcome: &Outcome, env: &ExecEnv) -> Result<()> {
    let result = match &outcome.result {
        Ok(result) => result,
        Err(abort) => bail!("invocation aborted: {abort}"),
    };
    if let Some(expected) = env.expected_for(&case.method) {
        ensure!(
            result.vm_eq(&expected),
            "not equal: expected {expected}, got {result}"
        );
        return Ok(());
    }
    if let Some(expected) = case.expected_value().context("parsing expected")? {
        ensure!(
            result.vm_eq(&expected),
            "not equal: expected {expected}, got {result}"
        );
    }
    if !case.notify.is_empty() {
        let js = serde_json::to_string(&outcome.notify)?;
        ensure!(
            js.contains(&case.notify),
            "notify {js} does not contain {:?}",
            case.notify
        );
    }
    Ok(())
}

/// Runs one test case against the contract deployed under `file`.
///
/// # Errors
///
/// Errors if the params cannot be parsed or the result is not as
/// expected.
pub fn run_test_case(
    engine: &mut Engine,
    context: &TestContext,
    file: &str,
    case: &TestCase,
) -> Result<Value> {
    info!("executing testcase: {}", serde_json::to_string(case)?);
    let address = context
        .find(file)
        .map(|item| item.address)
        .ok_or_else(|| anyhow!("Contract {file} not exist. "))?;
    let mut args = case.params().context("parsing param")?;
    if case.needcontext {
        args.push(context.to_value());
    }
    let env = ExecEnv::next_block(engine.ledger(), address);
    let outcome = engine.execute(&address, &case.method, args, &case.env.witness);
    if !outcome.notify.is_empty() {
        info!("Notify info : {}", serde_json::to_string(&outcome.notify)?);
    }
    check_exec_result(case, &outcome, &env)?;
    let result = outcome.result.unwrap_or(Value::Bool(false));
    info!("Return result: {result}");
    Ok(result)
}

/// Runs every group of the descriptor of the contract under `file`.
/// Failing cases are collected rather than stopping the run.
///
/// # Errors
///
/// Errors if the descriptor itself cannot be obtained.
pub fn run_contract(engine: &mut Engine, file: &str) -> Result<Report> {
    info!("exacting testcase from {file}");
    let groups = extract_test_cases(engine, file)?;
    let context = TestContext::from_ledger(engine.ledger(), engine.config().admin);
    let mut report = Report::default();
    for (group, cases) in groups.iter().enumerate() {
        for (index, case) in cases.iter().enumerate() {
            match run_test_case(engine, &context, file, case) {
                Ok(_) => report.passed += 1,
                Err(err) => {
                    warn!("{file} group {group} case {index} ({}) failed: {err:#}", case.method);
                    report.failures.push(CaseFailure {
                        file: file.to_string(),
                        group,
                        index,
                        method: case.method.clone(),
                        reason: format!("{err:#}"),
                    });
                }
            }
        }
    }
    Ok(report)
}

/// Runs the descriptors of all deployed contracts in file-name order.
///
/// # Errors
///
/// Errors if any contract's descriptor cannot be obtained.
pub fn run_all(engine: &mut Engine) -> Result<Report> {
    let files: Vec<String> = engine
        .ledger()
        .deployments()
        .map(|deployment| deployment.file.to_string())
        .collect();
    let mut report = Report::default();
    for file in files {
        report.merge(run_contract(engine, &file)?);
    }
    if report.is_success() {
        info!("contract test succeed");
    }
    Ok(report)
}

/// Invokes the contract under `file` with an ad-hoc param list whose first
/// item is the operation name, e.g. `[string:ownerOf,int:2]`.
///
/// # Errors
///
/// Errors on an unknown contract, bad params or an aborted invocation.
pub fn invoke_specified(
    engine: &mut Engine,
    file: &str,
    params: &str,
    witnesses: &[Address],
) -> Result<Value> {
    let address = deployed(engine, file).context("contract not exist")?;
    let mut args = parse_params(params)?;
    if args.is_empty() {
        bail!("params must start with the operation name");
    }
    let operation = match args.remove(0) {
        Value::String(operation) => operation,
        other => bail!("operation name must be a string, got {other}"),
    };
    let outcome = engine.execute(&address, &operation, args, witnesses);
    if !outcome.notify.is_empty() {
        info!("Notify info : {}", serde_json::to_string(&outcome.notify)?);
    }
    let result = outcome.result.with_context(|| format!("invoking {operation} on {file}"))?;
    info!("Return result: {result}");
    Ok(result)
}
