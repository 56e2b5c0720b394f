use std::rc::Rc;

use anyhow::{Context, Result};
use fixture_sdk::common::types::Notify;
use fixture_sdk::native::{CallTape, IdentityStack};
use fixture_sdk::{Abort, Address, Contract, Runtime, Value};
use log::{debug, trace};

use crate::config::Config;
use crate::ledger::{ContractFile, Deployment, Ledger};

/// What a top-level invocation produced. On abort nothing it did is
/// committed, so `notify` is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub result: Result<Value, Abort>,
    pub notify: Vec<Notify>,
}

/// Executes contract invocations against a [`Ledger`], one transaction
/// at a time.
#[derive(Debug, Default)]
pub struct Engine {
    config: Config,
    ledger: Ledger,
    call_tape: CallTape,
    identity_stack: IdentityStack,
    witnesses: Vec<Address>,
    pending_notify: Vec<Notify>,
}

impl Engine {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config { &self.config }

    #[must_use]
    pub fn ledger(&self) -> &Ledger { &self.ledger }

    #[must_use]
    pub fn call_tape(&self) -> &CallTape { &self.call_tape }

    /// Deploys `contract` under `file` and runs its deploy hook, signed
    /// by the configured admin.
    ///
    /// # Errors
    ///
    /// Errors on a bad file name, a duplicate deployment or an aborting
    /// deploy hook.
    pub fn deploy(&mut self, file: &str, contract: impl Contract + 'static) -> Result<Address> {
        let file = ContractFile::new(file)?;
        let address = Address::from_code(contract.code());
        let contract: Rc<dyn Contract> = Rc::new(contract);
        self.ledger.insert(Deployment {
            file: file.clone(),
            address,
            contract: Rc::clone(&contract),
        })?;

        let admin = self.config.admin;
        let outcome = self.transact(address, &[admin], |engine| {
            contract.deploy(engine).map(|()| Value::Bool(true))
        });
        if let Err(abort) = outcome.result {
            self.ledger.remove(&address);
            return Err(abort).with_context(|| format!("deploying {file}"));
        }
        debug!("deployed {file} at {address}");
        Ok(address)
    }

    /// Invokes `Main(operation, args)` of the contract at `contract` as one
    /// transaction signed by `witnesses`. Storage writes and notifications
    /// are committed only if the invocation returns a value.
    pub fn execute(
        &mut self,
        contract: &Address,
        operation: &str,
        args: Vec<Value>,
        witnesses: &[Address],
    ) -> Outcome {
        let Some(target) = self.ledger.contract(contract) else {
            return Outcome {
                result: Err(Abort::UnknownContract(*contract)),
                notify: Vec::new(),
            };
        };
        let outcome = self.transact(*contract, witnesses, |engine| {
            target.invoke(operation, args, engine)
        });
        trace!("{operation} on {contract} -> {:?}", outcome.result);
        outcome
    }

    fn transact(
        &mut self,
        contract: Address,
        witnesses: &[Address],
        run: impl FnOnce(&mut Self) -> Result<Value, Abort>,
    ) -> Outcome {
        let snapshot = self.ledger.storage.clone();
        self.witnesses = witnesses.to_vec();
        self.identity_stack.clear();
        self.identity_stack.add_identity(contract);

        let result = run(self);

        self.identity_stack.clear();
        self.witnesses.clear();
        let pending = std::mem::take(&mut self.pending_notify);
        match result {
            Ok(value) => {
                self.ledger.commit_block();
                debug!(
                    "committed block {} with {} notifications",
                    self.ledger.height(),
                    pending.len()
                );
                Outcome {
                    result: Ok(value),
                    notify: pending,
                }
            }
            Err(abort) => {
                debug!("rolling back: {abort}");
                self.ledger.storage = snapshot;
                Outcome {
                    result: Err(abort),
                    notify: Vec::new(),
                }
            }
        }
    }
}

impl Runtime for Engine {
    fn self_address(&self) -> Address { self.identity_stack.top_identity() }

    fn caller_address(&self) -> Option<Address> { self.identity_stack.caller_identity() }

    fn entry_address(&self) -> Address { self.identity_stack.entry_identity() }

    fn check_witness(&self, address: &Address) -> bool {
        self.witnesses.contains(address) || self.caller_address() == Some(*address)
    }

    fn block_height(&self) -> u32 { self.ledger.head().height + 1 }

    fn timestamp(&self) -> u64 { self.ledger.head().timestamp + 1 }

    fn current_blockhash(&self) -> [u8; 32] { self.ledger.head().hash }

    fn storage_get(&self, key: &[u8]) -> Option<Value> {
        self.ledger
            .storage_get(&self.self_address(), key)
            .cloned()
    }

    fn storage_put(&mut self, key: &[u8], value: Value) {
        let owner = self.self_address();
        self.ledger.storage.insert((owner, key.to_vec()), value);
    }

    fn storage_delete(&mut self, key: &[u8]) {
        let owner = self.self_address();
        self.ledger.storage.remove(&(owner, key.to_vec()));
    }

    fn dynamic_call(
        &mut self,
        contract: &Address,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, Abort> {
        if self.identity_stack.depth() >= self.config.max_call_depth {
            return Err(Abort::CallDepthExceeded(self.config.max_call_depth));
        }
        let callee = self
            .ledger
            .contract(contract)
            .ok_or(Abort::UnknownContract(*contract))?;
        let caller = self.self_address();
        debug!("{caller} calls {method} on {contract} with {params:?}");

        let inserted_idx = self.call_tape.send(caller, *contract, method, &params);
        let snapshot = self.ledger.storage.clone();
        let notified = self.pending_notify.len();
        self.identity_stack.add_identity(*contract);
        let resolved = callee.invoke(method, params, self);
        self.identity_stack.rm_identity();

        match resolved {
            Ok(value) => {
                self.call_tape.resolve(inserted_idx, &value);
                Ok(value)
            }
            Err(abort) => {
                // The caller may carry on, but nothing the callee did stays.
                debug!("rolling back call to {contract}: {abort}");
                self.ledger.storage = snapshot;
                self.pending_notify.truncate(notified);
                Err(abort)
            }
        }
    }

    fn notify(&mut self, states: Vec<Value>) {
        let contract = self.self_address();
        self.pending_notify.push(Notify { contract, states });
    }
}
