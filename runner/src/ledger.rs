use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{bail, Result};
use derive_more::{Deref, Display};
use fixture_sdk::{Address, Contract, Value};
use im::OrdMap;
use sha2::{Digest, Sha256};

/// Storage is keyed by the owning contract, then by the contract's key.
pub type Storage = OrdMap<(Address, Vec<u8>), Value>;

/// Timestamp of the genesis block, 2018-06-30 00:00:00 UTC.
pub const GENESIS_TIMESTAMP: u64 = 1_530_316_800;

/// File name a contract is deployed under, e.g. `test2.avm`.
#[derive(Clone, Debug, Deref, Display, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContractFile(String);

impl ContractFile {
    /// # Errors
    ///
    /// Errors unless the name ends in `.avm` or `.wasm`.
    pub fn new(name: &str) -> Result<Self> {
        if !(name.ends_with(".avm") || name.ends_with(".wasm")) {
            bail!("contract name {name} error. must be suffix .wasm/.avm");
        }
        Ok(Self(name.to_string()))
    }
}

impl Borrow<str> for ContractFile {
    fn borrow(&self) -> &str { &self.0 }
}

#[derive(Clone)]
pub struct Deployment {
    pub file: ContractFile,
    pub address: Address,
    pub contract: Rc<dyn Contract>,
}

impl std::fmt::Debug for Deployment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Deployment({} at {})", self.file, self.address)
    }
}

/// Header of the latest committed block. Blocks are one second apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u32,
    pub timestamp: u64,
    pub hash: [u8; 32],
}

impl BlockHeader {
    fn genesis() -> Self {
        Self {
            height: 0,
            timestamp: GENESIS_TIMESTAMP,
            hash: Sha256::digest(GENESIS_TIMESTAMP.to_le_bytes()).into(),
        }
    }

    fn next(&self) -> Self {
        let height = self.height + 1;
        let timestamp = self.timestamp + 1;
        let hash = Sha256::new()
            .chain_update(self.hash)
            .chain_update(height.to_le_bytes())
            .chain_update(timestamp.to_le_bytes())
            .finalize()
            .into();
        Self {
            height,
            timestamp,
            hash,
        }
    }
}

/// Committed chain state: deployed contracts, contract storage and the
/// latest block.
#[derive(Clone, Debug)]
pub struct Ledger {
    contracts: BTreeMap<Address, Deployment>,
    files: BTreeMap<ContractFile, Address>,
    pub(crate) storage: Storage,
    head: BlockHeader,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            contracts: BTreeMap::new(),
            files: BTreeMap::new(),
            storage: Storage::new(),
            head: BlockHeader::genesis(),
        }
    }
}

impl Ledger {
    pub(crate) fn insert(&mut self, deployment: Deployment) -> Result<()> {
        if let Some(existing) = self.contracts.get(&deployment.address) {
            bail!(
                "{} has the same code as {}, already deployed at {}",
                deployment.file,
                existing.file,
                existing.address
            );
        }
        if self.files.contains_key(&deployment.file) {
            bail!("a contract named {} is already deployed", deployment.file);
        }
        self.files
            .insert(deployment.file.clone(), deployment.address);
        self.contracts.insert(deployment.address, deployment);
        Ok(())
    }

    pub(crate) fn remove(&mut self, address: &Address) {
        if let Some(deployment) = self.contracts.remove(address) {
            self.files.remove(&deployment.file);
        }
    }

    #[must_use]
    pub fn contract(&self, address: &Address) -> Option<Rc<dyn Contract>> {
        self.contracts
            .get(address)
            .map(|deployment| Rc::clone(&deployment.contract))
    }

    #[must_use]
    pub fn address_of(&self, file: &str) -> Option<Address> { self.files.get(file).copied() }

    /// Deployments in file-name order.
    pub fn deployments(&self) -> impl Iterator<Item = &Deployment> {
        self.files
            .values()
            .filter_map(|address| self.contracts.get(address))
    }

    #[must_use]
    pub fn storage_get(&self, contract: &Address, key: &[u8]) -> Option<&Value> {
        self.storage.get(&(*contract, key.to_vec()))
    }

    #[must_use]
    pub fn storage(&self) -> &Storage { &self.storage }

    #[must_use]
    pub fn head(&self) -> &BlockHeader { &self.head }

    #[must_use]
    pub fn height(&self) -> u32 { self.head.height }

    /// Seals the current state as a new block.
    pub(crate) fn commit_block(&mut self) { self.head = self.head.next(); }
}
