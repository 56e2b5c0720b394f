use std::collections::BTreeMap;

use fixture_sdk::{Address, Value};
use serde::Serialize;

use crate::ledger::Ledger;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConAddr {
    pub file: String,
    pub address: Address,
}

/// What a `needcontext` test case gets appended to its arguments: the
/// admin account and where every contract was deployed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TestContext {
    pub admin: Address,
    pub addr_map: Vec<ConAddr>,
}

impl TestContext {
    #[must_use]
    pub fn from_ledger(ledger: &Ledger, admin: Address) -> Self {
        let addr_map = ledger
            .deployments()
            .map(|deployment| ConAddr {
                file: deployment.file.to_string(),
                address: deployment.address,
            })
            .collect();
        Self { admin, addr_map }
    }

    #[must_use]
    pub fn find(&self, file: &str) -> Option<&ConAddr> {
        self.addr_map.iter().find(|item| item.file == file)
    }

    /// Rendered as `[{file: address, ...}, admin]`, so contracts reach a
    /// deployment with `ctx[0][file]`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let files: BTreeMap<String, Value> = self
            .addr_map
            .iter()
            .map(|item| (item.file.clone(), Value::Address(item.address)))
            .collect();
        Value::Array(vec![Value::Map(files), Value::Address(self.admin)])
    }
}
