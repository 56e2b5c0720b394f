use super::{Address, Value};

/// One dynamic call from one contract into another. `return_` stays empty
/// while the callee runs and for calls that aborted.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[allow(clippy::pub_underscore_fields)]
pub struct CrossContractCall {
    pub caller: Address,
    pub callee: Address,
    pub method: String,
    pub params: Vec<Value>,
    pub return_: Option<Value>,
}
