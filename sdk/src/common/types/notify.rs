use super::{Address, Value};

/// Notification emitted by a contract during execution.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Notify {
    pub contract: Address,
    pub states: Vec<Value>,
}
