use thiserror::Error;

use super::Address;

/// A contract call that stopped without producing a value. The enclosing
/// transaction is rolled back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Abort {
    #[error("assertion failed: {0}")]
    AssertionFailed(String),
    #[error("execution fault: {0}")]
    Fault(String),
    #[error("no contract deployed at {0}")]
    UnknownContract(Address),
    #[error("call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),
}

/// Aborts with [`Abort::AssertionFailed`] unless `condition` holds.
///
/// # Errors
///
/// Errors if `condition` is false.
pub fn check(condition: bool, msg: impl Into<String>) -> Result<(), Abort> {
    if condition {
        Ok(())
    } else {
        Err(Abort::AssertionFailed(msg.into()))
    }
}
