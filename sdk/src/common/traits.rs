use crate::common::types::{Abort, Address, Value};

/// Services the executing environment offers to a contract. Storage is
/// scoped to the contract currently executing.
pub trait Runtime {
    fn self_address(&self) -> Address;

    /// The contract that issued the current call, `None` at the top level.
    fn caller_address(&self) -> Option<Address>;

    /// The contract the transaction invoked first.
    fn entry_address(&self) -> Address;

    /// Whether `address` signed the transaction being executed, or is the
    /// contract that issued the current call.
    fn check_witness(&self, address: &Address) -> bool;

    /// Height of the block the transaction is executed in.
    fn block_height(&self) -> u32;

    /// Timestamp of the block the transaction is executed in, in seconds.
    fn timestamp(&self) -> u64;

    /// Hash of the latest committed block.
    fn current_blockhash(&self) -> [u8; 32];

    fn storage_get(&self, key: &[u8]) -> Option<Value>;

    fn storage_put(&mut self, key: &[u8], value: Value);

    fn storage_delete(&mut self, key: &[u8]);

    /// `dynamic_call` resolves `contract` at call time, invokes `method`
    /// on it with `params` and hands back whatever it returns.
    ///
    /// # Errors
    ///
    /// Errors if the callee aborts or cannot be resolved.
    fn dynamic_call(
        &mut self,
        contract: &Address,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, Abort>;

    fn notify(&mut self, states: Vec<Value>);
}

/// A deployable contract whose entry point is `Main(operation, args)`.
pub trait Contract {
    /// Bytes the deployment address is derived from.
    fn code(&self) -> &[u8];

    /// Runs once when the contract is deployed.
    ///
    /// # Errors
    ///
    /// Errors if initialisation aborts, which fails the deployment.
    fn deploy(&self, _runtime: &mut dyn Runtime) -> Result<(), Abort> { Ok(()) }

    /// # Errors
    ///
    /// Errors if the invocation aborts.
    fn invoke(
        &self,
        operation: &str,
        args: Vec<Value>,
        runtime: &mut dyn Runtime,
    ) -> Result<Value, Abort>;
}
