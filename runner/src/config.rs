use fixture_sdk::Address;

/// Matches the call stack depth the VM allows.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Account that deploys the contracts; handed to contracts as part of
    /// the test context.
    pub admin: Address,
    /// Top-level invocation counts as depth 1.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin: Address::from_code(b"fixture admin"),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
