use fixture_sdk::{Abort, Address, Contract, Runtime, Value};
use thiserror::Error;

/// File name the contract is deployed under.
pub const CONTRACT_FILE: &str = "mint_token.avm";

/// Key under which the deployment context holds the registry address.
pub const REGISTRY_FILE: &str = "test2.avm";

const CODE: &[u8] = b"fixture:mint_token.avm:v1";

pub const TESTCASE: &str = r#"
    [
        [{"needcontext":true,"env":{"witness":[]}, "method":"mintToken", "param":"[address:AbG3ZgFrMK6fqwXWR1WkQ1d1EYVunCwknu,int:2]", "expected":"int:1"}
        ]
    ]"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    MintToken,
    Testcase,
}

impl Operation {
    pub const TABLE: [(&'static str, Operation); 2] = [
        ("mintToken", Operation::MintToken),
        ("testcase", Operation::Testcase),
    ];

    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, op)| *op)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Operation::MintToken => "mintToken",
            Operation::Testcase => "testcase",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodArgs {
    MintToken {
        player: Value,
        contract: Address,
        token_id: Value,
    },
    Testcase,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodReturns {
    MintToken(bool),
    Testcase(&'static str),
}

impl From<MethodReturns> for Value {
    fn from(value: MethodReturns) -> Self {
        match value {
            MethodReturns::MintToken(minted) => Value::Bool(minted),
            MethodReturns::Testcase(descriptor) => Value::from(descriptor),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    #[error("malformed {operation} call: {reason}")]
    Malformed {
        operation: &'static str,
        reason: String,
    },
    #[error("{player} is not the owner of token {token_id}, {owner} is")]
    Unauthorized {
        player: Value,
        token_id: Value,
        owner: Value,
    },
    #[error(transparent)]
    Oracle(#[from] Abort),
}

/// Answers who owns a token on a given contract.
pub trait OwnershipOracle {
    /// # Errors
    ///
    /// Errors if the lookup itself aborts.
    fn owner_of(&mut self, contract: &Address, token_id: &Value) -> Result<Value, Abort>;
}

/// Looks ownership up through a dynamic `ownerOf` call on the target
/// contract.
pub struct DynamicOwnerOracle<'a> {
    runtime: &'a mut dyn Runtime,
}

impl<'a> DynamicOwnerOracle<'a> {
    pub fn new(runtime: &'a mut dyn Runtime) -> Self { Self { runtime } }
}

impl OwnershipOracle for DynamicOwnerOracle<'_> {
    fn owner_of(&mut self, contract: &Address, token_id: &Value) -> Result<Value, Abort> {
        owner_of(self.runtime, contract, token_id)
    }
}

/// The result is passed through as is.
///
/// # Errors
///
/// Errors if the dynamic call aborts.
pub fn owner_of(
    runtime: &mut dyn Runtime,
    contract: &Address,
    token_id: &Value,
) -> Result<Value, Abort> {
    runtime.dynamic_call(contract, "ownerOf", vec![token_id.clone()])
}

/// Turns the positional arguments of `operation` into [`MethodArgs`].
///
/// # Errors
///
/// Errors with [`MintError::Malformed`] when `mintToken` does not get
/// exactly three arguments or its context carries no registry address.
pub fn decode_args(operation: Operation, args: Vec<Value>) -> Result<MethodArgs, MintError> {
    match operation {
        Operation::MintToken => {
            let malformed = |reason: String| MintError::Malformed {
                operation: operation.name(),
                reason,
            };
            let [player, token_id, context]: [Value; 3] = args
                .try_into()
                .map_err(|args: Vec<Value>| {
                    malformed(format!("expected 3 arguments, got {}", args.len()))
                })?;
            // The deployment context is appended last.
            let contract = context
                .index(0)
                .and_then(|files| files.key(REGISTRY_FILE))
                .and_then(Value::as_address)
                .ok_or_else(|| malformed(format!("context has no {REGISTRY_FILE} address")))?;
            Ok(MethodArgs::MintToken {
                player,
                contract,
                token_id,
            })
        }
        Operation::Testcase => Ok(MethodArgs::Testcase),
    }
}

/// # Errors
///
/// Errors if the mint is not authorised or the ownership lookup aborts.
pub fn dispatch(
    args: MethodArgs,
    oracle: &mut impl OwnershipOracle,
) -> Result<MethodReturns, MintError> {
    match args {
        MethodArgs::MintToken {
            player,
            contract,
            token_id,
        } => mint_token(&player, &contract, &token_id, oracle).map(MethodReturns::MintToken),
        MethodArgs::Testcase => Ok(MethodReturns::Testcase(testcase())),
    }
}

/// Succeeds only for the current owner of `token_id` on `contract`.
///
/// # Errors
///
/// Errors with [`MintError::Unauthorized`] if `player` is not the owner.
pub fn mint_token(
    player: &Value,
    contract: &Address,
    token_id: &Value,
    oracle: &mut impl OwnershipOracle,
) -> Result<bool, MintError> {
    let owner = oracle.owner_of(contract, token_id)?;
    if !player.vm_eq(&owner) {
        return Err(MintError::Unauthorized {
            player: player.clone(),
            token_id: token_id.clone(),
            owner,
        });
    }
    Ok(true)
}

#[must_use]
pub fn testcase() -> &'static str { TESTCASE }

/// The `Main(operation, args)` entry point. Unknown operations and
/// malformed arguments return `false`; an unauthorised mint aborts.
///
/// # Errors
///
/// Errors if the mint is unauthorised or the ownership lookup aborts.
pub fn entry(operation: &str, args: Vec<Value>, runtime: &mut dyn Runtime) -> Result<Value, Abort> {
    let Some(operation) = Operation::lookup(operation) else {
        return Ok(Value::Bool(false));
    };
    let result = decode_args(operation, args)
        .and_then(|args| dispatch(args, &mut DynamicOwnerOracle::new(runtime)));
    match result {
        Ok(returns) => Ok(returns.into()),
        Err(MintError::Malformed { .. }) => Ok(Value::Bool(false)),
        Err(err @ MintError::Unauthorized { .. }) => Err(Abort::AssertionFailed(err.to_string())),
        Err(MintError::Oracle(abort)) => Err(abort),
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MintTokenContract;

impl Contract for MintTokenContract {
    fn code(&self) -> &[u8] { CODE }

    fn invoke(
        &self,
        operation: &str,
        args: Vec<Value>,
        runtime: &mut dyn Runtime,
    ) -> Result<Value, Abort> {
        entry(operation, args, runtime)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use fixture_sdk::common::testcase::parse_test_groups;
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;

    const PLAYER: &str = "AbG3ZgFrMK6fqwXWR1WkQ1d1EYVunCwknu";

    fn player() -> Address { PLAYER.parse().unwrap() }

    fn registry() -> Address { Address::from_code(b"registry") }

    /// Answers `ownerOf` from a fixed table and remembers what it was asked.
    #[derive(Default)]
    struct StubRuntime {
        owners: BTreeMap<i128, Value>,
        calls: Vec<(Address, String, Vec<Value>)>,
    }

    impl StubRuntime {
        fn with_owner(token: i128, owner: Address) -> Self {
            Self {
                owners: BTreeMap::from([(token, Value::Address(owner))]),
                calls: Vec::new(),
            }
        }
    }

    impl Runtime for StubRuntime {
        fn self_address(&self) -> Address { Address::from_code(CODE) }

        fn caller_address(&self) -> Option<Address> { None }

        fn entry_address(&self) -> Address { self.self_address() }

        fn check_witness(&self, _address: &Address) -> bool { false }

        fn block_height(&self) -> u32 { 1 }

        fn timestamp(&self) -> u64 { 0 }

        fn current_blockhash(&self) -> [u8; 32] { [0; 32] }

        fn storage_get(&self, _key: &[u8]) -> Option<Value> { None }

        fn storage_put(&mut self, _key: &[u8], _value: Value) {}

        fn storage_delete(&mut self, _key: &[u8]) {}

        fn dynamic_call(
            &mut self,
            contract: &Address,
            method: &str,
            params: Vec<Value>,
        ) -> Result<Value, Abort> {
            self.calls
                .push((*contract, method.to_string(), params.clone()));
            if *contract != registry() {
                return Err(Abort::UnknownContract(*contract));
            }
            params
                .first()
                .and_then(Value::as_int)
                .and_then(|token| self.owners.get(&token).cloned())
                .ok_or_else(|| Abort::AssertionFailed("unknown token".to_string()))
        }

        fn notify(&mut self, _states: Vec<Value>) {}
    }

    struct FixedOracle(Value);

    impl OwnershipOracle for FixedOracle {
        fn owner_of(&mut self, _contract: &Address, _token_id: &Value) -> Result<Value, Abort> {
            Ok(self.0.clone())
        }
    }

    fn context(registry: Address) -> Value {
        Value::Array(vec![Value::Map(BTreeMap::from([(
            REGISTRY_FILE.to_string(),
            Value::Address(registry),
        )]))])
    }

    fn mint_args(player: Address, token: i128) -> Vec<Value> {
        vec![Value::Address(player), Value::Int(token), context(registry())]
    }

    #[test_case("mintToken", Some(Operation::MintToken); "mint")]
    #[test_case("testcase", Some(Operation::Testcase); "testcase")]
    #[test_case("MintToken", None; "case sensitive")]
    #[test_case("", None; "empty")]
    fn lookup(name: &str, expected: Option<Operation>) {
        assert_eq!(Operation::lookup(name), expected);
    }

    #[test]
    fn owner_mints() {
        let mut runtime = StubRuntime::with_owner(2, player());
        assert_eq!(
            entry("mintToken", mint_args(player(), 2), &mut runtime),
            Ok(Value::Bool(true))
        );
        assert_eq!(runtime.calls, vec![(
            registry(),
            "ownerOf".to_string(),
            vec![Value::Int(2)]
        )]);
    }

    #[test]
    fn non_owner_aborts() {
        let mut runtime = StubRuntime::with_owner(2, Address::from_code(b"someone else"));
        assert!(matches!(
            entry("mintToken", mint_args(player(), 2), &mut runtime),
            Err(Abort::AssertionFailed(_))
        ));
    }

    #[test]
    fn lookup_abort_propagates() {
        let mut runtime = StubRuntime::with_owner(2, player());
        assert_eq!(
            entry("mintToken", mint_args(player(), 7), &mut runtime),
            Err(Abort::AssertionFailed("unknown token".to_string()))
        );
    }

    #[test]
    fn missing_registry_in_context_is_malformed() {
        let mut runtime = StubRuntime::with_owner(2, player());
        let args = vec![Value::Address(player()), Value::Int(2), Value::Array(vec![])];
        assert_eq!(entry("mintToken", args.clone(), &mut runtime), Ok(Value::Bool(false)));
        assert!(matches!(
            decode_args(Operation::MintToken, args),
            Err(MintError::Malformed { .. })
        ));
        assert!(runtime.calls.is_empty());
    }

    #[test]
    fn player_as_bytes_matches_address_owner() {
        let mut oracle = FixedOracle(Value::Address(player()));
        let player_bytes = Value::ByteArray(player().to_vec());
        assert_eq!(
            mint_token(&player_bytes, &registry(), &Value::Int(2), &mut oracle),
            Ok(true)
        );
    }

    #[test]
    fn unauthorized_is_distinct_from_malformed() {
        let mut oracle = FixedOracle(Value::Address(registry()));
        let args = decode_args(Operation::MintToken, mint_args(player(), 2)).unwrap();
        assert!(matches!(
            dispatch(args, &mut oracle),
            Err(MintError::Unauthorized { .. })
        ));
    }

    #[test]
    fn unknown_operation_returns_false() {
        let mut runtime = StubRuntime::default();
        for op in ["ownerOf", "burn", "Main", "testcase "] {
            assert_eq!(
                entry(op, mint_args(player(), 2), &mut runtime),
                Ok(Value::Bool(false))
            );
        }
        assert!(runtime.calls.is_empty());
    }

    #[test]
    fn descriptor_describes_mint() {
        let mut runtime = StubRuntime::default();
        let Ok(Value::String(descriptor)) = entry("testcase", vec![], &mut runtime) else {
            panic!("testcase did not return a string");
        };
        let groups = parse_test_groups(&descriptor).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 1);
        let case = &groups[0][0];
        assert!(case.needcontext);
        assert!(case.env.witness.is_empty());
        assert_eq!(case.method, "mintToken");
        assert_eq!(case.param, format!("[address:{PLAYER},int:2]"));
        assert_eq!(case.expected, "int:1");
    }

    fn any_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| Value::Int(n.into())),
            "[a-z]{0,6}".prop_map(Value::String),
        ]
    }

    proptest! {
        #[test]
        fn wrong_arity_returns_false(args in proptest::collection::vec(any_value(), 0..8)) {
            prop_assume!(args.len() != 3);
            let mut runtime = StubRuntime::with_owner(2, player());
            prop_assert_eq!(entry("mintToken", args, &mut runtime), Ok(Value::Bool(false)));
            prop_assert!(runtime.calls.is_empty());
        }

        #[test]
        fn testcase_ignores_arguments(args in proptest::collection::vec(any_value(), 0..5)) {
            let mut runtime = StubRuntime::default();
            prop_assert_eq!(entry("testcase", args, &mut runtime), Ok(Value::from(TESTCASE)));
        }
    }
}
