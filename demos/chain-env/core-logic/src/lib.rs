use fixture_sdk::{Abort, Contract, Runtime, Value};

/// File name the contract is deployed under.
pub const CONTRACT_FILE: &str = "chain_env.wasm";

const CODE: &[u8] = b"fixture:chain_env.wasm:v1";

/// Each case is checked by the runner against the block it executes in,
/// so none carries an `expected`.
pub const TESTCASE: &str = r#"
    [
        [{"needcontext":false,"env":{"witness":[]}, "method":"timestamp", "param":"[]"},
         {"needcontext":false,"env":{"witness":[]}, "method":"block_height", "param":"[]"},
         {"needcontext":false,"env":{"witness":[]}, "method":"self_address", "param":"[]"},
         {"needcontext":false,"env":{"witness":[]}, "method":"entry_address", "param":"[]"},
         {"needcontext":false,"env":{"witness":[]}, "method":"caller_address", "param":"[]"},
         {"needcontext":false,"env":{"witness":[]}, "method":"current_blockhash", "param":"[]"}
        ]
    ]"#;

/// Reports on the chain environment it executes in. Numbers are returned
/// as fixed-width little-endian byte arrays; a top-level call has the
/// empty address as its caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChainEnv;

impl Contract for ChainEnv {
    fn code(&self) -> &[u8] { CODE }

    fn invoke(
        &self,
        operation: &str,
        _args: Vec<Value>,
        runtime: &mut dyn Runtime,
    ) -> Result<Value, Abort> {
        Ok(match operation {
            "timestamp" => Value::ByteArray(runtime.timestamp().to_le_bytes().to_vec()),
            "block_height" => Value::ByteArray(runtime.block_height().to_le_bytes().to_vec()),
            "self_address" => Value::Address(runtime.self_address()),
            "entry_address" => Value::Address(runtime.entry_address()),
            "caller_address" => Value::Address(runtime.caller_address().unwrap_or_default()),
            "current_blockhash" => Value::ByteArray(runtime.current_blockhash().to_vec()),
            "testcase" => Value::from(TESTCASE),
            _ => Value::Bool(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use fixture_runner::config::Config;
    use fixture_runner::engine::Engine;
    use fixture_runner::harness::run_contract;
    use fixture_sdk::Address;
    use test_case::test_case;

    use super::*;

    fn deployed() -> (Engine, Address) {
        let mut engine = Engine::new(Config::default());
        let address = engine.deploy(CONTRACT_FILE, ChainEnv).unwrap();
        (engine, address)
    }

    #[test]
    fn reports_the_next_block() {
        let (mut engine, address) = deployed();
        let head = *engine.ledger().head();

        let height = engine.execute(&address, "block_height", vec![], &[]);
        assert_eq!(
            height.result,
            Ok(Value::ByteArray((head.height + 1).to_le_bytes().to_vec()))
        );
        // The previous call sealed a block.
        let time = engine.execute(&address, "timestamp", vec![], &[]);
        assert_eq!(
            time.result,
            Ok(Value::ByteArray((head.timestamp + 2).to_le_bytes().to_vec()))
        );
    }

    #[test_case("self_address"; "self")]
    #[test_case("entry_address"; "entry")]
    fn reports_itself(method: &str) {
        let (mut engine, address) = deployed();
        assert_eq!(
            engine.execute(&address, method, vec![], &[]).result,
            Ok(Value::Address(address))
        );
    }

    #[test]
    fn top_level_caller_is_empty() {
        let (mut engine, address) = deployed();
        assert_eq!(
            engine.execute(&address, "caller_address", vec![], &[]).result,
            Ok(Value::Address(Address::default()))
        );
    }

    #[test]
    fn unknown_operation_returns_false() {
        let (mut engine, address) = deployed();
        assert_eq!(
            engine.execute(&address, "sha256", vec![], &[]).result,
            Ok(Value::Bool(false))
        );
    }

    #[test]
    fn own_descriptor_passes() {
        let (mut engine, _) = deployed();
        let report = run_contract(&mut engine, CONTRACT_FILE).unwrap();
        assert_eq!(report.passed, 6);
        assert!(report.is_success());
    }
}
