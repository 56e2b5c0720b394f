use fixture_sdk::common::types::int_to_vm_bytes;
use fixture_sdk::{check, Abort, Address, Contract, Runtime, Value};

/// File name the registry is deployed under. Other fixtures find it in
/// the deployment context under this key.
pub const CONTRACT_FILE: &str = "test2.avm";

const CODE: &[u8] = b"fixture:test2.avm:v1";

const OWNER_PREFIX: &[u8] = b"owner:";

/// Only this account may `register` tokens.
pub const ADMIN: &str = "AFsBXShNPGXJCSpxmFnTWEm3UHqyohhEgP";

/// Owner of token 2 at deployment.
pub const GENESIS_OWNER: &str = "AbG3ZgFrMK6fqwXWR1WkQ1d1EYVunCwknu";

pub const TESTCASE: &str = r#"
    [
        [{"needcontext":false,"env":{"witness":[]}, "method":"ownerOf", "param":"[int:2]", "expected":"address:AbG3ZgFrMK6fqwXWR1WkQ1d1EYVunCwknu"},
         {"needcontext":false,"env":{"witness":["AFsBXShNPGXJCSpxmFnTWEm3UHqyohhEgP"]}, "method":"register", "param":"[int:3,address:AFmtrXSFfVhd8wGYdLNkkJuWaHfDJo9afu]", "expected":"bool:true", "notify":"register"},
         {"needcontext":false,"env":{"witness":[]}, "method":"ownerOf", "param":"[int:3]", "expected":"address:AFmtrXSFfVhd8wGYdLNkkJuWaHfDJo9afu"},
         {"needcontext":false,"env":{"witness":["AFsBXShNPGXJCSpxmFnTWEm3UHqyohhEgP"]}, "method":"unregister", "param":"[int:3]", "expected":"bool:true", "notify":"unregister"}
        ]
    ]"#;

fn owner_key(token_id: i128) -> Vec<u8> {
    let mut key = OWNER_PREFIX.to_vec();
    key.extend(int_to_vm_bytes(token_id));
    key
}

fn token_id(value: &Value) -> Result<i128, Abort> {
    value
        .as_int()
        .ok_or_else(|| Abort::Fault(format!("token id must be an int, got {value}")))
}

/// Maps token ids to owner addresses.
#[derive(Clone, Debug)]
pub struct TokenRegistry {
    admin: Address,
    genesis: Vec<(i128, Address)>,
}

impl TokenRegistry {
    #[must_use]
    pub fn new(admin: Address, genesis: Vec<(i128, Address)>) -> Self { Self { admin, genesis } }

    #[must_use]
    pub fn admin(&self) -> Address { self.admin }

    /// # Errors
    ///
    /// Errors if the token is unknown or the arguments do not name one.
    pub fn owner_of(&self, args: &[Value], runtime: &mut dyn Runtime) -> Result<Value, Abort> {
        let [token] = args else {
            return Err(Abort::Fault(format!(
                "ownerOf takes 1 argument, got {}",
                args.len()
            )));
        };
        let token = token_id(token)?;
        runtime
            .storage_get(&owner_key(token))
            .ok_or_else(|| Abort::AssertionFailed(format!("token {token} has no owner")))
    }

    /// Needs the admin's witness. Wrong arity returns `false`.
    ///
    /// # Errors
    ///
    /// Errors without the admin's witness or on a malformed token or owner.
    pub fn register(&self, args: &[Value], runtime: &mut dyn Runtime) -> Result<Value, Abort> {
        let [token, owner] = args else {
            return Ok(Value::Bool(false));
        };
        check(
            runtime.check_witness(&self.admin),
            "register needs the admin's witness",
        )?;
        let token = token_id(token)?;
        let owner = owner
            .as_address()
            .ok_or_else(|| Abort::Fault(format!("owner must be an address, got {owner}")))?;
        runtime.storage_put(&owner_key(token), Value::Address(owner));
        runtime.notify(vec![
            Value::from("register"),
            Value::Int(token),
            Value::Address(owner),
        ]);
        Ok(Value::Bool(true))
    }

    /// Needs the admin's witness. Returns `false` for wrong arity or a
    /// token nobody owns.
    ///
    /// # Errors
    ///
    /// Errors without the admin's witness or on a malformed token.
    pub fn unregister(&self, args: &[Value], runtime: &mut dyn Runtime) -> Result<Value, Abort> {
        let [token] = args else {
            return Ok(Value::Bool(false));
        };
        check(
            runtime.check_witness(&self.admin),
            "unregister needs the admin's witness",
        )?;
        let token = token_id(token)?;
        let key = owner_key(token);
        if runtime.storage_get(&key).is_none() {
            return Ok(Value::Bool(false));
        }
        runtime.storage_delete(&key);
        runtime.notify(vec![Value::from("unregister"), Value::Int(token)]);
        Ok(Value::Bool(true))
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        // Both constants are valid base58check addresses.
        let address = |s: &str| s.parse::<Address>().unwrap_or_default();
        Self::new(address(ADMIN), vec![(2, address(GENESIS_OWNER))])
    }
}

impl Contract for TokenRegistry {
    fn code(&self) -> &[u8] { CODE }

    fn deploy(&self, runtime: &mut dyn Runtime) -> Result<(), Abort> {
        for (token, owner) in &self.genesis {
            runtime.storage_put(&owner_key(*token), Value::Address(*owner));
        }
        Ok(())
    }

    fn invoke(
        &self,
        operation: &str,
        args: Vec<Value>,
        runtime: &mut dyn Runtime,
    ) -> Result<Value, Abort> {
        match operation {
            "ownerOf" => self.owner_of(&args, runtime),
            "register" => self.register(&args, runtime),
            "unregister" => self.unregister(&args, runtime),
            "testcase" => Ok(Value::from(TESTCASE)),
            _ => Ok(Value::Bool(false)),
        }
    }
}
