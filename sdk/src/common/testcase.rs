//! Test descriptors returned by a contract's `testcase` operation and
//! consumed by the runner.
use serde::{Deserialize, Serialize};

use crate::common::params::{parse_params, parse_single, ParamError};
use crate::common::types::{Address, Value};

/// Simulated environment of a single test invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEnv {
    #[serde(default)]
    pub witness: Vec<Address>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Append the deployment context as the last argument.
    #[serde(default)]
    pub needcontext: bool,
    #[serde(default)]
    pub env: TestEnv,
    pub method: String,
    #[serde(default = "empty_param_list")]
    pub param: String,
    /// Encoded return value; empty means the result is not compared.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expected: String,
    /// Substring the emitted notifications must contain.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notify: String,
}

fn empty_param_list() -> String { "[]".to_string() }

/// Outer list is the test groups, inner lists the cases of a group.
pub type TestGroups = Vec<Vec<TestCase>>;

impl TestCase {
    /// # Errors
    ///
    /// Errors if `param` is not a valid param list.
    pub fn params(&self) -> Result<Vec<Value>, ParamError> { parse_params(&self.param) }

    /// # Errors
    ///
    /// Errors if `expected` is set but does not hold exactly one value.
    pub fn expected_value(&self) -> Result<Option<Value>, ParamError> {
        if self.expected.trim().is_empty() {
            return Ok(None);
        }
        parse_single(&self.expected).map(Some)
    }
}

/// # Errors
///
/// Errors if `json` is not an array of arrays of test cases.
pub fn parse_test_groups(json: &str) -> Result<TestGroups, serde_json::Error> {
    serde_json::from_str(json)
}
