//! Building blocks for test-fixture contracts and the harness that runs
//! them: values and addresses, the `type:value` param codec, test
//! descriptors, the [`Contract`]/[`Runtime`] seam and the native call tape.
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod common;
pub mod native;

pub use common::traits::{Contract, Runtime};
pub use common::types::{check, Abort, Address, Value};
