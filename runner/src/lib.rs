//! Test harness for fixture contracts: an in-memory [`ledger::Ledger`], an
//! [`engine::Engine`] executing invocations against it and the batch
//! [`harness`] that drives each contract's own test descriptor.
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod engine;
pub mod harness;
pub mod ledger;
