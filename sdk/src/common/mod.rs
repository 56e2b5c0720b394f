pub mod params;
pub mod testcase;
pub(crate) mod traits;
pub mod types;
