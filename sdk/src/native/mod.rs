pub(crate) mod calltape;
pub mod identity;

pub use calltape::CallTape;
pub use identity::IdentityStack;
