pub(crate) mod abort;
pub(crate) mod address;
pub(crate) mod cross_contract_call;
pub(crate) mod notify;
pub(crate) mod value;

pub use abort::{check, Abort};
pub use address::{Address, AddressError, ADDRESS_BYTES, ADDRESS_VERSION};
pub use cross_contract_call::CrossContractCall;
pub use notify::Notify;
pub use value::{int_to_vm_bytes, Value, VmRepr};
