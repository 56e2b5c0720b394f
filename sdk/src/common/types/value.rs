use std::collections::BTreeMap;

use itertools::Itertools;

use super::Address;

/// Dynamically typed value passed to and returned from contract entry
/// points.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Bool(bool),
    Int(i128),
    String(String),
    ByteArray(#[serde(with = "hex")] Vec<u8>),
    Address(Address),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// Byte-level shape of a value as the VM stack sees it. Results are
/// compared in this form, so `Bool(true)` and `Int(1)` are equal.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum VmRepr {
    Bytes(String),
    Array(Vec<VmRepr>),
}

/// Minimal little-endian two's-complement encoding, zero is empty.
#[must_use]
pub fn int_to_vm_bytes(n: i128) -> Vec<u8> {
    if n == 0 {
        return Vec::new();
    }
    let mut bytes = n.to_le_bytes().to_vec();
    while let [.., prev, last] = bytes[..] {
        let redundant = (last == 0x00 && prev & 0x80 == 0) || (last == 0xff && prev & 0x80 != 0);
        if !redundant {
            break;
        }
        bytes.pop();
    }
    bytes
}

impl Value {
    #[must_use]
    pub fn vm_repr(&self) -> VmRepr {
        match self {
            Value::Bool(b) => VmRepr::Bytes(if *b { "01" } else { "00" }.to_string()),
            Value::Int(n) => VmRepr::Bytes(hex::encode(int_to_vm_bytes(*n))),
            Value::String(s) => VmRepr::Bytes(hex::encode(s.as_bytes())),
            Value::ByteArray(bytes) => VmRepr::Bytes(hex::encode(bytes)),
            Value::Address(address) => VmRepr::Bytes(address.to_hex()),
            Value::Array(items) => VmRepr::Array(items.iter().map(Value::vm_repr).collect()),
            Value::Map(entries) => VmRepr::Array(
                entries
                    .iter()
                    .map(|(k, v)| {
                        VmRepr::Array(vec![VmRepr::Bytes(hex::encode(k.as_bytes())), v.vm_repr()])
                    })
                    .collect(),
            ),
        }
    }

    /// Equality as the VM's `EQUAL` opcode would decide it.
    #[must_use]
    pub fn vm_eq(&self, other: &Value) -> bool { self.vm_repr() == other.vm_repr() }

    #[must_use]
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// A 20 byte array is accepted as an address as well.
    #[must_use]
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Address(address) => Some(*address),
            Value::ByteArray(bytes) => Address::from_slice(bytes).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Indexes into an array.
    #[must_use]
    pub fn index(&self, i: usize) -> Option<&Value> { self.as_array()?.get(i) }

    /// Looks up a key of a map.
    #[must_use]
    pub fn key(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.get(key),
            _ => None,
        }
    }
}

/// Renders in the `type:value` param convention.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "bool:{b}"),
            Value::Int(n) => write!(f, "int:{n}"),
            Value::String(s) => write!(f, "string:{s}"),
            Value::ByteArray(bytes) => write!(f, "bytearray:{}", hex::encode(bytes)),
            Value::Address(address) => write!(f, "address:{address}"),
            Value::Array(items) => write!(f, "[{}]", items.iter().join(",")),
            Value::Map(entries) => write!(
                f,
                "{{{}}}",
                entries.iter().map(|(k, v)| format!("{k}={v}")).join(",")
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self { Value::Bool(value) }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self { Value::Int(value) }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self { Value::String(value.to_string()) }
}

impl From<String> for Value {
    fn from(value: String) -> Self { Value::String(value) }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self { Value::Address(value) }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self { Value::Array(value) }
}
