use crate::common::types::{Address, CrossContractCall, Value};

/// Represents the `CallTape` under native execution
#[derive(Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CallTape {
    #[serde(rename = "global_calltape")]
    pub writer: Vec<CrossContractCall>,
}

impl std::fmt::Debug for CallTape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result { self.writer.fmt(f) }
}

impl CallTape {
    /// Pushes a skeletal `CrossContractCall` whose return is filled in
    /// later by [`CallTape::resolve`]. Returns where in the "writer" it
    /// went, since calls made while resolving this one land after it.
    pub fn send(
        &mut self,
        caller: Address,
        callee: Address,
        method: &str,
        params: &[Value],
    ) -> usize {
        let inserted_idx = self.writer.len();
        self.writer.push(CrossContractCall {
            caller,
            callee,
            method: method.to_string(),
            params: params.to_vec(),
            return_: None,
        });
        inserted_idx
    }

    pub fn resolve(&mut self, inserted_idx: usize, resolved_value: &Value) {
        if let Some(call) = self.writer.get_mut(inserted_idx) {
            call.return_ = Some(resolved_value.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.writer.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.writer.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &CrossContractCall> { self.writer.iter() }
}

#[cfg(test)]
mod tests {
    use super::CallTape;
    use crate::common::types::{Address, Value};

    #[test]
    fn test_send_native_nested_call() {
        let a = Address::from_code(b"a");
        let b = Address::from_code(b"b");
        let c = Address::from_code(b"c");

        let mut calltape = CallTape::default();
        let outer = calltape.send(a, b, "ownerOf", &[Value::Int(2)]);
        let inner = calltape.send(b, c, "lookup", &[]);
        calltape.resolve(inner, &Value::Bool(true));
        calltape.resolve(outer, &Value::Address(a));

        assert_eq!(calltape.len(), 2);
        assert_eq!(calltape.writer[0].callee, b);
        assert_eq!(calltape.writer[0].return_, Some(Value::Address(a)));
        assert_eq!(calltape.writer[1].caller, b);
        assert_eq!(calltape.writer[1].return_, Some(Value::Bool(true)));
    }

    #[test]
    fn unresolved_call_serializes_as_null() {
        let mut calltape = CallTape::default();
        calltape.send(Address::default(), Address::from_code(b"x"), "boom", &[]);
        let json = serde_json::to_value(&calltape).unwrap();
        assert!(json["global_calltape"][0]["return_"].is_null());
    }
}
