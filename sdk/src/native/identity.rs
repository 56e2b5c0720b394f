#![allow(clippy::module_name_repetitions)]
use crate::common::types::Address;

/// Represents a stack for call contexts during native execution.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct IdentityStack(Vec<Address>);

impl IdentityStack {
    pub fn add_identity(&mut self, id: Address) { self.0.push(id); }

    #[must_use]
    pub fn top_identity(&self) -> Address { self.0.last().copied().unwrap_or_default() }

    /// The identity just below the top, i.e. whoever called the current
    /// frame.
    #[must_use]
    pub fn caller_identity(&self) -> Option<Address> {
        self.0.len().checked_sub(2).map(|i| self.0[i])
    }

    /// The identity at the bottom, i.e. the contract invoked first.
    #[must_use]
    pub fn entry_identity(&self) -> Address { self.0.first().copied().unwrap_or_default() }

    pub fn rm_identity(&mut self) { self.0.truncate(self.0.len().saturating_sub(1)); }

    #[must_use]
    pub fn depth(&self) -> usize { self.0.len() }

    pub fn clear(&mut self) { self.0.clear(); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_caller() {
        let a = Address::from_code(b"a");
        let b = Address::from_code(b"b");
        let mut stack = IdentityStack::default();
        assert_eq!(stack.top_identity(), Address::default());
        assert_eq!(stack.caller_identity(), None);

        stack.add_identity(a);
        stack.add_identity(b);
        assert_eq!(stack.top_identity(), b);
        assert_eq!(stack.caller_identity(), Some(a));
        assert_eq!(stack.entry_identity(), a);
        assert_eq!(stack.depth(), 2);

        stack.rm_identity();
        stack.rm_identity();
        stack.rm_identity();
        assert_eq!(stack.depth(), 0);
    }
}
