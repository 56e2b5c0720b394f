//! Codec for typed param lists such as
//! `[address:AbG3ZgFrMK6fqwXWR1WkQ1d1EYVunCwknu,int:2]`.
use itertools::Itertools;
use thiserror::Error;

use crate::common::types::{AddressError, Value};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("param {0:?} has no `type:` prefix")]
    MissingType(String),
    #[error("unknown param type {0:?}")]
    UnknownType(String),
    #[error("invalid {ty} value {value:?}")]
    InvalidValue { ty: &'static str, value: String },
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error("unexpected {found:?} at offset {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("unterminated list")]
    Unterminated,
    #[error("expected a single value, got {0}")]
    NotSingle(usize),
}

/// Parses a param list. The outer brackets are optional, so `int:1` and
/// `[int:1]` both yield a single value; an empty string yields none.
///
/// # Errors
///
/// Errors on unknown types, malformed values and unbalanced brackets.
pub fn parse_params(src: &str) -> Result<Vec<Value>, ParamError> {
    let mut parser = Parser { src, pos: 0 };
    parser.skip_ws();
    let values = if parser.peek() == Some('[') {
        parser.bump();
        parser.sequence(Some(']'))?
    } else {
        parser.sequence(None)?
    };
    parser.skip_ws();
    match parser.peek() {
        Some(found) => Err(ParamError::Unexpected {
            found,
            offset: parser.pos,
        }),
        None => Ok(values),
    }
}

/// Parses a param string that must hold exactly one value.
///
/// # Errors
///
/// Errors as [`parse_params`] does, or if the count is not one.
pub fn parse_single(src: &str) -> Result<Value, ParamError> {
    let mut values = parse_params(src)?;
    match values.len() {
        1 => Ok(values.remove(0)),
        n => Err(ParamError::NotSingle(n)),
    }
}

#[must_use]
pub fn format_params(values: &[Value]) -> String { format!("[{}]", values.iter().join(",")) }

/// Parses one `type:value` item.
///
/// # Errors
///
/// Errors on a missing or unknown type, or a value that does not fit it.
pub fn parse_typed(item: &str) -> Result<Value, ParamError> {
    let (ty, value) = item
        .split_once(':')
        .ok_or_else(|| ParamError::MissingType(item.to_string()))?;
    let value = value.trim();
    let invalid = |ty| ParamError::InvalidValue {
        ty,
        value: value.to_string(),
    };
    match ty.trim() {
        "bool" => match value {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid("bool")),
        },
        "int" => value.parse().map(Value::Int).map_err(|_| invalid("int")),
        "string" => Ok(Value::String(value.to_string())),
        "bytearray" => hex::decode(value)
            .map(Value::ByteArray)
            .map_err(|_| invalid("bytearray")),
        "address" => Ok(Value::Address(value.parse()?)),
        other => Err(ParamError::UnknownType(other.to_string())),
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> { self.src[self.pos..].chars().next() }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Reads items up to `closing`, or to the end of input when `None`.
    fn sequence(&mut self, closing: Option<char>) -> Result<Vec<Value>, ParamError> {
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == closing {
            self.bump();
            return Ok(items);
        }
        loop {
            self.skip_ws();
            let item = if self.peek() == Some('[') {
                self.bump();
                Value::Array(self.sequence(Some(']'))?)
            } else {
                parse_typed(self.scalar())?
            };
            items.push(item);
            self.skip_ws();
            let offset = self.pos;
            match self.bump() {
                Some(',') => continue,
                found if found == closing => return Ok(items),
                Some(found) => return Err(ParamError::Unexpected { found, offset }),
                None => return Err(ParamError::Unterminated),
            }
        }
    }

    fn scalar(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|c| c != ',' && c != ']') {
            self.bump();
        }
        self.src[start..self.pos].trim()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_case::test_case;

    use super::*;
    use crate::common::types::Address;

    const PLAYER: &str = "AbG3ZgFrMK6fqwXWR1WkQ1d1EYVunCwknu";

    #[test]
    fn parses_fixture_params() {
        let values = parse_params(&format!("[address:{PLAYER},int:2]")).unwrap();
        assert_eq!(values, vec![
            Value::Address(PLAYER.parse().unwrap()),
            Value::Int(2)
        ]);
    }

    #[test]
    fn parses_nested_lists() {
        let values = parse_params("[int:1, [string:a, bool:true], []]").unwrap();
        assert_eq!(values, vec![
            Value::Int(1),
            Value::Array(vec![Value::from("a"), Value::Bool(true)]),
            Value::Array(vec![]),
        ]);
    }

    #[test_case("", 0; "empty input")]
    #[test_case("[]", 0; "empty list")]
    #[test_case("  [ ]  ", 0; "empty list with spaces")]
    #[test_case("int:1", 1; "bare item")]
    #[test_case("int:1,int:2", 2; "bare items")]
    #[test_case("[string:]", 1; "empty string")]
    fn counts(src: &str, n: usize) {
        assert_eq!(parse_params(src).unwrap().len(), n);
    }

    #[test_case("[int:1"; "unterminated")]
    #[test_case("[int:x]"; "bad int")]
    #[test_case("[bool:yes]"; "bad bool")]
    #[test_case("[bytearray:zz]"; "bad hex")]
    #[test_case("[float:1.0]"; "unknown type")]
    #[test_case("[noprefix]"; "missing type")]
    #[test_case("[int:1]]"; "trailing bracket")]
    #[test_case("[address:Abc]"; "bad address")]
    fn rejects(src: &str) {
        assert!(parse_params(src).is_err());
    }

    #[test_case("int : 1", Value::Int(1); "spaces on both sides")]
    #[test_case("int :1", Value::Int(1); "space before value")]
    #[test_case(" bool: true ", Value::Bool(true); "padded item")]
    #[test_case("string: hi", Value::from("hi"); "string is trimmed")]
    fn whitespace_around_separator(item: &str, expected: Value) {
        assert_eq!(parse_typed(item), Ok(expected));
    }

    #[test]
    fn single_value() {
        assert_eq!(parse_single("int:1"), Ok(Value::Int(1)));
        assert_eq!(parse_single("[int:1]"), Ok(Value::Int(1)));
        assert_eq!(parse_single("int:1,int:2"), Err(ParamError::NotSingle(2)));
        assert_eq!(parse_single(""), Err(ParamError::NotSingle(0)));
    }

    #[test]
    fn format_matches_descriptor_text() {
        let player: Address = PLAYER.parse().unwrap();
        assert_eq!(
            format_params(&[Value::Address(player), Value::Int(2)]),
            format!("[address:{PLAYER},int:2]")
        );
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| Value::Int(n.into())),
            "[a-zA-Z0-9 _.-]{0,12}".prop_map(|s| Value::String(s.trim().to_string())),
            proptest::collection::vec(any::<u8>(), 0..8).prop_map(Value::ByteArray),
            any::<[u8; 20]>().prop_map(|b| Value::Address(Address(b))),
        ]
    }

    fn value() -> impl Strategy<Value = Value> {
        scalar().prop_recursive(3, 16, 4, |inner| {
            proptest::collection::vec(inner, 0..4).prop_map(Value::Array)
        })
    }

    proptest! {
        #[test]
        fn format_then_parse(values in proptest::collection::vec(value(), 0..5)) {
            prop_assert_eq!(parse_params(&format_params(&values)).unwrap(), values);
        }

        /// Arbitrary input never panics the parser.
        #[test]
        fn fuzz_parse(src in "\\PC{0,40}") {
            let _ = parse_params(&src);
        }
    }
}
