//! Cache key construction
//!
//! Keys are human-readable so entries can be inspected and purged by pattern:
//!
//! ```text
//! {entity}_{operation}_{version}[_{arg}...][_{name}={arg}...]
//! ACME_income_statement_2026.10.1_annual_12
//! ```

use crate::api::types::{IndicatorKind, Period};
use std::fmt;

/// A typed value that takes part in a cache key
#[derive(Debug, Clone, PartialEq)]
pub enum KeyArg {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for KeyArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyArg::None => f.write_str("none"),
            KeyArg::Bool(v) => write!(f, "{v}"),
            KeyArg::Int(v) => write!(f, "{v}"),
            KeyArg::Float(v) => write!(f, "{v}"),
            KeyArg::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for KeyArg {
    fn from(v: bool) -> Self {
        KeyArg::Bool(v)
    }
}

impl From<i64> for KeyArg {
    fn from(v: i64) -> Self {
        KeyArg::Int(v)
    }
}

impl From<i32> for KeyArg {
    fn from(v: i32) -> Self {
        KeyArg::Int(i64::from(v))
    }
}

impl From<u32> for KeyArg {
    fn from(v: u32) -> Self {
        KeyArg::Int(i64::from(v))
    }
}

impl From<u8> for KeyArg {
    fn from(v: u8) -> Self {
        KeyArg::Int(i64::from(v))
    }
}

impl From<usize> for KeyArg {
    fn from(v: usize) -> Self {
        KeyArg::Int(v as i64)
    }
}

impl From<f64> for KeyArg {
    fn from(v: f64) -> Self {
        KeyArg::Float(v)
    }
}

impl From<&str> for KeyArg {
    fn from(v: &str) -> Self {
        KeyArg::Text(v.to_string())
    }
}

impl From<String> for KeyArg {
    fn from(v: String) -> Self {
        KeyArg::Text(v)
    }
}

impl From<Period> for KeyArg {
    fn from(v: Period) -> Self {
        KeyArg::Text(v.as_str().to_string())
    }
}

impl From<IndicatorKind> for KeyArg {
    fn from(v: IndicatorKind) -> Self {
        KeyArg::Text(v.as_str().to_string())
    }
}

impl<T: Into<KeyArg>> From<Option<T>> for KeyArg {
    fn from(v: Option<T>) -> Self {
        v.map_or(KeyArg::None, Into::into)
    }
}

/// Something that knows every argument affecting its result
///
/// Implementations should destructure themselves exhaustively so that a new
/// field cannot be added without deciding how it enters the key.
pub trait KeyDescriptor {
    /// Stable operation name
    fn operation(&self) -> &'static str;

    /// Ordered arguments
    fn positional_args(&self) -> Vec<KeyArg>;

    /// Named arguments, rendered in the given order
    fn keyword_args(&self) -> Vec<(&'static str, KeyArg)> {
        Vec::new()
    }
}

/// Build a cache key from call-site identity
pub fn build_key(
    entity: &str,
    operation: &str,
    positional: &[KeyArg],
    keyword: &[(&str, KeyArg)],
    version: &str,
) -> String {
    let mut key = format!("{entity}_{operation}_{version}");

    if !positional.is_empty() {
        let args: Vec<String> = positional.iter().map(ToString::to_string).collect();
        key.push('_');
        key.push_str(&args.join("_"));
    }

    if !keyword.is_empty() {
        let args: Vec<String> = keyword.iter().map(|(k, v)| format!("{k}={v}")).collect();
        key.push('_');
        key.push_str(&args.join("_"));
    }

    key
}

/// Build a key from a [`KeyDescriptor`]
pub fn key_for(entity: &str, descriptor: &impl KeyDescriptor, version: &str) -> String {
    build_key(
        entity,
        descriptor.operation(),
        &descriptor.positional_args(),
        &descriptor.keyword_args(),
        version,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = build_key(
            "ACME",
            "calculate_dcf_value",
            &[0.11_f64.into(), 0.03_f64.into(), 0.08_f64.into(), 10_u32.into()],
            &[],
            "v1",
        );
        assert_eq!(key, "ACME_calculate_dcf_value_v1_0.11_0.03_0.08_10");

        let key = build_key(
            "ACME",
            "earnings_transcript",
            &[],
            &[("year", 2025_i32.into()), ("quarter", KeyArg::from(None::<u8>))],
            "v1",
        );
        assert_eq!(key, "ACME_earnings_transcript_v1_year=2025_quarter=none");

        assert_eq!(build_key("ACME", "profile", &[], &[], "v1"), "ACME_profile_v1");
    }

    #[test]
    fn test_key_is_deterministic() {
        let args: [KeyArg; 2] = [Period::Annual.into(), 12_usize.into()];
        assert_eq!(
            build_key("ACME", "income_statement", &args, &[], "v1"),
            build_key("ACME", "income_statement", &args, &[], "v1")
        );
    }

    #[test]
    fn test_each_input_changes_key() {
        let base = build_key("ACME", "op", &[1_i64.into(), true.into()], &[("k", "a".into())], "v1");
        let variants = [
            build_key("ACMF", "op", &[1_i64.into(), true.into()], &[("k", "a".into())], "v1"),
            build_key("ACME", "oq", &[1_i64.into(), true.into()], &[("k", "a".into())], "v1"),
            build_key("ACME", "op", &[2_i64.into(), true.into()], &[("k", "a".into())], "v1"),
            build_key("ACME", "op", &[1_i64.into(), false.into()], &[("k", "a".into())], "v1"),
            build_key("ACME", "op", &[1_i64.into(), true.into()], &[("k", "b".into())], "v1"),
            build_key("ACME", "op", &[1_i64.into(), true.into()], &[("k", "a".into())], "v2"),
        ];
        for variant in variants {
            assert_ne!(base, variant);
        }
    }

    #[test]
    fn test_positional_order_matters() {
        assert_ne!(
            build_key("ACME", "op", &[1_i64.into(), 2_i64.into()], &[], "v1"),
            build_key("ACME", "op", &[2_i64.into(), 1_i64.into()], &[], "v1")
        );
    }
}
