//! VM value type
//!
//! All stack slots and constants are 256-bit unsigned integers, matching
//! on-chain integer width.

use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serializer};

/// A single VM word
pub type Value = U256;

/// Parse a value from decimal or `0x`-prefixed hex
pub fn parse_value(s: &str) -> Option<Value> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() {
            return None;
        }
        U256::from_str_radix(hex, 16).ok()
    } else {
        U256::from_dec_str(s).ok()
    }
}

/// Serde adapter for a list of values.
///
/// Serializes as decimal strings. Deserializes from JSON numbers, decimal
/// strings or hex strings, so asset files can write `1000000000000000000`
/// or `"0xde0b6b3a7640000"` interchangeably.
pub mod values_serde {
    use super::*;
    use serde::de::Error as _;
    use serde::ser::SerializeSeq;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(values: &[Value], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
        let raw = Vec::<Raw>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|r| match r {
                Raw::Number(n) => Ok(U256::from(n)),
                Raw::Text(s) => {
                    parse_value(&s).ok_or_else(|| D::Error::custom(format!("invalid value: {}", s)))
                }
            })
            .collect()
    }
}

/// Serde adapter for a single value, same accepted forms as [`values_serde`]
pub mod value_serde {
    use super::*;
    use serde::de::Error as _;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Value, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(U256::from(n)),
            Raw::Text(s) => {
                parse_value(&s).ok_or_else(|| D::Error::custom(format!("invalid value: {}", s)))
            }
        }
    }
}
