//! Payment currencies accepted by an asset

use crate::vm::value::{values_serde, Value};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid hex in address: {0}")]
    InvalidHex(String),
    #[error("Invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 20-byte account or token address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn zero() -> Self {
        Self([0u8; 20])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// The address as a VM word (big-endian, left-padded)
    pub fn to_value(&self) -> Value {
        Value::from_big_endian(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(body).map_err(|_| AddressError::InvalidHex(s.to_string()))?;
        let array: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Token standard of a payment currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Erc20,
    Erc1155,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Erc20 => write!(f, "ERC20"),
            TokenType::Erc1155 => write!(f, "ERC1155"),
        }
    }
}

/// One accepted payment method, addressed by its list position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyEntry {
    pub token: Address,
    #[serde(with = "crate::vm::value::value_serde")]
    pub token_id: Value,
    pub token_type: TokenType,
}

/// Registration form of the currency list: parallel arrays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currencies {
    pub token: Vec<Address>,
    #[serde(with = "values_serde")]
    pub token_id: Vec<Value>,
    pub token_type: Vec<TokenType>,
}

impl Currencies {
    /// Whether all three arrays have the same length
    pub fn is_consistent(&self) -> bool {
        self.token.len() == self.token_id.len() && self.token.len() == self.token_type.len()
    }

    /// Zip the parallel arrays into entries, in list order
    pub fn entries(&self) -> Vec<CurrencyEntry> {
        self.token
            .iter()
            .zip(&self.token_id)
            .zip(&self.token_type)
            .map(|((token, token_id), token_type)| CurrencyEntry {
                token: *token,
                token_id: *token_id,
                token_type: *token_type,
            })
            .collect()
    }

    pub fn push(&mut self, token: Address, token_id: Value, token_type: TokenType) {
        self.token.push(token);
        self.token_id.push(token_id);
        self.token_type.push(token_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDT: &str = "0xdac17f958d2ee523a2206206994597c13d831ec7";

    #[test]
    fn test_address_parse_and_display() {
        let addr: Address = USDT.parse().unwrap();
        assert_eq!(addr.to_string(), USDT);

        let bare: Address = USDT.trim_start_matches("0x").parse().unwrap();
        assert_eq!(bare, addr);
    }

    #[test]
    fn test_address_errors() {
        assert!(matches!(
            "0x1234".parse::<Address>(),
            Err(AddressError::InvalidLength(2))
        ));
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_address_to_value() {
        let addr: Address = "0x0000000000000000000000000000000000000102".parse().unwrap();
        assert_eq!(addr.to_value(), Value::from(0x0102));
    }

    #[test]
    fn test_token_type_serde() {
        assert_eq!(
            serde_json::to_string(&TokenType::Erc1155).unwrap(),
            "\"erc1155\""
        );
    }

    #[test]
    fn test_currencies_entries() {
        let mut currencies = Currencies::default();
        currencies.push(USDT.parse().unwrap(), Value::zero(), TokenType::Erc20);
        currencies.push(Address::zero(), Value::from(10), TokenType::Erc1155);

        assert!(currencies.is_consistent());
        let entries = currencies.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].token_id, Value::from(10));
        assert_eq!(entries[1].token_type, TokenType::Erc1155);
    }

    #[test]
    fn test_currencies_inconsistent() {
        let currencies = Currencies {
            token: vec![Address::zero()],
            token_id: vec![],
            token_type: vec![TokenType::Erc20],
        };
        assert!(!currencies.is_consistent());
    }

    #[test]
    fn test_currencies_from_json() {
        let json = format!(
            r#"{{"token": ["{}"], "token_id": [0], "token_type": ["erc20"]}}"#,
            USDT
        );
        let currencies: Currencies = serde_json::from_str(&json).unwrap();
        assert_eq!(currencies.entries()[0].token.to_string(), USDT);
    }
}
