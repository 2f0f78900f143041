//! Asset pricing configs
//!
//! An [`Asset`] is the validated, immutable form of an [`AssetConfig`]:
//! its pricing sources, constants pool and currency list never change
//! after registration.

use crate::asset::currency::{Address, Currencies, CurrencyEntry};
use crate::vm::interpreter::VmError;
use crate::vm::state::StateConfig;
use crate::vm::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Asset identifier, allocated from 1 upward
pub type AssetId = u64;

/// Asset pricing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(AssetId),
    #[error("invalid payment token")]
    InvalidPaymentToken { index: usize, count: usize },
    #[error("Malformed pricing script: expected {expected} stack values, got {actual}")]
    MalformedPricingScript { expected: usize, actual: usize },
    #[error(
        "Invalid script bounds: source {source_index} step {position} reads constant {index} (pool size {len})"
    )]
    InvalidScriptBounds {
        source_index: usize,
        position: usize,
        index: u8,
        len: usize,
    },
    #[error("Empty currency list")]
    EmptyCurrencyList,
    #[error("Currency list mismatch: {tokens} tokens, {ids} ids, {types} types")]
    CurrencyLengthMismatch {
        tokens: usize,
        ids: usize,
        types: usize,
    },
    #[error("Asset has no pricing source")]
    MissingSource,
    #[error("Insufficient stock: requested {requested}, max {max}")]
    InsufficientStock { requested: Value, max: Value },
    #[error("Invalid units: must be greater than 0")]
    InvalidUnits,
    #[error("Payment overflow: {price} x {units}")]
    PaymentOverflow { price: Value, units: Value },
    #[error("VM error: {0}")]
    Vm(#[from] VmError),
}

/// Registration payload for a new asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    #[serde(default)]
    pub loot_box_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub recipient: Address,
    pub currencies: Currencies,
    #[serde(default)]
    pub token_uri: String,
    pub vm_state_config: StateConfig,
}

/// Opaque metadata passed through unmodified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub loot_box_id: u64,
    pub name: String,
    pub description: String,
    pub recipient: Address,
    pub token_uri: String,
}

/// A registered asset (immutable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub metadata: AssetMetadata,
    pub currencies: Vec<CurrencyEntry>,
    pub state: StateConfig,
    /// SHA-256 over sources and constants, hex encoded
    pub script_hash: String,
    pub registered_at: DateTime<Utc>,
}

impl Asset {
    /// Validate a config and build the asset it describes
    pub fn from_config(id: AssetId, config: AssetConfig) -> Result<Self, PricingError> {
        let AssetConfig {
            loot_box_id,
            name,
            description,
            recipient,
            currencies,
            token_uri,
            vm_state_config,
        } = config;

        validate_currencies(&currencies)?;
        validate_state(&vm_state_config)?;

        let script_hash = script_hash(&vm_state_config);

        Ok(Self {
            id,
            metadata: AssetMetadata {
                loot_box_id,
                name,
                description,
                recipient,
                token_uri,
            },
            currencies: currencies.entries(),
            state: vm_state_config,
            script_hash,
            registered_at: Utc::now(),
        })
    }

    pub fn currency_count(&self) -> usize {
        self.currencies.len()
    }

    /// Check a currency index against the currency list
    pub fn check_currency_index(&self, index: usize) -> Result<&CurrencyEntry, PricingError> {
        self.currencies
            .get(index)
            .ok_or(PricingError::InvalidPaymentToken {
                index,
                count: self.currencies.len(),
            })
    }
}

fn validate_currencies(currencies: &Currencies) -> Result<(), PricingError> {
    if !currencies.is_consistent() {
        return Err(PricingError::CurrencyLengthMismatch {
            tokens: currencies.token.len(),
            ids: currencies.token_id.len(),
            types: currencies.token_type.len(),
        });
    }

    if currencies.token.is_empty() {
        return Err(PricingError::EmptyCurrencyList);
    }

    Ok(())
}

fn validate_state(state: &StateConfig) -> Result<(), PricingError> {
    if state.sources.is_empty() {
        return Err(PricingError::MissingSource);
    }

    let len = state.constants.len();
    for (source_index, source) in state.sources.iter().enumerate() {
        if let Some((position, index)) = source.constant_out_of_bounds(len) {
            return Err(PricingError::InvalidScriptBounds {
                source_index,
                position,
                index,
                len,
            });
        }
    }

    Ok(())
}

/// Content hash of a state config
pub fn script_hash(state: &StateConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update((state.sources.len() as u64).to_be_bytes());
    for source in &state.sources {
        let bytes = source.to_bytes();
        hasher.update((bytes.len() as u64).to_be_bytes());
        hasher.update(&bytes);
    }
    for constant in &state.constants {
        hasher.update(constant.to_string().as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::currency::TokenType;
    use crate::vm::opcodes::OpCode;
    use crate::vm::script::{concat, op, Script};

    fn config(constants: &[u64], ops: &[[u8; 2]], currencies: usize) -> AssetConfig {
        let mut list = Currencies::default();
        for i in 0..currencies {
            list.push(Address::zero(), Value::from(i as u64), TokenType::Erc20);
        }

        AssetConfig {
            loot_box_id: 0,
            name: "asset 1".to_string(),
            description: "Asset Description".to_string(),
            recipient: Address::zero(),
            currencies: list,
            token_uri: "TOKEN_URI".to_string(),
            vm_state_config: StateConfig::new(
                vec![Script::from_bytes(&concat(ops)).unwrap()],
                constants.iter().map(|c| Value::from(*c)).collect(),
            ),
        }
    }

    #[test]
    fn test_from_config() {
        let cfg = config(
            &[10, 20],
            &[op(OpCode::Constant, 0), op(OpCode::Constant, 1)],
            1,
        );
        let asset = Asset::from_config(1, cfg).unwrap();

        assert_eq!(asset.id, 1);
        assert_eq!(asset.metadata.name, "asset 1");
        assert_eq!(asset.metadata.token_uri, "TOKEN_URI");
        assert_eq!(asset.currency_count(), 1);
        assert_eq!(asset.script_hash.len(), 64);
    }

    #[test]
    fn test_constant_out_of_bounds_rejected() {
        let cfg = config(&[10], &[op(OpCode::Constant, 0), op(OpCode::Constant, 1)], 1);
        let err = Asset::from_config(1, cfg).unwrap_err();

        assert_eq!(
            err,
            PricingError::InvalidScriptBounds {
                source_index: 0,
                position: 1,
                index: 1,
                len: 1,
            }
        );
    }

    #[test]
    fn test_empty_currency_list_rejected() {
        let cfg = config(&[10, 20], &[op(OpCode::Constant, 0)], 0);
        assert_eq!(
            Asset::from_config(1, cfg).unwrap_err(),
            PricingError::EmptyCurrencyList
        );
    }

    #[test]
    fn test_mismatched_currency_arrays_rejected() {
        let mut cfg = config(&[10, 20], &[op(OpCode::Constant, 0)], 2);
        cfg.currencies.token_type.pop();

        assert!(matches!(
            Asset::from_config(1, cfg),
            Err(PricingError::CurrencyLengthMismatch { types: 1, .. })
        ));
    }

    #[test]
    fn test_missing_source_rejected() {
        let mut cfg = config(&[10, 20], &[], 1);
        cfg.vm_state_config.sources.clear();

        assert_eq!(
            Asset::from_config(1, cfg).unwrap_err(),
            PricingError::MissingSource
        );
    }

    #[test]
    fn test_check_currency_index() {
        let cfg = config(&[10, 20], &[op(OpCode::Constant, 0)], 1);
        let asset = Asset::from_config(1, cfg).unwrap();

        assert!(asset.check_currency_index(0).is_ok());
        let err = asset.check_currency_index(2).unwrap_err();
        assert_eq!(err.to_string(), "invalid payment token");
    }

    #[test]
    fn test_script_hash_depends_on_constants() {
        let ops = [op(OpCode::Constant, 0)];
        let a = config(&[1], &ops, 1).vm_state_config;
        let b = config(&[2], &ops, 1).vm_state_config;

        assert_eq!(script_hash(&a), script_hash(&a.clone()));
        assert_ne!(script_hash(&a), script_hash(&b));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "name": "asset 1",
            "recipient": "0x0000000000000000000000000000000000000001",
            "currencies": {
                "token": ["0x0000000000000000000000000000000000000002"],
                "token_id": [10],
                "token_type": ["erc1155"]
            },
            "vm_state_config": {
                "sources": ["0x00000001"],
                "constants": [10, "20"]
            }
        }"#;
        let cfg: AssetConfig = serde_json::from_str(json).unwrap();
        let asset = Asset::from_config(7, cfg).unwrap();

        assert_eq!(asset.currencies[0].token_type, TokenType::Erc1155);
        assert_eq!(asset.state.constants[1], Value::from(20));
        assert_eq!(asset.metadata.description, "");
    }
}
