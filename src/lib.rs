//! Asset Pricing: scriptable multi-currency pricing for digital assets
//!
//! This crate provides:
//! - A deterministic 256-bit stack VM with a fixed, pure opcode set
//! - An assembler and disassembler for pricing scripts
//! - Assets accepting ERC20 and ERC1155 payment currencies
//! - A concurrent asset registry with per-currency and bulk price queries
//! - A REST API and CLI on top of the registry
//!
//! # Example
//!
//! ```rust
//! use asset_pricing::asset::{Address, AssetConfig, AssetRegistry, Currencies, TokenType};
//! use asset_pricing::vm::{Compiler, Value};
//!
//! let registry = AssetRegistry::new();
//!
//! let mut currencies = Currencies::default();
//! currencies.push(Address::zero(), Value::zero(), TokenType::Erc20);
//!
//! // One currency: push (maxUnits, price)
//! let vm_state_config = Compiler::new()
//!     .compile(".constant 10\n.constant 1000000\nCONSTANT 0\nCONSTANT 1")
//!     .unwrap();
//!
//! let id = registry
//!     .create_asset(AssetConfig {
//!         loot_box_id: 0,
//!         name: "asset 1".to_string(),
//!         description: String::new(),
//!         recipient: Address::zero(),
//!         currencies,
//!         token_uri: String::new(),
//!         vm_state_config,
//!     })
//!     .unwrap();
//!
//! let price = registry
//!     .get_currency_price(id, 0, Address::zero(), Value::one())
//!     .unwrap();
//! assert_eq!(price, Value::from(1_000_000));
//! ```

pub mod api;
pub mod asset;
pub mod cli;
pub mod vm;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use asset::{
    Address, Asset, AssetConfig, AssetCost, AssetId, AssetRegistry, Currencies, PricingError,
    PurchaseQuote, TokenType,
};
pub use vm::{Compiler, EvalContext, Interpreter, OpCode, Script, StateConfig, Value, VmError};
