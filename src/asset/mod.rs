//! Priced assets
//!
//! Each asset carries a currency list and a pricing script. Evaluating the
//! script yields one `(maxUnits, price)` pair per currency.

pub mod asset;
pub mod currency;
pub mod pricing;
pub mod registry;

pub use asset::{script_hash, Asset, AssetConfig, AssetId, AssetMetadata, PricingError};
pub use currency::{Address, AddressError, Currencies, CurrencyEntry, TokenType};
pub use pricing::{pairs_from_stack, AssetCost, PricePair, PurchaseQuote, PRICING_SOURCE};
pub use registry::{AssetRegistry, FIRST_ASSET_ID};
