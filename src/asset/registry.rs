//! Asset registry
//!
//! Publishes validated assets and serves pricing queries against them.
//! Assets are stored as `Arc<Asset>` and never mutated, so any number of
//! evaluations may run concurrently while new assets are registered.

use crate::asset::asset::{Asset, AssetConfig, AssetId, PricingError};
use crate::asset::currency::Address;
use crate::asset::pricing::{AssetCost, PurchaseQuote};
use crate::vm::value::Value;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// First id handed out by a fresh registry
pub const FIRST_ASSET_ID: AssetId = 1;

/// Thread-safe registry of all assets
#[derive(Debug)]
pub struct AssetRegistry {
    assets: DashMap<AssetId, Arc<Asset>>,
    next_id: AtomicU64,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            assets: DashMap::new(),
            next_id: AtomicU64::new(FIRST_ASSET_ID),
        }
    }

    /// Validate and publish a new asset
    ///
    /// The asset becomes visible only once fully built; a failed
    /// validation leaves the registry unchanged.
    pub fn create_asset(&self, config: AssetConfig) -> Result<AssetId, PricingError> {
        // Validate under a placeholder id so rejected configs don't burn ids
        let asset = Asset::from_config(0, config)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let asset = Asset { id, ..asset };

        log::info!(
            "Asset registered: {} ({}) with {} currencies, script {}",
            id,
            asset.metadata.name,
            asset.currency_count(),
            &asset.script_hash[..16]
        );

        self.assets.insert(id, Arc::new(asset));
        Ok(id)
    }

    /// Get an asset by id
    pub fn get(&self, id: AssetId) -> Option<Arc<Asset>> {
        self.assets.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    fn require(&self, id: AssetId) -> Result<Arc<Asset>, PricingError> {
        self.get(id).ok_or(PricingError::UnknownAsset(id))
    }

    /// List all assets, ordered by id
    pub fn list(&self) -> Vec<Arc<Asset>> {
        let mut assets: Vec<Arc<Asset>> = self
            .assets
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        assets.sort_by_key(|a| a.id);
        assets
    }

    /// Get asset count
    pub fn count(&self) -> usize {
        self.assets.len()
    }

    /// Check if an asset exists
    pub fn exists(&self, id: AssetId) -> bool {
        self.assets.contains_key(&id)
    }

    /// Unit price of `asset_id` in the currency at `currency_index`
    pub fn get_currency_price(
        &self,
        asset_id: AssetId,
        currency_index: usize,
        buyer: Address,
        units: Value,
    ) -> Result<Value, PricingError> {
        self.require(asset_id)?
            .currency_price(currency_index, buyer, units)
    }

    /// Purchase cap and prices for every currency of `asset_id`
    pub fn get_asset_cost(
        &self,
        asset_id: AssetId,
        buyer: Address,
        units: Value,
    ) -> Result<AssetCost, PricingError> {
        self.require(asset_id)?.cost(buyer, units)
    }

    /// Payment required for `units` of `asset_id`
    pub fn quote_purchase(
        &self,
        asset_id: AssetId,
        currency_index: usize,
        buyer: Address,
        units: Value,
    ) -> Result<PurchaseQuote, PricingError> {
        self.require(asset_id)?.quote(currency_index, buyer, units)
    }
}
