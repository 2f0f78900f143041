//! Asset pricing adapter
//!
//! Runs an asset's pricing source and maps the resulting stack onto its
//! currency list. The stack contract is a flat run of interleaved pairs,
//! one per currency in list order:
//!
//! ```text
//! [maxUnits_0, price_0, maxUnits_1, price_1, ..., maxUnits_n-1, price_n-1]
//! ```
//!
//! Any other shape is rejected as `MalformedPricingScript`.

use crate::asset::asset::{Asset, PricingError};
use crate::asset::currency::Address;
use crate::vm::interpreter::Interpreter;
use crate::vm::state::EvalContext;
use crate::vm::value::Value;
use serde::{Deserialize, Serialize};

/// Source evaluated for pricing
pub const PRICING_SOURCE: usize = 0;

/// Purchase cap and unit price for one currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePair {
    #[serde(with = "crate::vm::value::value_serde")]
    pub max_units: Value,
    #[serde(with = "crate::vm::value::value_serde")]
    pub price: Value,
}

/// Prices for every currency of an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCost {
    /// Binding purchase cap: the smallest per-currency cap
    #[serde(with = "crate::vm::value::value_serde")]
    pub max_units: Value,
    /// Unit price per currency, in currency-list order
    #[serde(with = "crate::vm::value::values_serde")]
    pub prices: Vec<Value>,
    /// Full per-currency results
    pub pairs: Vec<PricePair>,
}

/// Payment required for a purchase in one currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseQuote {
    pub currency_index: usize,
    #[serde(with = "crate::vm::value::value_serde")]
    pub units: Value,
    #[serde(with = "crate::vm::value::value_serde")]
    pub max_units: Value,
    #[serde(with = "crate::vm::value::value_serde")]
    pub price: Value,
    #[serde(with = "crate::vm::value::value_serde")]
    pub total: Value,
}

/// Split a final stack into one pair per currency
pub fn pairs_from_stack(
    stack: &[Value],
    currency_count: usize,
) -> Result<Vec<PricePair>, PricingError> {
    let expected = currency_count * 2;
    if stack.len() != expected {
        return Err(PricingError::MalformedPricingScript {
            expected,
            actual: stack.len(),
        });
    }

    Ok(stack
        .chunks_exact(2)
        .map(|pair| PricePair {
            max_units: pair[0],
            price: pair[1],
        })
        .collect())
}

impl Asset {
    /// Run the pricing source and return one pair per currency
    pub fn evaluate(&self, buyer: Address, units: Value) -> Result<Vec<PricePair>, PricingError> {
        let context = EvalContext::new(buyer, units);
        let stack = Interpreter::new().run_source(&self.state, PRICING_SOURCE, &context)?;

        log::debug!(
            "Asset {} evaluated for {} ({} units): {:?}",
            self.id,
            buyer,
            units,
            stack
        );

        pairs_from_stack(&stack, self.currency_count())
    }

    /// Unit price in the currency at `currency_index`
    pub fn currency_price(
        &self,
        currency_index: usize,
        buyer: Address,
        units: Value,
    ) -> Result<Value, PricingError> {
        Ok(self.price_pair(currency_index, buyer, units)?.price)
    }

    /// Cap and price for the currency at `currency_index`
    pub fn price_pair(
        &self,
        currency_index: usize,
        buyer: Address,
        units: Value,
    ) -> Result<PricePair, PricingError> {
        self.check_currency_index(currency_index)?;
        let pairs = self.evaluate(buyer, units)?;
        Ok(pairs[currency_index])
    }

    /// Prices for every currency from a single run
    pub fn cost(&self, buyer: Address, units: Value) -> Result<AssetCost, PricingError> {
        let pairs = self.evaluate(buyer, units)?;

        // Registration guarantees at least one currency
        let max_units = pairs
            .iter()
            .map(|p| p.max_units)
            .min()
            .unwrap_or_default();

        Ok(AssetCost {
            max_units,
            prices: pairs.iter().map(|p| p.price).collect(),
            pairs,
        })
    }

    /// Payment required to buy `units` in the currency at `currency_index`
    pub fn quote(
        &self,
        currency_index: usize,
        buyer: Address,
        units: Value,
    ) -> Result<PurchaseQuote, PricingError> {
        if units.is_zero() {
            return Err(PricingError::InvalidUnits);
        }

        let pair = self.price_pair(currency_index, buyer, units)?;

        if units > pair.max_units {
            return Err(PricingError::InsufficientStock {
                requested: units,
                max: pair.max_units,
            });
        }

        let total = pair
            .price
            .checked_mul(units)
            .ok_or(PricingError::PaymentOverflow {
                price: pair.price,
                units,
            })?;

        Ok(PurchaseQuote {
            currency_index,
            units,
            max_units: pair.max_units,
            price: pair.price,
            total,
        })
    }
}
