//! CLI commands for the pricing engine
//!
//! Implements all command handlers for the CLI interface.

use crate::asset::{
    Address, AssetConfig, AssetCost, AssetId, AssetRegistry, PurchaseQuote,
};
use crate::vm::{disassemble, parse_value, Compiler, StateConfig, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Default file holding asset definitions
pub const DEFAULT_ASSETS_FILE: &str = "assets.json";

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// JSON array of asset configs registered at startup
    pub assets_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            assets_file: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Read a JSON array of asset configs
pub fn load_asset_configs(path: &Path) -> CliResult<Vec<AssetConfig>> {
    let data = fs::read_to_string(path)?;
    let configs: Vec<AssetConfig> = serde_json::from_str(&data)?;
    Ok(configs)
}

/// Build a registry from an asset file, in file order
///
/// Ids follow file order starting at 1. Any invalid entry aborts loading.
pub fn load_registry(path: &Path) -> CliResult<Arc<AssetRegistry>> {
    let registry = AssetRegistry::new();

    for (i, config) in load_asset_configs(path)?.into_iter().enumerate() {
        let name = config.name.clone();
        registry
            .create_asset(config)
            .map_err(|e| format!("Asset #{} ({}) rejected: {}", i, name, e))?;
    }

    log::info!("Loaded {} assets from {:?}", registry.count(), path);
    Ok(Arc::new(registry))
}

/// Parse optional buyer and units arguments
pub fn parse_context(buyer: Option<&str>, units: &str) -> CliResult<(Address, Value)> {
    let buyer = match buyer {
        Some(s) => s.parse::<Address>()?,
        None => Address::zero(),
    };
    let units = parse_value(units).ok_or_else(|| format!("Invalid units: {}", units))?;
    Ok((buyer, units))
}

/// Compile an assembly file into a state config
pub fn cmd_compile(input: &Path, output: Option<&Path>) -> CliResult<StateConfig> {
    println!("🔧 Compiling {:?}...", input);

    let source = fs::read_to_string(input)?;
    let config = Compiler::new().compile(&source)?;
    let json = serde_json::to_string_pretty(&config)?;

    println!(
        "   Compiled {} source(s), {} constant(s)",
        config.sources.len(),
        config.constants.len()
    );

    match output {
        Some(path) => {
            fs::write(path, &json)?;
            println!("✅ State config written to {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(config)
}

/// Disassemble a compiled state config
pub fn cmd_disasm(input: &Path) -> CliResult<String> {
    let data = fs::read_to_string(input)?;
    let config: StateConfig = serde_json::from_str(&data)?;

    let mut listing = String::new();
    for (i, constant) in config.constants.iter().enumerate() {
        listing.push_str(&format!(".constant {} ; #{}\n", constant, i));
    }
    for (i, source) in config.sources.iter().enumerate() {
        // The first source is implicit
        if i == 0 {
            listing.push_str("; source #0\n");
        } else {
            listing.push_str(&format!(".source ; #{}\n", i));
        }
        listing.push_str(&disassemble(source));
    }

    println!("📜 {:?}", input);
    for line in listing.lines() {
        println!("   {}", line);
    }

    Ok(listing)
}

/// Price an asset in one currency
pub fn cmd_price(
    registry: &AssetRegistry,
    asset_id: AssetId,
    currency_index: usize,
    buyer: Address,
    units: Value,
) -> CliResult<Value> {
    let price = registry.get_currency_price(asset_id, currency_index, buyer, units)?;

    let currency = registry
        .get(asset_id)
        .and_then(|a| a.currencies.get(currency_index).cloned());

    println!("💰 Asset {} price", asset_id);
    if let Some(currency) = currency {
        println!(
            "   ├─ Currency #{}: {} {} (id {})",
            currency_index, currency.token_type, currency.token, currency.token_id
        );
    }
    println!("   ├─ Buyer: {}", buyer);
    println!("   └─ Price: {}", price);

    Ok(price)
}

/// Price an asset in every currency
pub fn cmd_cost(
    registry: &AssetRegistry,
    asset_id: AssetId,
    buyer: Address,
    units: Value,
) -> CliResult<AssetCost> {
    let cost = registry.get_asset_cost(asset_id, buyer, units)?;

    println!("💰 Asset {} cost", asset_id);
    println!("   ├─ Max units: {}", cost.max_units);
    for (i, pair) in cost.pairs.iter().enumerate() {
        let branch = if i + 1 == cost.pairs.len() { "└─" } else { "├─" };
        println!(
            "   {} #{}: price {} (max {})",
            branch, i, pair.price, pair.max_units
        );
    }

    Ok(cost)
}

/// Quote the payment for a purchase
pub fn cmd_quote(
    registry: &AssetRegistry,
    asset_id: AssetId,
    currency_index: usize,
    buyer: Address,
    units: Value,
) -> CliResult<PurchaseQuote> {
    let quote = registry.quote_purchase(asset_id, currency_index, buyer, units)?;

    println!("🧾 Quote for asset {}", asset_id);
    println!("   ├─ Currency #{}", quote.currency_index);
    println!("   ├─ Units: {} (max {})", quote.units, quote.max_units);
    println!("   ├─ Unit price: {}", quote.price);
    println!("   └─ Total: {}", quote.total);

    Ok(quote)
}
