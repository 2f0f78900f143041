//! REST API handlers for asset pricing

use crate::asset::{
    Address, Asset, AssetConfig, AssetCost, AssetId, AssetRegistry, Currencies, CurrencyEntry,
    PricingError, PurchaseQuote,
};
use crate::vm::{parse_value, Compiler, StateConfig, Value};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state for API handlers
#[derive(Clone, Default)]
pub struct ApiState {
    pub registry: Arc<AssetRegistry>,
}

impl ApiState {
    pub fn new(registry: Arc<AssetRegistry>) -> Self {
        Self { registry }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Serialize)]
pub struct AssetInfo {
    pub id: AssetId,
    pub loot_box_id: u64,
    pub name: String,
    pub description: String,
    pub recipient: String,
    pub token_uri: String,
    pub currencies: Vec<CurrencyEntry>,
    pub source_count: usize,
    pub constant_count: usize,
    pub script_hash: String,
    pub registered_at: String,
}

impl From<&Asset> for AssetInfo {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id,
            loot_box_id: asset.metadata.loot_box_id,
            name: asset.metadata.name.clone(),
            description: asset.metadata.description.clone(),
            recipient: asset.metadata.recipient.to_string(),
            token_uri: asset.metadata.token_uri.clone(),
            currencies: asset.currencies.clone(),
            source_count: asset.state.sources.len(),
            constant_count: asset.state.constants.len(),
            script_hash: asset.script_hash.clone(),
            registered_at: asset.registered_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct CreateAssetResponse {
    pub id: AssetId,
    pub script_hash: String,
}

#[derive(Serialize)]
pub struct PriceResponse {
    pub asset_id: AssetId,
    pub currency_index: usize,
    pub currency: CurrencyEntry,
    pub price: String,
}

#[derive(Serialize)]
pub struct CostResponse {
    pub asset_id: AssetId,
    #[serde(flatten)]
    pub cost: AssetCost,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub asset_id: AssetId,
    #[serde(flatten)]
    pub quote: PurchaseQuote,
}

// ============================================================================
// Request Types
// ============================================================================

/// Asset registration payload
///
/// The pricing script is given either as a compiled `vm_state_config` or
/// as assembly `source`.
#[derive(Deserialize)]
pub struct CreateAssetRequest {
    #[serde(default)]
    pub loot_box_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub recipient: Address,
    pub currencies: Currencies,
    #[serde(default)]
    pub token_uri: String,
    pub vm_state_config: Option<StateConfig>,
    pub source: Option<String>,
}

impl CreateAssetRequest {
    fn into_config(self) -> Result<AssetConfig, String> {
        let vm_state_config = match (self.vm_state_config, self.source) {
            (Some(state), None) => state,
            (None, Some(source)) => Compiler::new()
                .compile(&source)
                .map_err(|e| format!("Compilation failed: {}", e))?,
            (Some(_), Some(_)) => {
                return Err("Provide either vm_state_config or source, not both".to_string())
            }
            (None, None) => return Err("Missing vm_state_config or source".to_string()),
        };

        Ok(AssetConfig {
            loot_box_id: self.loot_box_id,
            name: self.name,
            description: self.description,
            recipient: self.recipient,
            currencies: self.currencies,
            token_uri: self.token_uri,
            vm_state_config,
        })
    }
}

/// Evaluation context query params
#[derive(Deserialize, Default)]
pub struct ContextQuery {
    pub buyer: Option<String>,
    pub units: Option<String>,
}

/// Single-currency query params
#[derive(Deserialize)]
pub struct CurrencyQuery {
    pub currency_index: usize,
    pub buyer: Option<String>,
    pub units: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

fn bad_request(error: String) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error }))
}

fn pricing_error(e: PricingError) -> (StatusCode, Json<ApiError>) {
    let status = match e {
        PricingError::UnknownAsset(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ApiError {
            error: e.to_string(),
        }),
    )
}

/// Parse buyer and units, defaulting to the zero address and one unit
fn parse_context(
    buyer: Option<&str>,
    units: Option<&str>,
) -> Result<(Address, Value), (StatusCode, Json<ApiError>)> {
    let buyer = match buyer {
        Some(s) => s
            .parse::<Address>()
            .map_err(|e| bad_request(format!("Invalid buyer: {}", e)))?,
        None => Address::zero(),
    };

    let units = match units {
        Some(s) => parse_value(s).ok_or_else(|| bad_request(format!("Invalid units: {}", s)))?,
        None => Value::one(),
    };

    Ok((buyer, units))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/assets - List all assets
pub async fn list_assets(State(state): State<ApiState>) -> Json<Vec<AssetInfo>> {
    let assets: Vec<AssetInfo> = state
        .registry
        .list()
        .iter()
        .map(|a| AssetInfo::from(a.as_ref()))
        .collect();

    Json(assets)
}

/// POST /api/assets - Register a new asset
pub async fn create_asset(
    State(state): State<ApiState>,
    Json(req): Json<CreateAssetRequest>,
) -> Result<(StatusCode, Json<CreateAssetResponse>), (StatusCode, Json<ApiError>)> {
    let config = req.into_config().map_err(bad_request)?;
    let id = state.registry.create_asset(config).map_err(pricing_error)?;

    let script_hash = state
        .registry
        .get(id)
        .map(|a| a.script_hash.clone())
        .unwrap_or_default();

    Ok((StatusCode::CREATED, Json(CreateAssetResponse { id, script_hash })))
}

/// GET /api/assets/{id} - Get asset info
pub async fn get_asset(
    State(state): State<ApiState>,
    Path(id): Path<AssetId>,
) -> ApiResult<AssetInfo> {
    match state.registry.get(id) {
        Some(asset) => Ok(Json(AssetInfo::from(asset.as_ref()))),
        None => Err(pricing_error(PricingError::UnknownAsset(id))),
    }
}

/// GET /api/assets/{id}/price - Unit price in one currency
pub async fn get_currency_price(
    State(state): State<ApiState>,
    Path(id): Path<AssetId>,
    Query(query): Query<CurrencyQuery>,
) -> ApiResult<PriceResponse> {
    let (buyer, units) = parse_context(query.buyer.as_deref(), query.units.as_deref())?;

    let price = state
        .registry
        .get_currency_price(id, query.currency_index, buyer, units)
        .map_err(pricing_error)?;

    // The index was validated by the price lookup
    let currency = state
        .registry
        .get(id)
        .and_then(|a| a.currencies.get(query.currency_index).cloned())
        .ok_or_else(|| pricing_error(PricingError::UnknownAsset(id)))?;

    Ok(Json(PriceResponse {
        asset_id: id,
        currency_index: query.currency_index,
        currency,
        price: price.to_string(),
    }))
}

/// GET /api/assets/{id}/cost - Prices for every currency
pub async fn get_asset_cost(
    State(state): State<ApiState>,
    Path(id): Path<AssetId>,
    Query(query): Query<ContextQuery>,
) -> ApiResult<CostResponse> {
    let (buyer, units) = parse_context(query.buyer.as_deref(), query.units.as_deref())?;

    let cost = state
        .registry
        .get_asset_cost(id, buyer, units)
        .map_err(pricing_error)?;

    Ok(Json(CostResponse { asset_id: id, cost }))
}

/// GET /api/assets/{id}/quote - Payment required for a purchase
pub async fn quote_purchase(
    State(state): State<ApiState>,
    Path(id): Path<AssetId>,
    Query(query): Query<CurrencyQuery>,
) -> ApiResult<QuoteResponse> {
    let (buyer, units) = parse_context(query.buyer.as_deref(), query.units.as_deref())?;

    let quote = state
        .registry
        .quote_purchase(id, query.currency_index, buyer, units)
        .map_err(pricing_error)?;

    Ok(Json(QuoteResponse { asset_id: id, quote }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(source: &str, tokens: usize) -> CreateAssetRequest {
        let token: Vec<String> = (0..tokens)
            .map(|i| format!("0x{:040x}", i + 1))
            .collect();
        serde_json::from_value(json!({
            "name": "asset 1",
            "recipient": "0x0000000000000000000000000000000000000002",
            "currencies": {
                "token": token,
                "token_id": vec![0; tokens],
                "token_type": vec!["erc20"; tokens],
            },
            "source": source,
        }))
        .unwrap()
    }

    async fn seeded() -> (ApiState, AssetId) {
        let state = ApiState::default();
        let (status, Json(created)) = create_asset(
            State(state.clone()),
            Json(request(
                ".constant 10\n.constant 20\n.constant 5\n.constant 7\n\
                 CONSTANT 0\nCONSTANT 1\nCONSTANT 2\nCONSTANT 3",
                2,
            )),
        )
        .await
        .unwrap_or_else(|(_, Json(e))| panic!("{}", e.error));

        assert_eq!(status, StatusCode::CREATED);
        (state, created.id)
    }

    fn currency_query(index: usize, units: Option<&str>) -> CurrencyQuery {
        CurrencyQuery {
            currency_index: index,
            buyer: None,
            units: units.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "OK");
    }

    #[tokio::test]
    async fn test_create_and_get_asset() {
        let (state, id) = seeded().await;
        assert_eq!(id, 1);

        let Json(info) = get_asset(State(state.clone()), Path(id)).await.ok().unwrap();
        assert_eq!(info.name, "asset 1");
        assert_eq!(info.currencies.len(), 2);
        assert_eq!(info.constant_count, 4);

        let Json(all) = list_assets(State(state)).await;
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_create_asset_rejects_bad_payloads() {
        let state = ApiState::default();

        let err = create_asset(State(state.clone()), Json(request("FOO 1", 1)))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1 .0.error.starts_with("Compilation failed"));

        let err = create_asset(State(state.clone()), Json(request("CONSTANT 0", 0)))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        assert_eq!(state.registry.count(), 0);
    }

    #[tokio::test]
    async fn test_price_and_cost() {
        let (state, id) = seeded().await;

        let query = Query(currency_query(1, None));
        let Json(price) = get_currency_price(State(state.clone()), Path(id), query)
            .await
            .ok()
            .unwrap();
        assert_eq!(price.price, "7");
        assert_eq!(price.currency.token.to_string(), format!("0x{:040x}", 2));

        let Json(cost) = get_asset_cost(State(state), Path(id), Query(ContextQuery::default()))
            .await
            .ok()
            .unwrap();
        assert_eq!(cost.cost.max_units, Value::from(5));
        assert_eq!(cost.cost.prices, vec![Value::from(20), Value::from(7)]);
    }

    #[tokio::test]
    async fn test_error_status_codes() {
        let (state, id) = seeded().await;

        let query = Query(currency_query(2, None));
        let err = get_currency_price(State(state.clone()), Path(id), query)
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1 .0.error, "invalid payment token");

        let err = get_asset(State(state.clone()), Path(99)).await.err().unwrap();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        let query = ContextQuery {
            buyer: Some("0x12".to_string()),
            units: None,
        };
        let err = get_asset_cost(State(state), Path(id), Query(query))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quote() {
        let (state, id) = seeded().await;

        let query = Query(currency_query(0, Some("3")));
        let Json(quote) = quote_purchase(State(state.clone()), Path(id), query)
            .await
            .ok()
            .unwrap();
        assert_eq!(quote.quote.total, Value::from(60));

        let query = Query(currency_query(1, Some("6")));
        let err = quote_purchase(State(state), Path(id), query)
            .await
            .err()
            .unwrap();
        assert!(err.1 .0.error.starts_with("Insufficient stock"));
    }
}
