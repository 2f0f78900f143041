//! REST API module
//!
//! Provides HTTP REST API for registering assets and querying prices.
//!
//! # Endpoints
//!
//! ## Assets
//! - `GET /api/assets` - List assets
//! - `POST /api/assets` - Register asset (compiled `vm_state_config` or assembly `source`)
//! - `GET /api/assets/{id}` - Get asset info
//!
//! ## Pricing
//! - `GET /api/assets/{id}/price?currency_index=&buyer=&units=` - Unit price in one currency
//! - `GET /api/assets/{id}/cost?buyer=&units=` - Cap and prices for every currency
//! - `GET /api/assets/{id}/quote?currency_index=&buyer=&units=` - Payment required for a purchase
//!
//! `buyer` defaults to the zero address and `units` to 1. Unknown assets
//! return 404, every other pricing failure returns 400.

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_router;
