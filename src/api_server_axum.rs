use crate::analyzer::{self, AnalysisOutcome};
use crate::chain;
use crate::config;
use crate::models::OptionChainResponse;
use crate::nse_client::{CacheEntry, NseClient};
use crate::scoring::ScoreParams;
use anyhow::Result;
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    pub symbol: String,
    /// Omitted expiry selects the nearest available one.
    pub expiry: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T, start: Instant) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: Some(start.elapsed().as_millis() as u64),
        }
    }

    fn err(error: impl ToString, start: Instant) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            processing_time_ms: Some(start.elapsed().as_millis() as u64),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpiriesResponse {
    pub symbol: String,
    pub expiry_dates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SpotResponse {
    pub symbol: String,
    pub spot: f64,
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    client: Arc<NseClient>,
    cache: Arc<RwLock<ProviderCache>>,
}

/// Explicit TTL entries per symbol: check, refetch on expiry.
#[derive(Default)]
struct ProviderCache {
    chains: HashMap<String, CacheEntry<OptionChainResponse>>,
    histories: HashMap<String, CacheEntry<Vec<f64>>>,
}

impl AppState {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Arc::new(NseClient::new()?),
            cache: Arc::new(RwLock::new(ProviderCache::default())),
        })
    }

    async fn chain_response(&self, symbol: &str) -> Result<OptionChainResponse> {
        {
            let cache = self.cache.read().await;
            if let Some(fresh) = cache.chains.get(symbol).and_then(|e| e.get()) {
                return Ok(fresh.clone());
            }
        }

        let response = self.client.fetch_option_chain(symbol).await?;
        {
            let mut cache = self.cache.write().await;
            cache.chains.insert(
                symbol.to_string(),
                CacheEntry::new(response.clone(), config::CHAIN_CACHE_TTL),
            );
        }
        Ok(response)
    }

    async fn close_history(&self, symbol: &str, lookback: usize) -> Vec<f64> {
        {
            let cache = self.cache.read().await;
            if let Some(fresh) = cache.histories.get(symbol).and_then(|e| e.get()) {
                return fresh.clone();
            }
        }

        // History is optional context; a failed fetch degrades to no zones
        match self.client.fetch_price_history(symbol, lookback).await {
            Ok(closes) => {
                let mut cache = self.cache.write().await;
                cache.histories.insert(
                    symbol.to_string(),
                    CacheEntry::new(closes.clone(), config::HISTORY_CACHE_TTL),
                );
                closes
            }
            Err(_) => Vec::new(),
        }
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/expiries?symbol=NIFTY - sorted expiry dates for a symbol
async fn get_expiries(
    Query(query): Query<SymbolQuery>,
    State(app_state): State<AppState>,
) -> Json<ApiResponse<ExpiriesResponse>> {
    let start = Instant::now();

    match app_state.chain_response(&query.symbol).await {
        Ok(response) => Json(ApiResponse::ok(
            ExpiriesResponse {
                symbol: query.symbol,
                expiry_dates: chain::expiry_dates(&response.records.data),
            },
            start,
        )),
        Err(e) => Json(ApiResponse::err(e, start)),
    }
}

/// GET /api/analysis?symbol=NIFTY&expiry=30-Dec-2025 - scored chain
async fn get_analysis(
    Query(query): Query<AnalysisQuery>,
    State(app_state): State<AppState>,
) -> Json<ApiResponse<AnalysisOutcome>> {
    let start = Instant::now();
    let symbol = &query.symbol;
    let profile = config::profile_for(symbol);
    let params = ScoreParams::from(&profile);

    let response = match app_state.chain_response(symbol).await {
        Ok(response) => response,
        Err(chain_err) => {
            // Degrade to the last-close source before reporting failure
            return match app_state.client.fetch_spot_fallback(symbol).await {
                Ok(spot) => Json(ApiResponse::ok(
                    AnalysisOutcome::SpotOnly {
                        symbol: symbol.to_string(),
                        spot,
                    },
                    start,
                )),
                Err(_) => Json(ApiResponse::err(chain_err, start)),
            };
        }
    };

    let expiry = match query.expiry {
        Some(expiry) if !expiry.is_empty() => expiry,
        _ => match chain::expiry_dates(&response.records.data).into_iter().next() {
            Some(nearest) => nearest,
            None => {
                return Json(ApiResponse::ok(
                    AnalysisOutcome::NoData {
                        symbol: symbol.to_string(),
                    },
                    start,
                ));
            }
        },
    };

    let history = app_state.close_history(symbol, profile.zone_lookback).await;
    let outcome = analyzer::analyze_response(&response, symbol, &expiry, &history, &params);

    Json(ApiResponse::ok(outcome, start))
}

/// GET /api/spot?symbol=NIFTY - spot price, falling back to last close
async fn get_spot(
    Query(query): Query<SymbolQuery>,
    State(app_state): State<AppState>,
) -> Json<ApiResponse<SpotResponse>> {
    let start = Instant::now();
    let symbol = &query.symbol;

    let spot = match app_state.chain_response(symbol).await {
        Ok(response) => Ok(response.records.underlying_value),
        Err(_) => app_state.client.fetch_spot_fallback(symbol).await,
    };

    match spot {
        Ok(spot) => Json(ApiResponse::ok(
            SpotResponse {
                symbol: symbol.to_string(),
                spot,
            },
            start,
        )),
        Err(e) => Json(ApiResponse::err(e, start)),
    }
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub async fn start_server(port: u16) -> Result<()> {
    let app_state = AppState::new()?;

    let app = Router::new()
        .route("/api/expiries", get(get_expiries))
        .route("/api/analysis", get(get_analysis))
        .route("/api/spot", get(get_spot))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("Decay-bias API server running on http://{}", addr);
    println!("Available endpoints:");
    println!("   GET  /api/expiries?symbol=NIFTY");
    println!("   GET  /api/analysis?symbol=NIFTY&expiry=30-Dec-2025");
    println!("   GET  /api/spot?symbol=NIFTY");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
