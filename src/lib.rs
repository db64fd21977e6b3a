pub mod analyzer;
pub mod api_server_axum;
pub mod chain;
pub mod config;
pub mod journal;
pub mod logging;
pub mod models;
pub mod notify;
pub mod nse_client;
pub mod scoring;
pub mod strategy;
pub mod zones;

// Re-exports (public API)
pub use analyzer::{AnalysisOutcome, AnalysisReport, analyze, analyze_response};
pub use chain::{ChainOutcome, atm_strike, build_chain, days_to_expiry, expiry_dates};
pub use models::{Chain, OptionChainResponse, OptionSide, Quote, RawLeg, RawStrikeRecord};
pub use nse_client::{CacheEntry, NseClient};
pub use scoring::{
    BiasLabel, ScoreParams, ScoredRow, aggregate_bias, classify_decay_bias, score_chain,
};
pub use strategy::{ExitLevels, Strategy, chain_recommendation, exit_levels, recommend};
pub use zones::{PriceZones, zones_from_history};
