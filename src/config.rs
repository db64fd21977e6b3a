use std::time::Duration;

// -----------------------------------------------
// NSE API ENDPOINTS
// -----------------------------------------------
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";

pub fn nse_option_chain_url(symbol: &str) -> String {
    format!(
        "{}/api/option-chain-indices?symbol={}",
        NSE_BASE_URL,
        urlencoding::encode(symbol)
    )
}

pub fn nse_all_indices_url() -> String {
    format!("{}/api/allIndices", NSE_BASE_URL)
}

pub fn nse_index_chart_url(symbol: &str) -> String {
    format!(
        "{}/api/chart-databyindex?index={}&indices=true",
        NSE_BASE_URL,
        urlencoding::encode(&index_display_name(symbol).replace(' ', ""))
    )
}

/// Display name used by the indices endpoints ("NIFTY" is listed as "NIFTY 50").
pub fn index_display_name(symbol: &str) -> String {
    match symbol {
        "NIFTY" => "NIFTY 50".to_string(),
        "BANKNIFTY" => "NIFTY BANK".to_string(),
        "FINNIFTY" => "NIFTY FINANCIAL SERVICES".to_string(),
        other => other.to_string(),
    }
}

// -----------------------------------------------
// SUPPORTED INDICES
// -----------------------------------------------
pub const NSE_INDICES: &[&str] = &["NIFTY", "BANKNIFTY", "FINNIFTY"];

// -----------------------------------------------
// INSTRUMENT PROFILES
// -----------------------------------------------
// The original dashboards kept one near-identical script per index with the
// thresholds baked in. Here each index is a profile consumed by the same
// pipeline.

#[derive(Debug, Clone, Copy)]
pub struct InstrumentProfile {
    pub symbol: &'static str,
    /// Distance between adjacent strikes (50 for NIFTY, 100 for BANKNIFTY).
    pub strike_step: f64,
    /// Minimum traded volume before the liquidity penalty fires.
    pub min_volume: f64,
    /// Minimum open interest before the liquidity penalty fires.
    pub min_oi: f64,
    /// Number of recent closes used for support/resistance zones.
    pub zone_lookback: usize,
}

pub const PROFILES: &[InstrumentProfile] = &[
    InstrumentProfile {
        symbol: "NIFTY",
        strike_step: 50.0,
        min_volume: 500.0,
        min_oi: 1000.0,
        zone_lookback: 120,
    },
    InstrumentProfile {
        symbol: "BANKNIFTY",
        strike_step: 100.0,
        min_volume: 300.0,
        min_oi: 500.0,
        zone_lookback: 120,
    },
    InstrumentProfile {
        symbol: "FINNIFTY",
        strike_step: 50.0,
        min_volume: 200.0,
        min_oi: 400.0,
        zone_lookback: 120,
    },
];

/// Look up the profile for a symbol, falling back to NIFTY-like defaults.
pub fn profile_for(symbol: &str) -> InstrumentProfile {
    PROFILES
        .iter()
        .find(|p| p.symbol == symbol)
        .copied()
        .unwrap_or(PROFILES[0])
}

// -----------------------------------------------
// SCORING CONSTANTS
// -----------------------------------------------
pub const PARTICIPATION_CAP: f64 = 50.0;
pub const PROXIMITY_BONUS: f64 = 30.0;
pub const DECAY_STRENGTH_CAP: f64 = 40.0;
pub const DECAY_STRENGTH_SCALE: f64 = 2.0;
pub const CONFIDENCE_MAX: f64 = 100.0;
pub const LIQUIDITY_PENALTY: f64 = 0.6;

pub const MIN_TRADE_CONFIDENCE: f64 = 45.0;
pub const DIRECTIONAL_CONFIDENCE: f64 = 70.0;

// -----------------------------------------------
// EXIT LEVEL CONSTANTS
// -----------------------------------------------
pub const MIN_ENTRY_PREMIUM: f64 = 1.0;
pub const STOP_LOSS_FRACTION: f64 = 0.70;
pub const TARGET_MULTIPLE: f64 = 1.5;
pub const WIDE_TARGET_MULTIPLE: f64 = 2.0;
/// Nearest zone further than this fraction of spot widens the target.
pub const ZONE_WIDE_RATIO: f64 = 0.02;

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(8);

// -----------------------------------------------
// SESSION WARMUP
// -----------------------------------------------
pub const WARMUP_DELAY_MS: u64 = 200;

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const RETRY_BASE_DELAY_MS: u64 = 200;
pub const RETRY_FACTOR: u64 = 2;
pub const RETRY_MAX_DELAY_SECS: u64 = 3;
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// -----------------------------------------------
// CACHING
// -----------------------------------------------
pub const CHAIN_CACHE_TTL: Duration = Duration::from_secs(60);
pub const HISTORY_CACHE_TTL: Duration = Duration::from_secs(300);

// -----------------------------------------------
// HTTP HEADERS
// -----------------------------------------------
pub const HEADER_REFERER: &str = "https://www.nseindia.com/";
pub const HEADER_X_REQUESTED_WITH: &str = "XMLHttpRequest";
pub const HEADER_ACCEPT_HTML: &str = "text/html";

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

/// Execution mode from environment, defaults to a single analysis pass
pub fn get_execution_mode() -> String {
    std::env::var("NSE_MODE").unwrap_or_else(|_| "single".to_string())
}

pub fn get_symbol() -> String {
    std::env::var("NSE_SYMBOL").unwrap_or_else(|_| "NIFTY".to_string())
}

/// Expiry for single/watch mode. Empty means "nearest available".
pub fn get_expiry() -> String {
    std::env::var("NSE_EXPIRY").unwrap_or_default()
}

pub fn get_port() -> u16 {
    std::env::var("NSE_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or(3001)
}

/// Refresh period for watch mode, clamped to something polite.
pub fn get_refresh_secs() -> u64 {
    std::env::var("NSE_REFRESH_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(|v| v.clamp(30, 600))
        .unwrap_or(60)
}
