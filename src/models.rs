use serde::{Deserialize, Serialize};

// -----------------------------------------------
// RAW PROVIDER MODELS (NSE option-chain payload)
// -----------------------------------------------

/// Top-level response from the NSE option chain API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChainResponse {
    pub records: Records,
}

/// Records section containing timestamp, underlying value, and all strike data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Records {
    pub timestamp: String,

    #[serde(rename = "underlyingValue")]
    pub underlying_value: f64,

    pub data: Vec<RawStrikeRecord>,

    #[serde(rename = "expiryDates")]
    pub expiry_dates: Vec<String>,
}

/// One per-strike record; either leg may be absent for illiquid strikes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStrikeRecord {
    #[serde(rename = "expiryDate")]
    pub expiry_date: Option<String>,

    #[serde(rename = "strikePrice")]
    pub strike_price: Option<f64>,

    #[serde(rename = "CE")]
    pub call: Option<RawLeg>,

    #[serde(rename = "PE")]
    pub put: Option<RawLeg>,
}

/// Per-leg market data (CE or PE). NSE omits fields for dead strikes, and
/// theta is only present on feeds that carry computed Greeks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLeg {
    #[serde(rename = "lastPrice")]
    pub last_price: Option<f64>,

    #[serde(rename = "openInterest")]
    pub open_interest: Option<f64>,

    #[serde(rename = "changeinOpenInterest")]
    pub change_in_oi: Option<f64>,

    #[serde(rename = "totalTradedVolume")]
    pub total_traded_volume: Option<f64>,

    #[serde(rename = "impliedVolatility")]
    pub implied_volatility: Option<f64>,

    #[serde(rename = "change")]
    pub price_change: Option<f64>,

    #[serde(default)]
    pub theta: Option<f64>,
}

/// allIndices entry, used as the fallback spot source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexQuote {
    pub index: String,
    pub last: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllIndicesResponse {
    pub data: Vec<IndexQuote>,
}

/// Intraday chart payload ("grapthData" is the provider's spelling)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexChartResponse {
    #[serde(rename = "grapthData")]
    pub graph_data: Vec<(i64, f64)>,
}

// -----------------------------------------------
// DOMAIN MODELS
// -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionSide {
    Call,
    Put,
}

impl OptionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionSide::Call => "CE",
            OptionSide::Put => "PE",
        }
    }
}

/// One (strike, side) market snapshot. Missing provider numbers are
/// defaulted to zero at build time so downstream arithmetic stays total;
/// theta stays optional because absence means "no Greeks on this feed",
/// which the scorer handles explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub strike: f64,
    pub side: OptionSide,
    pub last_price: f64,
    pub open_interest: f64,
    pub volume: f64,
    pub implied_volatility: f64,
    pub theta: Option<f64>,
    pub price_change: f64,
    pub change_in_oi: f64,
}

/// All quotes for one (symbol, expiry), rebuilt from scratch on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub symbol: String,
    pub expiry: String,
    pub timestamp: String,
    pub spot: f64,
    pub atm_strike: f64,
    pub strike_step: f64,
    pub quotes: Vec<Quote>,
}

impl Chain {
    pub fn strikes(&self) -> Vec<f64> {
        let mut strikes: Vec<f64> = self.quotes.iter().map(|q| q.strike).collect();
        strikes.sort_by(|a, b| a.partial_cmp(b).unwrap());
        strikes.dedup();
        strikes
    }
}
