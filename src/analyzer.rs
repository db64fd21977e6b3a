use crate::chain::{self, ChainOutcome};
use crate::config;
use crate::models::OptionChainResponse;
use crate::nse_client::NseClient;
use crate::scoring::{self, BiasLabel, ScoreParams, ScoredRow};
use crate::strategy;
use crate::zones;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Full analysis for one (symbol, expiry): summary fields plus rows sorted
/// by confidence descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub expiry: String,
    pub timestamp: String,
    pub spot: f64,
    pub atm_strike: f64,
    pub days_to_expiry: i32,
    pub aggregate_bias: BiasLabel,
    pub recommendation: String,
    pub rows: Vec<ScoredRow>,
}

/// Outcome of one refresh cycle. Degraded states are normal results, not
/// errors: the presentation layer renders them as "no data / spot only".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Report(AnalysisReport),
    SpotOnly { symbol: String, spot: f64 },
    NoData { symbol: String },
}

/// Score an already-fetched chain response against precomputed zones.
/// Pure apart from the expiry-date clock; shared by the server, the CLI
/// driver, and the watch loop.
pub fn analyze_response(
    response: &OptionChainResponse,
    symbol: &str,
    expiry: &str,
    close_history: &[f64],
    params: &ScoreParams,
) -> AnalysisOutcome {
    let profile = config::profile_for(symbol);

    let outcome = chain::build_chain(
        &response.records.data,
        response.records.underlying_value,
        symbol,
        expiry,
        &response.records.timestamp,
        profile.strike_step,
    );

    let built = match outcome {
        ChainOutcome::Ready(chain) => chain,
        ChainOutcome::NoData => {
            return AnalysisOutcome::NoData {
                symbol: symbol.to_string(),
            };
        }
    };

    let days = match chain::days_to_expiry(expiry) {
        Ok(days) => days,
        Err(e) => {
            warn!("Unusable expiry '{}': {}", expiry, e);
            return AnalysisOutcome::NoData {
                symbol: symbol.to_string(),
            };
        }
    };

    let price_zones = zones::zones_from_history(close_history);
    let rows = scoring::score_chain(&built, &price_zones, days, params);
    let aggregate = scoring::aggregate_bias(&rows);

    AnalysisOutcome::Report(AnalysisReport {
        symbol: built.symbol,
        expiry: built.expiry,
        timestamp: built.timestamp,
        spot: built.spot,
        atm_strike: built.atm_strike,
        days_to_expiry: days,
        aggregate_bias: aggregate,
        recommendation: strategy::chain_recommendation(aggregate).to_string(),
        rows,
    })
}

/// Fetch and analyze one (symbol, expiry). Empty expiry selects the
/// nearest available one. A failed chain fetch falls back to the
/// last-close source; only when both providers fail does this return Err.
pub async fn analyze(
    client: &NseClient,
    symbol: &str,
    expiry: &str,
    params: &ScoreParams,
) -> Result<AnalysisOutcome> {
    let profile = config::profile_for(symbol);

    let response = match client.fetch_option_chain(symbol).await {
        Ok(response) => response,
        Err(chain_err) => {
            warn!("Option chain fetch failed for {}: {}", symbol, chain_err);
            let spot = client.fetch_spot_fallback(symbol).await?;
            return Ok(AnalysisOutcome::SpotOnly {
                symbol: symbol.to_string(),
                spot,
            });
        }
    };

    let expiry = if expiry.is_empty() {
        match chain::expiry_dates(&response.records.data).into_iter().next() {
            Some(nearest) => nearest,
            None => {
                return Ok(AnalysisOutcome::NoData {
                    symbol: symbol.to_string(),
                });
            }
        }
    } else {
        expiry.to_string()
    };

    // Zones are a bonus input; a missing history never blocks scoring
    let close_history = match client.fetch_price_history(symbol, profile.zone_lookback).await {
        Ok(closes) => closes,
        Err(e) => {
            warn!("Price history fetch failed for {}: {}", symbol, e);
            Vec::new()
        }
    };

    Ok(analyze_response(&response, symbol, &expiry, &close_history, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawLeg, RawStrikeRecord, Records};

    fn sample_response() -> OptionChainResponse {
        let leg = |price: f64, volume: f64, theta: Option<f64>| RawLeg {
            last_price: Some(price),
            open_interest: Some(5000.0),
            change_in_oi: Some(100.0),
            total_traded_volume: Some(volume),
            implied_volatility: Some(14.0),
            price_change: Some(1.0),
            theta,
        };
        OptionChainResponse {
            records: Records {
                timestamp: "30-Dec-2025 15:30:00".to_string(),
                underlying_value: 22025.0,
                expiry_dates: vec!["30-Dec-2025".to_string()],
                data: vec![
                    RawStrikeRecord {
                        expiry_date: Some("30-Dec-2025".to_string()),
                        strike_price: Some(22000.0),
                        call: Some(leg(140.0, 9000.0, Some(-6.0))),
                        put: Some(leg(110.0, 7000.0, Some(-3.0))),
                    },
                    RawStrikeRecord {
                        expiry_date: Some("30-Dec-2025".to_string()),
                        strike_price: Some(22050.0),
                        call: Some(leg(105.0, 4000.0, Some(-2.0))),
                        put: Some(leg(130.0, 6000.0, Some(-5.0))),
                    },
                ],
            },
        }
    }

    #[test]
    fn test_analyze_response_produces_report() {
        let response = sample_response();
        let params = ScoreParams {
            min_volume: 100.0,
            min_oi: 100.0,
        };
        // Expiry is in the past relative to any real clock only if the date
        // has passed; use a far-future expiry to keep the test stable.
        let mut response = response;
        for r in &mut response.records.data {
            r.expiry_date = Some("30-Dec-2099".to_string());
        }
        match analyze_response(&response, "NIFTY", "30-Dec-2099", &[], &params) {
            AnalysisOutcome::Report(report) => {
                assert_eq!(report.symbol, "NIFTY");
                assert_eq!(report.rows.len(), 4);
                assert_eq!(report.atm_strike, 22050.0);
                // Rows arrive sorted by confidence descending
                for pair in report.rows.windows(2) {
                    assert!(pair[0].confidence >= pair[1].confidence);
                }
            }
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[test]
    fn test_analyze_response_no_matching_expiry_is_no_data() {
        let response = sample_response();
        let params = ScoreParams {
            min_volume: 100.0,
            min_oi: 100.0,
        };
        assert_eq!(
            analyze_response(&response, "NIFTY", "01-Jan-2099", &[], &params),
            AnalysisOutcome::NoData {
                symbol: "NIFTY".to_string()
            }
        );
    }
}
