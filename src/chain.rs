use crate::models::{Chain, OptionSide, Quote, RawLeg, RawStrikeRecord};
use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use std::collections::HashSet;

/// Result of a chain build. An empty or unusable provider payload is a
/// normal terminal state for the refresh cycle, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    Ready(Chain),
    NoData,
}

/// Build a Chain from raw per-strike records for one expiry.
///
/// Records missing both legs are dropped, missing numeric fields default to
/// zero, and (strike, side) pairs are deduplicated keeping the first
/// occurrence.
pub fn build_chain(
    records: &[RawStrikeRecord],
    spot: f64,
    symbol: &str,
    expiry: &str,
    timestamp: &str,
    strike_step: f64,
) -> ChainOutcome {
    let mut quotes: Vec<Quote> = Vec::new();
    let mut seen: HashSet<(i64, OptionSide)> = HashSet::new();

    for record in records {
        if record.expiry_date.as_deref() != Some(expiry) {
            continue;
        }
        let Some(strike) = record.strike_price else {
            continue;
        };
        if record.call.is_none() && record.put.is_none() {
            continue;
        }

        let key = (strike * 100.0).round() as i64;
        if let Some(leg) = &record.call {
            if seen.insert((key, OptionSide::Call)) {
                quotes.push(quote_from_leg(strike, OptionSide::Call, leg));
            }
        }
        if let Some(leg) = &record.put {
            if seen.insert((key, OptionSide::Put)) {
                quotes.push(quote_from_leg(strike, OptionSide::Put, leg));
            }
        }
    }

    if quotes.is_empty() {
        return ChainOutcome::NoData;
    }

    quotes.sort_by(|a, b| a.strike.partial_cmp(&b.strike).unwrap());

    let strikes: Vec<f64> = {
        let mut s: Vec<f64> = quotes.iter().map(|q| q.strike).collect();
        s.sort_by(|a, b| a.partial_cmp(b).unwrap());
        s.dedup();
        s
    };
    let atm_strike = atm_strike(spot, strike_step, &strikes);

    ChainOutcome::Ready(Chain {
        symbol: symbol.to_string(),
        expiry: expiry.to_string(),
        timestamp: timestamp.to_string(),
        spot,
        atm_strike,
        strike_step,
        quotes,
    })
}

/// Missing numeric fields default to zero so downstream arithmetic is total.
/// Theta stays optional: absence is meaningful to the scorer.
fn quote_from_leg(strike: f64, side: OptionSide, leg: &RawLeg) -> Quote {
    Quote {
        strike,
        side,
        last_price: leg.last_price.unwrap_or(0.0),
        open_interest: leg.open_interest.unwrap_or(0.0),
        volume: leg.total_traded_volume.unwrap_or(0.0),
        implied_volatility: leg.implied_volatility.unwrap_or(0.0),
        theta: leg.theta,
        price_change: leg.price_change.unwrap_or(0.0),
        change_in_oi: leg.change_in_oi.unwrap_or(0.0),
    }
}

/// ATM strike: spot rounded to the instrument's strike step, snapped to the
/// nearest strike actually present when the rounded value is missing.
pub fn atm_strike(spot: f64, strike_step: f64, available: &[f64]) -> f64 {
    let rounded = if strike_step > 0.0 {
        (spot / strike_step).round() * strike_step
    } else {
        spot
    };

    if available.iter().any(|&s| s == rounded) {
        return rounded;
    }

    // Fall back to the nearest listed strike, preferring the lower on ties
    let mut best = rounded;
    let mut best_dist = f64::MAX;
    for &s in available {
        let dist = (s - spot).abs();
        if dist < best_dist || (dist == best_dist && s < best) {
            best_dist = dist;
            best = s;
        }
    }
    best
}

/// Distinct expiry dates across all records, sorted chronologically.
pub fn expiry_dates(records: &[RawStrikeRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dates: Vec<String> = records
        .iter()
        .filter_map(|r| r.expiry_date.clone())
        .filter(|d| seen.insert(d.clone()))
        .collect();

    dates.sort_by_key(|d| {
        NaiveDate::parse_from_str(d, "%d-%b-%Y").unwrap_or(NaiveDate::MAX)
    });
    dates
}

/// Days remaining until expiry (0 on expiry day). Past dates are rejected.
pub fn days_to_expiry(expiry: &str) -> Result<i32> {
    let expiry_date = NaiveDate::parse_from_str(expiry, "%d-%b-%Y")
        .map_err(|e| anyhow!("Failed to parse expiry date '{}': {}", expiry, e))?;

    let today = Local::now().date_naive();
    let days = (expiry_date - today).num_days() as i32;

    if days < 0 {
        return Err(anyhow!(
            "Expiry date {} is in the past (today is {})",
            expiry_date,
            today
        ));
    }

    Ok(days)
}
