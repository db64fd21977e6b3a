use crate::config::{
    self, CONFIDENCE_MAX, DECAY_STRENGTH_CAP, DECAY_STRENGTH_SCALE, LIQUIDITY_PENALTY,
    PARTICIPATION_CAP, PROXIMITY_BONUS,
};
use crate::models::{Chain, OptionSide, Quote};
use crate::strategy::{self, Strategy};
use crate::zones::PriceZones;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which side of the chain is losing time value faster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiasLabel {
    CallSide,
    PutSide,
    Neutral,
}

impl BiasLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BiasLabel::CallSide => "CALL_SIDE",
            BiasLabel::PutSide => "PUT_SIDE",
            BiasLabel::Neutral => "NEUTRAL",
        }
    }
}

/// A Quote with the derived signal attached. Regenerated every refresh;
/// carries no identity beyond its source quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    pub strike: f64,
    pub side: OptionSide,
    pub last_price: f64,
    pub open_interest: f64,
    pub volume: f64,
    pub theta: Option<f64>,
    pub bias: BiasLabel,
    pub confidence: f64,
    pub strategy: Strategy,
    pub stop_loss: Option<f64>,
    pub target: Option<f64>,
}

/// Liquidity thresholds for the scoring pass. Kept separate from the
/// instrument profile so the watch-mode tuner can adjust them.
#[derive(Debug, Clone, Copy)]
pub struct ScoreParams {
    pub min_volume: f64,
    pub min_oi: f64,
}

impl From<&config::InstrumentProfile> for ScoreParams {
    fn from(profile: &config::InstrumentProfile) -> Self {
        Self {
            min_volume: profile.min_volume,
            min_oi: profile.min_oi,
        }
    }
}

/// Decide which leg is decaying faster from per-day theta.
///
/// The side with the larger-magnitude negative theta wins. A leg with
/// exactly zero theta against a nonzero leg loses: the nonzero leg is
/// treated as definitively faster-decaying (the fallback rule used when
/// theta comes from an estimate). Missing or equal values are Neutral.
pub fn classify_decay_bias(ce_theta: Option<f64>, pe_theta: Option<f64>) -> BiasLabel {
    let (ce, pe) = match (ce_theta, pe_theta) {
        (Some(ce), Some(pe)) => (ce, pe),
        _ => return BiasLabel::Neutral,
    };

    if ce == pe {
        return BiasLabel::Neutral;
    }
    if ce == 0.0 {
        return BiasLabel::PutSide;
    }
    if pe == 0.0 {
        return BiasLabel::CallSide;
    }

    // Daily decay rate: positive means the leg is losing value
    let ce_decay = -ce;
    let pe_decay = -pe;
    if ce_decay > pe_decay {
        BiasLabel::CallSide
    } else if pe_decay > ce_decay {
        BiasLabel::PutSide
    } else {
        BiasLabel::Neutral
    }
}

/// Majority label across scored rows. Ties break toward CallSide because
/// the call leg is counted first; rows without a directional label never
/// force a direction.
pub fn aggregate_bias(rows: &[ScoredRow]) -> BiasLabel {
    let call = rows.iter().filter(|r| r.bias == BiasLabel::CallSide).count();
    let put = rows.iter().filter(|r| r.bias == BiasLabel::PutSide).count();

    if call == 0 && put == 0 {
        BiasLabel::Neutral
    } else if call >= put {
        BiasLabel::CallSide
    } else {
        BiasLabel::PutSide
    }
}

/// Time-value part of the premium once intrinsic value is removed.
pub fn time_value(last_price: f64, strike: f64, spot: f64, side: OptionSide) -> f64 {
    match side {
        OptionSide::Call => {
            if spot > strike {
                last_price - (spot - strike)
            } else {
                last_price
            }
        }
        OptionSide::Put => {
            if strike > spot {
                last_price - (strike - spot)
            } else {
                last_price
            }
        }
    }
}

/// Theta when the feed carries it, otherwise a deterministic estimate:
/// the remaining time value spread over the days left. This replaces the
/// simulated values some dashboard variants injected for missing Greeks.
pub fn effective_theta(quote: &Quote, spot: f64, days_to_expiry: i32) -> f64 {
    match quote.theta {
        Some(theta) => theta,
        None => {
            let tv = time_value(quote.last_price, quote.strike, spot, quote.side).max(0.0);
            -(tv / days_to_expiry.max(1) as f64)
        }
    }
}

/// Score every quote in the chain. Deterministic: the same chain, zones,
/// and params always yield identical rows, sorted by confidence descending
/// (strike ascending on ties).
pub fn score_chain(
    chain: &Chain,
    zones: &PriceZones,
    days_to_expiry: i32,
    params: &ScoreParams,
) -> Vec<ScoredRow> {
    // Effective theta per (strike, side) so each strike's bias compares
    // both legs even when only an estimate is available.
    let mut theta_pairs: HashMap<i64, (Option<f64>, Option<f64>)> = HashMap::new();
    for quote in &chain.quotes {
        let key = strike_key(quote.strike);
        let eff = effective_theta(quote, chain.spot, days_to_expiry);
        let entry = theta_pairs.entry(key).or_insert((None, None));
        match quote.side {
            OptionSide::Call => entry.0 = Some(eff),
            OptionSide::Put => entry.1 = Some(eff),
        }
    }

    let volumes: Vec<f64> = chain.quotes.iter().map(|q| q.volume).collect();

    let mut rows: Vec<ScoredRow> = chain
        .quotes
        .iter()
        .map(|quote| {
            let (ce_theta, pe_theta) = theta_pairs
                .get(&strike_key(quote.strike))
                .copied()
                .unwrap_or((None, None));
            let bias = classify_decay_bias(ce_theta, pe_theta);
            let net_theta = ce_theta.unwrap_or(0.0) + pe_theta.unwrap_or(0.0);

            let confidence = confidence_score(quote, chain, zones, &volumes, net_theta, params);
            let strategy = strategy::recommend(bias, confidence, chain.spot, quote.strike);

            let (stop_loss, target) = if strategy == Strategy::NoTrade {
                (None, None)
            } else {
                let levels = strategy::exit_levels(quote.last_price, chain.spot, zones);
                (Some(levels.stop_loss), Some(levels.target))
            };

            ScoredRow {
                strike: quote.strike,
                side: quote.side,
                last_price: quote.last_price,
                open_interest: quote.open_interest,
                volume: quote.volume,
                theta: quote.theta,
                bias,
                confidence,
                strategy,
                stop_loss,
                target,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.strike.partial_cmp(&b.strike).unwrap_or(std::cmp::Ordering::Equal))
    });

    rows
}

/// Three capped sub-scores summed, clamped to [0, 100], then the liquidity
/// penalty. The penalty must multiply the clamped value: applying it
/// before the clamp would let an over-cap raw sum mask thin liquidity.
fn confidence_score(
    quote: &Quote,
    chain: &Chain,
    zones: &PriceZones,
    volumes: &[f64],
    net_theta: f64,
    params: &ScoreParams,
) -> f64 {
    let participation = participation_score(quote.volume, volumes);
    let proximity = proximity_score(quote.strike, chain.atm_strike, chain.strike_step, zones);
    let decay = decay_strength_score(net_theta);

    let mut score = (participation + proximity + decay).clamp(0.0, CONFIDENCE_MAX);

    if quote.volume < params.min_volume || quote.open_interest < params.min_oi {
        score *= LIQUIDITY_PENALTY;
    }

    score
}

/// Rank of this quote's volume against every quote in the chain. The
/// highest-volume strike earns the full cap; ties share a rank.
fn participation_score(volume: f64, volumes: &[f64]) -> f64 {
    let n = volumes.len();
    if n == 0 {
        return 0.0;
    }
    let better = volumes.iter().filter(|&&v| v > volume).count();
    PARTICIPATION_CAP * (n - better) as f64 / n as f64
}

/// Fixed bonus when the strike sits within one step of ATM or of a zone.
fn proximity_score(strike: f64, atm_strike: f64, strike_step: f64, zones: &PriceZones) -> f64 {
    let tolerance = strike_step.max(0.0);
    if (strike - atm_strike).abs() <= tolerance || zones.is_near(strike, tolerance) {
        PROXIMITY_BONUS
    } else {
        0.0
    }
}

/// Bonus proportional to how fast the strike's combined premium decays.
/// Non-negative net theta (no decay) earns nothing.
fn decay_strength_score(net_theta: f64) -> f64 {
    if net_theta >= 0.0 {
        0.0
    } else {
        ((-net_theta) * DECAY_STRENGTH_SCALE).min(DECAY_STRENGTH_CAP)
    }
}

fn strike_key(strike: f64) -> i64 {
    (strike * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_call_side_faster() {
        // Call losing 5/day vs put losing 2/day
        assert_eq!(
            classify_decay_bias(Some(-5.0), Some(-2.0)),
            BiasLabel::CallSide
        );
    }

    #[test]
    fn test_classifier_zero_vs_nonzero_fallback() {
        assert_eq!(classify_decay_bias(Some(0.0), Some(-3.0)), BiasLabel::PutSide);
        assert_eq!(classify_decay_bias(Some(-3.0), Some(0.0)), BiasLabel::CallSide);
    }

    #[test]
    fn test_classifier_neutral_cases() {
        assert_eq!(classify_decay_bias(None, None), BiasLabel::Neutral);
        assert_eq!(classify_decay_bias(Some(-2.0), None), BiasLabel::Neutral);
        assert_eq!(classify_decay_bias(None, Some(-2.0)), BiasLabel::Neutral);
        assert_eq!(classify_decay_bias(Some(0.0), Some(0.0)), BiasLabel::Neutral);
        assert_eq!(classify_decay_bias(Some(-4.0), Some(-4.0)), BiasLabel::Neutral);
    }

    #[test]
    fn test_participation_rank() {
        let volumes = vec![100.0, 500.0, 300.0, 500.0];
        // Top volume (tied) counts nobody above it
        assert_eq!(participation_score(500.0, &volumes), PARTICIPATION_CAP);
        // 300 has two quotes above it: 50 * (4-2)/4 = 25
        assert_eq!(participation_score(300.0, &volumes), 25.0);
        // Bottom volume: 50 * (4-3)/4 = 12.5
        assert_eq!(participation_score(100.0, &volumes), 12.5);
    }

    #[test]
    fn test_decay_strength_capped_and_signed() {
        assert_eq!(decay_strength_score(5.0), 0.0);
        assert_eq!(decay_strength_score(0.0), 0.0);
        assert_eq!(decay_strength_score(-10.0), 20.0);
        assert_eq!(decay_strength_score(-100.0), DECAY_STRENGTH_CAP);
    }

    #[test]
    fn test_effective_theta_prefers_feed_value() {
        let quote = Quote {
            strike: 22000.0,
            side: OptionSide::Call,
            last_price: 150.0,
            open_interest: 1000.0,
            volume: 500.0,
            implied_volatility: 12.0,
            theta: Some(-6.5),
            price_change: 0.0,
            change_in_oi: 0.0,
        };
        assert_eq!(effective_theta(&quote, 22000.0, 5), -6.5);
    }

    #[test]
    fn test_effective_theta_estimate_is_deterministic() {
        let quote = Quote {
            strike: 22000.0,
            side: OptionSide::Call,
            last_price: 100.0,
            open_interest: 1000.0,
            volume: 500.0,
            implied_volatility: 12.0,
            theta: None,
            price_change: 0.0,
            change_in_oi: 0.0,
        };
        // ATM call, time value = premium = 100, 5 days → -20/day
        let first = effective_theta(&quote, 22000.0, 5);
        assert_eq!(first, -20.0);
        assert_eq!(effective_theta(&quote, 22000.0, 5), first);
        // Zero days floors at one day
        assert_eq!(effective_theta(&quote, 22000.0, 0), -100.0);
    }

    #[test]
    fn test_time_value_matches_intrinsic_split() {
        // ITM call: premium 120, intrinsic 100 → time value 20
        assert_eq!(time_value(120.0, 22000.0, 22100.0, OptionSide::Call), 20.0);
        // OTM call: all premium is time value
        assert_eq!(time_value(40.0, 22200.0, 22100.0, OptionSide::Call), 40.0);
        // ITM put
        assert_eq!(time_value(90.0, 22200.0, 22100.0, OptionSide::Put), -10.0);
    }
}
