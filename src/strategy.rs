use crate::config::{
    DIRECTIONAL_CONFIDENCE, MIN_ENTRY_PREMIUM, MIN_TRADE_CONFIDENCE, STOP_LOSS_FRACTION,
    TARGET_MULTIPLE, WIDE_TARGET_MULTIPLE, ZONE_WIDE_RATIO,
};
use crate::scoring::BiasLabel;
use crate::zones::PriceZones;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    ShortOtmCall,
    ShortOtmPut,
    DirectionalBuy,
    NoTrade,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ShortOtmCall => "SHORT_OTM_CALL",
            Strategy::ShortOtmPut => "SHORT_OTM_PUT",
            Strategy::DirectionalBuy => "DIRECTIONAL_BUY",
            Strategy::NoTrade => "NO_TRADE",
        }
    }
}

/// Map (bias, confidence, spot-vs-strike) to a recommendation.
///
/// Total over its input domain: every combination lands on a label, with
/// NoTrade as the catch-all. Faster call decay means call premium sellers
/// get paid, so call-side bias shorts OTM calls and vice versa.
pub fn recommend(bias: BiasLabel, confidence: f64, spot: f64, strike: f64) -> Strategy {
    if confidence < MIN_TRADE_CONFIDENCE {
        return Strategy::NoTrade;
    }

    match bias {
        BiasLabel::Neutral => Strategy::NoTrade,
        BiasLabel::CallSide => {
            if strike > spot {
                Strategy::ShortOtmCall
            } else if confidence >= DIRECTIONAL_CONFIDENCE {
                Strategy::DirectionalBuy
            } else {
                Strategy::NoTrade
            }
        }
        BiasLabel::PutSide => {
            if strike < spot {
                Strategy::ShortOtmPut
            } else if confidence >= DIRECTIONAL_CONFIDENCE {
                Strategy::DirectionalBuy
            } else {
                Strategy::NoTrade
            }
        }
    }
}

/// Chain-level banner line, worded as the original dashboards did.
pub fn chain_recommendation(bias: BiasLabel) -> &'static str {
    match bias {
        BiasLabel::CallSide => "PE Short Strategy favored (CE decay is higher)",
        BiasLabel::PutSide => "CE Short Strategy favored (PE decay is higher)",
        BiasLabel::Neutral => "Neutral Bias - Consider Iron Condor/Straddle",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitLevels {
    pub stop_loss: f64,
    pub target: f64,
}

/// Stop-loss and target from the entry premium.
///
/// Entry is floored at a minimum premium so zero-priced strikes never
/// produce degenerate levels; both outputs are therefore always positive.
/// The target widens when the nearest support/resistance zone sits far
/// enough from spot to imply a larger move.
pub fn exit_levels(last_price: f64, spot: f64, zones: &PriceZones) -> ExitLevels {
    let entry = last_price.max(MIN_ENTRY_PREMIUM);

    let mut multiple = TARGET_MULTIPLE;
    if spot > 0.0 {
        if let Some(zone) = zones.nearest(spot) {
            if (zone - spot).abs() / spot > ZONE_WIDE_RATIO {
                multiple = WIDE_TARGET_MULTIPLE;
            }
        }
    }

    ExitLevels {
        stop_loss: entry * STOP_LOSS_FRACTION,
        target: entry * multiple,
    }
}
