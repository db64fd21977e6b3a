use crate::scoring::BiasLabel;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// Session accumulators for watch mode. Both are owned by the caller and
// passed into each refresh cycle; nothing here is ambient global state.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub recorded_at: DateTime<Local>,
    pub symbol: String,
    pub expiry: String,
    pub spot: f64,
    pub bias: BiasLabel,
    pub recommendation: String,
    pub top_confidence: f64,
}

/// Append-only log of per-cycle outcomes.
#[derive(Debug, Default)]
pub struct TradeJournal {
    entries: Vec<JournalEntry>,
}

impl TradeJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }
}

/// Smoothing weight for each observation.
const TUNER_ALPHA: f64 = 0.2;
/// Adjusted thresholds stay within [base/2, base*2].
const TUNER_MIN_FACTOR: f64 = 0.5;
const TUNER_MAX_FACTOR: f64 = 2.0;
/// Thresholds track this fraction of the observed chain medians.
const TUNER_TARGET_FRACTION: f64 = 0.25;

/// Bounded-adjustment tuner for the liquidity thresholds. Each cycle it
/// nudges the active minimums toward a fraction of the chain's observed
/// median volume and OI, clamped around the configured base values.
#[derive(Debug, Clone, Copy)]
pub struct LiquidityTuner {
    base_min_volume: f64,
    base_min_oi: f64,
    min_volume: f64,
    min_oi: f64,
}

impl LiquidityTuner {
    pub fn new(base_min_volume: f64, base_min_oi: f64) -> Self {
        Self {
            base_min_volume,
            base_min_oi,
            min_volume: base_min_volume,
            min_oi: base_min_oi,
        }
    }

    pub fn min_volume(&self) -> f64 {
        self.min_volume
    }

    pub fn min_oi(&self) -> f64 {
        self.min_oi
    }

    /// Feed one cycle's observed chain medians into the tuner.
    pub fn observe(&mut self, median_volume: f64, median_oi: f64) {
        self.min_volume = Self::adjust(
            self.min_volume,
            median_volume * TUNER_TARGET_FRACTION,
            self.base_min_volume,
        );
        self.min_oi = Self::adjust(
            self.min_oi,
            median_oi * TUNER_TARGET_FRACTION,
            self.base_min_oi,
        );
    }

    fn adjust(current: f64, observed_target: f64, base: f64) -> f64 {
        let blended = current + TUNER_ALPHA * (observed_target - current);
        blended.clamp(base * TUNER_MIN_FACTOR, base * TUNER_MAX_FACTOR)
    }
}

/// Median over an unsorted sample; 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_is_append_only() {
        let mut journal = TradeJournal::new();
        assert!(journal.is_empty());

        journal.record(JournalEntry {
            recorded_at: Local::now(),
            symbol: "NIFTY".to_string(),
            expiry: "30-Dec-2025".to_string(),
            spot: 22000.0,
            bias: BiasLabel::CallSide,
            recommendation: "PE Short Strategy favored (CE decay is higher)".to_string(),
            top_confidence: 82.0,
        });

        assert_eq!(journal.len(), 1);
        assert_eq!(journal.last().unwrap().symbol, "NIFTY");
    }

    #[test]
    fn test_tuner_stays_bounded() {
        let mut tuner = LiquidityTuner::new(500.0, 1000.0);

        // Extremely liquid chain pushes thresholds up, but never past 2x base
        for _ in 0..100 {
            tuner.observe(1_000_000.0, 1_000_000.0);
        }
        assert_eq!(tuner.min_volume(), 1000.0);
        assert_eq!(tuner.min_oi(), 2000.0);

        // Dead chain pulls them down, but never below half of base
        for _ in 0..100 {
            tuner.observe(0.0, 0.0);
        }
        assert_eq!(tuner.min_volume(), 250.0);
        assert_eq!(tuner.min_oi(), 500.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[3.0]), 3.0);
        assert_eq!(median(&[1.0, 9.0]), 5.0);
        assert_eq!(median(&[9.0, 1.0, 5.0]), 5.0);
    }
}
