// Support/resistance levels from the distribution of recent closes.
// Lower quantiles act as floors, upper quantiles as ceilings.

/// Quantiles of the lookback window used as zone levels.
const SUPPORT_QUANTILES: &[f64] = &[0.10, 0.25];
const RESISTANCE_QUANTILES: &[f64] = &[0.75, 0.90];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceZones {
    pub supports: Vec<f64>,
    pub resistances: Vec<f64>,
}

impl PriceZones {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.supports.is_empty() && self.resistances.is_empty()
    }

    fn levels(&self) -> impl Iterator<Item = f64> + '_ {
        self.supports.iter().chain(self.resistances.iter()).copied()
    }

    /// Zone level closest to the given price, if any zones exist.
    pub fn nearest(&self, price: f64) -> Option<f64> {
        self.levels().min_by(|a, b| {
            (a - price)
                .abs()
                .partial_cmp(&(b - price).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// True when the price sits within `tolerance` of any zone level.
    pub fn is_near(&self, price: f64, tolerance: f64) -> bool {
        self.levels().any(|z| (z - price).abs() <= tolerance)
    }
}

/// Build zones from a window of recent closes. Fewer than two samples
/// yields no zones; the pipeline treats that as "no price action context".
pub fn zones_from_history(closes: &[f64]) -> PriceZones {
    if closes.len() < 2 {
        return PriceZones::empty();
    }

    let mut sorted: Vec<f64> = closes.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.len() < 2 {
        return PriceZones::empty();
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    PriceZones {
        supports: SUPPORT_QUANTILES.iter().map(|&q| quantile(&sorted, q)).collect(),
        resistances: RESISTANCE_QUANTILES.iter().map(|&q| quantile(&sorted, q)).collect(),
    }
}

/// Linear-interpolation quantile over a sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolation() {
        let sorted = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(quantile(&sorted, 0.0), 10.0);
        assert_eq!(quantile(&sorted, 0.5), 30.0);
        assert_eq!(quantile(&sorted, 1.0), 50.0);
        assert_eq!(quantile(&sorted, 0.25), 20.0);
    }

    #[test]
    fn test_zones_ordering() {
        let closes: Vec<f64> = (1..=100).map(|i| i as f64 * 100.0).collect();
        let zones = zones_from_history(&closes);
        assert_eq!(zones.supports.len(), 2);
        assert_eq!(zones.resistances.len(), 2);
        // Supports below resistances for a spread-out window
        assert!(zones.supports.iter().all(|s| zones.resistances.iter().all(|r| s < r)));
    }

    #[test]
    fn test_empty_history_yields_no_zones() {
        assert!(zones_from_history(&[]).is_empty());
        assert!(zones_from_history(&[22000.0]).is_empty());
    }

    #[test]
    fn test_nearest_and_is_near() {
        let zones = PriceZones {
            supports: vec![21800.0],
            resistances: vec![22400.0],
        };
        assert_eq!(zones.nearest(22350.0), Some(22400.0));
        assert!(zones.is_near(22380.0, 50.0));
        assert!(!zones.is_near(22100.0, 50.0));
        assert_eq!(PriceZones::empty().nearest(22000.0), None);
    }
}
