use nse_decay_analyzer::chain::{ChainOutcome, build_chain, expiry_dates};
use nse_decay_analyzer::models::{OptionSide, RawLeg, RawStrikeRecord};

fn leg(price: f64) -> RawLeg {
    RawLeg {
        last_price: Some(price),
        open_interest: Some(1000.0),
        change_in_oi: Some(10.0),
        total_traded_volume: Some(500.0),
        implied_volatility: Some(14.0),
        price_change: Some(1.0),
        theta: None,
    }
}

fn record(
    expiry: &str,
    strike: f64,
    call: Option<RawLeg>,
    put: Option<RawLeg>,
) -> RawStrikeRecord {
    RawStrikeRecord {
        expiry_date: Some(expiry.to_string()),
        strike_price: Some(strike),
        call,
        put,
    }
}

#[test]
fn test_builder_keeps_only_records_with_a_leg() {
    // N = 5 input records, K = 3 with at least one leg
    let records = vec![
        record("30-Dec-2025", 22000.0, Some(leg(100.0)), Some(leg(90.0))),
        record("30-Dec-2025", 22050.0, None, None),
        record("30-Dec-2025", 22100.0, Some(leg(70.0)), None),
        record("30-Dec-2025", 22150.0, None, None),
        record("30-Dec-2025", 22200.0, None, Some(leg(130.0))),
    ];

    match build_chain(&records, 22075.0, "NIFTY", "30-Dec-2025", "ts", 50.0) {
        ChainOutcome::Ready(chain) => {
            // 3 usable strikes, one of them with both sides
            assert_eq!(chain.strikes().len(), 3);
            assert_eq!(chain.quotes.len(), 4);
        }
        ChainOutcome::NoData => panic!("expected usable chain"),
    }
}

#[test]
fn test_builder_filters_by_expiry() {
    let records = vec![
        record("30-Dec-2025", 22000.0, Some(leg(100.0)), None),
        record("06-Jan-2026", 22000.0, Some(leg(120.0)), None),
    ];

    match build_chain(&records, 22000.0, "NIFTY", "06-Jan-2026", "ts", 50.0) {
        ChainOutcome::Ready(chain) => {
            assert_eq!(chain.quotes.len(), 1);
            assert_eq!(chain.quotes[0].last_price, 120.0);
            assert_eq!(chain.expiry, "06-Jan-2026");
        }
        ChainOutcome::NoData => panic!("expected usable chain"),
    }
}

#[test]
fn test_builder_defaults_missing_numerics_to_zero() {
    let records = vec![record(
        "30-Dec-2025",
        22000.0,
        Some(RawLeg::default()),
        None,
    )];

    match build_chain(&records, 22000.0, "NIFTY", "30-Dec-2025", "ts", 50.0) {
        ChainOutcome::Ready(chain) => {
            let quote = &chain.quotes[0];
            assert_eq!(quote.side, OptionSide::Call);
            assert_eq!(quote.last_price, 0.0);
            assert_eq!(quote.open_interest, 0.0);
            assert_eq!(quote.volume, 0.0);
            assert_eq!(quote.change_in_oi, 0.0);
            // Theta is not defaulted: absence is meaningful downstream
            assert_eq!(quote.theta, None);
        }
        ChainOutcome::NoData => panic!("expected usable chain"),
    }
}

#[test]
fn test_builder_empty_input_signals_no_data() {
    assert_eq!(
        build_chain(&[], 22000.0, "NIFTY", "30-Dec-2025", "ts", 50.0),
        ChainOutcome::NoData
    );

    // Records exist but none carry a leg
    let records = vec![
        record("30-Dec-2025", 22000.0, None, None),
        record("30-Dec-2025", 22050.0, None, None),
    ];
    assert_eq!(
        build_chain(&records, 22000.0, "NIFTY", "30-Dec-2025", "ts", 50.0),
        ChainOutcome::NoData
    );
}

#[test]
fn test_atm_strike_respects_instrument_step() {
    // BANKNIFTY-style 100-point grid
    let records: Vec<RawStrikeRecord> = (0..5)
        .map(|i| {
            record(
                "30-Dec-2025",
                48000.0 + i as f64 * 100.0,
                Some(leg(100.0)),
                Some(leg(100.0)),
            )
        })
        .collect();

    match build_chain(&records, 48170.0, "BANKNIFTY", "30-Dec-2025", "ts", 100.0) {
        ChainOutcome::Ready(chain) => assert_eq!(chain.atm_strike, 48200.0),
        ChainOutcome::NoData => panic!("expected usable chain"),
    }
}

#[test]
fn test_expiry_dates_deduped_and_sorted() {
    let records = vec![
        record("06-Jan-2026", 22000.0, Some(leg(1.0)), None),
        record("30-Dec-2025", 22000.0, Some(leg(1.0)), None),
        record("06-Jan-2026", 22050.0, Some(leg(1.0)), None),
        record("13-Jan-2026", 22000.0, Some(leg(1.0)), None),
    ];
    assert_eq!(
        expiry_dates(&records),
        vec!["30-Dec-2025", "06-Jan-2026", "13-Jan-2026"]
    );
}
