use nse_decay_analyzer::scoring::BiasLabel;
use nse_decay_analyzer::strategy::{Strategy, chain_recommendation, exit_levels, recommend};
use nse_decay_analyzer::zones::PriceZones;

#[test]
fn test_example_scenario_entry_100() {
    let levels = exit_levels(100.0, 22000.0, &PriceZones::empty());
    assert_eq!(levels.stop_loss, 70.0);
    assert_eq!(levels.target, 150.0);
}

#[test]
fn test_stop_below_entry_below_target() {
    for entry in [1.0, 2.5, 10.0, 55.5, 100.0, 840.0] {
        let levels = exit_levels(entry, 22000.0, &PriceZones::empty());
        assert!(levels.stop_loss > 0.0);
        assert!(levels.stop_loss < entry);
        assert!(entry < levels.target);
    }
}

#[test]
fn test_degenerate_premiums_floor_at_minimum() {
    for entry in [0.0, 0.05, 0.5, -3.0] {
        let levels = exit_levels(entry, 22000.0, &PriceZones::empty());
        // Floored entry of 1.0 keeps both levels positive
        assert_eq!(levels.stop_loss, 0.70);
        assert_eq!(levels.target, 1.5);
    }
}

#[test]
fn test_far_zone_widens_target() {
    let zones = PriceZones {
        supports: vec![],
        resistances: vec![23000.0], // ~4.5% above spot
    };
    let levels = exit_levels(100.0, 22000.0, &zones);
    assert_eq!(levels.stop_loss, 70.0);
    assert_eq!(levels.target, 200.0);
}

#[test]
fn test_recommender_is_total() {
    let biases = [BiasLabel::CallSide, BiasLabel::PutSide, BiasLabel::Neutral];
    let confidences = [0.0, 44.9, 45.0, 69.9, 70.0, 100.0];
    let strikes = [21500.0, 22000.0, 22500.0];
    let spot = 22000.0;

    for bias in biases {
        for confidence in confidences {
            for strike in strikes {
                let strategy = recommend(bias, confidence, spot, strike);
                assert!(matches!(
                    strategy,
                    Strategy::ShortOtmCall
                        | Strategy::ShortOtmPut
                        | Strategy::DirectionalBuy
                        | Strategy::NoTrade
                ));
            }
        }
    }
}

#[test]
fn test_recommender_otm_short_sides() {
    // Call side decaying faster: sell the OTM call
    assert_eq!(
        recommend(BiasLabel::CallSide, 60.0, 22000.0, 22300.0),
        Strategy::ShortOtmCall
    );
    // Put side decaying faster: sell the OTM put
    assert_eq!(
        recommend(BiasLabel::PutSide, 60.0, 22000.0, 21700.0),
        Strategy::ShortOtmPut
    );
}

#[test]
fn test_recommender_guard_rails() {
    // Below the trade threshold nothing fires
    assert_eq!(
        recommend(BiasLabel::CallSide, 20.0, 22000.0, 22300.0),
        Strategy::NoTrade
    );
    // Neutral bias never trades, however confident
    assert_eq!(
        recommend(BiasLabel::Neutral, 100.0, 22000.0, 22300.0),
        Strategy::NoTrade
    );
}

#[test]
fn test_chain_recommendation_wording() {
    assert_eq!(
        chain_recommendation(BiasLabel::CallSide),
        "PE Short Strategy favored (CE decay is higher)"
    );
    assert_eq!(
        chain_recommendation(BiasLabel::PutSide),
        "CE Short Strategy favored (PE decay is higher)"
    );
    assert_eq!(
        chain_recommendation(BiasLabel::Neutral),
        "Neutral Bias - Consider Iron Condor/Straddle"
    );
}
