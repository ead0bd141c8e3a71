use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use ride_ledger::models::{CostConfig, Platform, RideInput, Viability};
use ride_ledger::services::ViabilityEngine;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn ride(amount: Decimal, distance_km: Decimal, duration_min: u32) -> RideInput {
    RideInput {
        amount,
        distance_km,
        duration_min,
        platform: Platform::Uber,
    }
}

fn configs() -> Vec<CostConfig> {
    vec![
        CostConfig::default(),
        CostConfig {
            cost_per_km: d("0.5"),
            cost_per_hour: d("20"),
            km_per_liter: d("12"),
            fuel_price_per_liter: d("5.5"),
        },
        CostConfig {
            cost_per_km: d("0.333"),
            cost_per_hour: d("17.35"),
            km_per_liter: d("9.7"),
            fuel_price_per_liter: d("6.19"),
        },
    ]
}

#[test]
fn test_scenario_reference_ride() {
    let result = ViabilityEngine::analyze(&ride(d("50"), d("20"), 40), &configs()[1]);

    assert_eq!(result.fuel_cost, d("9.17"));
    assert_eq!(result.wear_cost, d("10.00"));
    assert_eq!(result.time_cost, d("13.33"));
    assert_eq!(result.total_cost, d("32.50"));
    assert_eq!(result.net_profit, d("17.50"));
    assert_eq!(result.profit_margin, d("35.00"));
    assert_eq!(result.viability, Viability::Good);
}

#[test]
fn test_total_and_net_are_consistent_with_rounded_parts() {
    let distances = ["0", "0.01", "1.5", "7.77", "23.4", "101"];
    let minutes = [0u32, 1, 7, 33, 59, 125];

    for config in configs() {
        for (distance, duration) in distances.iter().zip(minutes) {
            let amount = d("27.35");
            let result = ViabilityEngine::analyze(&ride(amount, d(distance), duration), &config);

            assert_eq!(
                result.total_cost,
                round2(result.fuel_cost) + round2(result.wear_cost) + round2(result.time_cost)
            );
            assert_eq!(result.net_profit, round2(amount - result.total_cost));
        }
    }
}

#[test]
fn test_higher_amount_never_worsens_viability() {
    for config in configs() {
        let mut previous = Viability::Terrible;
        let mut amount = Decimal::ZERO;
        while amount <= d("200") {
            let result = ViabilityEngine::analyze(&ride(amount, d("18.4"), 37), &config);
            assert!(
                result.viability >= previous,
                "amount {} dropped from {:?} to {:?}",
                amount,
                previous,
                result.viability
            );
            previous = result.viability;
            amount += d("0.25");
        }
        assert_eq!(previous, Viability::Excellent);
    }
}

#[test]
fn test_recommendation_matches_tier() {
    let result = ViabilityEngine::analyze(&ride(d("5"), d("20"), 40), &CostConfig::default());
    assert_eq!(result.viability, Viability::Terrible);
    assert_eq!(result.recommendation, Viability::Terrible.recommendation());
}
