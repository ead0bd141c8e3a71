//! Motor de economía de carreras
//!
//! Cálculo puro y determinista del desglose de costos, la ganancia neta y
//! el veredicto de viabilidad de una carrera. No hace I/O y nunca falla:
//! la UI sanea las entradas antes de llamar (ver `utils::validation`).
//!
//! El redondeo a 2 decimales ocurre solo en la salida. El costo total se
//! reporta como la suma de los tres componentes ya redondeados, de modo
//! que `total_cost == fuel_cost + wear_cost + time_cost` siempre se cumple
//! sobre los valores que ve el usuario.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{CostConfig, RideInput, TargetReport, TargetThresholds, Viability, ViabilityResult};

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Motor de viabilidad
pub struct ViabilityEngine;

impl ViabilityEngine {
    /// Analiza una carrera con la configuración de costos vigente
    pub fn analyze(ride: &RideInput, config: &CostConfig) -> ViabilityResult {
        let distance = ride.distance_km;
        let minutes = Decimal::from(ride.duration_min);

        let fuel_cost = (distance * config.fuel_price_per_liter)
            .checked_div(config.km_per_liter)
            .unwrap_or(Decimal::ZERO);
        let wear_cost = distance * config.cost_per_km;
        let time_cost = minutes * config.cost_per_hour / MINUTES_PER_HOUR;

        let fuel_cost = round2(fuel_cost);
        let wear_cost = round2(wear_cost);
        let time_cost = round2(time_cost);
        let total_cost = fuel_cost + wear_cost + time_cost;

        let net_profit = round2(ride.amount - total_cost);
        let profit_margin = if ride.amount > Decimal::ZERO {
            round2(net_profit * HUNDRED / ride.amount)
        } else {
            Decimal::ZERO
        };

        let value_per_km = if distance > Decimal::ZERO {
            round2(ride.amount / distance)
        } else {
            Decimal::ZERO
        };
        let value_per_hour = if ride.duration_min > 0 {
            round2(ride.amount * MINUTES_PER_HOUR / minutes)
        } else {
            Decimal::ZERO
        };

        let viability = Viability::from_margin(profit_margin);

        ViabilityResult {
            fuel_cost,
            wear_cost,
            time_cost,
            total_cost,
            net_profit,
            profit_margin,
            value_per_km,
            value_per_hour,
            viability,
            recommendation: viability.recommendation().to_string(),
        }
    }

    /// Compara la carrera con las metas del conductor
    pub fn check_targets(
        ride: &RideInput,
        analysis: &ViabilityResult,
        thresholds: &TargetThresholds,
    ) -> TargetReport {
        let meets_min_per_km = analysis.value_per_km >= thresholds.min_value_per_km;
        let meets_min_per_hour = analysis.value_per_hour >= thresholds.min_value_per_hour;
        let exceeds_max_distance = ride.distance_km > thresholds.max_distance_km;
        let exceeds_max_duration = ride.duration_min > thresholds.max_duration_min;

        let mut reasons = Vec::new();
        if meets_min_per_km {
            reasons.push(format!(
                "{:.2}/km (minimum {:.2})",
                analysis.value_per_km, thresholds.min_value_per_km
            ));
        } else {
            reasons.push(format!(
                "{:.2}/km below minimum ({:.2})",
                analysis.value_per_km, thresholds.min_value_per_km
            ));
        }
        if meets_min_per_hour {
            reasons.push(format!(
                "{:.2}/h (minimum {:.2})",
                analysis.value_per_hour, thresholds.min_value_per_hour
            ));
        } else {
            reasons.push(format!(
                "{:.2}/h below minimum ({:.2})",
                analysis.value_per_hour, thresholds.min_value_per_hour
            ));
        }
        if exceeds_max_distance {
            reasons.push(format!(
                "Distance ({:.1} km) exceeds maximum ({} km)",
                ride.distance_km, thresholds.max_distance_km
            ));
        }
        if exceeds_max_duration {
            reasons.push(format!(
                "Duration ({} min) exceeds maximum ({} min)",
                ride.duration_min, thresholds.max_duration_min
            ));
        }

        TargetReport {
            meets_min_per_km,
            meets_min_per_hour,
            exceeds_max_distance,
            exceeds_max_duration,
            reasons,
        }
    }
}

pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ride(amount: &str, distance: &str, minutes: u32) -> RideInput {
        RideInput {
            amount: d(amount),
            distance_km: d(distance),
            duration_min: minutes,
            platform: Platform::Uber,
        }
    }

    fn scenario_config() -> CostConfig {
        CostConfig {
            cost_per_km: d("0.5"),
            cost_per_hour: d("20"),
            km_per_liter: d("12"),
            fuel_price_per_liter: d("5.5"),
        }
    }

    #[test]
    fn test_reference_ride_is_good() {
        let result = ViabilityEngine::analyze(&ride("50", "20", 40), &scenario_config());
        assert_eq!(result.fuel_cost, d("9.17"));
        assert_eq!(result.wear_cost, d("10.00"));
        assert_eq!(result.time_cost, d("13.33"));
        assert_eq!(result.total_cost, d("32.50"));
        assert_eq!(result.net_profit, d("17.50"));
        assert_eq!(result.profit_margin, d("35.00"));
        assert_eq!(result.value_per_km, d("2.50"));
        assert_eq!(result.value_per_hour, d("75.00"));
        assert_eq!(result.viability, Viability::Good);
        assert_eq!(result.recommendation, Viability::Good.recommendation());
    }

    #[test]
    fn test_total_is_sum_of_rounded_components() {
        // Cada componente vale 0.005: redondear y sumar da 0.03,
        // sumar y redondear daría 0.02.
        let config = CostConfig {
            cost_per_km: d("0.5"),
            cost_per_hour: d("0.3"),
            km_per_liter: d("12"),
            fuel_price_per_liter: d("6"),
        };
        let result = ViabilityEngine::analyze(&ride("1", "0.01", 1), &config);
        assert_eq!(result.fuel_cost, d("0.01"));
        assert_eq!(result.wear_cost, d("0.01"));
        assert_eq!(result.time_cost, d("0.01"));
        assert_eq!(result.total_cost, d("0.03"));
        assert_ne!(result.total_cost, d("0.02"));
        assert_eq!(result.net_profit, d("0.97"));
    }

    #[test]
    fn test_zero_amount_distance_and_duration() {
        let result = ViabilityEngine::analyze(&ride("0", "0", 0), &CostConfig::default());
        assert_eq!(result.total_cost, Decimal::ZERO);
        assert_eq!(result.net_profit, Decimal::ZERO);
        assert_eq!(result.profit_margin, Decimal::ZERO);
        assert_eq!(result.value_per_km, Decimal::ZERO);
        assert_eq!(result.value_per_hour, Decimal::ZERO);
        assert_eq!(result.viability, Viability::Terrible);
    }

    #[test]
    fn test_zero_km_per_liter_does_not_panic() {
        let mut config = scenario_config();
        config.km_per_liter = Decimal::ZERO;
        let result = ViabilityEngine::analyze(&ride("50", "20", 40), &config);
        assert_eq!(result.fuel_cost, Decimal::ZERO);
    }

    #[test]
    fn test_loss_is_terrible() {
        let result = ViabilityEngine::analyze(&ride("10", "20", 40), &scenario_config());
        assert!(result.net_profit < Decimal::ZERO);
        assert_eq!(result.viability, Viability::Terrible);
    }

    #[test]
    fn test_check_targets_reports_violations() {
        let input = ride("12", "15", 45);
        let analysis = ViabilityEngine::analyze(&input, &scenario_config());
        let report = ViabilityEngine::check_targets(&input, &analysis, &TargetThresholds::default());
        assert!(!report.meets_min_per_km);
        assert!(!report.meets_min_per_hour);
        assert!(report.exceeds_max_distance);
        assert!(report.exceeds_max_duration);
        assert!(!report.all_met());
        assert_eq!(report.reasons.len(), 4);
    }

    #[test]
    fn test_check_targets_all_met() {
        let input = ride("20", "5", 15);
        let analysis = ViabilityEngine::analyze(&input, &scenario_config());
        let report = ViabilityEngine::check_targets(&input, &analysis, &TargetThresholds::default());
        assert!(report.all_met());
        assert_eq!(report.reasons.len(), 2);
    }
}
