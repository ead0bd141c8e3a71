//! Modelos del análisis de viabilidad
//!
//! Resultado del motor de economía de carreras y reporte de metas del
//! conductor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Veredicto categórico de una carrera
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viability {
    Terrible,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Viability {
    /// Nivel por margen de ganancia (%), el primero que coincide gana
    pub fn from_margin(margin: Decimal) -> Self {
        if margin > Decimal::new(50, 0) {
            Viability::Excellent
        } else if margin > Decimal::new(30, 0) {
            Viability::Good
        } else if margin > Decimal::new(15, 0) {
            Viability::Fair
        } else if margin > Decimal::ZERO {
            Viability::Poor
        } else {
            Viability::Terrible
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Viability::Excellent => "Very profitable ride! Accept it!",
            Viability::Good => "Worth it! Good margin.",
            Viability::Fair => "Acceptable, but not ideal.",
            Viability::Poor => "Low profit, consider declining.",
            Viability::Terrible => "Not worth it! Guaranteed loss.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Viability::Excellent => "excellent",
            Viability::Good => "good",
            Viability::Fair => "fair",
            Viability::Poor => "poor",
            Viability::Terrible => "terrible",
        }
    }
}

/// Desglose de costos, ganancia y veredicto de una carrera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViabilityResult {
    pub fuel_cost: Decimal,
    pub wear_cost: Decimal,
    pub time_cost: Decimal,
    pub total_cost: Decimal,
    pub net_profit: Decimal,
    pub profit_margin: Decimal,
    pub value_per_km: Decimal,
    pub value_per_hour: Decimal,
    pub viability: Viability,
    pub recommendation: String,
}

/// Metas mínimas y límites del conductor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetThresholds {
    pub min_value_per_km: Decimal,
    pub min_value_per_hour: Decimal,
    pub max_distance_km: Decimal,
    pub max_duration_min: u32,
}

impl Default for TargetThresholds {
    fn default() -> Self {
        Self {
            min_value_per_km: Decimal::new(180, 2),
            min_value_per_hour: Decimal::new(2500, 2),
            max_distance_km: Decimal::new(10, 0),
            max_duration_min: 30,
        }
    }
}

/// Cumplimiento de metas; solo informativo, no altera el veredicto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetReport {
    pub meets_min_per_km: bool,
    pub meets_min_per_hour: bool,
    pub exceeds_max_distance: bool,
    pub exceeds_max_duration: bool,
    pub reasons: Vec<String>,
}

impl TargetReport {
    pub fn all_met(&self) -> bool {
        self.meets_min_per_km
            && self.meets_min_per_hour
            && !self.exceeds_max_distance
            && !self.exceeds_max_duration
    }
}
