//! Configuración de costos del conductor
//!
//! La fuente de verdad es la configuración de la organización en el
//! servidor; si no está disponible, la copia local; si tampoco, los
//! valores por defecto. Nunca se persiste una configuración incompleta.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parámetros de costo usados por el motor de viabilidad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    pub cost_per_km: Decimal,
    pub cost_per_hour: Decimal,
    pub km_per_liter: Decimal,
    pub fuel_price_per_liter: Decimal,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            cost_per_km: Decimal::new(50, 2),
            cost_per_hour: Decimal::new(20, 0),
            km_per_liter: Decimal::new(12, 0),
            fuel_price_per_liter: Decimal::new(600, 2),
        }
    }
}

/// Configuración tal como llega del servidor o de una caché antigua:
/// cualquier campo puede faltar
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialCostConfig {
    #[serde(default)]
    pub cost_per_km: Option<Decimal>,
    #[serde(default)]
    pub cost_per_hour: Option<Decimal>,
    #[serde(default)]
    pub km_per_liter: Option<Decimal>,
    #[serde(default)]
    pub fuel_price_per_liter: Option<Decimal>,
}

impl PartialCostConfig {
    /// Completa los huecos (o valores no positivos) con los valores por defecto
    pub fn complete(self) -> CostConfig {
        let defaults = CostConfig::default();
        CostConfig {
            cost_per_km: positive_or(self.cost_per_km, defaults.cost_per_km),
            cost_per_hour: positive_or(self.cost_per_hour, defaults.cost_per_hour),
            km_per_liter: positive_or(self.km_per_liter, defaults.km_per_liter),
            fuel_price_per_liter: positive_or(self.fuel_price_per_liter, defaults.fuel_price_per_liter),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cost_per_km.is_none()
            && self.cost_per_hour.is_none()
            && self.km_per_liter.is_none()
            && self.fuel_price_per_liter.is_none()
    }
}

impl From<CostConfig> for PartialCostConfig {
    fn from(config: CostConfig) -> Self {
        Self {
            cost_per_km: Some(config.cost_per_km),
            cost_per_hour: Some(config.cost_per_hour),
            km_per_liter: Some(config.km_per_liter),
            fuel_price_per_liter: Some(config.fuel_price_per_liter),
        }
    }
}

fn positive_or(value: Option<Decimal>, fallback: Decimal) -> Decimal {
    match value {
        Some(v) if v > Decimal::ZERO => v,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_fills_missing_and_non_positive_fields() {
        let partial = PartialCostConfig {
            cost_per_km: Some(Decimal::new(75, 2)),
            cost_per_hour: None,
            km_per_liter: Some(Decimal::ZERO),
            fuel_price_per_liter: Some(Decimal::new(-1, 0)),
        };
        let config = partial.complete();
        assert_eq!(config.cost_per_km, Decimal::new(75, 2));
        assert_eq!(config.cost_per_hour, Decimal::new(20, 0));
        assert_eq!(config.km_per_liter, Decimal::new(12, 0));
        assert_eq!(config.fuel_price_per_liter, Decimal::new(6, 0));
    }

    #[test]
    fn test_partial_ignores_unknown_settings_columns() {
        let json = r#"{"organization_id":"org-1","cost_per_hour":"30","theme":"dark"}"#;
        let partial: PartialCostConfig = serde_json::from_str(json).unwrap();
        assert!(!partial.is_empty());
        assert_eq!(partial.complete().cost_per_hour, Decimal::new(30, 0));
    }
}
