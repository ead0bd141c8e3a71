//! Resumen de ganancias del período

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ride::Platform;

/// Estadísticas de los últimos 30 días
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsSummary {
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    pub total_rides: usize,
    pub total_km: Decimal,
    pub average_ride_value: Decimal,
    /// Franja de 4 horas con mejor valor medio, p. ej. "16h-20h"
    pub best_time_window: Option<String>,
    pub best_platform: Option<Platform>,
    pub rides_today: usize,
    pub profit_margin: Decimal,
}

impl Default for EarningsSummary {
    fn default() -> Self {
        Self {
            total_revenue: Decimal::ZERO,
            total_expenses: Decimal::ZERO,
            net_profit: Decimal::ZERO,
            total_rides: 0,
            total_km: Decimal::ZERO,
            average_ride_value: Decimal::ZERO,
            best_time_window: None,
            best_platform: None,
            rides_today: 0,
            profit_margin: Decimal::ZERO,
        }
    }
}
