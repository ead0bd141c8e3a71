//! Historial para el llenado rápido de formularios
//!
//! Lee solo la caché local: funciona igual con o sin conexión.

use super::sync_coordinator::SyncCoordinator;
use crate::models::{sort_newest_first, ExpenseCategory, ExpenseRecord, SyncRecord};
use crate::utils::errors::AppResult;

/// Cantidad de registros recientes que se ofrecen por defecto
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Cantidad de gastos similares que se ofrecen por defecto
pub const DEFAULT_SIMILAR_LIMIT: usize = 3;

pub struct HistoryService;

impl HistoryService {
    /// Los `limit` registros más recientes
    pub fn latest<R: SyncRecord>(mut records: Vec<R>, limit: usize) -> Vec<R> {
        sort_newest_first(&mut records);
        records.truncate(limit);
        records
    }

    /// Los `limit` gastos más recientes de la misma categoría
    pub fn similar_expenses(expenses: Vec<ExpenseRecord>, category: ExpenseCategory, limit: usize) -> Vec<ExpenseRecord> {
        let same_category = expenses
            .into_iter()
            .filter(|expense| expense.category == category)
            .collect();
        Self::latest(same_category, limit)
    }

    pub async fn recent<R: SyncRecord>(coordinator: &SyncCoordinator, limit: usize) -> AppResult<Vec<R>> {
        Ok(Self::latest(coordinator.cached::<R>().await?, limit))
    }

    pub async fn similar(
        coordinator: &SyncCoordinator,
        category: ExpenseCategory,
        limit: usize,
    ) -> AppResult<Vec<ExpenseRecord>> {
        let expenses = coordinator.cached::<ExpenseRecord>().await?;
        Ok(Self::similar_expenses(expenses, category, limit))
    }
}
