//! Filtros para listados de carreras y gastos

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::expense::ExpenseCategory;
use super::ride::Platform;

/// Filtros opcionales; vacío significa "todo"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListFilters {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub platform: Option<Platform>,
    pub category: Option<ExpenseCategory>,
    pub limit: Option<usize>,
}

impl ListFilters {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.platform.is_none()
            && self.category.is_none()
            && self.limit.is_none()
    }

    pub fn matches_date(&self, created_at: DateTime<Utc>) -> bool {
        self.start_date.map_or(true, |start| created_at >= start)
            && self.end_date.map_or(true, |end| created_at <= end)
    }

    pub fn since(start_date: DateTime<Utc>) -> Self {
        Self {
            start_date: Some(start_date),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
