//! Modelo de gasto (Expense)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::filters::ListFilters;
use super::identity::RecordIdentity;
use super::record::{RecordKind, SyncRecord};
use crate::utils::errors::AppResult;
use crate::utils::validation::{validate_non_negative, validate_not_blank};

/// Categoría del gasto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Fuel,
    Maintenance,
    Food,
    Parking,
    Wash,
    Fine,
    Insurance,
    #[serde(other)]
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Fuel => "fuel",
            ExpenseCategory::Maintenance => "maintenance",
            ExpenseCategory::Food => "food",
            ExpenseCategory::Parking => "parking",
            ExpenseCategory::Wash => "wash",
            ExpenseCategory::Fine => "fine",
            ExpenseCategory::Insurance => "insurance",
            ExpenseCategory::Other => "other",
        }
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase()))
    }
}

/// Borrador de gasto capturado por la UI
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExpenseDraft {
    pub category: ExpenseCategory,

    #[validate(custom = "validate_non_negative")]
    pub amount: Decimal,

    #[validate(custom = "validate_not_blank", length(max = 500))]
    pub description: String,

    pub created_at: Option<DateTime<Utc>>,
}

/// Gasto persistido
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(flatten)]
    pub identity: RecordIdentity,
    #[serde(default)]
    pub organization_id: Option<String>,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    pub fn new(draft: ExpenseDraft) -> Self {
        Self {
            identity: RecordIdentity::pending(),
            organization_id: None,
            category: draft.category,
            amount: draft.amount,
            description: draft.description.trim().to_string(),
            created_at: draft.created_at.unwrap_or_else(Utc::now),
        }
    }

    /// Valida el borrador antes de crear el registro
    pub fn from_draft(draft: ExpenseDraft) -> AppResult<Self> {
        draft.validate()?;
        Ok(Self::new(draft))
    }

    pub fn id(&self) -> &str {
        self.identity.id()
    }
}

impl SyncRecord for ExpenseRecord {
    const KIND: RecordKind = RecordKind::Expenses;

    fn identity(&self) -> &RecordIdentity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut RecordIdentity {
        &mut self.identity
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn matches_kind_filters(&self, filters: &ListFilters) -> bool {
        filters.category.map_or(true, |c| c == self.category)
    }
}
