//! Plantillas de gasto para el llenado rápido
//!
//! Solo viven en el almacenamiento local; no se sincronizan.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::expense::{ExpenseCategory, ExpenseDraft};
use crate::utils::validation::{validate_non_negative, validate_not_blank};

/// Datos de una plantilla nueva
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TemplateDraft {
    pub category: ExpenseCategory,

    #[validate(custom = "validate_non_negative")]
    pub amount: Decimal,

    #[validate(custom = "validate_not_blank", length(max = 500))]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTemplate {
    pub id: String,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Veces que se creó un gasto desde la plantilla
    #[serde(default)]
    pub used: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl ExpenseTemplate {
    pub fn new(draft: TemplateDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category: draft.category,
            amount: draft.amount,
            description: draft.description.trim().to_string(),
            created_at: Utc::now(),
            used: 0,
            last_used: None,
        }
    }

    /// Borrador de gasto prellenado con la plantilla
    pub fn to_draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            category: self.category,
            amount: self.amount,
            description: self.description.clone(),
            created_at: None,
        }
    }
}
