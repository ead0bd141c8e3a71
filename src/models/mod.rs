//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos del núcleo: carreras, gastos,
//! configuración de costos, resultado de viabilidad, plantillas de gasto
//! e identidad de registros para la sincronización.

pub mod cost_config;
pub mod expense;
pub mod filters;
pub mod identity;
pub mod record;
pub mod ride;
pub mod summary;
pub mod template;
pub mod viability;

pub use cost_config::{CostConfig, PartialCostConfig};
pub use expense::{ExpenseCategory, ExpenseDraft, ExpenseRecord};
pub use filters::ListFilters;
pub use identity::{is_server_id, RecordIdentity};
pub use record::{sort_newest_first, RecordKind, SyncRecord};
pub use ride::{Platform, RideDraft, RideInput, RideRecord};
pub use summary::EarningsSummary;
pub use template::{ExpenseTemplate, TemplateDraft};
pub use viability::{TargetReport, TargetThresholds, Viability, ViabilityResult};
