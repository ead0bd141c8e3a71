//! Services module
//!
//! Este módulo contiene la lógica de negocio: el motor de viabilidad,
//! la sincronización local-first y los servicios que se apoyan en ella.

pub mod config_service;
pub mod export_service;
pub mod history_service;
pub mod summary_service;
pub mod sync_coordinator;
pub mod sync_strategy;
pub mod templates_service;
pub mod viability_service;

pub use config_service::ConfigService;
pub use export_service::{ExportScope, ExportService, ReportPeriod};
pub use history_service::HistoryService;
pub use summary_service::summarize;
pub use sync_coordinator::{SyncCoordinator, SyncReport};
pub use sync_strategy::{LocalOnly, RemoteBacked, SyncStrategy};
pub use templates_service::TemplatesService;
pub use viability_service::ViabilityEngine;
