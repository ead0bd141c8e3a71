//! Ride Ledger
//!
//! Núcleo local-first para conductores de aplicación: análisis de
//! viabilidad de carreras y sincronización de carreras y gastos entre
//! el almacenamiento local y el servidor de la organización.

pub mod cache;
pub mod clients;
pub mod config;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use state::{AppState, Session, SessionProvider, SessionState};
