//! Configuración del almacenamiento local
//!
//! Este módulo contiene la configuración para el almacenamiento clave-valor
//! donde se guardan las cachés de carreras, gastos y configuración.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backend del almacenamiento local
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    File,
    Redis,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown store backend '{}'", other)),
        }
    }
}

/// Configuración del almacenamiento local
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    pub redis_url: String,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            data_dir: PathBuf::from(".ride_ledger"),
            redis_url: "redis://localhost:6379".to_string(),
            key_prefix: "ride_ledger".to_string(),
        }
    }
}
