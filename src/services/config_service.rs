//! Resolución de la configuración de costos
//!
//! Orden: configuración de la organización en el servidor, copia local
//! bajo la clave `config`, valores por defecto. `resolve` nunca falla.

use std::sync::Arc;
use tracing::{debug, warn};

use super::sync_coordinator::SyncCoordinator;
use crate::models::{CostConfig, PartialCostConfig};
use crate::utils::errors::AppResult;

pub const CONFIG_CACHE_KEY: &str = "config";

pub struct ConfigService {
    coordinator: Arc<SyncCoordinator>,
}

impl ConfigService {
    pub fn new(coordinator: Arc<SyncCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Configuración efectiva para el motor de viabilidad
    pub async fn resolve(&self) -> CostConfig {
        let strategy = self.coordinator.strategy();

        match strategy.fetch_settings().await {
            Ok(Some(settings)) => {
                let config = settings.complete();
                if let Err(e) = self.save_local(&config).await {
                    warn!("⚠️ No se pudo cachear la configuración remota: {}", e);
                }
                debug!("⚙️ Configuración de la organización aplicada");
                return config;
            }
            Ok(None) => debug!("⚙️ La organización no tiene configuración propia"),
            Err(e) => debug!("⚙️ Configuración remota no disponible: {}", e),
        }

        match self.cached().await {
            Some(config) => config,
            None => CostConfig::default(),
        }
    }

    /// Persiste una configuración editada por el usuario
    pub async fn save_local(&self, config: &CostConfig) -> AppResult<()> {
        let raw = serde_json::to_string(config)?;
        self.coordinator.local().set(CONFIG_CACHE_KEY, &raw).await?;
        Ok(())
    }

    async fn cached(&self) -> Option<CostConfig> {
        let raw = match self.coordinator.local().get(CONFIG_CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("⚠️ No se pudo leer la configuración local: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<PartialCostConfig>(&raw) {
            Ok(partial) => Some(partial.complete()),
            Err(e) => {
                warn!("⚠️ Configuración local corrupta, usando valores por defecto: {}", e);
                None
            }
        }
    }
}
