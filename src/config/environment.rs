//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. `main` carga `.env`
//! con dotenvy antes de llamar a `AppConfig::from_env`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{CacheConfig, StoreBackend};
use crate::utils::errors::{config_error, AppError};

/// Timeout por defecto de las llamadas remotas
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 5;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub log_level: String,
    /// URL base del servidor (PostgREST); sin ella todo es solo local
    pub remote_url: Option<String>,
    pub remote_api_key: Option<String>,
    pub remote_timeout: Duration,
    /// Secreto para verificar la firma del access token
    pub jwt_secret: Option<String>,
    /// Access token de la sesión actual
    pub access_token: Option<String>,
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            remote_url: None,
            remote_api_key: None,
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            jwt_secret: None,
            access_token: None,
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Leer la configuración de las variables de entorno
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Leer la configuración de una fuente arbitraria (tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let remote_timeout = match non_empty("REMOTE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .map_err(|_| config_error("REMOTE_TIMEOUT_SECS must be a valid number"))?,
            ),
            None => defaults.remote_timeout,
        };

        let backend = match non_empty("STORE_BACKEND") {
            Some(raw) => raw.parse::<StoreBackend>().map_err(AppError::Config)?,
            None => defaults.cache.backend.clone(),
        };

        let cache = CacheConfig {
            backend,
            data_dir: non_empty("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache.data_dir),
            redis_url: non_empty("REDIS_URL").unwrap_or(defaults.cache.redis_url),
            key_prefix: non_empty("CACHE_KEY_PREFIX").unwrap_or(defaults.cache.key_prefix),
        };

        Ok(Self {
            environment: non_empty("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: non_empty("LOG_LEVEL").unwrap_or(defaults.log_level),
            remote_url: non_empty("REMOTE_URL").map(|url| url.trim_end_matches('/').to_string()),
            remote_api_key: non_empty("REMOTE_API_KEY"),
            remote_timeout,
            jwt_secret: non_empty("JWT_SECRET"),
            access_token: non_empty("SESSION_TOKEN"),
            cache,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn has_remote(&self) -> bool {
        self.remote_url.is_some()
    }
}
